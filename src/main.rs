mod config;
mod embedding;
mod error;
mod llm;
mod models;
mod pipeline;
mod resume;
mod routes;
mod sources;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::config::{Command, Config};
use crate::embedding::Embedder;
use crate::error::AppError;
use crate::llm::OllamaClient;
use crate::pipeline::aggregate::Aggregator;
use crate::pipeline::rank::Ranker;
use crate::pipeline::{MatchResponse, MatchService};

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

fn build_embedder(config: &Config, timeout: Duration) -> Result<Arc<dyn Embedder>, AppError> {
    match config.embedding_backend.as_str() {
        "ollama" => Ok(Arc::new(embedding::ollama::OllamaEmbedder::new(
            &config.ollama_url,
            &config.embed_model,
            timeout,
        )?)),
        "openai" => Ok(Arc::new(embedding::openai::OpenAiEmbedder::new(
            &config.openai_base_url,
            &config.embed_model,
            config.openai_api_key.as_deref().unwrap_or(""),
            timeout,
        )?)),
        other => Err(AppError::Internal(format!(
            "unknown embedding backend '{other}' (expected 'ollama' or 'openai')"
        ))),
    }
}

fn build_service(config: &Config) -> anyhow::Result<MatchService> {
    let timeout = Duration::from_secs(config.request_timeout);

    let llm = OllamaClient::new(&config.ollama_url, &config.chat_model, timeout)?;
    let embedder = build_embedder(config, timeout)?;
    let sources = sources::build_sources(config)?;
    tracing::info!(
        sources = sources.len(),
        embedding_backend = embedder.name(),
        chat_model = %config.chat_model,
        "Pipeline configured"
    );

    Ok(MatchService {
        llm,
        aggregator: Aggregator::new(sources, config.source_limit, timeout),
        ranker: Ranker::new(embedder, config.top_k),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("jobmatch=info,tower_http=info")),
        )
        .init();

    let config = Config::parse();

    match config.resolved_command() {
        Command::Serve { listen_addr } => {
            let service = Arc::new(build_service(&config)?);

            let app = Router::new()
                .route("/healthz", get(healthz))
                .merge(routes::router(service))
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive());

            let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
            tracing::info!("Listening on {listen_addr}");
            axum::serve(listener, app).await?;
        }
        Command::Match {
            resume,
            location,
            keywords,
        } => {
            let service = build_service(&config)?;
            let bytes = std::fs::read(&resume)?;
            let response = service
                .match_resume(&bytes, location.trim(), keywords)
                .await?;
            print_results(&response);
        }
    }

    Ok(())
}

/// Plain-text rendering for the CLI path. Nothing is persisted.
fn print_results(response: &MatchResponse) {
    println!("Target role: {}", response.profile.primary_role);
    if !response.profile.keywords.is_empty() {
        println!("Keywords:    {}", response.profile.keywords.join(", "));
    }
    println!("Ranking:     {:?}", response.ranking_mode);
    for outcome in &response.sources {
        match outcome {
            models::SourceOutcome::Ok { source, found } => {
                println!("Source {source}: {found} found");
            }
            models::SourceOutcome::Failed { source, error } => {
                println!("Source {source}: FAILED ({error})");
            }
        }
    }
    println!();

    if response.jobs.is_empty() {
        println!("No jobs found.");
        return;
    }

    for job in &response.jobs {
        println!(
            "{:>3}. [{:+.3}] {} at {} ({}) <{}> via {}",
            job.rank,
            job.score,
            job.job.title,
            if job.job.company.is_empty() {
                "?"
            } else {
                &job.job.company
            },
            if job.job.location.is_empty() {
                "anywhere"
            } else {
                &job.job.location
            },
            job.job.url,
            job.job.source,
        );
    }
}
