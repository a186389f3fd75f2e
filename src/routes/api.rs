use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::pipeline::{MatchResponse, MatchService};

/// POST /api/v1/match
///
/// Multipart form: `resume` (PDF, required), `location` (optional free
/// text, empty means no geographic filter), `keywords` (optional comma
/// list, the manual fallback when role inference is down). Nothing from
/// the upload is stored; the resume lives only for this request.
pub async fn match_resume(
    State(service): State<Arc<MatchService>>,
    mut multipart: Multipart,
) -> Result<Json<MatchResponse>, AppError> {
    let mut resume_bytes: Option<Vec<u8>> = None;
    let mut location = String::new();
    let mut keywords: Vec<String> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        match field.name().unwrap_or("") {
            "resume" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("could not read upload: {e}")))?;
                resume_bytes = Some(bytes.to_vec());
            }
            "location" => {
                location = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("invalid location field: {e}")))?;
            }
            "keywords" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("invalid keywords field: {e}")))?;
                keywords = split_keywords(&raw);
            }
            _ => {}
        }
    }

    let resume_bytes = resume_bytes
        .ok_or_else(|| AppError::BadRequest("missing 'resume' file field".to_string()))?;

    let request_id = Uuid::new_v4();
    tracing::info!(
        %request_id,
        resume_bytes = resume_bytes.len(),
        location = %location,
        manual_keywords = keywords.len(),
        "Match request received"
    );

    let response = service
        .match_resume(&resume_bytes, location.trim(), keywords)
        .await?;

    tracing::info!(
        %request_id,
        ranked = response.jobs.len(),
        mode = ?response.ranking_mode,
        "Match request completed"
    );
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub keywords: Vec<String>,
    #[serde(default)]
    pub location: String,
}

/// POST /api/v1/search
///
/// Keyword-only search, no resume upload. Results are ranked against the
/// joined keywords.
pub async fn search(
    State(service): State<Arc<MatchService>>,
    Json(input): Json<SearchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    let response = service
        .match_keywords(input.keywords, input.location.trim())
        .await?;
    Ok(Json(response))
}

fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}
