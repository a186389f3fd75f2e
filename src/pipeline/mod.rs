// Request orchestration: resume text -> role profile -> aggregate ->
// rank. Shared by the HTTP routes and the one-shot CLI; holds no state
// across requests.

pub mod aggregate;
pub mod rank;

use serde::Serialize;

use crate::error::AppError;
use crate::llm::OllamaClient;
use crate::models::{RankedJob, RoleProfile, SourceOutcome};
use crate::pipeline::aggregate::Aggregator;
use crate::pipeline::rank::{Ranker, RankingMode};
use crate::resume;

pub struct MatchService {
    pub llm: OllamaClient,
    pub aggregator: Aggregator,
    pub ranker: Ranker,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub profile: RoleProfile,
    /// The exact text jobs were ranked against: the LLM summary, the
    /// raw-resume fallback slice, or the joined keywords.
    pub summary_used: String,
    /// Whether jobs were scored by embeddings or the lexical fallback.
    pub ranking_mode: RankingMode,
    pub sources: Vec<SourceOutcome>,
    pub jobs: Vec<RankedJob>,
}

impl MatchService {
    /// Full match flow for an uploaded resume. `manual_keywords` is the
    /// caller-supplied fallback used when role inference is unavailable;
    /// without it an inference failure is surfaced to the caller.
    pub async fn match_resume(
        &self,
        resume_bytes: &[u8],
        location: &str,
        manual_keywords: Vec<String>,
    ) -> Result<MatchResponse, AppError> {
        let resume_text = resume::extract_text(resume_bytes)?;

        let mut inference_failed = false;
        let profile = match self.llm.infer_role(&resume_text).await {
            Ok(profile) => profile,
            Err(e) => {
                inference_failed = true;
                let fallback = RoleProfile::from_keywords(manual_keywords);
                if fallback.keywords.is_empty() {
                    return Err(e);
                }
                tracing::warn!("Role inference failed, using manual keywords: {e}");
                fallback
            }
        };

        let summary = self.llm.summarize(&resume_text).await;
        self.search_and_rank(profile, &summary, location, inference_failed)
            .await
    }

    /// Keyword-only flow, no resume involved. Jobs are ranked against the
    /// joined keywords.
    pub async fn match_keywords(
        &self,
        keywords: Vec<String>,
        location: &str,
    ) -> Result<MatchResponse, AppError> {
        let profile = RoleProfile::from_keywords(keywords);
        if profile.keywords.is_empty() {
            return Err(AppError::BadRequest("no keywords provided".to_string()));
        }
        let summary = profile.keywords.join(" ");
        self.search_and_rank(profile, &summary, location, false)
            .await
    }

    async fn search_and_rank(
        &self,
        profile: RoleProfile,
        summary: &str,
        location: &str,
        inference_failed: bool,
    ) -> Result<MatchResponse, AppError> {
        let output = self.aggregator.aggregate(&profile, location).await;

        let all_failed = !output.outcomes.is_empty()
            && output
                .outcomes
                .iter()
                .all(|o| matches!(o, SourceOutcome::Failed { .. }));
        if all_failed && inference_failed {
            // Nothing trustworthy to show: inferred roles were a guess
            // from manual keywords and every source is down.
            return Err(AppError::Internal(
                "all job sources failed and role inference was unavailable".to_string(),
            ));
        }

        let ranked = self.ranker.rank(output.jobs, summary).await;

        Ok(MatchResponse {
            profile,
            summary_used: summary.to_string(),
            ranking_mode: ranked.mode,
            sources: output.outcomes,
            jobs: ranked.jobs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::embedding::Embedder;

    struct DownEmbedder;

    #[async_trait]
    impl Embedder for DownEmbedder {
        fn name(&self) -> &str {
            "down"
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>, AppError> {
            Err(AppError::EmbeddingUnavailable("unreachable".to_string()))
        }
    }

    fn service() -> MatchService {
        MatchService {
            llm: OllamaClient::new("http://localhost:11434", "mistral", Duration::from_secs(1))
                .unwrap(),
            aggregator: Aggregator::new(Vec::new(), 10, Duration::from_secs(1)),
            ranker: Ranker::new(Arc::new(DownEmbedder), 10),
        }
    }

    #[tokio::test]
    async fn response_reports_the_text_jobs_were_ranked_against() {
        let response = service()
            .match_keywords(vec!["rust".to_string(), "backend".to_string()], "")
            .await
            .unwrap();
        assert_eq!(response.summary_used, "rust backend");

        let body = serde_json::to_value(&response).unwrap();
        for field in ["profile", "summary_used", "ranking_mode", "sources", "jobs"] {
            assert!(body.get(field).is_some(), "missing field {field}");
        }
        assert_eq!(body["summary_used"], "rust backend");
    }

    #[tokio::test]
    async fn keyword_search_rejects_empty_input() {
        let err = service().match_keywords(Vec::new(), "").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
