//! Score deduplicated postings against the resume summary and keep the
//! best top_k. Embedding failures degrade to lexical overlap scoring;
//! ranking never comes back empty just because the model host is down.

use std::sync::Arc;

use serde::Serialize;

use crate::embedding::{Embedder, cosine_similarity, lexical};
use crate::models::{JobPosting, RankedJob};

/// How many description characters feed each job's embedding call.
const MAX_DESCRIPTION_CHARS: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingMode {
    Embedding,
    Lexical,
}

#[derive(Debug)]
pub struct RankOutput {
    pub jobs: Vec<RankedJob>,
    pub mode: RankingMode,
}

pub struct Ranker {
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl Ranker {
    pub fn new(embedder: Arc<dyn Embedder>, top_k: usize) -> Self {
        Ranker { embedder, top_k }
    }

    /// Embed the summary once, score every job, sort and truncate.
    /// Ordering is deterministic: score descending, then published_at
    /// descending, then original aggregation order (stable sort).
    pub async fn rank(&self, jobs: Vec<JobPosting>, summary: &str) -> RankOutput {
        if jobs.is_empty() {
            return RankOutput {
                jobs: Vec::new(),
                mode: RankingMode::Embedding,
            };
        }

        let resume_vector = match self.embedder.embed(summary).await {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(
                    backend = self.embedder.name(),
                    "Resume embedding failed, ranking falls back to lexical scoring: {e}"
                );
                None
            }
        };
        let mut cosine_scored = 0usize;
        let mut scored = Vec::with_capacity(jobs.len());
        for job in jobs {
            let text = job.embedding_text(MAX_DESCRIPTION_CHARS);
            let score = match &resume_vector {
                Some(resume_vector) => match self.embedder.embed(&text).await {
                    Ok(job_vector) => {
                        cosine_scored += 1;
                        cosine_similarity(resume_vector, &job_vector)
                    }
                    Err(e) => {
                        // One bad call degrades one job, not the ranking.
                        tracing::warn!(
                            backend = self.embedder.name(),
                            title = %job.title,
                            "Job embedding failed, using lexical score: {e}"
                        );
                        lexical::overlap_score(summary, &text)
                    }
                },
                None => lexical::overlap_score(summary, &text),
            };
            scored.push((score, job));
        }

        // The mode reflects how jobs were actually scored: a run where the
        // resume embedded but every job call failed is lexical all the same.
        let mode = if cosine_scored > 0 {
            RankingMode::Embedding
        } else {
            RankingMode::Lexical
        };

        // Stable sort keeps aggregation order as the final tie-break.
        scored.sort_by(|(score_a, job_a), (score_b, job_b)| {
            score_b
                .total_cmp(score_a)
                .then_with(|| job_b.published_at.cmp(&job_a.published_at))
        });

        let jobs = scored
            .into_iter()
            .take(self.top_k)
            .enumerate()
            .map(|(i, (score, job))| RankedJob {
                rank: i as u32 + 1,
                score,
                job,
            })
            .collect();

        RankOutput { jobs, mode }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use crate::error::AppError;
    use crate::models::JobSourceKind;

    /// Embedder with canned vectors per exact input text.
    struct StubEmbedder {
        vectors: HashMap<String, Vec<f32>>,
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        fn name(&self) -> &str {
            "stub"
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
            self.vectors
                .get(text)
                .cloned()
                .ok_or_else(|| AppError::EmbeddingUnavailable(format!("no vector for {text:?}")))
        }
    }

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

    fn posting(url: &str, title: &str) -> JobPosting {
        JobPosting {
            title: title.to_string(),
            company: String::new(),
            location: String::new(),
            description: String::new(),
            url: url.to_string(),
            source: JobSourceKind::Jobicy,
            published_at: None,
        }
    }

    const SUMMARY: &str = "Python backend developer with API experience";

    fn stub() -> Arc<dyn Embedder> {
        let mut vectors = HashMap::new();
        vectors.insert(SUMMARY.to_string(), vec![1.0, 0.0, 0.2]);
        vectors.insert(
            "Senior Python Backend Engineer".to_string(),
            vec![0.9, 0.1, 0.2],
        );
        vectors.insert("Frontend React Developer".to_string(), vec![0.0, 1.0, 0.0]);
        Arc::new(StubEmbedder { vectors })
    }

    #[tokio::test]
    async fn ranks_the_closer_job_first() {
        let ranker = Ranker::new(stub(), 10);
        let jobs = vec![
            posting("https://x.example/react", "Frontend React Developer"),
            posting("https://x.example/python", "Senior Python Backend Engineer"),
        ];
        let out = ranker.rank(jobs, SUMMARY).await;
        assert_eq!(out.mode, RankingMode::Embedding);
        assert_eq!(out.jobs[0].job.title, "Senior Python Backend Engineer");
        assert_eq!(out.jobs[0].rank, 1);
        assert_eq!(out.jobs[1].rank, 2);
    }

    #[tokio::test]
    async fn ranking_is_deterministic() {
        let jobs = vec![
            posting("https://x.example/react", "Frontend React Developer"),
            posting("https://x.example/python", "Senior Python Backend Engineer"),
        ];
        let first = Ranker::new(stub(), 10).rank(jobs.clone(), SUMMARY).await;
        let second = Ranker::new(stub(), 10).rank(jobs, SUMMARY).await;
        let order = |o: &RankOutput| {
            o.jobs
                .iter()
                .map(|j| j.job.url.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(order(&first), order(&second));
    }

    #[tokio::test]
    async fn scores_stay_in_cosine_bounds() {
        let out = Ranker::new(stub(), 10)
            .rank(
                vec![posting("https://x.example/react", "Frontend React Developer")],
                SUMMARY,
            )
            .await;
        assert!((-1.0..=1.0).contains(&out.jobs[0].score));
    }

    #[tokio::test]
    async fn truncates_to_top_k() {
        let mut vectors = HashMap::new();
        vectors.insert(SUMMARY.to_string(), vec![1.0, 0.0]);
        for i in 0..5 {
            vectors.insert(format!("Role {i}"), vec![1.0, i as f32]);
        }
        let ranker = Ranker::new(Arc::new(StubEmbedder { vectors }), 3);
        let jobs: Vec<_> = (0..5)
            .map(|i| posting(&format!("https://x.example/{i}"), &format!("Role {i}")))
            .collect();
        let out = ranker.rank(jobs, SUMMARY).await;
        assert_eq!(out.jobs.len(), 3);
        assert_eq!(
            out.jobs.iter().map(|j| j.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[tokio::test]
    async fn down_embedder_degrades_to_lexical_not_empty() {
        let ranker = Ranker::new(Arc::new(DownEmbedder), 10);
        let jobs = vec![
            posting("https://x.example/react", "Frontend React Developer"),
            posting("https://x.example/python", "Senior Python Backend Engineer"),
        ];
        let out = ranker.rank(jobs, SUMMARY).await;
        assert_eq!(out.mode, RankingMode::Lexical);
        assert_eq!(out.jobs.len(), 2);
        assert_eq!(out.jobs[0].job.title, "Senior Python Backend Engineer");
    }

    #[tokio::test]
    async fn all_job_embeddings_failing_reports_lexical_mode() {
        // The embedder only knows the resume summary, so its embedding
        // succeeds while every per-job call fails.
        let mut vectors = HashMap::new();
        vectors.insert(SUMMARY.to_string(), vec![1.0, 0.0, 0.2]);
        let ranker = Ranker::new(Arc::new(StubEmbedder { vectors }), 10);

        let jobs = vec![
            posting("https://x.example/react", "Frontend React Developer"),
            posting("https://x.example/python", "Senior Python Backend Engineer"),
        ];
        let out = ranker.rank(jobs, SUMMARY).await;
        assert_eq!(out.mode, RankingMode::Lexical);
        assert_eq!(out.jobs.len(), 2);
        assert_eq!(out.jobs[0].job.title, "Senior Python Backend Engineer");
    }

    #[tokio::test]
    async fn empty_input_is_empty_output() {
        let out = Ranker::new(stub(), 10).rank(Vec::new(), SUMMARY).await;
        assert!(out.jobs.is_empty());
    }

    #[tokio::test]
    async fn equal_scores_break_ties_by_recency_then_input_order() {
        let mut vectors = HashMap::new();
        vectors.insert(SUMMARY.to_string(), vec![1.0, 0.0]);
        for title in ["Old", "New", "Undated A", "Undated B"] {
            vectors.insert(title.to_string(), vec![1.0, 0.0]);
        }
        let ranker = Ranker::new(Arc::new(StubEmbedder { vectors }), 10);

        let mut old = posting("https://x.example/old", "Old");
        old.published_at = Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        let mut new = posting("https://x.example/new", "New");
        new.published_at = Some(Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap());
        let undated_a = posting("https://x.example/ua", "Undated A");
        let undated_b = posting("https://x.example/ub", "Undated B");

        let out = ranker
            .rank(vec![undated_a, old, new, undated_b], SUMMARY)
            .await;
        let titles: Vec<_> = out.jobs.iter().map(|j| j.job.title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Old", "Undated A", "Undated B"]);
    }
}
