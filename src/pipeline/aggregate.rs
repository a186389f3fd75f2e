//! Fan out one search across every configured job source, then merge and
//! deduplicate. A broken source contributes zero records and a Failed
//! outcome; it never takes the request down with it.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::models::{JobPosting, RoleProfile, SourceOutcome};
use crate::sources::JobSource;

pub struct Aggregator {
    sources: Vec<Arc<dyn JobSource>>,
    per_source_limit: usize,
    call_timeout: Duration,
}

#[derive(Debug)]
pub struct AggregateOutput {
    /// Deduplicated postings in per-source order; may be empty, which
    /// means "no jobs found", not an error.
    pub jobs: Vec<JobPosting>,
    /// One report per source, in configured source order.
    pub outcomes: Vec<SourceOutcome>,
}

impl Aggregator {
    pub fn new(
        sources: Vec<Arc<dyn JobSource>>,
        per_source_limit: usize,
        call_timeout: Duration,
    ) -> Self {
        Aggregator {
            sources,
            per_source_limit,
            call_timeout,
        }
    }

    /// Query every source with the profile's terms and the same location.
    /// Sources run concurrently but the merge is deterministic: results
    /// are slotted by configured source order, then deduplicated first-
    /// occurrence-wins.
    pub async fn aggregate(&self, profile: &RoleProfile, location: &str) -> AggregateOutput {
        let terms = profile.query_terms();
        if terms.is_empty() {
            tracing::warn!("No usable query terms in role profile");
            return AggregateOutput {
                jobs: Vec::new(),
                outcomes: Vec::new(),
            };
        }

        let mut handles = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let source = Arc::clone(source);
            let terms = terms.clone();
            let location = location.to_string();
            let limit = self.per_source_limit;
            let call_timeout = self.call_timeout;
            handles.push(tokio::spawn(async move {
                collect_source(source, &terms, &location, limit, call_timeout).await
            }));
        }

        let mut merged = Vec::new();
        let mut outcomes = Vec::with_capacity(handles.len());
        for (source, handle) in self.sources.iter().zip(handles) {
            let name = source.name().to_string();
            match handle.await {
                Ok((jobs, None)) => {
                    outcomes.push(SourceOutcome::Ok {
                        source: name,
                        found: jobs.len(),
                    });
                    merged.extend(jobs);
                }
                Ok((jobs, Some(error))) if !jobs.is_empty() => {
                    // Partially usable: some terms failed, some returned.
                    tracing::warn!(source = %name, %error, "Source partially failed");
                    outcomes.push(SourceOutcome::Ok {
                        source: name,
                        found: jobs.len(),
                    });
                    merged.extend(jobs);
                }
                Ok((_, Some(error))) => {
                    tracing::warn!(source = %name, %error, "Source failed");
                    outcomes.push(SourceOutcome::Failed {
                        source: name,
                        error,
                    });
                }
                Err(e) => {
                    tracing::error!(source = %name, "Source task panicked: {e}");
                    outcomes.push(SourceOutcome::Failed {
                        source: name,
                        error: "internal task failure".to_string(),
                    });
                }
            }
        }

        AggregateOutput {
            jobs: dedup(merged),
            outcomes,
        }
    }
}

/// Run every query term against one source, accumulating up to its limit.
/// Term-level failures are collected rather than aborting the remaining
/// terms; the last error is reported alongside whatever was fetched.
async fn collect_source(
    source: Arc<dyn JobSource>,
    terms: &[String],
    location: &str,
    limit: usize,
    call_timeout: Duration,
) -> (Vec<JobPosting>, Option<String>) {
    let mut collected: Vec<JobPosting> = Vec::new();
    let mut last_error = None;

    for term in terms {
        if collected.len() >= limit {
            break;
        }
        let remaining = limit - collected.len();
        match tokio::time::timeout(call_timeout, source.search(term, location, remaining)).await {
            Ok(Ok(jobs)) => {
                tracing::debug!(
                    source = source.name(),
                    query = %term,
                    found = jobs.len(),
                    "Source query completed"
                );
                collected.extend(jobs);
            }
            Ok(Err(e)) => {
                tracing::warn!(source = source.name(), query = %term, "Source query failed: {e}");
                last_error = Some(e.to_string());
            }
            Err(_) => {
                tracing::warn!(source = source.name(), query = %term, "Source query timed out");
                last_error = Some(format!("timed out after {}s", call_timeout.as_secs()));
            }
        }
    }

    (collected, last_error)
}

/// First occurrence wins. Records without any usable identifier are
/// dropped here, before dedup.
fn dedup(jobs: Vec<JobPosting>) -> Vec<JobPosting> {
    let mut seen = HashSet::new();
    jobs.into_iter()
        .filter(|job| match job.dedup_key() {
            Some(key) => seen.insert(key),
            None => false,
        })
        .collect()
}
