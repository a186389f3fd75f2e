// Job source adapters. Each adapter wraps one external provider behind
// the same search interface; the aggregator holds an ordered list of them
// and treats every call as fallible in isolation.

pub mod jobicy;
pub mod rss;
pub mod serpapi;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::AppError;
use crate::models::JobPosting;

/// Trait all job sources implement. A source returns the postings that
/// match one query term; errors are reported per call and never abort
/// the other sources.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Short name used in logs and source outcomes.
    fn name(&self) -> &str;

    async fn search(
        &self,
        query: &str,
        location: &str,
        limit: usize,
    ) -> Result<Vec<JobPosting>, AppError>;
}

/// Build the configured source list in priority order: the keyed search
/// API first (when a key is present), then the open fallback sources.
pub fn build_sources(config: &Config) -> Result<Vec<Arc<dyn JobSource>>, AppError> {
    let timeout = Duration::from_secs(config.request_timeout);
    let mut sources: Vec<Arc<dyn JobSource>> = Vec::new();

    match &config.serpapi_key {
        Some(key) if !key.trim().is_empty() => {
            sources.push(Arc::new(serpapi::SerpApiGoogleJobs::new(key, timeout)?));
        }
        _ => tracing::info!("SERPAPI_KEY not set, skipping the Google Jobs source"),
    }

    sources.push(Arc::new(jobicy::Jobicy::new(config.max_age_days, timeout)?));

    for feed_url in &config.rss_feeds {
        let feed_url = feed_url.trim();
        if feed_url.is_empty() {
            continue;
        }
        sources.push(Arc::new(rss::RssFeed::new(
            feed_url,
            config.max_age_days,
            timeout,
        )?));
    }

    Ok(sources)
}
