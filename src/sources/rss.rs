use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rss::Channel;

use crate::error::AppError;
use crate::models::{JobPosting, JobSourceKind};
use crate::sources::JobSource;

/// One configured RSS job feed. Feeds carry no structured company or
/// location fields, so postings keep what the item titles give us.
pub struct RssFeed {
    client: reqwest::Client,
    name: String,
    url: String,
    max_age_days: i64,
}

impl RssFeed {
    pub fn new(url: &str, max_age_days: i64, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(RssFeed {
            client,
            name: feed_name(url),
            url: url.to_string(),
            max_age_days,
        })
    }
}

/// Use the feed host as the source name so logs distinguish feeds.
fn feed_name(url: &str) -> String {
    let host = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let host = host.split('/').next().unwrap_or(host);
    format!("rss:{host}")
}

#[async_trait]
impl JobSource for RssFeed {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(
        &self,
        query: &str,
        _location: &str,
        limit: usize,
    ) -> Result<Vec<JobPosting>, AppError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AppError::source(self.name(), format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::source(
                self.name(),
                format!("returned {}", resp.status()),
            ));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| AppError::source(self.name(), format!("read failed: {e}")))?;

        let channel = Channel::read_from(&body[..])
            .map_err(|e| AppError::source(self.name(), format!("bad feed: {e}")))?;

        let cutoff = Utc::now() - chrono::Duration::days(self.max_age_days);
        Ok(filter_items(&channel, query, limit, cutoff))
    }
}

/// Keep items inside the recency window whose title mentions the query.
fn filter_items(
    channel: &Channel,
    query: &str,
    limit: usize,
    cutoff: DateTime<Utc>,
) -> Vec<JobPosting> {
    let query = query.to_lowercase();
    let mut jobs = Vec::new();

    for item in channel.items() {
        if jobs.len() >= limit {
            break;
        }

        let (Some(title), Some(link)) = (item.title(), item.link()) else {
            continue;
        };

        let published_at = item
            .pub_date()
            .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
            .map(|d| d.with_timezone(&Utc));

        if let Some(published_at) = published_at
            && published_at < cutoff
        {
            continue;
        }

        if !title.to_lowercase().contains(&query) {
            continue;
        }

        jobs.push(JobPosting {
            title: title.to_string(),
            company: String::new(),
            location: "Remote".to_string(),
            description: item.description().unwrap_or("").to_string(),
            url: link.to_string(),
            source: JobSourceKind::Rss,
            published_at,
        });
    }
    jobs
}
