use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::AppError;
use crate::models::{JobPosting, JobSourceKind};
use crate::sources::JobSource;

const API_URL: &str = "https://jobs.jobicy.com/api/v2/remote-jobs";

/// Keyless remote-jobs API. The endpoint returns its whole recent feed,
/// so matching against the query term happens client-side.
pub struct Jobicy {
    client: reqwest::Client,
    max_age_days: i64,
}

impl Jobicy {
    pub fn new(max_age_days: i64, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Jobicy {
            client,
            max_age_days,
        })
    }
}

#[async_trait]
impl JobSource for Jobicy {
    fn name(&self) -> &str {
        "jobicy"
    }

    async fn search(
        &self,
        query: &str,
        _location: &str,
        limit: usize,
    ) -> Result<Vec<JobPosting>, AppError> {
        let resp = self
            .client
            .get(API_URL)
            .send()
            .await
            .map_err(|e| AppError::source(self.name(), format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::source(
                self.name(),
                format!("returned {}", resp.status()),
            ));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| AppError::source(self.name(), format!("bad response: {e}")))?;

        let cutoff = Utc::now() - chrono::Duration::days(self.max_age_days);
        Ok(filter_jobs(&data, query, limit, cutoff))
    }
}

/// Keep postings that are inside the recency window and mention the query
/// term in their title or description.
fn filter_jobs(data: &Value, query: &str, limit: usize, cutoff: DateTime<Utc>) -> Vec<JobPosting> {
    let rows = data
        .get("jobs")
        .and_then(|v| v.as_array())
        .map(|a| a.as_slice())
        .unwrap_or_default();

    let query = query.to_lowercase();
    let mut jobs = Vec::new();

    for raw in rows {
        if jobs.len() >= limit {
            break;
        }

        let Some(job) = parse_job(raw) else { continue };

        if let Some(published_at) = job.published_at
            && published_at < cutoff
        {
            continue;
        }

        let content = format!("{} {}", job.title, job.description).to_lowercase();
        if content.contains(&query) {
            jobs.push(job);
        }
    }
    jobs
}

fn parse_job(raw: &Value) -> Option<JobPosting> {
    let title = raw.get("title").and_then(|v| v.as_str())?.to_string();
    let url = raw.get("url").and_then(|v| v.as_str())?.to_string();

    let published_at = raw
        .get("published_at")
        .and_then(|v| v.as_str())
        .and_then(parse_published_at);

    Some(JobPosting {
        title,
        company: raw
            .get("company_name")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string(),
        location: raw
            .get("location")
            .and_then(|v| v.as_str())
            .unwrap_or("Remote")
            .to_string(),
        description: raw
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string(),
        url,
        source: JobSourceKind::Jobicy,
        published_at,
    })
}

/// The feed mixes full timestamps and bare dates; accept both.
fn parse_published_at(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = chrono::NaiveDate::parse_from_str(value.get(..10)?, "%Y-%m-%d").ok()?;
    Some(DateTime::from_naive_utc_and_offset(
        date.and_hms_opt(0, 0, 0)?,
        Utc,
    ))
}
