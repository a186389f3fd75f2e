use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;

use crate::error::AppError;
use crate::models::{JobPosting, JobSourceKind};
use crate::sources::JobSource;

/// Characters left alone by encodeURIComponent.
/// RFC 3986 unreserved: A-Z a-z 0-9 - _ . ! ~ * ' ( )
const ENCODE_URI_COMPONENT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const BASE_URL: &str = "https://serpapi.com/search.json";

/// Google Jobs via the SerpAPI search endpoint. The only keyed source.
pub struct SerpApiGoogleJobs {
    client: reqwest::Client,
    api_key: String,
}

impl SerpApiGoogleJobs {
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(SerpApiGoogleJobs {
            client,
            api_key: api_key.trim().to_string(),
        })
    }
}

#[async_trait]
impl JobSource for SerpApiGoogleJobs {
    fn name(&self) -> &str {
        "serpapi"
    }

    async fn search(
        &self,
        query: &str,
        location: &str,
        limit: usize,
    ) -> Result<Vec<JobPosting>, AppError> {
        let mut url = format!(
            "{BASE_URL}?engine=google_jobs&q={}&hl=en&gl=us&api_key={}",
            urlencoded(&format!("{query} remote")),
            urlencoded(&self.api_key),
        );
        // The engine rejects "Remote" as a location; remote intent is
        // already carried by the query text.
        let location = location.trim();
        if !location.is_empty() && !location.eq_ignore_ascii_case("remote") {
            url.push_str("&location=");
            url.push_str(&urlencoded(location));
        }

        let resp = self
            .client
            .get(&url)
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

        // Quota and plan errors arrive as 200s with an error field.
        if let Some(message) = data.get("error").and_then(|v| v.as_str()) {
            return Err(AppError::source(self.name(), message.to_string()));
        }

        Ok(parse_results(&data, limit, chrono::Utc::now()))
    }
}

fn urlencoded(s: &str) -> String {
    utf8_percent_encode(s, ENCODE_URI_COMPONENT_SET).to_string()
}

/// Map a jobs_results array into postings, skipping entries without a
/// usable link or title.
fn parse_results(data: &Value, limit: usize, now: chrono::DateTime<chrono::Utc>) -> Vec<JobPosting> {
    let results = data
        .get("jobs_results")
        .and_then(|v| v.as_array())
        .map(|a| a.as_slice())
        .unwrap_or_default();

    let mut jobs = Vec::new();
    for raw in results {
        if jobs.len() >= limit {
            break;
        }
        if let Some(job) = parse_job(raw, now) {
            jobs.push(job);
        }
    }
    jobs
}

fn parse_job(raw: &Value, now: chrono::DateTime<chrono::Utc>) -> Option<JobPosting> {
    let title = raw.get("title").and_then(|v| v.as_str())?.to_string();

    // Prefer the original listing link; fall back through the apply
    // options so the result always has something clickable.
    let url = raw
        .get("related_links")
        .and_then(|v| v.as_array())
        .and_then(|a| a.first())
        .and_then(|l| l.get("link"))
        .or_else(|| {
            raw.get("apply_options")
                .and_then(|v| v.as_array())
                .and_then(|a| a.first())
                .and_then(|l| l.get("link"))
        })
        .or_else(|| raw.get("share_link"))
        .or_else(|| raw.get("apply_link"))
        .or_else(|| raw.get("link"))
        .and_then(|v| v.as_str())?
        .to_string();

    let company = raw
        .get("company_name")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let location = raw
        .get("location")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let description = raw
        .get("description")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let published_at = raw
        .get("detected_extensions")
        .and_then(|v| v.get("posted_at"))
        .and_then(|v| v.as_str())
        .and_then(|s| parse_posted_at(s, now));

    Some(JobPosting {
        title,
        company,
        location,
        description,
        url,
        source: JobSourceKind::Serpapi,
        published_at,
    })
}

/// The engine reports relative ages like "3 days ago" or "21 hours ago";
/// resolve them against the request time so recency tie-breaks work.
fn parse_posted_at(
    posted: &str,
    now: chrono::DateTime<chrono::Utc>,
) -> Option<chrono::DateTime<chrono::Utc>> {
    let mut parts = posted.split_whitespace();
    let amount: i64 = parts.next()?.parse().ok()?;
    let unit = parts.next()?;
    let age = match unit {
        u if u.starts_with("minute") => chrono::Duration::minutes(amount),
        u if u.starts_with("hour") => chrono::Duration::hours(amount),
        u if u.starts_with("day") => chrono::Duration::days(amount),
        u if u.starts_with("month") => chrono::Duration::days(amount * 30),
        _ => return None,
    };
    Some(now - age)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn parses_results_with_link_preference() {
        let data = json!({
            "jobs_results": [{
                "title": "Backend Engineer",
                "company_name": "Acme",
                "location": "Remote",
                "description": "Build APIs",
                "related_links": [{"link": "https://acme.example/jobs/1"}],
                "apply_options": [{"link": "https://board.example/apply/1"}],
                "detected_extensions": {"posted_at": "3 days ago"}
            }]
        });
        let jobs = parse_results(&data, 10, now());
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].url, "https://acme.example/jobs/1");
        assert_eq!(jobs[0].company, "Acme");
        assert_eq!(
            jobs[0].published_at.unwrap(),
            now() - chrono::Duration::days(3)
        );
    }

    #[test]
    fn falls_back_to_apply_option_link() {
        let data = json!({
            "jobs_results": [{
                "title": "Data Scientist",
                "apply_options": [{"link": "https://board.example/apply/2"}]
            }]
        });
        let jobs = parse_results(&data, 10, now());
        assert_eq!(jobs[0].url, "https://board.example/apply/2");
    }

    #[test]
    fn drops_entries_without_any_link() {
        let data = json!({
            "jobs_results": [
                {"title": "No Link Role"},
                {"title": "Linked Role", "link": "https://x.example/3"}
            ]
        });
        let jobs = parse_results(&data, 10, now());
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "Linked Role");
    }

    #[test]
    fn respects_the_limit() {
        let rows: Vec<_> = (0..5)
            .map(|i| json!({"title": format!("Role {i}"), "link": format!("https://x.example/{i}")}))
            .collect();
        let data = json!({ "jobs_results": rows });
        assert_eq!(parse_results(&data, 2, now()).len(), 2);
    }

    #[test]
    fn relative_ages_parse_or_are_dropped() {
        assert_eq!(
            parse_posted_at("21 hours ago", now()),
            Some(now() - chrono::Duration::hours(21))
        );
        assert_eq!(parse_posted_at("yesterday", now()), None);
        assert_eq!(parse_posted_at("", now()), None);
    }
}
