use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tag identifying which source adapter produced a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobSourceKind {
    Serpapi,
    Jobicy,
    Rss,
}

impl std::fmt::Display for JobSourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobSourceKind::Serpapi => "serpapi",
            JobSourceKind::Jobicy => "jobicy",
            JobSourceKind::Rss => "rss",
        };
        f.write_str(s)
    }
}

/// One discovered posting. Exists only for the duration of one match
/// request; nothing is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub url: String,
    pub source: JobSourceKind,
    pub published_at: Option<DateTime<Utc>>,
}

impl JobPosting {
    /// Case-insensitive key used to collapse duplicate postings across
    /// sources. Prefers the URL; falls back to title+company when the
    /// source gave no link. Returns None when there is nothing usable
    /// to identify the posting by.
    pub fn dedup_key(&self) -> Option<String> {
        let url = normalize_url(&self.url);
        if !url.is_empty() {
            return Some(url);
        }
        let title = self.title.trim().to_lowercase();
        let company = self.company.trim().to_lowercase();
        if title.is_empty() && company.is_empty() {
            return None;
        }
        Some(format!("{title}|{company}"))
    }

    /// Text basis handed to the embedding provider: title plus a bounded
    /// slice of the description.
    pub fn embedding_text(&self, max_description: usize) -> String {
        let description: String = self.description.chars().take(max_description).collect();
        let mut text = self.title.clone();
        if !description.is_empty() {
            text.push('\n');
            text.push_str(&description);
        }
        text
    }
}

/// Strip scheme, fragment, and trailing slash so the same posting linked
/// as http/https or with tracking anchors collapses to one key.
fn normalize_url(url: &str) -> String {
    let url = url.trim().to_lowercase();
    let url = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(&url);
    let url = url.split('#').next().unwrap_or("");
    url.trim_end_matches('/').to_string()
}

/// A posting with its similarity score and final position.
#[derive(Debug, Clone, Serialize)]
pub struct RankedJob {
    pub rank: u32,
    pub score: f32,
    #[serde(flatten)]
    pub job: JobPosting,
}

/// Per-source report for one aggregation pass. "Found nothing" and
/// "failed" are distinct states so callers can tell an empty source
/// from a broken one.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SourceOutcome {
    Ok { source: String, found: usize },
    Failed { source: String, error: String },
}
