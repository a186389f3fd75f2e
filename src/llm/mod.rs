//! Ollama chat client used for resume summarization and role inference.
//! All model calls in the service go through this module.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::RoleProfile;

const SUMMARY_FALLBACK_CHARS: usize = 2_000;

pub struct OllamaClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(OllamaClient {
            client,
            endpoint: format!("{}/api/chat", base_url.trim_end_matches('/')),
            model: model.to_string(),
        })
    }

    async fn chat(&self, prompt: &str) -> Result<String, AppError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::RoleInference(format!("ollama unreachable: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::RoleInference(format!(
                "ollama returned {}",
                resp.status()
            )));
        }

        let body: ChatResponse = resp
            .json()
            .await
            .map_err(|e| AppError::RoleInference(format!("bad ollama response: {e}")))?;

        Ok(body.message.content)
    }

    /// Concise professional summary of the resume, used as the embedding
    /// basis for ranking. Model failure degrades to a bounded slice of the
    /// raw resume text rather than erroring; a worse summary still ranks.
    pub async fn summarize(&self, resume_text: &str) -> String {
        let prompt = format!(
            "Provide a concise professional summary of this resume, highlighting \
             key qualifications and experience:\n\n{resume_text}"
        );
        match self.chat(&prompt).await {
            Ok(summary) if !summary.trim().is_empty() => summary,
            Ok(_) => fallback_summary(resume_text),
            Err(e) => {
                tracing::warn!("Summarization unavailable, using raw resume text: {e}");
                fallback_summary(resume_text)
            }
        }
    }

    /// Infer target roles and search keywords from the resume. Errors when
    /// the model is unreachable or the reply has none of the expected
    /// fields; callers fall back to manual keywords.
    pub async fn infer_role(&self, resume_text: &str) -> Result<RoleProfile, AppError> {
        let prompt = format!(
            "Analyze this resume and determine the most suitable job roles for \
             this person, based on their skills, work experience, education, and \
             projects.\n\n\
             Format your response as:\n\
             PRIMARY ROLE: [job title]\n\
             ALTERNATIVE ROLES: [role1], [role2], [role3]\n\
             KEY STRENGTHS: [strength1], [strength2], [strength3]\n\
             RECOMMENDED KEYWORDS: [keyword1], [keyword2], [keyword3]\n\n\
             Resume content:\n{resume_text}"
        );
        let reply = self.chat(&prompt).await?;
        parse_role_reply(&reply)
            .ok_or_else(|| AppError::RoleInference("unparseable model reply".to_string()))
    }
}

fn fallback_summary(resume_text: &str) -> String {
    resume_text.chars().take(SUMMARY_FALLBACK_CHARS).collect()
}

/// Parse the line-oriented reply format. Returns None when no expected
/// field is present at all, so a refusal or free-form answer is treated
/// as inference failure instead of an empty profile.
fn parse_role_reply(reply: &str) -> Option<RoleProfile> {
    let mut primary_role = String::new();
    let mut alternative_roles = Vec::new();
    let mut keywords = Vec::new();
    let mut strengths = Vec::new();
    let mut matched = false;

    for line in reply.lines() {
        let line = line.trim().trim_start_matches(['-', '*', ' ']);
        if let Some(rest) = strip_field(line, "PRIMARY ROLE:") {
            primary_role = rest.trim_matches(['[', ']']).to_string();
            matched = true;
        } else if let Some(rest) = strip_field(line, "ALTERNATIVE ROLES:") {
            alternative_roles = split_list(rest);
            matched = true;
        } else if let Some(rest) = strip_field(line, "RECOMMENDED KEYWORDS:") {
            keywords = split_list(rest);
            matched = true;
        } else if let Some(rest) = strip_field(line, "KEY STRENGTHS:") {
            strengths = split_list(rest);
            matched = true;
        }
    }

    if !matched || (primary_role.is_empty() && keywords.is_empty()) {
        return None;
    }

    Some(RoleProfile {
        primary_role,
        alternative_roles,
        keywords,
        strengths,
    })
}

fn strip_field<'a>(line: &'a str, field: &str) -> Option<&'a str> {
    let head = line.get(..field.len())?;
    if head.eq_ignore_ascii_case(field) {
        Some(line[field.len()..].trim())
    } else {
        None
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|v| v.trim().trim_matches(['[', ']']).to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_reply() {
        let reply = "PRIMARY ROLE: Backend Engineer\n\
                     ALTERNATIVE ROLES: Platform Engineer, SRE\n\
                     KEY STRENGTHS: Rust, Distributed Systems, APIs\n\
                     RECOMMENDED KEYWORDS: backend, rust, microservices";
        let profile = parse_role_reply(reply).unwrap();
        assert_eq!(profile.primary_role, "Backend Engineer");
        assert_eq!(profile.alternative_roles, vec!["Platform Engineer", "SRE"]);
        assert_eq!(profile.keywords, vec!["backend", "rust", "microservices"]);
        assert_eq!(profile.strengths.len(), 3);
    }

    #[test]
    fn tolerates_bullets_case_and_brackets() {
        let reply = "- primary role: [Data Scientist]\n\
                     * recommended keywords: [ml], [python]";
        let profile = parse_role_reply(reply).unwrap();
        assert_eq!(profile.primary_role, "Data Scientist");
        assert_eq!(profile.keywords, vec!["ml", "python"]);
    }

    #[test]
    fn free_form_reply_is_rejected() {
        assert!(parse_role_reply("I think you would be a great fit for many roles!").is_none());
    }

    #[test]
    fn reply_with_only_empty_fields_is_rejected() {
        assert!(parse_role_reply("PRIMARY ROLE:\nRECOMMENDED KEYWORDS:").is_none());
    }

    #[test]
    fn fallback_summary_is_bounded() {
        let long = "x".repeat(10_000);
        assert_eq!(fallback_summary(&long).len(), SUMMARY_FALLBACK_CHARS);
    }
}
