use serde::{Deserialize, Serialize};

/// Output of the role-inference step, input to the aggregator.
/// `strengths` is informational only and never feeds into scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleProfile {
    pub primary_role: String,
    pub alternative_roles: Vec<String>,
    pub keywords: Vec<String>,
    pub strengths: Vec<String>,
}

impl RoleProfile {
    /// Build a profile directly from user-entered keywords, the fallback
    /// path when the model is unreachable or returns garbage.
    pub fn from_keywords(keywords: Vec<String>) -> Self {
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        let primary_role = keywords.first().cloned().unwrap_or_default();
        RoleProfile {
            primary_role,
            alternative_roles: Vec::new(),
            keywords,
            strengths: Vec::new(),
        }
    }

    /// Ordered, deduplicated query terms for the source adapters:
    /// primary role first, then up to two alternatives, then up to two
    /// keywords. Falls back to the primary role alone when the keyword
    /// list is empty.
    pub fn query_terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        let mut push = |term: &str| {
            let term = term.trim();
            if term.is_empty() {
                return;
            }
            if !terms.iter().any(|t: &String| t.eq_ignore_ascii_case(term)) {
                terms.push(term.to_string());
            }
        };

        push(&self.primary_role);
        for role in self.alternative_roles.iter().take(2) {
            push(role);
        }
        for keyword in self.keywords.iter().take(2) {
            push(keyword);
        }
        terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_terms_dedupes_case_insensitively() {
        let profile = RoleProfile {
            primary_role: "Backend Engineer".to_string(),
            alternative_roles: vec!["backend engineer".to_string(), "SRE".to_string()],
            keywords: vec!["rust".to_string(), "api".to_string(), "grpc".to_string()],
            strengths: vec![],
        };
        assert_eq!(
            profile.query_terms(),
            vec!["Backend Engineer", "SRE", "rust", "api"]
        );
    }

    #[test]
    fn query_terms_falls_back_to_primary_role() {
        let profile = RoleProfile {
            primary_role: "Data Scientist".to_string(),
            alternative_roles: vec![],
            keywords: vec![],
            strengths: vec![],
        };
        assert_eq!(profile.query_terms(), vec!["Data Scientist"]);
    }

    #[test]
    fn from_keywords_trims_and_drops_empty() {
        let profile =
            RoleProfile::from_keywords(vec![" rust ".to_string(), "".to_string()]);
        assert_eq!(profile.primary_role, "rust");
        assert_eq!(profile.keywords, vec!["rust"]);
    }
}
