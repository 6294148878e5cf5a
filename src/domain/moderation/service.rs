use regex::Regex;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{
    BlocklistDetail, CheckReport, ModerationClassifier, ModerationThresholds, PatternDetail,
    ProviderDetail, SafetyVerdict, VerdictDetail,
};

/// Seed list of disallowed terms. Coarse by design: terms implying a minor is
/// involved are excluded wholesale for the regulatory-sensitive case.
const DEFAULT_BLOCKED_TERMS: &[&str] = &[
    "underage",
    "minor",
    "child",
    "kid",
    "teen",
    "school",
    "rape",
    "assault",
    "abuse",
    "violence",
    "harm",
    "suicide",
    "self-harm",
    "cutting",
    "drugs",
    "cocaine",
];

const PATTERNS_CHECKED: [&str; 3] = ["phone", "address", "email"];

/// Content safety classifier: provider scores, personal-information patterns
/// and a static blocklist, combined by logical AND.
pub struct ModerationService {
    classifier: Option<Arc<dyn ModerationClassifier>>,
    thresholds: ModerationThresholds,
    phone_pattern: Regex,
    address_pattern: Regex,
    email_pattern: Regex,
    blocked_terms: RwLock<Vec<String>>,
}

impl ModerationService {
    pub fn new(
        classifier: Option<Arc<dyn ModerationClassifier>>,
        thresholds: ModerationThresholds,
    ) -> Self {
        Self {
            classifier,
            thresholds,
            phone_pattern: Regex::new(
                r"(\+?1[-.\s]?)?\(?([0-9]{3})\)?[-.\s]?([0-9]{3})[-.\s]?([0-9]{4})",
            )
            .unwrap(),
            address_pattern: Regex::new(
                r"(?i)\d+\s+[A-Za-z0-9\s,]+(?:Street|St|Avenue|Ave|Road|Rd|Drive|Dr|Lane|Ln|Boulevard|Blvd)\b",
            )
            .unwrap(),
            email_pattern: Regex::new(
                r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
            )
            .unwrap(),
            blocked_terms: RwLock::new(
                DEFAULT_BLOCKED_TERMS.iter().map(|t| t.to_string()).collect(),
            ),
        }
    }

    /// Run all three checks concurrently and combine their verdicts. A check
    /// that errors folds to safe with its error recorded; it never prevents
    /// the other two from completing.
    pub async fn moderate(&self, text: &str) -> SafetyVerdict {
        if text.trim().is_empty() {
            return SafetyVerdict {
                is_safe: true,
                detail: VerdictDetail::Skipped {
                    reason: "empty_content",
                },
            };
        }

        let (provider_result, pattern_result, blocklist_result) = tokio::join!(
            self.provider_check(text),
            self.pattern_check(text),
            self.blocklist_check(text),
        );

        let (provider_safe, provider) = fold(provider_result);
        let (patterns_safe, patterns) = fold(pattern_result);
        let (blocklist_safe, blocklist) = fold(blocklist_result);

        SafetyVerdict {
            is_safe: provider_safe && patterns_safe && blocklist_safe,
            detail: VerdictDetail::Checked {
                provider,
                patterns,
                blocklist,
            },
        }
    }

    async fn provider_check(&self, text: &str) -> Result<(bool, ProviderDetail), String> {
        let classifier = self
            .classifier
            .as_ref()
            .ok_or_else(|| "moderation_client_not_initialized".to_string())?;

        let response = classifier.classify(text).await?;
        let scores = response.scores;

        let mut flagged_categories = Vec::new();
        if scores.harassment > self.thresholds.harassment {
            flagged_categories.push("harassment".to_string());
        }
        if scores.sexual > self.thresholds.sexual {
            flagged_categories.push("sexual".to_string());
        }
        if scores.violence > self.thresholds.violence {
            flagged_categories.push("violence".to_string());
        }

        let is_safe = flagged_categories.is_empty();

        Ok((
            is_safe,
            ProviderDetail {
                flagged: response.flagged,
                flagged_categories,
                scores,
            },
        ))
    }

    async fn pattern_check(&self, text: &str) -> Result<(bool, PatternDetail), String> {
        let mut violations = Vec::new();

        if self.phone_pattern.is_match(text) {
            violations.push("phone_number".to_string());
        }
        if self.address_pattern.is_match(text) {
            violations.push("address".to_string());
        }
        if self.email_pattern.is_match(text) {
            violations.push("email".to_string());
        }

        let is_safe = violations.is_empty();

        Ok((
            is_safe,
            PatternDetail {
                violations,
                patterns_checked: PATTERNS_CHECKED.to_vec(),
            },
        ))
    }

    async fn blocklist_check(&self, text: &str) -> Result<(bool, BlocklistDetail), String> {
        let text_lower = text.to_lowercase();
        let terms = self.blocked_terms.read().await;

        let found_terms: Vec<String> = terms
            .iter()
            .filter(|term| text_lower.contains(term.as_str()))
            .cloned()
            .collect();

        let is_safe = found_terms.is_empty();

        Ok((
            is_safe,
            BlocklistDetail {
                blocked_terms_found: found_terms,
                total_blocked_terms: terms.len(),
            },
        ))
    }

    /// Add a term to the blocklist (case-insensitive, idempotent)
    pub async fn add_blocked_term(&self, term: &str) {
        let term = term.to_lowercase();
        let mut terms = self.blocked_terms.write().await;
        if !terms.contains(&term) {
            terms.push(term);
        }
    }

    /// Remove a term from the blocklist; a no-op if absent
    pub async fn remove_blocked_term(&self, term: &str) {
        let term = term.to_lowercase();
        let mut terms = self.blocked_terms.write().await;
        terms.retain(|t| t != &term);
    }
}

/// The single fold rule for check failures: a check error means is_safe=true
/// with the error captured in detail.
fn fold<T>(result: Result<(bool, T), String>) -> (bool, CheckReport<T>) {
    match result {
        Ok((is_safe, detail)) => (is_safe, CheckReport::Ok(detail)),
        Err(error) => (true, CheckReport::Failed { error }),
    }
}
