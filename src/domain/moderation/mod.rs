pub mod service;

pub use service::ModerationService;

use async_trait::async_trait;
use serde::Serialize;

/// Per-category risk scores returned by the content-classification provider
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CategoryScores {
    pub harassment: f32,
    pub sexual: f32,
    pub violence: f32,
    pub hate: f32,
}

/// Raw provider classification: its own binary flag plus the scores. The
/// verdict only ever comes from comparing scores against our thresholds; the
/// provider flag is recorded for diagnostics.
#[derive(Debug, Clone)]
pub struct ClassifierResponse {
    pub flagged: bool,
    pub scores: CategoryScores,
}

/// External content-classification provider
#[async_trait]
pub trait ModerationClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<ClassifierResponse, String>;
}

/// Category thresholds; a category is flagged only when its score strictly
/// exceeds the threshold.
#[derive(Debug, Clone, Copy)]
pub struct ModerationThresholds {
    pub harassment: f32,
    pub sexual: f32,
    pub violence: f32,
}

impl Default for ModerationThresholds {
    fn default() -> Self {
        Self {
            harassment: 0.90,
            sexual: 0.90,
            violence: 0.95,
        }
    }
}

/// Outcome of one sub-check. A failed check serializes as `{"error": ...}`
/// and folds to safe when verdicts are combined: moderation infrastructure
/// being down must not block all traffic.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CheckReport<T> {
    Ok(T),
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderDetail {
    pub flagged: bool,
    pub flagged_categories: Vec<String>,
    pub scores: CategoryScores,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatternDetail {
    pub violations: Vec<String>,
    pub patterns_checked: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlocklistDetail {
    pub blocked_terms_found: Vec<String>,
    pub total_blocked_terms: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum VerdictDetail {
    Skipped {
        reason: &'static str,
    },
    Checked {
        provider: CheckReport<ProviderDetail>,
        patterns: CheckReport<PatternDetail>,
        blocklist: CheckReport<BlocklistDetail>,
    },
}

/// Combined result of the three independent safety checks
#[derive(Debug, Clone, Serialize)]
pub struct SafetyVerdict {
    pub is_safe: bool,
    pub detail: VerdictDetail,
}

impl SafetyVerdict {
    /// Aggregate everything that tripped a check, across all three checks
    pub fn flagged_categories(&self) -> Vec<String> {
        let mut categories = Vec::new();

        if let VerdictDetail::Checked {
            provider,
            patterns,
            blocklist,
        } = &self.detail
        {
            if let CheckReport::Ok(detail) = provider {
                categories.extend(detail.flagged_categories.iter().cloned());
            }
            if let CheckReport::Ok(detail) = patterns {
                categories.extend(detail.violations.iter().cloned());
            }
            if let CheckReport::Ok(detail) = blocklist {
                categories.extend(detail.blocked_terms_found.iter().cloned());
            }
        }

        categories
    }
}
