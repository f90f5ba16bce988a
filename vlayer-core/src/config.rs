//! config.rs - Scan configuration for the vlayer-core library.
//!
//! The configuration record is deliberately small: which categories to run,
//! the confidence floor for the active set, and the default context-window
//! radius. Callers that need per-rule behavior set it on the rule
//! descriptor, not here.
//!
//! License: MIT OR APACHE 2.0

use serde::{Deserialize, Serialize};
use vlayer_rules::{Confidence, RuleCategory};

/// Default context-window radius when a rule does not override it.
pub const DEFAULT_CONTEXT_LINES: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScanConfig {
    /// Categories to scan. Empty means every category.
    pub categories: Vec<RuleCategory>,
    /// Findings below this confidence are suppressed from the active set
    /// (they remain in raw counts).
    pub min_confidence: Confidence,
    /// Context-window radius for rules that do not specify their own.
    pub context_lines: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            min_confidence: Confidence::Low,
            context_lines: DEFAULT_CONTEXT_LINES,
        }
    }
}

impl ScanConfig {
    pub fn with_categories(mut self, categories: &[RuleCategory]) -> Self {
        self.categories = categories.to_vec();
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: Confidence) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn with_context_lines(mut self, context_lines: usize) -> Self {
        self.context_lines = context_lines;
        self
    }
}
