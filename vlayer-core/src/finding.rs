//! finding.rs - Finding, grouped-finding, and scan-result data structures.
//!
//! A `Finding` is one detected violation instance. Its identifier is derived
//! from content, not allocated, so the same corpus always produces the same
//! ids and two runs can be diffed by id alone. `GroupedFinding` collapses
//! occurrences of one rule for reporting; its counts are recomputed from the
//! raw finding set every time, never cached independently of it.
//!
//! License: MIT OR APACHE 2.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use vlayer_rules::{Confidence, FixKind, RuleCategory, RuleDescriptor, Severity};

use crate::scoring::ComplianceScore;

/// Location identifier used by repository-granularity findings.
pub const REPOSITORY_SENTINEL: &str = "(repository)";

/// One detected rule-violation instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Deterministic id: first 16 hex chars of
    /// SHA-256(ruleId:file:line:snippet).
    pub id: String,
    pub rule_id: String,
    pub category: RuleCategory,
    pub severity: Severity,
    pub confidence: Confidence,
    pub file: String,
    /// 1-based line number; `None` for file/repository-granularity findings
    /// without a meaningful line.
    pub line: Option<usize>,
    pub title: String,
    pub description: String,
    /// The matched line (or path for path-subject rules).
    pub snippet: String,
    /// Comment-stripped context window around the match.
    pub context: Vec<String>,
    pub recommendation: String,
    pub reference: String,
    pub fix_type: Option<FixKind>,
    /// Set by the aggregator when confidence falls below the configured
    /// floor. Never set by scanners or the fixer.
    pub suppressed: bool,
    pub acknowledged: bool,
    pub ack_expires_at: Option<DateTime<Utc>>,
    pub is_baseline: bool,
}

impl Finding {
    /// Builds a finding from a rule descriptor and a match location. All
    /// flags start false; only the aggregator mutates them.
    pub fn from_rule(
        rule: &RuleDescriptor,
        file: &str,
        line: Option<usize>,
        snippet: &str,
        context: Vec<String>,
    ) -> Self {
        Self {
            id: finding_id(&rule.id, file, line, snippet),
            rule_id: rule.id.clone(),
            category: rule.category,
            severity: rule.severity,
            confidence: rule.confidence,
            file: file.to_string(),
            line,
            title: rule.title.clone(),
            description: rule.description.clone(),
            snippet: snippet.to_string(),
            context,
            recommendation: rule.recommendation.clone(),
            reference: rule.reference.clone(),
            fix_type: rule.fix,
            suppressed: false,
            acknowledged: false,
            ack_expires_at: None,
            is_baseline: false,
        }
    }

    /// Active findings drive scoring, fixing, and exit-code severity.
    pub fn is_active(&self) -> bool {
        !self.suppressed && !self.acknowledged && !self.is_baseline
    }
}

/// Deterministic finding identifier.
pub fn finding_id(rule_id: &str, file: &str, line: Option<usize>, snippet: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(rule_id.as_bytes());
    hasher.update(b":");
    hasher.update(file.as_bytes());
    hasher.update(b":");
    hasher.update(line.unwrap_or(0).to_string().as_bytes());
    hasher.update(b":");
    hasher.update(snippet.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..16].to_string()
}

/// Normalization applied to titles before they are used as grouping keys:
/// trimmed, lowercased, inner whitespace collapsed to single spaces.
pub fn normalize_title(title: &str) -> String {
    title
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Snippets may carry PHI; logs only see the raw text when the operator
/// explicitly opts in via `VLAYER_ALLOW_DEBUG_PHI`.
pub fn redact_for_log(snippet: &str) -> String {
    match std::env::var("VLAYER_ALLOW_DEBUG_PHI") {
        Ok(v) if v == "1" || v.eq_ignore_ascii_case("true") => snippet.to_string(),
        _ => format!("[REDACTED {} chars]", snippet.chars().count()),
    }
}

/// Multiple occurrences of one rule collapsed for reporting, keyed by
/// (ruleId, normalized title).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedFinding {
    pub rule_id: String,
    pub title: String,
    pub category: RuleCategory,
    pub severity: Severity,
    pub confidence: Confidence,
    pub occurrence_count: usize,
    pub file_count: usize,
    /// Distinct files, sorted.
    pub files: Vec<String>,
    /// The first occurrence in (file, line) order.
    pub representative: Finding,
}

/// Groups raw findings by (ruleId, normalized title). Counts are taken over
/// the full raw set, including suppressed and baseline-flagged findings.
/// Groups come back severity-descending, then occurrence-descending.
pub fn group_findings(findings: &[Finding]) -> Vec<GroupedFinding> {
    let mut buckets: BTreeMap<(String, String), Vec<&Finding>> = BTreeMap::new();
    for finding in findings {
        buckets
            .entry((finding.rule_id.clone(), normalize_title(&finding.title)))
            .or_default()
            .push(finding);
    }

    let mut groups: Vec<GroupedFinding> = buckets
        .into_values()
        .map(|members| {
            let files: BTreeSet<&str> = members.iter().map(|f| f.file.as_str()).collect();
            let representative = (*members[0]).clone();
            GroupedFinding {
                rule_id: representative.rule_id.clone(),
                title: representative.title.clone(),
                category: representative.category,
                severity: representative.severity,
                confidence: representative.confidence,
                occurrence_count: members.len(),
                file_count: files.len(),
                files: files.into_iter().map(str::to_string).collect(),
                representative,
            }
        })
        .collect();
    groups.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then(b.occurrence_count.cmp(&a.occurrence_count))
            .then(a.rule_id.cmp(&b.rule_id))
    });
    groups
}

/// The full outcome of one scan run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// Every raw finding with aggregation flags applied, sorted by
    /// (file, line, ruleId).
    pub findings: Vec<Finding>,
    pub grouped_findings: Vec<GroupedFinding>,
    pub raw_findings_count: usize,
    pub scanned_files: usize,
    pub scan_duration_ms: u64,
    pub compliance_score: ComplianceScore,
}

impl ScanResult {
    /// The subset that scoring, fixing, and exit codes consume.
    pub fn active(&self) -> Vec<&Finding> {
        self.findings.iter().filter(|f| f.is_active()).collect()
    }

    /// Active findings not present in the baseline.
    pub fn new_findings(&self) -> Vec<&Finding> {
        self.active()
    }

    /// Highest severity among new findings, for exit-code determination.
    /// Baseline-flagged findings never contribute here.
    pub fn highest_new_severity(&self) -> Option<Severity> {
        self.new_findings().iter().map(|f| f.severity).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vlayer_rules::RuleDescriptor;

    fn rule(id: &str, title: &str) -> RuleDescriptor {
        RuleDescriptor::line(
            id,
            RuleCategory::Encryption,
            Severity::High,
            Confidence::High,
            title,
        )
        .with_patterns(&["x"])
    }

    #[test]
    fn finding_ids_are_deterministic_and_content_sensitive() {
        let r = rule("T-001", "Title");
        let a = Finding::from_rule(&r, "src/a.js", Some(3), "md5(x)", vec![]);
        let b = Finding::from_rule(&r, "src/a.js", Some(3), "md5(x)", vec![]);
        let c = Finding::from_rule(&r, "src/a.js", Some(4), "md5(x)", vec![]);
        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
        assert_eq!(a.id.len(), 16);
    }

    #[test]
    fn title_normalization_collapses_whitespace_and_case() {
        assert_eq!(normalize_title("  Weak   MD5\tHash "), "weak md5 hash");
    }

    #[test]
    fn grouping_counts_match_raw_set() {
        let r = rule("T-002", "Weak hash");
        let findings = vec![
            Finding::from_rule(&r, "a.js", Some(1), "md5(a)", vec![]),
            Finding::from_rule(&r, "a.js", Some(9), "md5(b)", vec![]),
            Finding::from_rule(&r, "b.js", Some(2), "md5(c)", vec![]),
        ];
        let groups = group_findings(&findings);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].occurrence_count, 3);
        assert_eq!(groups[0].file_count, 2);
        assert_eq!(groups[0].files, vec!["a.js", "b.js"]);
        assert_eq!(groups[0].representative.line, Some(1));
    }

    #[test]
    fn distinct_titles_group_separately() {
        let findings = vec![
            Finding::from_rule(&rule("T-003", "Weak hash (MD5)"), "a.js", Some(1), "x", vec![]),
            Finding::from_rule(&rule("T-004", "Weak hash (SHA-1)"), "a.js", Some(2), "y", vec![]),
        ];
        assert_eq!(group_findings(&findings).len(), 2);
    }

    #[test]
    fn groups_order_by_severity_then_volume() {
        let critical = RuleDescriptor::line(
            "T-005",
            RuleCategory::Phi,
            Severity::Critical,
            Confidence::High,
            "SSN literal",
        )
        .with_patterns(&["x"]);
        let noisy_medium = RuleDescriptor::line(
            "T-006",
            RuleCategory::Encryption,
            Severity::Medium,
            Confidence::High,
            "Cleartext HTTP",
        )
        .with_patterns(&["x"]);
        let quiet_medium = RuleDescriptor::line(
            "T-007",
            RuleCategory::Encryption,
            Severity::Medium,
            Confidence::High,
            "Weak TLS",
        )
        .with_patterns(&["x"]);

        let findings = vec![
            Finding::from_rule(&quiet_medium, "a.js", Some(1), "x", vec![]),
            Finding::from_rule(&noisy_medium, "a.js", Some(2), "x", vec![]),
            Finding::from_rule(&noisy_medium, "b.js", Some(3), "x", vec![]),
            Finding::from_rule(&critical, "c.js", Some(4), "x", vec![]),
        ];
        let groups = group_findings(&findings);
        let ids: Vec<&str> = groups.iter().map(|g| g.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["T-005", "T-006", "T-007"]);
    }

    #[test]
    fn redaction_masks_by_default() {
        let masked = redact_for_log("ssn = 223-45-6789");
        assert!(masked.starts_with("[REDACTED"));
        assert!(!masked.contains("223"));
    }
}
