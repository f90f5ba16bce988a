//! aggregate.rs - Finding aggregation, suppression, and acknowledgment expiry.
//!
//! The aggregator is the only component that mutates finding flags. It takes
//! the raw scanner output and, in one pass: suppresses findings below the
//! confidence floor, marks baseline-known findings, applies unexpired
//! acknowledgments (reverting expired ones), then derives the grouped view
//! and the compliance score from what remains active.
//!
//! License: MIT OR APACHE 2.0

use crate::baseline::Baseline;
use crate::errors::Result;
use crate::finding::{group_findings, Finding, ScanResult};
use crate::scoring::score_findings;
use crate::store;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use vlayer_rules::Confidence;

const ACK_FILE: &str = "acknowledgments.json";

/// One recorded acknowledgment: "we know about this finding, hold it out of
/// the active set until the expiry passes".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acknowledgment {
    pub rule_id: String,
    pub file: String,
    pub acknowledged_by: String,
    pub note: String,
    pub created_at: DateTime<Utc>,
    /// `None` means the acknowledgment never expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Acknowledgment {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expiry) if expiry <= now)
    }
}

/// Acknowledgments keyed by (ruleId, file), like baseline signatures. Line
/// numbers are deliberately not part of the key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckRegistry {
    pub acknowledgments: Vec<Acknowledgment>,
}

impl AckRegistry {
    /// Records (or replaces) an acknowledgment for a (ruleId, file) pair.
    pub fn acknowledge(
        &mut self,
        rule_id: &str,
        file: &str,
        acknowledged_by: &str,
        note: &str,
        now: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) {
        self.acknowledgments
            .retain(|a| !(a.rule_id == rule_id && a.file == file));
        self.acknowledgments.push(Acknowledgment {
            rule_id: rule_id.to_string(),
            file: file.to_string(),
            acknowledged_by: acknowledged_by.to_string(),
            note: note.to_string(),
            created_at: now,
            expires_at,
        });
    }

    pub fn lookup(&self, rule_id: &str, file: &str) -> Option<&Acknowledgment> {
        self.acknowledgments
            .iter()
            .find(|a| a.rule_id == rule_id && a.file == file)
    }

    /// Drops expired entries from the registry itself; returns how many were
    /// removed. The aggregator reverts expired acknowledgments on findings
    /// regardless, so calling this is housekeeping, not correctness.
    pub fn prune_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.acknowledgments.len();
        self.acknowledgments.retain(|a| !a.is_expired(now));
        before - self.acknowledgments.len()
    }

    pub fn load(root: &Path) -> Result<Self> {
        Ok(store::read_json(&store::state_path(root, ACK_FILE))?.unwrap_or_default())
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        store::write_json_atomic(&store::state_path(root, ACK_FILE), self)
    }
}

/// Everything the aggregator needs beyond the raw findings.
pub struct AggregateContext<'a> {
    pub scanned_files: usize,
    pub scan_duration_ms: u64,
    pub baseline: Option<&'a Baseline>,
    pub acks: &'a AckRegistry,
    pub min_confidence: Confidence,
    pub now: DateTime<Utc>,
}

/// Applies flags, groups, and scores. The grouped counts are taken over the
/// full raw set; the score is taken over the active subset only.
pub fn aggregate(mut findings: Vec<Finding>, ctx: &AggregateContext) -> ScanResult {
    findings.sort_by(|a, b| {
        a.file
            .cmp(&b.file)
            .then(a.line.cmp(&b.line))
            .then(a.rule_id.cmp(&b.rule_id))
    });

    for finding in &mut findings {
        finding.suppressed = finding.confidence < ctx.min_confidence;
        finding.is_baseline = ctx
            .baseline
            .map_or(false, |b| b.contains(&finding.rule_id, &finding.file));
        if let Some(ack) = ctx.acks.lookup(&finding.rule_id, &finding.file) {
            if ack.is_expired(ctx.now) {
                log::debug!(
                    "acknowledgment for {} in {} expired, reverting",
                    finding.rule_id,
                    finding.file
                );
                finding.acknowledged = false;
                finding.ack_expires_at = None;
            } else {
                finding.acknowledged = true;
                finding.ack_expires_at = ack.expires_at;
            }
        }
    }

    let grouped_findings = group_findings(&findings);
    let active: Vec<&Finding> = findings.iter().filter(|f| f.is_active()).collect();
    let acknowledged = findings.iter().filter(|f| f.acknowledged).count();
    let compliance_score = score_findings(&active, acknowledged);

    log::debug!(
        "aggregated {} raw findings: {} active, {} acknowledged",
        findings.len(),
        active.len(),
        acknowledged
    );

    ScanResult {
        raw_findings_count: findings.len(),
        grouped_findings,
        scanned_files: ctx.scanned_files,
        scan_duration_ms: ctx.scan_duration_ms,
        compliance_score,
        findings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use vlayer_rules::{Confidence, RuleCategory, RuleDescriptor, Severity};

    fn finding(rule_id: &str, file: &str, confidence: Confidence) -> Finding {
        let rule = RuleDescriptor::line(
            rule_id,
            RuleCategory::Encryption,
            Severity::High,
            confidence,
            "Weak hash",
        )
        .with_patterns(&["x"]);
        Finding::from_rule(&rule, file, Some(1), "md5(x)", vec![])
    }

    fn ctx<'a>(acks: &'a AckRegistry, min_confidence: Confidence) -> AggregateContext<'a> {
        AggregateContext {
            scanned_files: 1,
            scan_duration_ms: 5,
            baseline: None,
            acks,
            min_confidence,
            now: Utc::now(),
        }
    }

    #[test]
    fn low_confidence_findings_are_suppressed_but_counted() {
        let acks = AckRegistry::default();
        let raw = vec![
            finding("T-001", "a.js", Confidence::High),
            finding("T-002", "a.js", Confidence::Low),
        ];
        let result = aggregate(raw, &ctx(&acks, Confidence::Medium));
        assert_eq!(result.raw_findings_count, 2);
        assert_eq!(result.active().len(), 1);
        let suppressed = result.findings.iter().find(|f| f.rule_id == "T-002").unwrap();
        assert!(suppressed.suppressed);
    }

    #[test]
    fn unexpired_acknowledgment_holds_finding_out_of_active_set() {
        let mut acks = AckRegistry::default();
        let now = Utc::now();
        acks.acknowledge(
            "T-001",
            "a.js",
            "compliance-officer",
            "risk accepted pending vendor fix",
            now,
            Some(now + Duration::days(30)),
        );
        let result = aggregate(
            vec![finding("T-001", "a.js", Confidence::High)],
            &ctx(&acks, Confidence::Low),
        );
        assert!(result.active().is_empty());
        assert!(result.findings[0].acknowledged);
        assert_eq!(result.compliance_score.breakdown.acknowledged, 1);
        assert_eq!(result.compliance_score.score, 100);
    }

    #[test]
    fn expired_acknowledgment_is_reverted() {
        let mut acks = AckRegistry::default();
        let now = Utc::now();
        acks.acknowledge(
            "T-001",
            "a.js",
            "compliance-officer",
            "expired waiver",
            now - Duration::days(60),
            Some(now - Duration::days(1)),
        );
        let result = aggregate(
            vec![finding("T-001", "a.js", Confidence::High)],
            &ctx(&acks, Confidence::Low),
        );
        assert_eq!(result.active().len(), 1);
        assert!(!result.findings[0].acknowledged);
        assert_eq!(result.findings[0].ack_expires_at, None);
    }

    #[test]
    fn prune_removes_only_expired_entries() {
        let mut acks = AckRegistry::default();
        let now = Utc::now();
        acks.acknowledge("T-001", "a.js", "a", "r", now, Some(now - Duration::hours(1)));
        acks.acknowledge("T-002", "a.js", "a", "r", now, Some(now + Duration::hours(1)));
        acks.acknowledge("T-003", "a.js", "a", "r", now, None);
        assert_eq!(acks.prune_expired(now), 1);
        assert_eq!(acks.acknowledgments.len(), 2);
    }

    #[test]
    fn grouping_spans_suppressed_findings() {
        let acks = AckRegistry::default();
        let raw = vec![
            finding("T-001", "a.js", Confidence::High),
            finding("T-001", "b.js", Confidence::Low),
        ];
        let result = aggregate(raw, &ctx(&acks, Confidence::Medium));
        assert_eq!(result.grouped_findings.len(), 1);
        assert_eq!(result.grouped_findings[0].occurrence_count, 2);
        assert_eq!(result.grouped_findings[0].file_count, 2);
        assert_eq!(result.active().len(), 1);
    }

    #[test]
    fn registry_round_trips_through_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut acks = AckRegistry::default();
        acks.acknowledge("T-001", "a.js", "officer", "accepted", Utc::now(), None);
        acks.save(dir.path()).unwrap();
        let loaded = AckRegistry::load(dir.path()).unwrap();
        assert_eq!(loaded, acks);
    }

    #[test]
    fn missing_registry_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = AckRegistry::load(dir.path()).unwrap();
        assert!(loaded.acknowledgments.is_empty());
    }
}
