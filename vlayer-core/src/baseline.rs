//! baseline.rs - Baseline snapshots for suppressing known findings.
//!
//! A baseline is a pure projection of a scan result: the set of
//! (ruleId, file) signatures seen at capture time. Line numbers are
//! intentionally not part of the signature, so a finding that merely moves
//! within its file stays suppressed. The flip side is that several
//! same-rule findings in one file collapse to a single signature.
//!
//! License: MIT OR APACHE 2.0

use crate::errors::Result;
use crate::finding::ScanResult;
use crate::store;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

const BASELINE_FILE: &str = "baseline.json";

/// One known-finding signature.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineEntry {
    pub rule_id: String,
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Baseline {
    pub created_at: DateTime<Utc>,
    pub entries: BTreeSet<BaselineEntry>,
}

impl Baseline {
    /// Snapshots every raw finding of `result`, suppressed ones included; a
    /// baseline records what was seen, not what was judged active.
    pub fn capture(result: &ScanResult, now: DateTime<Utc>) -> Self {
        let entries = result
            .findings
            .iter()
            .map(|f| BaselineEntry {
                rule_id: f.rule_id.clone(),
                file: f.file.clone(),
            })
            .collect();
        Self {
            created_at: now,
            entries,
        }
    }

    pub fn contains(&self, rule_id: &str, file: &str) -> bool {
        self.entries.contains(&BaselineEntry {
            rule_id: rule_id.to_string(),
            file: file.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn load_baseline(root: &Path) -> Result<Option<Baseline>> {
    store::read_json(&store::state_path(root, BASELINE_FILE))
}

pub fn save_baseline(root: &Path, baseline: &Baseline) -> Result<()> {
    store::write_json_atomic(&store::state_path(root, BASELINE_FILE), baseline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::{group_findings, Finding};
    use crate::scoring::score_findings;
    use vlayer_rules::{Confidence, RuleCategory, RuleDescriptor, Severity};

    fn result_with(findings: Vec<Finding>) -> ScanResult {
        let active: Vec<&Finding> = findings.iter().collect();
        ScanResult {
            raw_findings_count: findings.len(),
            grouped_findings: group_findings(&findings),
            scanned_files: 1,
            scan_duration_ms: 1,
            compliance_score: score_findings(&active, 0),
            findings,
        }
    }

    fn finding(rule_id: &str, file: &str) -> Finding {
        let rule = RuleDescriptor::line(
            rule_id,
            RuleCategory::Encryption,
            Severity::High,
            Confidence::High,
            "t",
        )
        .with_patterns(&["x"]);
        Finding::from_rule(&rule, file, Some(1), "x", vec![])
    }

    #[test]
    fn capture_collapses_same_rule_same_file() {
        let result = result_with(vec![
            finding("T-001", "a.js"),
            finding("T-001", "a.js"),
            finding("T-002", "b.js"),
        ]);
        let baseline = Baseline::capture(&result, Utc::now());
        assert_eq!(baseline.len(), 2);
        assert!(baseline.contains("T-001", "a.js"));
        assert!(baseline.contains("T-002", "b.js"));
        assert!(!baseline.contains("T-001", "b.js"));
    }

    #[test]
    fn baseline_round_trips_through_store() {
        let dir = tempfile::tempdir().unwrap();
        let baseline = Baseline::capture(&result_with(vec![finding("T-001", "a.js")]), Utc::now());
        save_baseline(dir.path(), &baseline).unwrap();
        let loaded = load_baseline(dir.path()).unwrap().unwrap();
        assert_eq!(loaded, baseline);
    }

    #[test]
    fn missing_baseline_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_baseline(dir.path()).unwrap().is_none());
    }
}
