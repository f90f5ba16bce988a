//! audit.rs - The tamper-evident audit trail.
//!
//! Every automated fix leaves an evidence record with SHA-256 hashes of the
//! file before and after the edit. The trail's `reportHash` is recomputed
//! over a canonical serialization of the evidence and review arrays on every
//! append or review update. The canonical form spells out field order
//! explicitly rather than trusting a serializer's default ordering, so the
//! hash is reproducible across implementations; an inspector that recomputes
//! it and gets a different value is looking at a modified file.
//!
//! License: MIT OR APACHE 2.0

use crate::errors::{Result, VlayerError};
use crate::review::{ManualReviewItem, ReviewQueue};
use crate::store;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;
use uuid::Uuid;
use vlayer_rules::FixKind;

const AUDIT_FILE: &str = "audit-trail.json";

/// A hashed before/after record of one automated fix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvidence {
    pub description: String,
    pub file: String,
    pub line: Option<usize>,
    /// The affected line before the edit.
    pub before: String,
    /// The affected line after the edit.
    pub after: String,
    pub timestamp: DateTime<Utc>,
    /// SHA-256 of the whole file immediately before this edit.
    pub file_hash_before: String,
    /// SHA-256 of the whole file immediately after this edit.
    pub file_hash_after: String,
    pub fix_type: FixKind,
    pub reference: String,
}

/// The persisted remediation record for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditTrail {
    pub id: String,
    pub project: String,
    pub created_at: DateTime<Utc>,
    pub evidence: Vec<AuditEvidence>,
    pub manual_reviews: Vec<ManualReviewItem>,
    /// SHA-256 over [`canonical_payload`] of evidence + reviews.
    pub report_hash: String,
}

impl AuditTrail {
    /// A fresh trail for a project that has never had a fix run.
    pub fn new(project: &str, now: DateTime<Utc>) -> Self {
        let mut trail = Self {
            id: Uuid::new_v4().to_string(),
            project: project.to_string(),
            created_at: now,
            evidence: Vec::new(),
            manual_reviews: Vec::new(),
            report_hash: String::new(),
        };
        trail.report_hash = trail.compute_hash();
        trail
    }

    /// Appends a run's evidence and review items and re-seals the hash.
    pub fn append(&mut self, evidence: Vec<AuditEvidence>, reviews: Vec<ManualReviewItem>) {
        self.evidence.extend(evidence);
        self.manual_reviews.extend(reviews);
        self.report_hash = self.compute_hash();
    }

    pub fn compute_hash(&self) -> String {
        let payload = canonical_payload(&self.evidence, &self.manual_reviews);
        hex::encode(Sha256::digest(payload.as_bytes()))
    }

    /// Errors with [`VlayerError::TamperDetected`] when the stored hash no
    /// longer matches the recomputed one. Never repairs the hash.
    pub fn verify_integrity(&self) -> Result<()> {
        let recomputed = self.compute_hash();
        if recomputed != self.report_hash {
            return Err(VlayerError::TamperDetected {
                stored: self.report_hash.clone(),
                recomputed,
            });
        }
        Ok(())
    }

    pub fn evidence_count(&self) -> usize {
        self.evidence.len()
    }

    /// Evidence totals keyed by fix type, for reporting. Computed on demand;
    /// the stored trail holds only the raw records.
    pub fn fixes_by_type(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.evidence {
            *counts.entry(record.fix_type.as_str()).or_insert(0) += 1;
        }
        counts
    }

    pub fn open_review_count(&self) -> usize {
        self.manual_reviews.iter().filter(|r| !r.is_terminal()).count()
    }

    pub fn review_queue(&self) -> ReviewQueue<'_> {
        ReviewQueue::new(&self.manual_reviews)
    }

    /// Applies a mutation to the review item for `finding_id`, then re-seals
    /// the hash. Review state is part of the hashed payload, so edits must
    /// come through here.
    pub fn update_review<F>(&mut self, finding_id: &str, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut ManualReviewItem) -> Result<()>,
    {
        let item = self
            .manual_reviews
            .iter_mut()
            .find(|r| r.finding_id == finding_id)
            .ok_or_else(|| VlayerError::ReviewNotFound(finding_id.to_string()))?;
        mutate(item)?;
        self.report_hash = self.compute_hash();
        Ok(())
    }
}

fn canonical_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn json_str(value: &str) -> String {
    serde_json::to_string(value).expect("JSON string encoding cannot fail")
}

fn push_field(out: &mut String, first: bool, name: &str, value: &str) {
    if !first {
        out.push(',');
    }
    out.push('"');
    out.push_str(name);
    out.push_str("\":");
    out.push_str(value);
}

fn canonical_evidence(e: &AuditEvidence) -> String {
    let mut out = String::from("{");
    push_field(&mut out, true, "description", &json_str(&e.description));
    push_field(&mut out, false, "file", &json_str(&e.file));
    push_field(
        &mut out,
        false,
        "line",
        &e.line.map_or_else(|| "null".to_string(), |n| n.to_string()),
    );
    push_field(&mut out, false, "before", &json_str(&e.before));
    push_field(&mut out, false, "after", &json_str(&e.after));
    push_field(
        &mut out,
        false,
        "timestamp",
        &json_str(&canonical_timestamp(e.timestamp)),
    );
    push_field(&mut out, false, "fileHashBefore", &json_str(&e.file_hash_before));
    push_field(&mut out, false, "fileHashAfter", &json_str(&e.file_hash_after));
    push_field(&mut out, false, "fixType", &json_str(e.fix_type.as_str()));
    push_field(&mut out, false, "reference", &json_str(&e.reference));
    out.push('}');
    out
}

fn canonical_review(r: &ManualReviewItem) -> String {
    let mut out = String::from("{");
    push_field(&mut out, true, "findingId", &json_str(&r.finding_id));
    push_field(&mut out, false, "ruleId", &json_str(&r.rule_id));
    push_field(&mut out, false, "file", &json_str(&r.file));
    push_field(
        &mut out,
        false,
        "line",
        &r.line.map_or_else(|| "null".to_string(), |n| n.to_string()),
    );
    push_field(&mut out, false, "title", &json_str(&r.title));
    push_field(&mut out, false, "severity", &json_str(r.severity.as_str()));
    push_field(&mut out, false, "reason", &json_str(r.reason.as_str()));
    push_field(&mut out, false, "status", &json_str(r.status.as_str()));
    push_field(
        &mut out,
        false,
        "assignedTo",
        &r.assigned_to
            .as_deref()
            .map_or_else(|| "null".to_string(), json_str),
    );
    push_field(
        &mut out,
        false,
        "createdAt",
        &json_str(&canonical_timestamp(r.created_at)),
    );
    push_field(
        &mut out,
        false,
        "suggestedDeadline",
        &json_str(&canonical_timestamp(r.suggested_deadline)),
    );
    out.push('}');
    out
}

/// The exact byte string the report hash covers. Field order here is the
/// contract; changing it invalidates every existing trail.
pub fn canonical_payload(evidence: &[AuditEvidence], reviews: &[ManualReviewItem]) -> String {
    let mut payload = String::from("{\"evidence\":[");
    for (i, e) in evidence.iter().enumerate() {
        if i > 0 {
            payload.push(',');
        }
        payload.push_str(&canonical_evidence(e));
    }
    payload.push_str("],\"manualReviews\":[");
    for (i, r) in reviews.iter().enumerate() {
        if i > 0 {
            payload.push(',');
        }
        payload.push_str(&canonical_review(r));
    }
    payload.push_str("]}");
    payload
}

/// Loads and integrity-checks the project's audit trail. A missing trail is
/// a normal state; a tampered one is an error the caller must surface.
pub fn load_trail(root: &Path) -> Result<Option<AuditTrail>> {
    match store::read_json::<AuditTrail>(&store::state_path(root, AUDIT_FILE))? {
        Some(trail) => {
            trail.verify_integrity()?;
            Ok(Some(trail))
        }
        None => Ok(None),
    }
}

pub fn save_trail(root: &Path, trail: &AuditTrail) -> Result<()> {
    store::write_json_atomic(&store::state_path(root, AUDIT_FILE), trail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Finding;
    use crate::review::ReviewReason;
    use vlayer_rules::{Confidence, RuleCategory, RuleDescriptor, Severity};

    fn evidence() -> AuditEvidence {
        AuditEvidence {
            description: "Weak hashing algorithm (MD5) detected".to_string(),
            file: "src/crypto.js".to_string(),
            line: Some(1),
            before: "const hash = md5(password);".to_string(),
            after: "const hash = sha256(password);".to_string(),
            timestamp: Utc::now(),
            file_hash_before: "a".repeat(64),
            file_hash_after: "b".repeat(64),
            fix_type: FixKind::UpgradeHashAlgorithm,
            reference: "HIPAA §164.312(a)(2)(iv)".to_string(),
        }
    }

    fn review_item() -> ManualReviewItem {
        let rule = RuleDescriptor::line(
            "ENC-003",
            RuleCategory::Encryption,
            Severity::High,
            Confidence::Medium,
            "Broken cipher or cipher mode",
        )
        .with_patterns(&["x"]);
        let finding = Finding::from_rule(&rule, "src/a.js", Some(9), "rc4(x)", vec![]);
        ManualReviewItem::from_finding(&finding, ReviewReason::NoAutomatedFix, Utc::now())
    }

    #[test]
    fn fresh_trail_verifies() {
        let trail = AuditTrail::new("demo", Utc::now());
        assert!(trail.verify_integrity().is_ok());
        assert_eq!(trail.evidence_count(), 0);
    }

    #[test]
    fn append_reseals_the_hash() {
        let mut trail = AuditTrail::new("demo", Utc::now());
        let empty_hash = trail.report_hash.clone();
        trail.append(vec![evidence()], vec![review_item()]);
        assert_ne!(trail.report_hash, empty_hash);
        assert!(trail.verify_integrity().is_ok());
        assert_eq!(trail.evidence_count(), 1);
        assert_eq!(trail.open_review_count(), 1);
    }

    #[test]
    fn fixes_by_type_counts_evidence_without_storing_totals() {
        let mut trail = AuditTrail::new("demo", Utc::now());
        let mut tls = evidence();
        tls.fix_type = FixKind::UpgradeTlsVersion;
        trail.append(vec![evidence(), evidence(), tls], vec![]);
        let counts = trail.fixes_by_type();
        assert_eq!(counts.get("upgrade_hash_algorithm"), Some(&2));
        assert_eq!(counts.get("upgrade_tls_version"), Some(&1));
        assert_eq!(counts.get("use_https"), None);
    }

    #[test]
    fn mutating_any_evidence_field_is_detected() {
        let mut trail = AuditTrail::new("demo", Utc::now());
        trail.append(vec![evidence()], vec![]);
        trail.evidence[0].after = "const hash = md4(password);".to_string();
        let err = trail.verify_integrity().unwrap_err();
        assert!(matches!(err, VlayerError::TamperDetected { .. }));
    }

    #[test]
    fn mutating_review_status_outside_api_is_detected() {
        let mut trail = AuditTrail::new("demo", Utc::now());
        trail.append(vec![], vec![review_item()]);
        trail.manual_reviews[0].assigned_to = Some("intruder".to_string());
        assert!(trail.verify_integrity().is_err());
    }

    #[test]
    fn update_review_reseals() {
        let mut trail = AuditTrail::new("demo", Utc::now());
        let item = review_item();
        let finding_id = item.finding_id.clone();
        trail.append(vec![], vec![item]);
        trail
            .update_review(&finding_id, |r| r.assign("security-team"))
            .unwrap();
        assert!(trail.verify_integrity().is_ok());
        assert_eq!(
            trail.manual_reviews[0].assigned_to.as_deref(),
            Some("security-team")
        );
    }

    #[test]
    fn unknown_review_update_errors() {
        let mut trail = AuditTrail::new("demo", Utc::now());
        let err = trail.update_review("no-such-id", |_| Ok(())).unwrap_err();
        assert!(matches!(err, VlayerError::ReviewNotFound(_)));
    }

    #[test]
    fn canonical_payload_field_order_is_fixed() {
        let e = evidence();
        let payload = canonical_payload(&[e], &[]);
        let desc_pos = payload.find("\"description\"").unwrap();
        let file_pos = payload.find("\"file\"").unwrap();
        let ts_pos = payload.find("\"timestamp\"").unwrap();
        let fix_pos = payload.find("\"fixType\"").unwrap();
        assert!(desc_pos < file_pos && file_pos < ts_pos && ts_pos < fix_pos);
    }

    #[test]
    fn trail_survives_serde_round_trip_with_hash_intact() {
        let mut trail = AuditTrail::new("demo", Utc::now());
        trail.append(vec![evidence()], vec![review_item()]);
        let json = serde_json::to_string(&trail).unwrap();
        let back: AuditTrail = serde_json::from_str(&json).unwrap();
        assert!(back.verify_integrity().is_ok());
        assert_eq!(back.report_hash, trail.report_hash);
    }

    #[test]
    fn tampered_store_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut trail = AuditTrail::new("demo", Utc::now());
        trail.append(vec![evidence()], vec![]);
        save_trail(dir.path(), &trail).unwrap();

        let path = store::state_path(dir.path(), AUDIT_FILE);
        let raw = std::fs::read_to_string(&path).unwrap();
        let tampered = raw.replace("sha256(password)", "sha1(password)");
        assert_ne!(raw, tampered);
        std::fs::write(&path, tampered).unwrap();

        assert!(matches!(
            load_trail(dir.path()),
            Err(VlayerError::TamperDetected { .. })
        ));
    }

    #[test]
    fn missing_trail_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_trail(dir.path()).unwrap().is_none());
    }
}
