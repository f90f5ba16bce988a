//! fixer/mod.rs - Applies automated remediations and records evidence.
//!
//! The engine walks the active findings of a scan, rewrites the lines it has
//! a deterministic edit for, and records a hashed before/after evidence entry
//! for each applied fix. Findings it cannot or may not touch are routed into
//! the manual review queue instead. Fixes within one file are applied from
//! the bottom of the file upward so earlier edits never shift the line
//! numbers of later ones, and each file is written back to disk exactly once.
//!
//! Before touching a line the engine re-validates that the line still matches
//! the rule that produced the finding. A stale finding (the file changed
//! since the scan) is never edited; it goes to review.
//!
//! License: MIT OR APACHE 2.0

pub mod edits;

use crate::audit::{load_trail, save_trail, AuditEvidence, AuditTrail};
use crate::errors::Result;
use crate::finding::{redact_for_log, Finding, ScanResult};
use crate::review::{ManualReviewItem, ReviewReason};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use vlayer_rules::{builtin_rules, compile_rules, CompiledRule, FixKind, RuleDescriptor};

/// What happened to one finding during a fixer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixOutcome {
    /// The line was rewritten and the file saved.
    Fixed,
    /// The recorded line no longer matches the rule; the file changed since
    /// the scan.
    Stale,
    /// The fix's replacement table did not know how to rewrite this line, or
    /// the file could not be read.
    Failed,
    /// The edit was computed but the file could not be written back.
    WriteFailed,
}

/// Per-finding record of a fix attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixResult {
    pub finding_id: String,
    pub rule_id: String,
    pub file: String,
    pub line: Option<usize>,
    pub fixed: bool,
    pub fix_type: FixKind,
    pub outcome: FixOutcome,
    /// The affected line before the edit (empty when nothing was edited).
    pub before: String,
    /// The affected line after the edit (empty when nothing was edited).
    pub after: String,
}

/// Summary of one fixer invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixReport {
    /// Active findings the engine considered, fixable or not.
    pub total_findings: usize,
    pub fixed_count: usize,
    pub skipped_count: usize,
    pub fixes: Vec<FixResult>,
    pub audit_trail: AuditTrail,
}

/// Applies fix tables to a scanned tree and maintains the audit trail.
pub struct FixEngine {
    root: PathBuf,
    project: String,
    rules: HashMap<String, CompiledRule>,
}

impl FixEngine {
    /// Engine over the built-in catalog.
    pub fn new(root: &Path, project: &str) -> Result<Self> {
        Self::with_rules(root, project, &builtin_rules())
    }

    /// Engine over an explicit rule set, for runs that scanned with
    /// organization-specific rules.
    pub fn with_rules(root: &Path, project: &str, descriptors: &[RuleDescriptor]) -> Result<Self> {
        let rules = compile_rules(descriptors)?
            .into_iter()
            .map(|rule| (rule.id().to_string(), rule))
            .collect();
        Ok(Self {
            root: root.to_path_buf(),
            project: project.to_string(),
            rules,
        })
    }

    /// Applies every fix the engine has an edit for, routes the rest to
    /// manual review, and persists the updated audit trail. The trail file is
    /// only rewritten when this run actually produced evidence or review
    /// items, so a run with nothing to do leaves the store untouched.
    pub fn apply(&self, result: &ScanResult) -> Result<FixReport> {
        let now = Utc::now();
        let active: Vec<&Finding> = result.active();
        let mut trail = match load_trail(&self.root)? {
            Some(existing) => existing,
            None => AuditTrail::new(&self.project, now),
        };
        let known_reviews: HashSet<String> = trail
            .manual_reviews
            .iter()
            .map(|item| item.finding_id.clone())
            .collect();

        let mut fixes: Vec<FixResult> = Vec::new();
        let mut evidence_batch: Vec<AuditEvidence> = Vec::new();
        let mut review_batch: Vec<ManualReviewItem> = Vec::new();
        let queue_review = |batch: &mut Vec<ManualReviewItem>, finding: &Finding, reason| {
            if known_reviews.contains(&finding.id)
                || batch.iter().any(|item| item.finding_id == finding.id)
            {
                log::debug!("review item for {} already queued, skipping", finding.id);
                return;
            }
            batch.push(ManualReviewItem::from_finding(finding, reason, now));
        };

        let mut by_file: BTreeMap<&str, Vec<&Finding>> = BTreeMap::new();
        for finding in active.iter().copied() {
            match finding.fix_type {
                Some(_) if finding.line.is_some() => {
                    by_file.entry(finding.file.as_str()).or_default().push(finding);
                }
                _ => queue_review(&mut review_batch, finding, ReviewReason::NoAutomatedFix),
            }
        }

        for (file, mut group) in by_file {
            // Bottom-up keeps line numbers stable across edits in one file.
            group.sort_by(|a, b| b.line.cmp(&a.line));
            let path = self.root.join(file);
            let original = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(err) => {
                    log::warn!("cannot read {} for fixing: {err}", path.display());
                    for finding in group {
                        fixes.push(unfixed(finding, FixOutcome::Failed));
                        queue_review(&mut review_batch, finding, ReviewReason::FixFailed);
                    }
                    continue;
                }
            };
            let (mut lines, terminators) = split_terminated(&original);
            let mut buffer = original;
            let mut staged: Vec<(FixResult, AuditEvidence)> = Vec::new();

            for finding in group {
                let line_no = finding.line.unwrap_or(0);
                let current = match line_no.checked_sub(1).and_then(|idx| lines.get(idx)) {
                    Some(line) => line.clone(),
                    None => {
                        fixes.push(unfixed(finding, FixOutcome::Stale));
                        queue_review(&mut review_batch, finding, ReviewReason::StaleFinding);
                        continue;
                    }
                };
                let still_matches = match self.rules.get(&finding.rule_id) {
                    Some(rule) => rule.matches_primary(&current),
                    None => current == finding.snippet,
                };
                if !still_matches {
                    log::debug!(
                        "{} at {file}:{line_no} is stale: {}",
                        finding.rule_id,
                        redact_for_log(&current)
                    );
                    fixes.push(unfixed(finding, FixOutcome::Stale));
                    queue_review(&mut review_batch, finding, ReviewReason::StaleFinding);
                    continue;
                }
                let fix_type = finding.fix_type.expect("fixable findings carry a fix type");
                let Some(rewritten) = edits::apply_fix(fix_type, &current) else {
                    fixes.push(unfixed(finding, FixOutcome::Failed));
                    queue_review(&mut review_batch, finding, ReviewReason::FixFailed);
                    continue;
                };

                let file_hash_before = sha256_hex(&buffer);
                lines[line_no - 1] = rewritten.clone();
                buffer = rebuild(&lines, &terminators);
                let file_hash_after = sha256_hex(&buffer);
                log::debug!(
                    "{} fixed {file}:{line_no}: {}",
                    finding.rule_id,
                    redact_for_log(&rewritten)
                );
                staged.push((
                    FixResult {
                        finding_id: finding.id.clone(),
                        rule_id: finding.rule_id.clone(),
                        file: finding.file.clone(),
                        line: finding.line,
                        fixed: true,
                        fix_type,
                        outcome: FixOutcome::Fixed,
                        before: current.clone(),
                        after: rewritten.clone(),
                    },
                    AuditEvidence {
                        description: finding.title.clone(),
                        file: finding.file.clone(),
                        line: finding.line,
                        before: current,
                        after: rewritten,
                        timestamp: now,
                        file_hash_before,
                        file_hash_after,
                        fix_type,
                        reference: finding.reference.clone(),
                    },
                ));
            }

            if staged.is_empty() {
                continue;
            }
            match fs::write(&path, &buffer) {
                Ok(()) => {
                    for (fix, evidence) in staged {
                        fixes.push(fix);
                        evidence_batch.push(evidence);
                    }
                }
                Err(err) => {
                    // The file on disk is untouched, so the staged evidence
                    // would attest to an edit that never happened.
                    log::warn!("cannot write {}: {err}", path.display());
                    for (fix, _) in staged {
                        if let Some(finding) =
                            active.iter().copied().find(|f| f.id == fix.finding_id)
                        {
                            queue_review(&mut review_batch, finding, ReviewReason::WriteFailed);
                        }
                        fixes.push(FixResult {
                            fixed: false,
                            outcome: FixOutcome::WriteFailed,
                            before: String::new(),
                            after: String::new(),
                            ..fix
                        });
                    }
                }
            }
        }

        let fixed_count = fixes.iter().filter(|fix| fix.fixed).count();
        if !evidence_batch.is_empty() || !review_batch.is_empty() {
            trail.append(evidence_batch, review_batch);
            save_trail(&self.root, &trail)?;
        }
        log::info!(
            "fixer pass: {fixed_count} fixed, {} sent to review, {} active findings total",
            trail.open_review_count(),
            active.len()
        );
        Ok(FixReport {
            total_findings: active.len(),
            fixed_count,
            skipped_count: active.len() - fixed_count,
            fixes,
            audit_trail: trail,
        })
    }
}

fn unfixed(finding: &Finding, outcome: FixOutcome) -> FixResult {
    FixResult {
        finding_id: finding.id.clone(),
        rule_id: finding.rule_id.clone(),
        file: finding.file.clone(),
        line: finding.line,
        fixed: false,
        fix_type: finding.fix_type.expect("only fixable findings reach the fixer"),
        outcome,
        before: String::new(),
        after: String::new(),
    }
}

// Bodies match what `str::lines` yields; rebuild restores the input byte
// for byte, so an edit never rewrites the endings of untouched lines.
fn split_terminated(content: &str) -> (Vec<String>, Vec<&'static str>) {
    let mut bodies = Vec::new();
    let mut terminators = Vec::new();
    let mut rest = content;
    while !rest.is_empty() {
        match rest.find('\n') {
            Some(pos) => {
                if pos > 0 && rest.as_bytes()[pos - 1] == b'\r' {
                    bodies.push(rest[..pos - 1].to_string());
                    terminators.push("\r\n");
                } else {
                    bodies.push(rest[..pos].to_string());
                    terminators.push("\n");
                }
                rest = &rest[pos + 1..];
            }
            None => {
                bodies.push(rest.to_string());
                terminators.push("");
                rest = "";
            }
        }
    }
    (bodies, terminators)
}

fn rebuild(lines: &[String], terminators: &[&str]) -> String {
    let mut content = String::new();
    for (body, term) in lines.iter().zip(terminators) {
        content.push_str(body);
        content.push_str(term);
    }
    content
}

fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
