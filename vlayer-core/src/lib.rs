// vlayer-core/src/lib.rs
//! # Vlayer Core Library
//!
//! `vlayer-core` provides the platform-independent logic for compliance
//! scanning of healthcare source trees. It compiles the rule catalog from
//! `vlayer-rules`, scans a corpus of source files for PHI exposure and
//! security weaknesses, aggregates raw matches against baselines and
//! acknowledgments, scores the result, and can apply deterministic automated
//! fixes backed by a tamper-evident audit trail.
//!
//! The library is designed so the scanning and scoring stages are pure over
//! their inputs: the same corpus, rule set, baseline and acknowledgment
//! state always produce the same findings in the same order, regardless of
//! how many worker threads the scan used.
//!
//! ## Modules
//!
//! * `config`: Scan-time options such as category filters and context width.
//! * `corpus`: Walks a directory tree into an in-memory scanning corpus.
//! * `scanner`: The parallel rule-matching engine and comment/context logic.
//! * `validators`: Programmatic second-pass checks behind high-noise rules.
//! * `finding`: Finding and grouped-finding records, scan results.
//! * `aggregate`: Confidence suppression, baseline marking, acknowledgments.
//! * `scoring`: Severity-weighted compliance score, grade, and status.
//! * `fixer`: Deterministic automated remediation with evidence capture.
//! * `audit`: The hash-sealed audit trail and manual review persistence.
//! * `review`: The manual review queue and its status workflow.
//! * `baseline`: Accepted-debt snapshots that separate new from known debt.
//! * `history`: Retained score history and trend calculation.
//! * `store`: Atomic JSON persistence under the project's `.vlayer/` state directory.
//! * `watch`: Cancellation and single-scan admission for watch mode.
//!
//! ## Public API
//!
//! The public API is organized by pipeline stage:
//!
//! **Configuration & Rules**
//!
//! * [`ScanConfig`]: Scan options (categories, minimum confidence, context lines).
//! * [`RuleDescriptor`] / [`builtin_rules`]: The rule catalog, re-exported from `vlayer-rules`.
//!
//! **Scanning**
//!
//! * [`ScanEngine`]: Compiles a rule set and scans corpora or directory trees.
//! * [`SourceFile`] / [`collect_corpus`]: The scanning corpus and its on-disk loader.
//! * [`Finding`] / [`GroupedFinding`] / [`ScanResult`]: What a scan produces.
//!
//! **Aggregation & Scoring**
//!
//! * [`AckRegistry`]: Time-boxed acknowledgments that suppress findings until expiry.
//! * [`Baseline`]: Snapshot of accepted findings for incremental adoption.
//! * [`ComplianceScore`]: Score, grade, status, and severity breakdown.
//! * [`ScanHistory`]: Retained run history with trend and best/worst lookups.
//!
//! **Remediation & Evidence**
//!
//! * [`FixEngine`] / [`FixReport`]: Applies fix tables and reports per-finding outcomes.
//! * [`AuditTrail`] / [`AuditEvidence`]: Hash-sealed record of every automated edit.
//! * [`ManualReviewItem`] / [`ReviewQueue`]: Findings waiting on a human decision.
//!
//! **Watch Mode**
//!
//! * [`CancellationToken`]: Stops a running scan at the next file boundary.
//! * [`ScanGate`]: Admits one scan at a time and coalesces change events.
//!
//! ## Usage Example
//!
//! ```rust
//! use vlayer_core::{AckRegistry, ScanConfig, ScanEngine, SourceFile};
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     // 1. Compile the built-in catalog.
//!     let engine = ScanEngine::new(ScanConfig::default())?;
//!
//!     // 2. Scan an in-memory corpus.
//!     let corpus = vec![SourceFile::new(
//!         "src/crypto.js",
//!         "const hash = md5(password);\n",
//!     )];
//!     let result = engine.scan_corpus(&corpus, None, &AckRegistry::default());
//!
//!     // 3. One weak-hash finding, ten penalty points.
//!     assert_eq!(result.findings.len(), 1);
//!     assert_eq!(result.compliance_score.score, 90);
//!     println!(
//!         "score {} ({})",
//!         result.compliance_score.score, result.compliance_score.grade
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`VlayerError`] through the crate-local
//! [`Result`] alias; `anyhow::Error` is accepted at the boundary via the
//! `AnyhowWrapper` variant.
//!
//! ## Design Principles
//!
//! * **Deterministic:** Findings are sorted and identified by content, so
//!   repeated scans of an unchanged tree are byte-identical.
//! * **Evidence-first:** No automated edit happens without a hashed
//!   before/after record in the audit trail.
//! * **Incremental adoption:** Baselines and acknowledgments let a team
//!   gate on new findings without first paying down historical debt.
//! * **Testable:** Each pipeline stage is a pure function over explicit
//!   inputs and is unit-tested in isolation.
//!
//! ---
//! License: MIT OR APACHE 2.0

pub mod aggregate;
pub mod audit;
pub mod baseline;
pub mod config;
pub mod corpus;
pub mod errors;
pub mod finding;
pub mod fixer;
pub mod history;
pub mod review;
pub mod scanner;
pub mod scoring;
pub mod store;
pub mod validators;
pub mod watch;

/// Re-exports the scan configuration and its defaults.
pub use config::{ScanConfig, DEFAULT_CONTEXT_LINES};

/// Re-exports the crate error type and result alias.
pub use errors::{Result, VlayerError};

/// Re-exports the scanning engine and corpus types.
pub use corpus::{collect_corpus, SourceFile, MAX_FILE_SIZE};
pub use scanner::ScanEngine;

/// Re-exports finding records and their helpers.
pub use finding::{
    finding_id,
    group_findings,
    redact_for_log,
    Finding,
    GroupedFinding,
    ScanResult,
    REPOSITORY_SENTINEL,
};

/// Re-exports aggregation state: acknowledgments and baselines.
pub use aggregate::{aggregate, AckRegistry, Acknowledgment, AggregateContext};
pub use baseline::{load_baseline, save_baseline, Baseline, BaselineEntry};

/// Re-exports the scoring model.
pub use scoring::{
    penalty_for,
    score_findings,
    ComplianceScore,
    ComplianceStatus,
    Grade,
    Penalty,
    SeverityBreakdown,
};

/// Re-exports score history persistence.
pub use history::{append_run, HistoryEntry, ScanHistory, HISTORY_RETENTION};

/// Re-exports the automated fixer and its report types.
pub use fixer::{FixEngine, FixOutcome, FixReport, FixResult};

/// Re-exports the audit trail and manual review workflow.
pub use audit::{load_trail, save_trail, AuditEvidence, AuditTrail};
pub use review::{deadline_days, ManualReviewItem, ReviewQueue, ReviewReason, ReviewStatus};

/// Re-exports watch-mode primitives.
pub use watch::{CancellationToken, ScanGate, ScanPermit};

// Rule-catalog types appear throughout the public API, so consumers get them
// without a direct vlayer-rules dependency.
pub use vlayer_rules::{
    builtin_rules,
    rules_for_categories,
    Confidence,
    FixKind,
    Granularity,
    RuleCategory,
    RuleDescriptor,
    Severity,
};
