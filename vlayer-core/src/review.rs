//! review.rs - The manual-review queue and its status state machine.
//!
//! Findings that cannot be fixed automatically (or whose fix went stale or
//! failed) become review items. An item moves strictly through
//! pending_review -> assigned -> in_progress and terminates as resolved or
//! accepted_risk; any other move is rejected. The suggested deadline is
//! computed once from severity at creation and never recomputed.
//!
//! License: MIT OR APACHE 2.0

use crate::errors::{Result, VlayerError};
use crate::finding::Finding;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use vlayer_rules::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    PendingReview,
    Assigned,
    InProgress,
    Resolved,
    AcceptedRisk,
}

impl ReviewStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            ReviewStatus::PendingReview => "pending_review",
            ReviewStatus::Assigned => "assigned",
            ReviewStatus::InProgress => "in_progress",
            ReviewStatus::Resolved => "resolved",
            ReviewStatus::AcceptedRisk => "accepted_risk",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, ReviewStatus::Resolved | ReviewStatus::AcceptedRisk)
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a finding landed in the queue instead of being fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewReason {
    NoAutomatedFix,
    StaleFinding,
    FixFailed,
    WriteFailed,
}

impl ReviewReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            ReviewReason::NoAutomatedFix => "no_automated_fix",
            ReviewReason::StaleFinding => "stale_finding",
            ReviewReason::FixFailed => "fix_failed",
            ReviewReason::WriteFailed => "write_failed",
        }
    }
}

impl fmt::Display for ReviewReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Days until the suggested deadline, by severity.
pub fn deadline_days(severity: Severity) -> i64 {
    match severity {
        Severity::Critical => 3,
        Severity::High => 7,
        Severity::Medium => 30,
        Severity::Low => 60,
        Severity::Info => 90,
    }
}

/// One finding awaiting human disposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualReviewItem {
    pub finding_id: String,
    pub rule_id: String,
    pub file: String,
    pub line: Option<usize>,
    pub title: String,
    pub severity: Severity,
    pub reason: ReviewReason,
    pub status: ReviewStatus,
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub suggested_deadline: DateTime<Utc>,
}

impl ManualReviewItem {
    pub fn from_finding(finding: &Finding, reason: ReviewReason, now: DateTime<Utc>) -> Self {
        Self {
            finding_id: finding.id.clone(),
            rule_id: finding.rule_id.clone(),
            file: finding.file.clone(),
            line: finding.line,
            title: finding.title.clone(),
            severity: finding.severity,
            reason,
            status: ReviewStatus::PendingReview,
            assigned_to: None,
            created_at: now,
            suggested_deadline: now + Duration::days(deadline_days(finding.severity)),
        }
    }

    fn transition(&mut self, to: ReviewStatus) -> Result<()> {
        let allowed = matches!(
            (self.status, to),
            (ReviewStatus::PendingReview, ReviewStatus::Assigned)
                | (ReviewStatus::Assigned, ReviewStatus::InProgress)
                | (ReviewStatus::InProgress, ReviewStatus::Resolved)
                | (ReviewStatus::InProgress, ReviewStatus::AcceptedRisk)
        );
        if !allowed {
            return Err(VlayerError::InvalidTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        log::debug!(
            "review {}: {} -> {}",
            self.finding_id,
            self.status,
            to
        );
        self.status = to;
        Ok(())
    }

    pub fn assign(&mut self, assignee: &str) -> Result<()> {
        self.transition(ReviewStatus::Assigned)?;
        self.assigned_to = Some(assignee.to_string());
        Ok(())
    }

    pub fn start(&mut self) -> Result<()> {
        self.transition(ReviewStatus::InProgress)
    }

    pub fn resolve(&mut self) -> Result<()> {
        self.transition(ReviewStatus::Resolved)
    }

    pub fn accept_risk(&mut self) -> Result<()> {
        self.transition(ReviewStatus::AcceptedRisk)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Overdue means past the suggested deadline while still non-terminal.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_terminal() && now > self.suggested_deadline
    }
}

/// Read-only queries over a set of review items; the audit trail is the
/// owner of the underlying storage.
pub struct ReviewQueue<'a> {
    items: &'a [ManualReviewItem],
}

impl<'a> ReviewQueue<'a> {
    pub fn new(items: &'a [ManualReviewItem]) -> Self {
        Self { items }
    }

    pub fn by_status(&self, status: ReviewStatus) -> Vec<&'a ManualReviewItem> {
        self.items.iter().filter(|i| i.status == status).collect()
    }

    pub fn by_severity(&self, severity: Severity) -> Vec<&'a ManualReviewItem> {
        self.items
            .iter()
            .filter(|i| i.severity == severity)
            .collect()
    }

    pub fn overdue(&self, now: DateTime<Utc>) -> Vec<&'a ManualReviewItem> {
        self.items.iter().filter(|i| i.is_overdue(now)).collect()
    }

    /// Items still awaiting a terminal disposition.
    pub fn open(&self) -> Vec<&'a ManualReviewItem> {
        self.items.iter().filter(|i| !i.is_terminal()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
