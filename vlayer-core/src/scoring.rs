//! scoring.rs - Compliance scoring over the active finding set.
//!
//! Scoring is a pure projection: the same multiset of active findings always
//! produces the same score, grade, status, and recommendations. Nothing in
//! here reads clocks, configuration, or prior state, which is what makes
//! baseline and history trend comparisons reproducible.
//!
//! License: MIT OR APACHE 2.0

use crate::finding::Finding;
use serde::{Deserialize, Serialize};
use std::fmt;
use vlayer_rules::Severity;

pub const PENALTY_CRITICAL: u32 = 20;
pub const PENALTY_HIGH: u32 = 10;
pub const PENALTY_MEDIUM: u32 = 5;
pub const PENALTY_LOW: u32 = 2;
pub const PENALTY_INFO: u32 = 0;

/// Fixed per-finding penalty for a severity tier.
pub fn penalty_for(severity: Severity) -> u32 {
    match severity {
        Severity::Critical => PENALTY_CRITICAL,
        Severity::High => PENALTY_HIGH,
        Severity::Medium => PENALTY_MEDIUM,
        Severity::Low => PENALTY_LOW,
        Severity::Info => PENALTY_INFO,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    AtRisk,
    Critical,
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComplianceStatus::Compliant => "compliant",
            ComplianceStatus::AtRisk => "at_risk",
            ComplianceStatus::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Active finding counts per severity, plus the acknowledged count carried
/// for reporting (acknowledged findings are not penalized).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityBreakdown {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
    pub acknowledged: usize,
}

impl SeverityBreakdown {
    pub fn count_for(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::Info => self.info,
        }
    }
}

/// One severity tier's contribution to the total deduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Penalty {
    pub severity: Severity,
    pub count: usize,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceScore {
    /// 0..=100; 100 minus the summed penalties, clamped.
    pub score: u8,
    pub grade: Grade,
    pub status: ComplianceStatus,
    pub breakdown: SeverityBreakdown,
    /// Non-empty tiers only, highest severity first.
    pub penalties: Vec<Penalty>,
    pub recommendations: Vec<String>,
}

fn grade_for(score: u8) -> Grade {
    match score {
        90..=100 => Grade::A,
        80..=89 => Grade::B,
        70..=79 => Grade::C,
        60..=69 => Grade::D,
        _ => Grade::F,
    }
}

fn status_for(score: u8) -> ComplianceStatus {
    if score >= 80 {
        ComplianceStatus::Compliant
    } else if score >= 50 {
        ComplianceStatus::AtRisk
    } else {
        ComplianceStatus::Critical
    }
}

fn recommendations_for(breakdown: &SeverityBreakdown) -> Vec<String> {
    let mut recs = Vec::new();
    if breakdown.critical > 0 {
        recs.push("Address critical findings immediately; they represent reportable exposure.".to_string());
    }
    if breakdown.high > 0 {
        recs.push("Schedule high-severity remediation within the current sprint.".to_string());
    }
    if breakdown.medium > 0 {
        recs.push("Fold medium-severity findings into routine maintenance work.".to_string());
    }
    if recs.is_empty() && (breakdown.low > 0 || breakdown.info > 0) {
        recs.push("Review remaining low-severity findings during the next audit cycle.".to_string());
    }
    if recs.is_empty() {
        recs.push("No active findings. Maintain current controls and re-scan on change.".to_string());
    }
    if breakdown.acknowledged > 0 {
        recs.push("Re-validate acknowledged findings before their expiry dates.".to_string());
    }
    recs
}

/// Scores the active finding set. `acknowledged` is carried into the
/// breakdown for reporting but contributes no penalty.
pub fn score_findings(active: &[&Finding], acknowledged: usize) -> ComplianceScore {
    let mut breakdown = SeverityBreakdown {
        acknowledged,
        ..SeverityBreakdown::default()
    };
    for finding in active {
        match finding.severity {
            Severity::Critical => breakdown.critical += 1,
            Severity::High => breakdown.high += 1,
            Severity::Medium => breakdown.medium += 1,
            Severity::Low => breakdown.low += 1,
            Severity::Info => breakdown.info += 1,
        }
    }

    let penalties: Vec<Penalty> = Severity::ALL_DESC
        .iter()
        .filter_map(|&severity| {
            let count = breakdown.count_for(severity);
            if count == 0 {
                return None;
            }
            Some(Penalty {
                severity,
                count,
                points: penalty_for(severity) * count as u32,
            })
        })
        .collect();

    let deducted: u32 = penalties.iter().map(|p| p.points).sum();
    let score = 100i64.saturating_sub(i64::from(deducted)).clamp(0, 100) as u8;

    ComplianceScore {
        score,
        grade: grade_for(score),
        status: status_for(score),
        recommendations: recommendations_for(&breakdown),
        breakdown,
        penalties,
    }
}
