// vlayer-rules/src/taxonomy.rs
//! Fixed severity/confidence/category taxonomies shared by every rule and
//! finding in the workspace.
//!
//! The orderings are part of the external contract: severity
//! `info < low < medium < high < critical`, confidence `low < medium < high`.
//! Exit codes, deadlines and score penalties all key off these orderings, so
//! the variant declaration order below is load-bearing.
//!
//! License: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Regulatory/operational impact tier of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }

    /// All severities, highest first; reporting iterates in this order.
    pub const ALL_DESC: [Severity; 5] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Info,
    ];
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            "info" | "informational" => Ok(Severity::Info),
            other => Err(format!(
                "unknown severity '{other}' (expected critical|high|medium|low|info)"
            )),
        }
    }
}

/// Scanner certainty that a match is a true violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub const fn as_str(self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Confidence::High),
            "medium" => Ok(Confidence::Medium),
            "low" => Ok(Confidence::Low),
            other => Err(format!(
                "unknown confidence '{other}' (expected high|medium|low)"
            )),
        }
    }
}

/// The five scan categories. Each owns one built-in rule catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Phi,
    Encryption,
    AuditLogging,
    AccessControl,
    Retention,
}

impl RuleCategory {
    pub const ALL: [RuleCategory; 5] = [
        RuleCategory::Phi,
        RuleCategory::Encryption,
        RuleCategory::AuditLogging,
        RuleCategory::AccessControl,
        RuleCategory::Retention,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            RuleCategory::Phi => "phi",
            RuleCategory::Encryption => "encryption",
            RuleCategory::AuditLogging => "audit_logging",
            RuleCategory::AccessControl => "access_control",
            RuleCategory::Retention => "retention",
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "phi" => Ok(RuleCategory::Phi),
            "encryption" => Ok(RuleCategory::Encryption),
            "audit_logging" | "audit-logging" | "audit" => Ok(RuleCategory::AuditLogging),
            "access_control" | "access-control" | "access" => Ok(RuleCategory::AccessControl),
            "retention" => Ok(RuleCategory::Retention),
            other => Err(format!("unknown rule category '{other}'")),
        }
    }
}
