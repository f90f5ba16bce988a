// vlayer-rules/src/descriptor.rs
//! Rule descriptors: the immutable value objects the category scanners run.
//!
//! A descriptor is pure data. Everything a scanner needs to evaluate the rule
//! is an explicit field here; the detection granularity and negative-match
//! scope are never inferred from the rule id.
//! Descriptors arriving from outside the crate (marketplace/custom rules are
//! parsed elsewhere and handed over as values) go through [`partition_valid`],
//! which excludes malformed entries without aborting the scan.
//!
//! License: MIT OR Apache-2.0

use crate::taxonomy::{Confidence, RuleCategory, Severity};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Maximum allowed length for a single pattern string.
pub const MAX_PATTERN_LENGTH: usize = 500;

/// Hard cap on a rule's context-window radius.
pub const MAX_CONTEXT_LINES: usize = 20;

/// Detection granularity of a rule.
///
/// Dispatched as a tagged variant by the scanner driver; a rule is exactly
/// one of these, never a line rule that "acts like" a file rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// Evaluated against every non-blank, non-comment line of every file.
    #[default]
    Line,
    /// Evaluated once per file; emits at most one finding per file.
    File,
    /// Evaluated once per corpus; emits at most one synthetic finding.
    Repository,
}

/// Where a rule's negative ("safe usage") patterns are tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NegativeScope {
    /// The comment-stripped context window around the matched line.
    #[default]
    Window,
    /// The entire file content.
    File,
    /// The file path.
    Path,
}

/// What a file/repository rule's primary patterns are matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchSubject {
    #[default]
    Content,
    Path,
}

/// Whether a file/repository rule fires on a pattern match or on its absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    #[default]
    OnMatch,
    /// Fires when no examined file matches any primary pattern. Inapplicable
    /// (emits nothing) when `path_pattern` selects no files at all.
    OnMissing,
}

/// Tag for the deterministic text transformation the fixer applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixKind {
    UpgradeHashAlgorithm,
    UpgradeTlsVersion,
    EnforceCertValidation,
    UseHttps,
}

impl FixKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            FixKind::UpgradeHashAlgorithm => "upgrade_hash_algorithm",
            FixKind::UpgradeTlsVersion => "upgrade_tls_version",
            FixKind::EnforceCertValidation => "enforce_cert_validation",
            FixKind::UseHttps => "use_https",
        }
    }
}

impl fmt::Display for FixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single compliance rule as pure data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleDescriptor {
    /// Unique identifier, e.g. "ENC-001".
    pub id: String,
    pub category: RuleCategory,
    pub severity: Severity,
    /// Base certainty attached to every finding this rule emits.
    pub confidence: Confidence,
    pub title: String,
    pub description: String,
    /// Primary patterns; any match triggers the rule.
    pub patterns: Vec<String>,
    /// Safe-usage patterns; any match within `negative_scope` suppresses.
    pub negative_patterns: Vec<String>,
    pub negative_scope: NegativeScope,
    pub granularity: Granularity,
    /// Context-window radius for line rules. `None` means the scan config
    /// default (±2). Values above [`MAX_CONTEXT_LINES`] fail validation.
    pub context_lines: Option<usize>,
    /// Subject of file/repository rules; line rules always match content.
    pub subject: MatchSubject,
    pub trigger: Trigger,
    /// Restricts which files a file/repository rule examines.
    pub path_pattern: Option<String>,
    /// If true, matches also pass through the rule-specific programmatic
    /// validator (SSN structure, Luhn) before a finding is emitted.
    pub programmatic_validation: bool,
    pub recommendation: String,
    /// Regulatory citation, e.g. "HIPAA §164.312(a)(2)(iv)".
    pub reference: String,
    pub fix: Option<FixKind>,
}

impl Default for RuleDescriptor {
    fn default() -> Self {
        Self {
            id: String::new(),
            category: RuleCategory::Phi,
            severity: Severity::Medium,
            confidence: Confidence::Medium,
            title: String::new(),
            description: String::new(),
            patterns: Vec::new(),
            negative_patterns: Vec::new(),
            negative_scope: NegativeScope::Window,
            granularity: Granularity::Line,
            context_lines: None,
            subject: MatchSubject::Content,
            trigger: Trigger::OnMatch,
            path_pattern: None,
            programmatic_validation: false,
            recommendation: String::new(),
            reference: String::new(),
            fix: None,
        }
    }
}

impl RuleDescriptor {
    /// Starts a line-granularity rule; the catalog builds everything through
    /// these constructors so each rule reads as a single expression.
    pub fn line(
        id: &str,
        category: RuleCategory,
        severity: Severity,
        confidence: Confidence,
        title: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            category,
            severity,
            confidence,
            title: title.to_string(),
            ..Self::default()
        }
    }

    pub fn file(
        id: &str,
        category: RuleCategory,
        severity: Severity,
        confidence: Confidence,
        title: &str,
    ) -> Self {
        Self {
            granularity: Granularity::File,
            ..Self::line(id, category, severity, confidence, title)
        }
    }

    pub fn repository(
        id: &str,
        category: RuleCategory,
        severity: Severity,
        confidence: Confidence,
        title: &str,
    ) -> Self {
        Self {
            granularity: Granularity::Repository,
            ..Self::line(id, category, severity, confidence, title)
        }
    }

    pub fn with_patterns(mut self, patterns: &[&str]) -> Self {
        self.patterns = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_negative(mut self, scope: NegativeScope, patterns: &[&str]) -> Self {
        self.negative_scope = scope;
        self.negative_patterns = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_context_lines(mut self, radius: usize) -> Self {
        self.context_lines = Some(radius);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_recommendation(mut self, recommendation: &str) -> Self {
        self.recommendation = recommendation.to_string();
        self
    }

    pub fn with_reference(mut self, reference: &str) -> Self {
        self.reference = reference.to_string();
        self
    }

    pub fn with_fix(mut self, fix: FixKind) -> Self {
        self.fix = Some(fix);
        self
    }

    pub fn with_path_pattern(mut self, pattern: &str) -> Self {
        self.path_pattern = Some(pattern.to_string());
        self
    }

    pub fn path_subject(mut self) -> Self {
        self.subject = MatchSubject::Path;
        self
    }

    pub fn on_missing(mut self) -> Self {
        self.trigger = Trigger::OnMissing;
        self
    }

    pub fn with_programmatic_validation(mut self) -> Self {
        self.programmatic_validation = true;
        self
    }
}

/// A validation problem with one externally-supplied descriptor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("rule '{rule_id}': {message}")]
pub struct RuleIssue {
    pub rule_id: String,
    pub message: String,
}

impl RuleIssue {
    fn new(rule_id: &str, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            message: message.into(),
        }
    }
}

/// Checks one descriptor; returns every problem found, not just the first.
pub fn validate_rule(rule: &RuleDescriptor) -> Vec<RuleIssue> {
    let mut issues = Vec::new();

    if rule.id.trim().is_empty() {
        issues.push(RuleIssue::new("<unnamed>", "empty `id` field"));
    }
    if rule.title.trim().is_empty() {
        issues.push(RuleIssue::new(&rule.id, "empty `title` field"));
    }
    if rule.patterns.is_empty() {
        issues.push(RuleIssue::new(&rule.id, "no primary patterns"));
    }

    for pattern in rule.patterns.iter().chain(rule.negative_patterns.iter()) {
        if pattern.len() > MAX_PATTERN_LENGTH {
            issues.push(RuleIssue::new(
                &rule.id,
                format!(
                    "pattern length ({}) exceeds maximum allowed ({})",
                    pattern.len(),
                    MAX_PATTERN_LENGTH
                ),
            ));
            continue;
        }
        if let Err(e) = Regex::new(pattern) {
            issues.push(RuleIssue::new(&rule.id, format!("invalid pattern: {e}")));
        }
    }

    if let Some(path_pattern) = &rule.path_pattern {
        if let Err(e) = Regex::new(path_pattern) {
            issues.push(RuleIssue::new(&rule.id, format!("invalid path pattern: {e}")));
        }
    }

    if let Some(radius) = rule.context_lines {
        if radius > MAX_CONTEXT_LINES {
            issues.push(RuleIssue::new(
                &rule.id,
                format!("context window ({radius}) exceeds maximum allowed ({MAX_CONTEXT_LINES})"),
            ));
        }
    }

    if rule.trigger == Trigger::OnMissing && rule.granularity != Granularity::Repository {
        issues.push(RuleIssue::new(
            &rule.id,
            "on_missing trigger requires repository granularity",
        ));
    }

    issues
}

/// Splits descriptors into the usable set and the issues that disqualified
/// the rest. Duplicate ids (against earlier rules in the same batch) are
/// rejected like any other validation failure.
pub fn partition_valid(rules: Vec<RuleDescriptor>) -> (Vec<RuleDescriptor>, Vec<RuleIssue>) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut valid = Vec::with_capacity(rules.len());
    let mut issues = Vec::new();

    for rule in rules {
        let mut rule_issues = validate_rule(&rule);
        if !rule.id.trim().is_empty() && !seen.insert(rule.id.clone()) {
            rule_issues.push(RuleIssue::new(&rule.id, "duplicate rule id"));
        }
        if rule_issues.is_empty() {
            valid.push(rule);
        } else {
            for issue in &rule_issues {
                log::warn!("excluding rule: {issue}");
            }
            issues.extend(rule_issues);
        }
    }

    (valid, issues)
}
