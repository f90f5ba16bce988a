// vlayer-rules/src/catalog/audit_logging.rs
//! Audit-logging rules. HIPAA §164.312(b) requires recording access to
//! systems containing PHI; these rules flag codebases and code paths where
//! that record is absent or actively disabled. AUD-001 is the one
//! repository-granularity rule in the built-in catalog.

use crate::descriptor::{NegativeScope, RuleDescriptor};
use crate::taxonomy::{Confidence, RuleCategory, Severity};

pub(super) fn rules() -> Vec<RuleDescriptor> {
    vec![
        RuleDescriptor::repository(
            "AUD-001",
            RuleCategory::AuditLogging,
            Severity::Medium,
            Confidence::Low,
            "No audit logging dependency declared",
        )
        .with_description(
            "None of the project manifests declare a recognized logging or audit library.",
        )
        .on_missing()
        .with_path_pattern(
            r"(?i)(?:^|[/\\])(?:package\.json|cargo\.toml|requirements(?:-dev)?\.txt|pyproject\.toml|pom\.xml|build\.gradle|go\.mod|gemfile|composer\.json)$",
        )
        .with_patterns(&[
            r#"(?i)"(?:winston|morgan|bunyan|pino|log4js)""#,
            r"(?i)\b(?:log4j|logback|slf4j|zap|logrus|structlog|audit[-_]?log(?:ger)?)\b",
            r#"(?im)^\s*(?:log|tracing|slog|env_logger)\s*=\s*"#,
        ])
        .with_recommendation("Add a structured logging library and audit PHI access events.")
        .with_reference("HIPAA §164.312(b)"),
        RuleDescriptor::line(
            "AUD-002",
            RuleCategory::AuditLogging,
            Severity::High,
            Confidence::Medium,
            "Authentication endpoint without audit logging",
        )
        .with_description(
            "An authentication route is registered in a file that never references a logger.",
        )
        .with_patterns(&[
            r#"(?i)\b(?:app|router|server)\s*\.\s*(?:post|get|put|all)\s*\(\s*['"][^'"]*(?:login|logout|signin|sign-in|authenticate)"#,
            r#"(?i)@(?:post|get|route)(?:mapping)?\s*\(\s*['"(][^'")]*(?:login|logout|authenticate)"#,
        ])
        .with_negative(
            NegativeScope::File,
            &[r"(?i)\b(?:audit|logger|logging|winston|pino|morgan|log4js|syslog)\b"],
        )
        .with_recommendation("Record every authentication success and failure with actor and time.")
        .with_reference("HIPAA §164.312(b)"),
        RuleDescriptor::line(
            "AUD-003",
            RuleCategory::AuditLogging,
            Severity::Medium,
            Confidence::Medium,
            "Silently swallowed exception",
        )
        .with_description("An exception handler discards the error without recording it.")
        .with_patterns(&[
            r"catch\s*(?:\([^)]*\))?\s*\{\s*\}",
            r"except(?:\s+\w+(?:\s+as\s+\w+)?)?\s*:\s*pass\b",
            r"\.catch\s*\(\s*\(\s*\)\s*=>\s*\{\s*\}\s*\)",
        ])
        .with_recommendation("Log the failure with enough context to reconstruct the event.")
        .with_reference("HIPAA §164.312(b)"),
        RuleDescriptor::line(
            "AUD-004",
            RuleCategory::AuditLogging,
            Severity::High,
            Confidence::Medium,
            "Clinical data write without audit trail",
        )
        .with_description(
            "A write to a clinical table occurs in a file with no audit reference.",
        )
        .with_patterns(&[
            r"(?i)\b(?:insert\s+into|update|delete\s+from)\s+[a-z_\.]*(?:patient|clinical|medical|prescription|diagnos|treatment|health)",
        ])
        .with_negative(
            NegativeScope::File,
            &[r"(?i)\baudit(?:[-_ ]?(?:log|trail|event))?\b"],
        )
        .with_recommendation("Write an audit event alongside every clinical data mutation.")
        .with_reference("HIPAA §164.312(b)"),
        RuleDescriptor::line(
            "AUD-005",
            RuleCategory::AuditLogging,
            Severity::Medium,
            Confidence::High,
            "Logging disabled in code",
        )
        .with_description("Log output is turned off programmatically or by configuration.")
        .with_patterns(&[
            r"(?i)\b(?:logger|logging|log)\s*\.\s*(?:disable|off|silent)\s*\(",
            r"(?i)\bsilent\s*[:=]\s*true\b",
            r"(?i)\blogging\s*[:=]\s*(?:false|none|off)\b",
            r"(?i)\blogging\.disable\b",
        ])
        .with_negative(
            NegativeScope::Window,
            &[r"(?i)\b(?:test|spec|bench|fixture)\b"],
        )
        .with_recommendation("Keep audit logging enabled in every deployed configuration.")
        .with_reference("HIPAA §164.312(b)"),
    ]
}
