// vlayer-rules/src/catalog/retention.rs
//! Data-retention rules. HIPAA requires clinical records be retained six
//! years; these rules flag unguarded destruction, retention-free log
//! configuration, PHI parked in browser storage, and database dumps left in
//! the tree.

use crate::descriptor::{NegativeScope, RuleDescriptor};
use crate::taxonomy::{Confidence, RuleCategory, Severity};

pub(super) fn rules() -> Vec<RuleDescriptor> {
    vec![
        RuleDescriptor::line(
            "RET-001",
            RuleCategory::Retention,
            Severity::High,
            Confidence::Medium,
            "Unguarded destructive database operation",
        )
        .with_description(
            "A destructive SQL statement runs without a retention or archival guard nearby.",
        )
        .with_patterns(&[
            r"(?i)\b(?:drop\s+table|truncate\s+table)\b",
            r"(?i)\bdelete\s+from\s+[a-z_\.]*(?:patient|clinical|medical|record|audit|history)",
        ])
        .with_context_lines(5)
        .with_negative(
            NegativeScope::Window,
            &[
                r"(?i)\b(?:where\b|archive|backup|soft[-_ ]?delete|retention|migration|if\s+exists.*_tmp|temp(?:orary)?\b)",
                r"(?i)\b(?:test|spec|fixture|teardown)\b",
            ],
        )
        .with_recommendation("Archive records before destruction and guard deletes with policy checks.")
        .with_reference("HIPAA §164.316(b)(2)(i)"),
        RuleDescriptor::line(
            "RET-002",
            RuleCategory::Retention,
            Severity::Medium,
            Confidence::High,
            "Log retention disabled",
        )
        .with_description("Log rotation keeps zero or unlimited files, defeating retention policy.")
        .with_patterns(&[
            r#"(?i)\bmaxfiles\s*[:=]\s*(?:null|0\b|['"](?:0|none|unlimited|infinity)['"])"#,
            r"(?i)^\s*rotate\s+0\b",
            r#"(?i)\bbackupcount\s*=\s*0\b"#,
        ])
        .with_recommendation("Retain audit logs for the mandated six-year window.")
        .with_reference("HIPAA §164.316(b)(2)(i)"),
        RuleDescriptor::line(
            "RET-003",
            RuleCategory::Retention,
            Severity::High,
            Confidence::High,
            "PHI stored in browser storage",
        )
        .with_description(
            "Patient data is written to localStorage/sessionStorage, outside retention control.",
        )
        .with_patterns(&[
            r#"(?i)\b(?:local|session)storage\s*\.\s*setitem\s*\(\s*['"][^'"]*(?:patient|phi|medical|ssn|diagnos|health|record)"#,
        ])
        .with_recommendation("Keep PHI server-side; browsers cannot honor retention or disposal rules.")
        .with_reference("HIPAA §164.310(d)(2)(i)"),
        RuleDescriptor::file(
            "RET-004",
            RuleCategory::Retention,
            Severity::Medium,
            Confidence::Medium,
            "Database dump committed to repository",
        )
        .with_description("A dump or backup artifact is tracked in the source tree.")
        .path_subject()
        .with_patterns(&[r"(?i)\.(?:dump|bak|backup)$", r"(?i)(?:^|[/\\])(?:dump|backup)s?[^/\\]*\.sql$"])
        .with_negative(NegativeScope::Path, &[r"(?i)(?:migration|schema|seed|fixture)"])
        .with_recommendation("Store dumps in governed storage with retention and disposal controls.")
        .with_reference("HIPAA §164.310(d)(2)(i)"),
    ]
}
