// vlayer-rules/src/catalog/access_control.rs
//! Access-control rules: credentials in source, unauthenticated PHI routes,
//! permissive CORS, privilege backdoors, broken token verification, and
//! world-writable artifacts.

use crate::descriptor::{NegativeScope, RuleDescriptor};
use crate::taxonomy::{Confidence, RuleCategory, Severity};

pub(super) fn rules() -> Vec<RuleDescriptor> {
    vec![
        RuleDescriptor::line(
            "ACC-001",
            RuleCategory::AccessControl,
            Severity::Critical,
            Confidence::Medium,
            "Hardcoded credentials",
        )
        .with_description("A password or API token is assigned as a quoted literal.")
        .with_patterns(&[
            r#"(?i)\b[a-z0-9_]*(?:password|passwd|pwd|api[-_]?key|apikey|access[-_]?token|auth[-_]?token)\b\s*[:=]\s*['"][^'"]{4,}['"]"#,
        ])
        .with_negative(
            NegativeScope::Window,
            &[
                r"(?i)\b(?:process\.env|os\.environ|getenv|dotenv|vault|keyring)\b",
                r"(?i)\b(?:changeme|change[-_ ]me|placeholder|example|your[-_]|xxx+|redacted|dummy|fixture)\b",
                r"<[^>]+>",
                r"\$\{[^}]+\}",
            ],
        )
        .with_recommendation("Load credentials from the environment or a secret manager.")
        .with_reference("HIPAA §164.312(a)(2)(i)"),
        RuleDescriptor::line(
            "ACC-002",
            RuleCategory::AccessControl,
            Severity::Critical,
            Confidence::Medium,
            "PHI endpoint without authentication",
        )
        .with_description(
            "A route serving patient data is registered in a file with no authentication reference.",
        )
        .with_patterns(&[
            r#"(?i)\b(?:app|router|server)\s*\.\s*(?:get|post|put|delete|patch)\s*\(\s*['"][^'"]*(?:patient|record|medical|phi|health|prescription|diagnos)"#,
        ])
        .with_negative(
            NegativeScope::File,
            &[
                r"(?i)\b(?:authenticate|requireauth|require_auth|isauthenticated|is_authenticated|ensureauth|authmiddleware|auth_middleware|passport|verifytoken|verify_token|jwt|oauth|bearer)\b",
            ],
        )
        .with_recommendation("Gate every PHI route behind authentication middleware.")
        .with_reference("HIPAA §164.312(a)(1)"),
        RuleDescriptor::line(
            "ACC-003",
            RuleCategory::AccessControl,
            Severity::High,
            Confidence::High,
            "Permissive CORS policy",
        )
        .with_description("Cross-origin access is granted to any origin.")
        .with_patterns(&[
            r#"(?i)access-control-allow-origin['"]?\s*[,:]\s*['"]\*"#,
            r#"(?i)\borigin\s*:\s*['"]\*['"]"#,
            r#"(?i)\ballow_origins\s*=\s*\[?\s*['"]\*['"]"#,
        ])
        .with_recommendation("Enumerate the trusted origins explicitly.")
        .with_reference("HIPAA §164.312(a)(1)"),
        RuleDescriptor::line(
            "ACC-004",
            RuleCategory::AccessControl,
            Severity::High,
            Confidence::Low,
            "Privilege escalation backdoor",
        )
        .with_description("An admin flag or role is assigned unconditionally in code.")
        .with_patterns(&[
            r"(?i)\bis_?admin\s*=\s*true\b",
            r#"(?i)\brole\s*=\s*['"](?:admin|superuser|root)['"]"#,
        ])
        .with_context_lines(0)
        .with_negative(NegativeScope::Window, &[r"==|!=|===", r"(?i)\b(?:test|spec|mock|fixture|seed)\b"])
        .with_recommendation("Derive roles from the identity provider, never from constants.")
        .with_reference("HIPAA §164.312(a)(1)"),
        RuleDescriptor::line(
            "ACC-005",
            RuleCategory::AccessControl,
            Severity::Critical,
            Confidence::High,
            "Token verification disabled",
        )
        .with_description("JWT signature verification is bypassed or the `none` algorithm allowed.")
        .with_patterns(&[
            r#"(?i)\balgorithms?\s*[:=]\s*\[?\s*['"]none['"]"#,
            r"(?i)\bjwt\.decode\s*\([^)]*verify\s*=\s*False",
            r#"(?i)verify_signature['"]?\s*[:=]\s*false"#,
        ])
        .with_recommendation("Verify token signatures with an allow-listed algorithm set.")
        .with_reference("HIPAA §164.312(a)(2)(i)"),
        RuleDescriptor::line(
            "ACC-006",
            RuleCategory::AccessControl,
            Severity::Medium,
            Confidence::Medium,
            "World-writable file permissions",
        )
        .with_description("Files are created or re-moded with mode 777.")
        .with_patterns(&[
            r"(?i)\bchmod\s+(?:-[a-z]+\s+)?0?777\b",
            r#"(?i)\bchmod\s*\(\s*['"]?0o?777"#,
            r"\b0o777\b",
        ])
        .with_negative(NegativeScope::Window, &[r"(?i)\b(?:test|spec|fixture|tmpdir)\b"])
        .with_recommendation("Restrict modes to the owning service account.")
        .with_reference("HIPAA §164.312(a)(1)"),
        RuleDescriptor::file(
            "ACC-007",
            RuleCategory::AccessControl,
            Severity::High,
            Confidence::High,
            "Environment file committed to repository",
        )
        .with_description("A .env file carrying runtime secrets is tracked in the source tree.")
        .path_subject()
        .with_patterns(&[r"(?:^|[/\\])\.env(?:\.[A-Za-z0-9._-]+)?$"])
        .with_negative(
            NegativeScope::Path,
            &[r"(?i)\.(?:example|sample|template|dist|test)$"],
        )
        .with_recommendation("Remove the file from version control and rotate its contents.")
        .with_reference("HIPAA §164.312(a)(2)(i)"),
    ]
}
