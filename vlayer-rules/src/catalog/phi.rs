// vlayer-rules/src/catalog/phi.rs
//! PHI exposure rules: identifiers regulated under HIPAA appearing as
//! literals in source. SSN and payment-card matches additionally run the
//! structural validators before a finding is emitted.

use crate::descriptor::{NegativeScope, RuleDescriptor};
use crate::taxonomy::{Confidence, RuleCategory, Severity};

pub(super) fn rules() -> Vec<RuleDescriptor> {
    vec![
        RuleDescriptor::line(
            "PHI-001",
            RuleCategory::Phi,
            Severity::Critical,
            Confidence::High,
            "Social Security number in source",
        )
        .with_description(
            "A literal formatted as an SSN appears in code or configuration.",
        )
        .with_patterns(&[r"\b\d{3}-\d{2}-\d{4}\b"])
        .with_negative(
            NegativeScope::Window,
            &[
                r"(?i)\b(example|sample|dummy|fake|test|placeholder|redacted)\b",
                r"\b000-00-0000\b",
                r"\b123-45-6789\b",
            ],
        )
        .with_programmatic_validation()
        .with_recommendation(
            "Remove the literal and source identifiers from an encrypted store at runtime.",
        )
        .with_reference("HIPAA §164.514(b)(2)"),
        RuleDescriptor::line(
            "PHI-002",
            RuleCategory::Phi,
            Severity::High,
            Confidence::Medium,
            "Medical record number in source",
        )
        .with_description("A medical record number is assigned as a literal value.")
        .with_patterns(&[
            r#"(?i)\b(mrn|medical[-_ ]record[-_ ]number)\b\s*[:=#]\s*['"]?\d{5,10}\b"#,
        ])
        .with_negative(
            NegativeScope::Window,
            &[r"(?i)\b(example|sample|dummy|fake|test|fixture)\b"],
        )
        .with_recommendation("Reference records by opaque surrogate keys outside the codebase.")
        .with_reference("HIPAA §164.514(b)"),
        RuleDescriptor::line(
            "PHI-003",
            RuleCategory::Phi,
            Severity::Medium,
            Confidence::Medium,
            "Date of birth in source",
        )
        .with_description("A date of birth is assigned as a literal value.")
        .with_patterns(&[
            r#"(?i)\b(dob|date[-_ ]of[-_ ]birth|birth[-_ ]?date)\b\s*[:=]\s*['"]?\d{1,4}[-/]\d{1,2}[-/]\d{1,4}"#,
        ])
        .with_negative(
            NegativeScope::Window,
            &[r"(?i)\b(example|sample|dummy|fake|test|fixture|schema)\b"],
        )
        .with_recommendation("Load dates of birth from the patient store, never from source.")
        .with_reference("HIPAA §164.514(b)"),
        RuleDescriptor::line(
            "PHI-004",
            RuleCategory::Phi,
            Severity::High,
            Confidence::High,
            "Payment card number in source",
        )
        .with_description(
            "A literal shaped like a Visa/Mastercard/Amex/Discover PAN appears in code.",
        )
        .with_patterns(&[
            r"\b(?:4\d{3}|5[1-5]\d{2}|3[47]\d{2}|6011)[- ]?\d{4}[- ]?\d{4}[- ]?\d{3,4}\b",
        ])
        .with_negative(
            NegativeScope::Window,
            &[r"(?i)\b(example|sample|dummy|fake|test|fixture)\b"],
        )
        .with_programmatic_validation()
        .with_recommendation("Never embed card numbers; tokenize through the payment processor.")
        .with_reference("PCI DSS 3.4"),
        RuleDescriptor::line(
            "PHI-005",
            RuleCategory::Phi,
            Severity::Medium,
            Confidence::Low,
            "Patient email address in source",
        )
        .with_description("An email literal appears in a patient-data context.")
        .with_patterns(&[
            r"(?i)patient[a-z_]*(?:email|e-mail)[a-z_]*\s*[:=]\s*\S*@",
            r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}",
        ])
        .with_negative(
            NegativeScope::Window,
            &[
                r"(?i)@(example|test|sample|invalid|localhost)\.",
                r"(?i)\b(noreply|no-reply|support|admin|info|contact|maintainer|author)@",
                r"(?i)\b(example|sample|dummy|fake|test|fixture|todo|license|copyright)\b",
            ],
        )
        .with_recommendation("Keep contact details in the patient store, not in source.")
        .with_reference("HIPAA §164.514(b)"),
        RuleDescriptor::line(
            "PHI-006",
            RuleCategory::Phi,
            Severity::High,
            Confidence::Medium,
            "Hardcoded patient identifier",
        )
        .with_description("A patient identifier field is assigned a quoted literal.")
        .with_patterns(&[
            r#"(?i)\bpatient[-_ ]?(id|name|identifier)\b\s*[:=]\s*['"][^'"]+['"]"#,
        ])
        .with_negative(
            NegativeScope::Window,
            &[r"(?i)\b(example|sample|dummy|fake|test|fixture|mock|spec)\b"],
        )
        .with_recommendation("Pass patient identifiers as runtime parameters only.")
        .with_reference("HIPAA §164.514(b)"),
        RuleDescriptor::line(
            "PHI-007",
            RuleCategory::Phi,
            Severity::Medium,
            Confidence::Low,
            "Phone number in source",
        )
        .with_description("A literal formatted as a US phone number appears in code.")
        .with_patterns(&[
            r"\(\d{3}\)\s?\d{3}[- ]\d{4}\b",
            r"\b\d{3}[-.]\d{3}[-.]\d{4}\b",
        ])
        .with_negative(
            NegativeScope::Window,
            &[
                r"(?i)\b(example|sample|dummy|fake|test|fixture|placeholder)\b",
                r"[-.()]\s?555[-.)]",
                r"\b(?:800|888|877|866|855|900)[-.]\d{3}",
            ],
        )
        .with_recommendation("Keep phone numbers in the patient store, not in source.")
        .with_reference("HIPAA §164.514(b)(2)"),
        RuleDescriptor::line(
            "PHI-008",
            RuleCategory::Phi,
            Severity::High,
            Confidence::Medium,
            "PHI written to application logs",
        )
        .with_description(
            "A log or print call interpolates a patient identifier field.",
        )
        .with_patterns(&[
            r"(?i)\b(?:console\.(?:log|info|debug|warn|error)|log(?:ger)?\.(?:info|debug|warn|error)|print(?:ln)?!?|puts)\s*\([^)]*\b(?:ssn|social[-_ ]?security|mrn|medical[-_ ]?record|date[-_ ]of[-_ ]birth|diagnosis|patient[-_ ]?(?:name|id|email|phone|address))",
        ])
        .with_negative(
            NegativeScope::Window,
            &[
                r"(?i)\b(example|sample|dummy|fake|test|fixture|mock|spec)\b",
                r"(?i)\b(?:redact|mask|sanitiz|anonymiz|scrub)",
            ],
        )
        .with_recommendation("Log opaque identifiers only; redact PHI before it reaches a sink.")
        .with_reference("HIPAA §164.514(b)"),
    ]
}
