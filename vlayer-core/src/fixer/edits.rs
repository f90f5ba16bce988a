//! fixer/edits.rs - The deterministic text transformations behind each fix tag.
//!
//! Every fix kind is an ordered replacement table applied to a single line.
//! The tables are built so that the transformed line no longer matches the
//! rule's trigger pattern, which is what makes a second fixer run over an
//! already-remediated tree a no-op. More specific entries come before the
//! general ones they overlap with.
//!
//! License: MIT OR APACHE 2.0

use once_cell::sync::Lazy;
use regex::Regex;
use vlayer_rules::FixKind;

struct Replacement {
    pattern: Regex,
    replacement: &'static str,
}

fn table(entries: &[(&str, &'static str)]) -> Vec<Replacement> {
    entries
        .iter()
        .map(|(pattern, replacement)| Replacement {
            pattern: Regex::new(pattern).expect("fix table patterns are valid"),
            replacement,
        })
        .collect()
}

static HASH_UPGRADES: Lazy<Vec<Replacement>> = Lazy::new(|| {
    table(&[
        (r"(?i)\bmd5\b", "sha256"),
        (r"(?i)\bsha-?1\b", "sha256"),
    ])
});

static TLS_UPGRADES: Lazy<Vec<Replacement>> = Lazy::new(|| {
    table(&[
        (r"(?i)\bsslv[23]_method\b", "TLSv1_2_method"),
        (r"(?i)\btlsv1_method\b", "TLSv1_2_method"),
        (r"(?i)\btlsv1\.[01]\b", "TLSv1.2"),
        (r"(?i)\btlsv1_[01]\b", "TLSv1_2"),
        (r"(?i)\bsslv[23]\b", "TLSv1.2"),
        (r"'(?i:tlsv1)'", "'TLSv1.2'"),
        (r#""(?i:tlsv1)""#, "\"TLSv1.2\""),
    ])
});

static CERT_VALIDATION: Lazy<Vec<Replacement>> = Lazy::new(|| {
    table(&[
        (r"(?i)(rejectunauthorized\s*:\s*)false", "${1}true"),
        (r"(verify\s*=\s*)False", "${1}True"),
        (r"(?i)(insecure_?skip_?verify\s*[:=]\s*)true", "${1}false"),
        (r"(check_hostname\s*=\s*)False", "${1}True"),
        (r"(?i)(curlopt_ssl_verifypeer\s*,\s*)(?:false|0)\b", "${1}true"),
    ])
});

static HTTPS_UPGRADE: Lazy<Vec<Replacement>> =
    Lazy::new(|| table(&[(r"\bhttp://", "https://")]));

fn table_for(kind: FixKind) -> &'static [Replacement] {
    match kind {
        FixKind::UpgradeHashAlgorithm => &HASH_UPGRADES,
        FixKind::UpgradeTlsVersion => &TLS_UPGRADES,
        FixKind::EnforceCertValidation => &CERT_VALIDATION,
        FixKind::UseHttps => &HTTPS_UPGRADE,
    }
}

/// Applies the fix's replacement table to one line. Returns the rewritten
/// line, or `None` when no table entry changed anything (the fix does not
/// know how to handle this shape of line).
pub fn apply_fix(kind: FixKind, line: &str) -> Option<String> {
    let mut rewritten = line.to_string();
    for entry in table_for(kind) {
        if entry.pattern.is_match(&rewritten) {
            rewritten = entry
                .pattern
                .replace_all(&rewritten, entry.replacement)
                .into_owned();
        }
    }
    if rewritten == line {
        None
    } else {
        Some(rewritten)
    }
}
