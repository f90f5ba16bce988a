// vlayer-rules/src/catalog/encryption.rs
//! Weak-encryption rules: broken digest/cipher primitives, downgraded TLS,
//! disabled certificate validation, cleartext transport, and key material
//! committed to source. The four deterministic fixers all live in this
//! category.

use crate::descriptor::{FixKind, NegativeScope, RuleDescriptor};
use crate::taxonomy::{Confidence, RuleCategory, Severity};

pub(super) fn rules() -> Vec<RuleDescriptor> {
    vec![
        RuleDescriptor::line(
            "ENC-001",
            RuleCategory::Encryption,
            Severity::High,
            Confidence::High,
            "Weak hashing algorithm (MD5) detected",
        )
        .with_description("MD5 is cryptographically broken and unsuitable for any security use.")
        .with_patterns(&[r"(?i)\bmd5\b"])
        .with_negative(
            NegativeScope::Window,
            &[r"(?i)\b(etag|cache[-_ ]?key|checksum|fingerprint|non[-_ ]?security)\b"],
        )
        .with_fix(FixKind::UpgradeHashAlgorithm)
        .with_recommendation("Replace MD5 with SHA-256 or stronger.")
        .with_reference("HIPAA §164.312(a)(2)(iv)"),
        RuleDescriptor::line(
            "ENC-002",
            RuleCategory::Encryption,
            Severity::Medium,
            Confidence::High,
            "Weak hashing algorithm (SHA-1) detected",
        )
        .with_description("SHA-1 collisions are practical; it must not protect integrity or secrets.")
        .with_patterns(&[r"(?i)\bsha-?1\b"])
        .with_negative(
            NegativeScope::Window,
            &[r"(?i)\b(git|object[-_ ]?id|etag|cache[-_ ]?key|checksum|fingerprint)\b"],
        )
        .with_fix(FixKind::UpgradeHashAlgorithm)
        .with_recommendation("Replace SHA-1 with SHA-256 or stronger.")
        .with_reference("HIPAA §164.312(a)(2)(iv)"),
        RuleDescriptor::line(
            "ENC-003",
            RuleCategory::Encryption,
            Severity::High,
            Confidence::Medium,
            "Broken cipher or cipher mode",
        )
        .with_description("DES, RC4, and ECB-mode ciphers provide no meaningful confidentiality.")
        .with_patterns(&[
            r"(?i)\b(3des|des-(?:ecb|cbc|ede|ede3)|rc4|arcfour)\b",
            r#"(?i)createcipher(?:iv)?\s*\(\s*['"](?:des|rc4)"#,
            r"(?i)\baes-\d{3}-ecb\b",
            r"(?i)\becb[-_ ]mode\b",
        ])
        .with_recommendation("Use an AEAD cipher such as AES-256-GCM or ChaCha20-Poly1305.")
        .with_reference("HIPAA §164.312(a)(2)(iv)"),
        RuleDescriptor::line(
            "ENC-004",
            RuleCategory::Encryption,
            Severity::High,
            Confidence::High,
            "Outdated TLS protocol version",
        )
        .with_description("SSLv2/SSLv3/TLS 1.0/TLS 1.1 are prohibited for PHI transmission.")
        .with_patterns(&[
            r"(?i)\bsslv[23]\b",
            r"(?i)\btlsv1[._][01]\b",
            r#"(?i)['"]tlsv1['"]"#,
            r"(?i)\btlsv1_method\b",
        ])
        .with_fix(FixKind::UpgradeTlsVersion)
        .with_recommendation("Require TLS 1.2 or newer for every connection.")
        .with_reference("HIPAA §164.312(e)(2)(ii)"),
        RuleDescriptor::line(
            "ENC-005",
            RuleCategory::Encryption,
            Severity::Critical,
            Confidence::High,
            "TLS certificate validation disabled",
        )
        .with_description(
            "Disabling certificate checks exposes PHI in transit to interception.",
        )
        .with_patterns(&[
            r"(?i)rejectunauthorized\s*:\s*false",
            r"verify\s*=\s*False",
            r"(?i)insecure_?skip_?verify\s*[:=]\s*true",
            r"check_hostname\s*=\s*False",
            r"(?i)curlopt_ssl_verifypeer\s*,\s*(?:false|0)\b",
        ])
        .with_fix(FixKind::EnforceCertValidation)
        .with_recommendation("Re-enable certificate validation; pin an internal CA if needed.")
        .with_reference("HIPAA §164.312(e)(1)"),
        RuleDescriptor::line(
            "ENC-006",
            RuleCategory::Encryption,
            Severity::Medium,
            Confidence::Medium,
            "Cleartext HTTP transport",
        )
        .with_description("An http:// URL is used where PHI may transit the network.")
        .with_patterns(&[r"\bhttp://"])
        .with_negative(
            NegativeScope::Window,
            &[
                r"(?i)http://(?:localhost|127\.0\.0\.1|0\.0\.0\.0|\[::1\])",
                r"(?i)\b(?:w3\.org|xmlns|schemas?\.|example\.(?:com|org|net)|\.local\b|\.test\b)",
            ],
        )
        .with_fix(FixKind::UseHttps)
        .with_recommendation("Serve and consume every non-loopback endpoint over HTTPS.")
        .with_reference("HIPAA §164.312(e)(2)(ii)"),
        RuleDescriptor::line(
            "ENC-007",
            RuleCategory::Encryption,
            Severity::Critical,
            Confidence::High,
            "Encryption key material in source",
        )
        .with_description("A symmetric key or private key is committed to the repository.")
        .with_patterns(&[
            r#"(?i)\b(?:encryption[-_]?key|aes[-_]?key|secret[-_]?key|private[-_]?key|signing[-_]?key)\b\s*[:=]\s*['"][A-Za-z0-9+/=_-]{8,}['"]"#,
            r"-----BEGIN (?:RSA |EC |DSA |OPENSSH )?PRIVATE KEY-----",
        ])
        .with_negative(
            NegativeScope::Window,
            &[r"(?i)\b(process\.env|os\.environ|getenv|vault|kms|keyring|placeholder|changeme|your[-_])"],
        )
        .with_recommendation("Move key material to a secret manager and rotate the exposed key.")
        .with_reference("HIPAA §164.312(a)(2)(iv)"),
        RuleDescriptor::line(
            "ENC-008",
            RuleCategory::Encryption,
            Severity::High,
            Confidence::Medium,
            "Insecure randomness for security token",
        )
        .with_description(
            "A token, session id, or secret is derived from a non-cryptographic RNG.",
        )
        .with_patterns(&[
            r"(?i)\b(?:token|session|otp|nonce|secret|password)[a-z0-9_]*\s*=[^;#]*math\.random",
            r"(?i)\b(?:token|session|otp|nonce|secret|password)[a-z0-9_]*\s*=[^;#]*\brandom\.(?:random|randint|choice|randrange)\b",
        ])
        .with_recommendation("Generate security tokens from a CSPRNG (crypto.randomBytes, secrets).")
        .with_reference("HIPAA §164.312(a)(2)(i)"),
    ]
}
