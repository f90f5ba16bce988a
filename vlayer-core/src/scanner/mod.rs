//! scanner/mod.rs - The category scan engine.
//!
//! Scanning is file-parallel and rule-sequential: each file is examined
//! independently on the rayon pool with every applicable rule run in catalog
//! order, and the per-file results are merged into one collector. The final
//! (file, line, ruleId) sort makes the output independent of scheduling, so
//! two scans of an unchanged corpus produce identical finding lists.
//!
//! License: MIT OR APACHE 2.0

pub mod context;

use crate::aggregate::{aggregate, AckRegistry, AggregateContext};
use crate::baseline::Baseline;
use crate::config::ScanConfig;
use crate::corpus::{collect_corpus, SourceFile};
use crate::errors::Result;
use crate::finding::{redact_for_log, Finding, ScanResult, REPOSITORY_SENTINEL};
use crate::validators::passes_programmatic_validation;
use crate::watch::CancellationToken;
use chrono::Utc;
use context::{context_window, is_blank, is_comment_line};
use rayon::prelude::*;
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;
use vlayer_rules::{
    compile_rules, partition_valid, rules_for_categories, CompiledRule, Granularity, MatchSubject,
    NegativeScope, RuleDescriptor, Trigger,
};

/// Compiled rule set plus configuration; the entry point for every scan.
pub struct ScanEngine {
    rules: Vec<CompiledRule>,
    config: ScanConfig,
}

impl ScanEngine {
    /// Engine over the built-in catalog, narrowed by the configured
    /// categories.
    pub fn new(config: ScanConfig) -> Result<Self> {
        let descriptors = rules_for_categories(&config.categories);
        Ok(Self {
            rules: compile_rules(&descriptors)?,
            config,
        })
    }

    /// Engine over the built-in catalog plus externally-supplied rules.
    /// Malformed external rules are excluded with a warning; they never
    /// abort the scan.
    pub fn with_extra_rules(config: ScanConfig, extra: Vec<RuleDescriptor>) -> Result<Self> {
        let mut descriptors = rules_for_categories(&config.categories);
        let (valid, _issues) = partition_valid(extra);
        descriptors.extend(valid.into_iter().filter(|rule| {
            config.categories.is_empty() || config.categories.contains(&rule.category)
        }));
        Ok(Self {
            rules: compile_rules(&descriptors)?,
            config,
        })
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Raw findings for a corpus, sorted by (file, line, ruleId).
    pub fn scan(&self, corpus: &[SourceFile]) -> Vec<Finding> {
        self.scan_cancellable(corpus, &CancellationToken::new())
    }

    /// Like [`scan`](Self::scan), but stops picking up new files once the
    /// token is cancelled. Files already in flight finish; cancellation is
    /// only ever observed at file boundaries.
    pub fn scan_cancellable(
        &self,
        corpus: &[SourceFile],
        token: &CancellationToken,
    ) -> Vec<Finding> {
        let collector: Mutex<Vec<Finding>> = Mutex::new(Vec::new());
        corpus.par_iter().for_each(|file| {
            if token.is_cancelled() {
                return;
            }
            let mut found = self.scan_file(file);
            if !found.is_empty() {
                collector
                    .lock()
                    .expect("findings collector lock poisoned")
                    .append(&mut found);
            }
        });
        let mut findings = collector
            .into_inner()
            .expect("findings collector lock poisoned");

        if !token.is_cancelled() {
            findings.extend(self.scan_repository(corpus));
        }

        findings.sort_by(|a, b| {
            a.file
                .cmp(&b.file)
                .then(a.line.cmp(&b.line))
                .then(a.rule_id.cmp(&b.rule_id))
        });
        findings
    }

    /// Full pipeline over an in-memory corpus: scan, then aggregate against
    /// the given baseline and acknowledgment registry.
    pub fn scan_corpus(
        &self,
        corpus: &[SourceFile],
        baseline: Option<&Baseline>,
        acks: &AckRegistry,
    ) -> ScanResult {
        let started = Instant::now();
        let raw = self.scan(corpus);
        aggregate(
            raw,
            &AggregateContext {
                scanned_files: corpus.len(),
                scan_duration_ms: started.elapsed().as_millis() as u64,
                baseline,
                acks,
                min_confidence: self.config.min_confidence,
                now: Utc::now(),
            },
        )
    }

    /// Full pipeline over a directory tree, loading the baseline and
    /// acknowledgment registry from the project's `.vlayer` store.
    pub fn scan_tree(&self, root: &Path) -> Result<ScanResult> {
        let started = Instant::now();
        let corpus = collect_corpus(root)?;
        let baseline = crate::baseline::load_baseline(root)?;
        let acks = AckRegistry::load(root)?;
        let raw = self.scan(&corpus);
        log::info!(
            "scanned {} files, {} raw findings",
            corpus.len(),
            raw.len()
        );
        Ok(aggregate(
            raw,
            &AggregateContext {
                scanned_files: corpus.len(),
                scan_duration_ms: started.elapsed().as_millis() as u64,
                baseline: baseline.as_ref(),
                acks: &acks,
                min_confidence: self.config.min_confidence,
                now: Utc::now(),
            },
        ))
    }

    fn scan_file(&self, file: &SourceFile) -> Vec<Finding> {
        let lines: Vec<&str> = file.content.lines().collect();
        let mut findings = Vec::new();
        for rule in &self.rules {
            match rule.descriptor.granularity {
                Granularity::Line => self.scan_lines(rule, file, &lines, &mut findings),
                Granularity::File => self.scan_whole_file(rule, file, &lines, &mut findings),
                Granularity::Repository => {}
            }
        }
        findings
    }

    fn scan_lines(
        &self,
        rule: &CompiledRule,
        file: &SourceFile,
        lines: &[&str],
        findings: &mut Vec<Finding>,
    ) {
        if !rule.applies_to_path(&file.path) {
            return;
        }
        for (idx, line) in lines.iter().enumerate() {
            if is_blank(line) || is_comment_line(line) {
                continue;
            }
            if !rule.matches_primary(line) {
                continue;
            }
            let radius = rule
                .descriptor
                .context_lines
                .unwrap_or(self.config.context_lines);
            let window = context_window(lines, idx, radius);
            if self.negative_suppresses(rule, file, &window) {
                log::debug!(
                    "{}: negative pattern suppressed match at {}:{}",
                    rule.id(),
                    file.path,
                    idx + 1
                );
                continue;
            }
            if rule.descriptor.programmatic_validation
                && !passes_programmatic_validation(rule.id(), line)
            {
                log::debug!(
                    "{}: programmatic validation rejected match at {}:{}",
                    rule.id(),
                    file.path,
                    idx + 1
                );
                continue;
            }
            log::debug!(
                "{}: match at {}:{}: {}",
                rule.id(),
                file.path,
                idx + 1,
                redact_for_log(line)
            );
            findings.push(Finding::from_rule(
                &rule.descriptor,
                &file.path,
                Some(idx + 1),
                line,
                window,
            ));
        }
    }

    fn negative_suppresses(
        &self,
        rule: &CompiledRule,
        file: &SourceFile,
        window: &[String],
    ) -> bool {
        match rule.descriptor.negative_scope {
            NegativeScope::Window => rule.matches_negative(&window.join("\n")),
            NegativeScope::File => rule.matches_negative(&file.content),
            NegativeScope::Path => rule.matches_negative(&file.path),
        }
    }

    fn scan_whole_file(
        &self,
        rule: &CompiledRule,
        file: &SourceFile,
        lines: &[&str],
        findings: &mut Vec<Finding>,
    ) {
        if !rule.applies_to_path(&file.path) {
            return;
        }
        let (matched, line, snippet) = match rule.descriptor.subject {
            MatchSubject::Path => (rule.matches_primary(&file.path), None, file.path.clone()),
            MatchSubject::Content => {
                let line = lines
                    .iter()
                    .position(|candidate| rule.matches_primary(candidate));
                (
                    rule.matches_primary(&file.content),
                    line.map(|idx| idx + 1),
                    line.map(|idx| lines[idx].to_string())
                        .unwrap_or_else(|| file.path.clone()),
                )
            }
        };
        if !matched {
            return;
        }
        if self.negative_suppresses(rule, file, &[]) {
            log::debug!(
                "{}: negative pattern suppressed file-level match on {}",
                rule.id(),
                file.path
            );
            return;
        }
        findings.push(Finding::from_rule(
            &rule.descriptor,
            &file.path,
            line,
            &snippet,
            Vec::new(),
        ));
    }

    fn scan_repository(&self, corpus: &[SourceFile]) -> Vec<Finding> {
        let mut findings = Vec::new();
        for rule in &self.rules {
            if rule.descriptor.granularity != Granularity::Repository {
                continue;
            }
            let examined: Vec<&SourceFile> = corpus
                .iter()
                .filter(|file| rule.applies_to_path(&file.path))
                .collect();
            match rule.descriptor.trigger {
                Trigger::OnMissing => {
                    if examined.is_empty() {
                        // Nothing to judge; an absence rule over zero files
                        // is inapplicable, not violated.
                        log::debug!("{}: no files match its path pattern, skipping", rule.id());
                        continue;
                    }
                    let satisfied = examined
                        .iter()
                        .any(|file| rule.matches_primary(&file.content));
                    if !satisfied {
                        findings.push(Finding::from_rule(
                            &rule.descriptor,
                            REPOSITORY_SENTINEL,
                            None,
                            "",
                            Vec::new(),
                        ));
                    }
                }
                Trigger::OnMatch => {
                    let hit = examined.iter().any(|file| match rule.descriptor.subject {
                        MatchSubject::Content => rule.matches_primary(&file.content),
                        MatchSubject::Path => rule.matches_primary(&file.path),
                    });
                    if hit {
                        findings.push(Finding::from_rule(
                            &rule.descriptor,
                            REPOSITORY_SENTINEL,
                            None,
                            "",
                            Vec::new(),
                        ));
                    }
                }
            }
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vlayer_rules::{Confidence, RuleCategory, Severity};

    fn engine() -> ScanEngine {
        ScanEngine::new(ScanConfig::default()).unwrap()
    }

    fn file(path: &str, content: &str) -> SourceFile {
        SourceFile::new(path, content)
    }

    #[test]
    fn md5_line_produces_exactly_one_finding() {
        let corpus = vec![file("src/crypto.js", "const hash = md5(password);\n")];
        let findings = engine().scan(&corpus);
        assert_eq!(findings.len(), 1);
        let f = &findings[0];
        assert_eq!(f.rule_id, "ENC-001");
        assert_eq!(f.category, RuleCategory::Encryption);
        assert_eq!(f.severity, Severity::High);
        assert!(f.title.contains("MD5"));
        assert_eq!(f.line, Some(1));
    }

    #[test]
    fn comment_lines_never_match() {
        let corpus = vec![file(
            "src/notes.js",
            "// md5 is banned in this codebase\nconst ok = sha256(x);\n",
        )];
        assert!(engine().scan(&corpus).is_empty());
    }

    #[test]
    fn negative_window_suppresses_cache_md5() {
        let corpus = vec![file(
            "src/cache.js",
            "const cacheKey = md5(url); // non-security\nstore.put(cacheKey, body);\n",
        )];
        let findings = engine().scan(&corpus);
        assert!(findings.iter().all(|f| f.rule_id != "ENC-001"));
    }

    #[test]
    fn file_scope_negative_consults_whole_file() {
        let with_logging = file(
            "src/routes/auth.js",
            "const logger = require('winston');\napp.post('/login', handler);\n",
        );
        let without_logging = file(
            "src/routes/bare.js",
            "app.post('/login', handler);\n",
        );
        let findings = engine().scan(&[with_logging, without_logging]);
        let aud: Vec<&Finding> = findings.iter().filter(|f| f.rule_id == "AUD-002").collect();
        assert_eq!(aud.len(), 1);
        assert_eq!(aud[0].file, "src/routes/bare.js");
    }

    #[test]
    fn programmatic_validation_rejects_implausible_ssn() {
        let corpus = vec![file("src/a.py", "ssn = '000-12-3456'\n")];
        let findings = engine().scan(&corpus);
        assert!(findings.iter().all(|f| f.rule_id != "PHI-001"));
    }

    #[test]
    fn repository_rule_inapplicable_without_manifest() {
        let corpus = vec![file("src/crypto.js", "const a = 1;\n")];
        let findings = engine().scan(&corpus);
        assert!(findings.iter().all(|f| f.rule_id != "AUD-001"));
    }

    #[test]
    fn repository_rule_fires_when_manifest_lacks_logging() {
        let corpus = vec![file(
            "package.json",
            "{\n  \"dependencies\": {\n    \"express\": \"^4.18.0\"\n  }\n}\n",
        )];
        let findings = engine().scan(&corpus);
        let aud: Vec<&Finding> = findings.iter().filter(|f| f.rule_id == "AUD-001").collect();
        assert_eq!(aud.len(), 1);
        assert_eq!(aud[0].file, REPOSITORY_SENTINEL);
        assert_eq!(aud[0].line, None);
    }

    #[test]
    fn repository_rule_quiet_when_dependency_present() {
        let corpus = vec![file(
            "package.json",
            "{\n  \"dependencies\": {\n    \"winston\": \"^3.8.0\"\n  }\n}\n",
        )];
        let findings = engine().scan(&corpus);
        assert!(findings.iter().all(|f| f.rule_id != "AUD-001"));
    }

    #[test]
    fn path_subject_file_rule_flags_env_file() {
        let corpus = vec![
            file(".env", "DB_PASSWORD=super-secret-pass\n"),
            file(".env.example", "DB_PASSWORD=\n"),
        ];
        let findings = engine().scan(&corpus);
        let env: Vec<&Finding> = findings.iter().filter(|f| f.rule_id == "ACC-007").collect();
        assert_eq!(env.len(), 1);
        assert_eq!(env[0].file, ".env");
        assert_eq!(env[0].line, None);
    }

    #[test]
    fn scan_is_deterministic_across_runs() {
        let corpus = vec![
            file("a.js", "const hash = md5(a);\nfetch('http://api.example-clinic.io');\n"),
            file("b.py", "verify = False\npassword = \"hunter2222\"\n"),
            file("c.js", "const t = createHash('sha1');\n"),
        ];
        let eng = engine();
        let first = eng.scan(&corpus);
        let second = eng.scan(&corpus);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn category_filter_restricts_rules() {
        let config = ScanConfig::default().with_categories(&[RuleCategory::Phi]);
        let eng = ScanEngine::new(config).unwrap();
        let corpus = vec![file("a.js", "const hash = md5(x);\nssn = '223-45-6789'\n")];
        let findings = eng.scan(&corpus);
        assert!(findings.iter().all(|f| f.category == RuleCategory::Phi));
        assert!(findings.iter().any(|f| f.rule_id == "PHI-001"));
    }

    #[test]
    fn cancelled_token_yields_no_new_work() {
        let token = CancellationToken::new();
        token.cancel();
        let corpus = vec![file("a.js", "const hash = md5(x);\n")];
        let findings = engine().scan_cancellable(&corpus, &token);
        assert!(findings.is_empty());
    }

    #[test]
    fn external_rules_merge_with_builtin() {
        let extra = RuleDescriptor::line(
            "EXT-010",
            RuleCategory::Encryption,
            Severity::Low,
            Confidence::High,
            "Legacy crypt() call",
        )
        .with_patterns(&[r"\bcrypt\s*\("]);
        let eng =
            ScanEngine::with_extra_rules(ScanConfig::default(), vec![extra]).unwrap();
        let corpus = vec![file("a.c", "char *h = crypt(pw, salt);\n")];
        let findings = eng.scan(&corpus);
        assert!(findings.iter().any(|f| f.rule_id == "EXT-010"));
    }
}
