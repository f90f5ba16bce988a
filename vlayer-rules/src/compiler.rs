// vlayer-rules/src/compiler.rs
//! Pattern compilation with a process-wide cache.
//!
//! Compiled regexes are cached keyed by the source pattern string, so repeated
//! scans (watch mode re-runs in particular) never recompile a pattern the
//! process has already built. The cache is append-only for the process
//! lifetime; rule sets are small enough that eviction is not worth having.
//!
//! License: MIT OR Apache-2.0

use crate::descriptor::RuleDescriptor;
use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Upper bound on the compiled size of a single regex.
const REGEX_SIZE_LIMIT: usize = 10 * (1 << 20);

lazy_static! {
    static ref PATTERN_CACHE: RwLock<HashMap<String, Arc<Regex>>> =
        RwLock::new(HashMap::new());
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RulesError {
    #[error("rule '{0}': failed to compile pattern: {1}")]
    Compilation(String, #[source] regex::Error),
}

/// A descriptor paired with its compiled patterns, ready to run.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub descriptor: RuleDescriptor,
    pub primaries: Vec<Arc<Regex>>,
    pub negatives: Vec<Arc<Regex>>,
    pub path_pattern: Option<Arc<Regex>>,
}

impl CompiledRule {
    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    /// True when any primary pattern matches `text`.
    pub fn matches_primary(&self, text: &str) -> bool {
        self.primaries.iter().any(|re| re.is_match(text))
    }

    /// True when any negative pattern matches `text`.
    pub fn matches_negative(&self, text: &str) -> bool {
        self.negatives.iter().any(|re| re.is_match(text))
    }

    /// True when this rule examines the file at `path`. Rules without a path
    /// pattern examine everything.
    pub fn applies_to_path(&self, path: &str) -> bool {
        match &self.path_pattern {
            Some(re) => re.is_match(path),
            None => true,
        }
    }
}

fn compiled(pattern: &str) -> Result<Arc<Regex>, regex::Error> {
    {
        let cache = PATTERN_CACHE.read().expect("pattern cache lock poisoned");
        if let Some(hit) = cache.get(pattern) {
            log::debug!("pattern cache hit: {pattern}");
            return Ok(Arc::clone(hit));
        }
    }

    let built = RegexBuilder::new(pattern)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()?;
    let arc = Arc::new(built);

    let mut cache = PATTERN_CACHE.write().expect("pattern cache lock poisoned");
    // Another thread may have raced us here; keep whichever landed first.
    Ok(Arc::clone(
        cache.entry(pattern.to_string()).or_insert(arc),
    ))
}

/// Compiles every pattern of every descriptor. Descriptors are expected to
/// have passed [`crate::descriptor::partition_valid`] already, so a failure
/// here is a hard error rather than a skip.
pub fn compile_rules(rules: &[RuleDescriptor]) -> Result<Vec<CompiledRule>, RulesError> {
    let mut compiled_rules = Vec::with_capacity(rules.len());

    for rule in rules {
        let compile = |pattern: &str| {
            compiled(pattern).map_err(|e| RulesError::Compilation(rule.id.clone(), e))
        };

        let primaries = rule
            .patterns
            .iter()
            .map(|p| compile(p))
            .collect::<Result<Vec<_>, _>>()?;
        let negatives = rule
            .negative_patterns
            .iter()
            .map(|p| compile(p))
            .collect::<Result<Vec<_>, _>>()?;
        let path_pattern = match &rule.path_pattern {
            Some(p) => Some(compile(p)?),
            None => None,
        };

        compiled_rules.push(CompiledRule {
            descriptor: rule.clone(),
            primaries,
            negatives,
            path_pattern,
        });
    }

    log::debug!("compiled {} rules", compiled_rules.len());
    Ok(compiled_rules)
}

#[doc(hidden)]
pub fn pattern_cache_len() -> usize {
    PATTERN_CACHE
        .read()
        .expect("pattern cache lock poisoned")
        .len()
}
