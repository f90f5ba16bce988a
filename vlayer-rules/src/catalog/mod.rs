// vlayer-rules/src/catalog/mod.rs
//! The built-in rule catalog, one submodule per compliance category.
//!
//! Rules are constructed in code rather than loaded from data files so the
//! whole catalog is checked at compile time and carries no parse-time failure
//! mode. Ordering within a category is stable (ascending rule id) and the
//! catalog itself is immutable after construction.
//!
//! License: MIT OR Apache-2.0

mod access_control;
mod audit_logging;
mod encryption;
mod phi;
mod retention;

use crate::descriptor::RuleDescriptor;
use crate::taxonomy::RuleCategory;
use once_cell::sync::Lazy;

static BUILTIN: Lazy<Vec<RuleDescriptor>> = Lazy::new(|| {
    let mut rules = Vec::new();
    rules.extend(phi::rules());
    rules.extend(encryption::rules());
    rules.extend(audit_logging::rules());
    rules.extend(access_control::rules());
    rules.extend(retention::rules());
    rules
});

/// Every built-in rule, in category order (PHI, encryption, audit logging,
/// access control, retention). The catalog is constructed once per process.
pub fn builtin_rules() -> Vec<RuleDescriptor> {
    BUILTIN.clone()
}

/// Built-in rules restricted to `categories`. An empty slice selects the
/// whole catalog.
pub fn rules_for_categories(categories: &[RuleCategory]) -> Vec<RuleDescriptor> {
    if categories.is_empty() {
        return builtin_rules();
    }
    builtin_rules()
        .into_iter()
        .filter(|r| categories.contains(&r.category))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_rules;
    use crate::descriptor::validate_rule;
    use std::collections::HashSet;

    #[test]
    fn catalog_ids_are_unique() {
        let rules = builtin_rules();
        let ids: HashSet<&str> = rules.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), rules.len());
    }

    #[test]
    fn every_builtin_rule_validates() {
        for rule in builtin_rules() {
            let issues = validate_rule(&rule);
            assert!(issues.is_empty(), "rule {} has issues: {issues:?}", rule.id);
        }
    }

    #[test]
    fn every_builtin_pattern_compiles() {
        let rules = builtin_rules();
        assert!(compile_rules(&rules).is_ok());
    }

    #[test]
    fn every_builtin_rule_carries_remediation_and_reference() {
        for rule in builtin_rules() {
            assert!(!rule.recommendation.is_empty(), "{} lacks recommendation", rule.id);
            assert!(!rule.reference.is_empty(), "{} lacks reference", rule.id);
        }
    }

    #[test]
    fn category_filter_narrows_and_empty_selects_all() {
        let all = builtin_rules();
        assert_eq!(rules_for_categories(&[]).len(), all.len());
        let enc = rules_for_categories(&[RuleCategory::Encryption]);
        assert!(!enc.is_empty());
        assert!(enc.iter().all(|r| r.category == RuleCategory::Encryption));
        assert!(enc.len() < all.len());
    }

    #[test]
    fn ids_carry_their_category_prefix() {
        for rule in builtin_rules() {
            let prefix = match rule.category {
                RuleCategory::Phi => "PHI-",
                RuleCategory::Encryption => "ENC-",
                RuleCategory::AuditLogging => "AUD-",
                RuleCategory::AccessControl => "ACC-",
                RuleCategory::Retention => "RET-",
            };
            assert!(rule.id.starts_with(prefix), "{} mismatches category", rule.id);
        }
    }
}
