// vlayer-rules/src/lib.rs
//! Compliance rule library for the Verilayer scanner.
//!
//! This crate owns the pieces of the rule engine that are pure data and pure
//! computation: the severity/confidence/category taxonomies, the
//! [`RuleDescriptor`] value type with its validation, the built-in catalog,
//! and pattern compilation backed by a process-wide cache. It performs no
//! I/O; the scanner crate feeds it descriptors and reads back compiled rules.
//!
//! License: MIT OR Apache-2.0

pub mod catalog;
pub mod compiler;
pub mod descriptor;
pub mod taxonomy;

pub use catalog::{builtin_rules, rules_for_categories};
pub use compiler::{compile_rules, CompiledRule, RulesError};
pub use descriptor::{
    partition_valid, validate_rule, FixKind, Granularity, MatchSubject, NegativeScope,
    RuleDescriptor, RuleIssue, Trigger, MAX_CONTEXT_LINES, MAX_PATTERN_LENGTH,
};
pub use taxonomy::{Confidence, RuleCategory, Severity};
