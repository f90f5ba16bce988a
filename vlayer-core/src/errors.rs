//! errors.rs - Custom error types for the vlayer-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that can be handled programmatically.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// This enum represents all possible error types in the `vlayer-core` library.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions. This prevents them from
/// matching all variants exhaustively, thus avoiding breaking changes.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum VlayerError {
    #[error("Rule engine error: {0}")]
    Rules(#[from] vlayer_rules::RulesError),

    #[error("Audit trail integrity check failed: stored hash {stored}, recomputed {recomputed}")]
    TamperDetected { stored: String, recomputed: String },

    #[error("Invalid review transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("No review item found for finding '{0}'")]
    ReviewNotFound(String),

    #[error("Failed to serialize persisted state: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("An unexpected I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    #[error("A critical system error occurred: {0}")]
    AnyhowWrapper(#[from] anyhow::Error),

    // Add other specific error types as the project grows
    #[error("A fatal error occurred: {0}")]
    Fatal(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VlayerError>;
