//! store.rs - Persistence helpers for the project-local `.vlayer` directory.
//!
//! Everything the core persists (audit trail, baseline, acknowledgments,
//! history) lives as pretty-printed JSON under `<project>/.vlayer/`. Writes
//! go through a temp file in the same directory followed by a rename, so a
//! crash mid-write leaves the previous state intact rather than a truncated
//! file.
//!
//! License: MIT OR APACHE 2.0

use crate::errors::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the project-local state directory.
pub const VLAYER_DIR: &str = ".vlayer";

/// `<root>/.vlayer`
pub fn vlayer_dir(root: &Path) -> PathBuf {
    root.join(VLAYER_DIR)
}

/// `<root>/.vlayer/<name>`
pub fn state_path(root: &Path, name: &str) -> PathBuf {
    vlayer_dir(root).join(name)
}

/// Reads a JSON state file. An absent file is a normal first-run condition
/// and returns `Ok(None)`; a present-but-malformed file is an error.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_str(&raw)?))
}

/// Serializes `value` and moves it into place atomically.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| crate::errors::VlayerError::Fatal(format!(
            "state path has no parent directory: {}",
            path.display()
        )))?;
    fs::create_dir_all(parent)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "state".to_string());
    let tmp = parent.join(format!(".{file_name}.tmp"));

    let serialized = serde_json::to_string_pretty(value)?;
    fs::write(&tmp, serialized)?;
    fs::rename(&tmp, path)?;
    log::debug!("wrote state file {}", path.display());
    Ok(())
}
