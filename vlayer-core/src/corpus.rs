//! corpus.rs - File corpus collection for scanning.
//!
//! The scanner consumes a list of (path, UTF-8 content) pairs. This module
//! builds that list from a directory tree, honoring ignore files and
//! skipping anything the scan cannot usefully examine: binaries, files over
//! the size cap, and files that fail to read. A single unreadable file never
//! aborts collection.
//!
//! License: MIT OR APACHE 2.0

use crate::errors::Result;
use ignore::WalkBuilder;
use std::fs;
use std::path::Path;

/// Files larger than this are skipped outright.
pub const MAX_FILE_SIZE: u64 = 2 * 1024 * 1024;

/// One scannable file: a repository-relative path (forward slashes) and its
/// full UTF-8 content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

fn normalize_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.to_string_lossy().replace('\\', "/")
}

/// Walks `root` and returns every scannable file, sorted by path so the
/// corpus (and everything derived from it) is deterministic.
pub fn collect_corpus(root: &Path) -> Result<Vec<SourceFile>> {
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(false)
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            name != ".git" && name != ".vlayer"
        })
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::debug!("skipping unreadable entry: {e}");
                continue;
            }
        };
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();
        match entry.metadata() {
            Ok(meta) if meta.len() > MAX_FILE_SIZE => {
                log::debug!("skipping oversized file: {}", path.display());
                continue;
            }
            Err(e) => {
                log::debug!("skipping file without metadata: {}: {e}", path.display());
                continue;
            }
            _ => {}
        }
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                // Binary or permission-denied content lands here; the scan
                // continues without it.
                log::debug!("skipping unreadable file: {}: {e}", path.display());
                continue;
            }
        };
        if content.contains('\0') {
            log::debug!("skipping binary file: {}", path.display());
            continue;
        }
        files.push(SourceFile::new(normalize_path(root, path), content));
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    log::debug!("collected {} scannable files under {}", files.len(), root.display());
    Ok(files)
}
