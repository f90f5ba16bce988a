//! scanner/context.rs - Line classification and context-window extraction.
//!
//! The scanner never matches rules against blank or comment lines, and the
//! negative-pattern window it hands back is comment-stripped, so "md5 is
//! banned here" in a nearby comment cannot trigger or suppress anything.
//!
//! License: MIT OR APACHE 2.0

/// Comment prefixes across the languages the scanner commonly meets.
const COMMENT_PREFIXES: [&str; 7] = ["//", "#", "*", "/*", "*/", "--", "<!--"];

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// True when the line is a pure comment line. Trailing comments on code
/// lines do not count; the code part still gets scanned.
pub fn is_comment_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    COMMENT_PREFIXES
        .iter()
        .any(|prefix| trimmed.starts_with(prefix))
}

/// Extracts the `radius`-line window around `line_idx` (0-based), dropping
/// comment lines. A radius of zero yields just the matched line.
pub fn context_window(lines: &[&str], line_idx: usize, radius: usize) -> Vec<String> {
    if lines.is_empty() || line_idx >= lines.len() {
        return Vec::new();
    }
    let start = line_idx.saturating_sub(radius);
    let end = (line_idx + radius).min(lines.len() - 1);
    lines[start..=end]
        .iter()
        .filter(|line| !is_comment_line(line))
        .map(|line| line.to_string())
        .collect()
}
