//! Inclusion pattern file loading
//!
//! The file is line oriented: each line is trimmed, blank lines and lines
//! starting with `#` are skipped, and every other line is one pattern.

use crate::error::{QcpError, Result};
use std::path::Path;

/// Read and parse the inclusion pattern file
pub fn load_patterns(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path).map_err(|source| QcpError::PatternFile {
        path: path.to_path_buf(),
        source,
    })?;

    let patterns = parse_patterns(&contents);
    if patterns.is_empty() {
        tracing::warn!("Pattern file {:?} has no patterns; nothing will be copied", path);
    } else {
        tracing::debug!("Loaded {} patterns from {:?}", patterns.len(), path);
    }

    Ok(patterns)
}

/// Parse pattern file contents, preserving line order
pub fn parse_patterns(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
