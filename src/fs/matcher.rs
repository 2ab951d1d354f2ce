//! Inclusion predicate
//!
//! Decides whether a file under the source root qualifies for copying.
//! Files whose name ends with an ignored suffix are always rejected; every
//! other file must match at least one inclusion pattern (default deny).

use crate::config::{CopyConfig, MatchStyle};
use crate::error::{QcpError, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::Path;

/// Predicate deciding whether a path under a root qualifies for copying
pub trait PathMatcher: Send + Sync {
    /// Check whether `candidate`, found under `source_root`, should be copied
    fn matches(&self, source_root: &Path, candidate: &Path) -> bool;
}

impl<F> PathMatcher for F
where
    F: Fn(&Path, &Path) -> bool + Send + Sync,
{
    fn matches(&self, source_root: &Path, candidate: &Path) -> bool {
        self(source_root, candidate)
    }
}

/// Compiled inclusion rules
#[derive(Debug, Clone)]
pub struct InclusionMatcher {
    style: MatchStyle,
    prefixes: Vec<String>,
    globs: GlobSet,
    ignore_suffixes: Vec<String>,
}

impl InclusionMatcher {
    /// Compile a pattern set
    ///
    /// In glob style every pattern is compiled here, so a malformed pattern
    /// is a configuration error before any traversal happens.
    pub fn new(patterns: &[String], style: MatchStyle, ignore_suffixes: &[String]) -> Result<Self> {
        let prefixes: Vec<String> = patterns
            .iter()
            .map(|p| p.trim_start_matches('/').to_string())
            .collect();

        let globs = match style {
            MatchStyle::Prefix => GlobSet::empty(),
            MatchStyle::Glob => Self::build_globset(&prefixes)?,
        };

        Ok(Self {
            style,
            prefixes,
            globs,
            ignore_suffixes: ignore_suffixes
                .iter()
                .filter(|s| !s.is_empty())
                .cloned()
                .collect(),
        })
    }

    /// Build the matcher described by a run configuration
    pub fn from_config(config: &CopyConfig) -> Result<Self> {
        Self::new(&config.patterns, config.match_style, &config.ignore_suffixes)
    }

    fn build_globset(patterns: &[String]) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|e| QcpError::config(format!("Invalid glob pattern '{}': {}", pattern, e)))?;
            builder.add(glob);
        }
        builder
            .build()
            .map_err(|e| QcpError::config(format!("Failed to build glob set: {}", e)))
    }

    /// Check the ignore list against the candidate's file name
    pub fn is_ignored(&self, candidate: &Path) -> bool {
        let Some(name) = candidate.file_name() else {
            return false;
        };
        let name = name.to_string_lossy();
        self.ignore_suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
    }

    /// Check a `/`-separated path relative to the source root
    pub fn matches_relative(&self, relative: &str) -> bool {
        match self.style {
            MatchStyle::Prefix => self.prefixes.iter().any(|p| relative.starts_with(p.as_str())),
            MatchStyle::Glob => self.globs.is_match(relative),
        }
    }

    /// Number of inclusion patterns
    pub fn pattern_count(&self) -> usize {
        self.prefixes.len()
    }
}

impl PathMatcher for InclusionMatcher {
    fn matches(&self, source_root: &Path, candidate: &Path) -> bool {
        if self.is_ignored(candidate) {
            return false;
        }
        match relative_slash_path(source_root, candidate) {
            Some(relative) => self.matches_relative(&relative),
            None => false,
        }
    }
}

/// Render `candidate` relative to `root` with `/` separators
pub fn relative_slash_path(root: &Path, candidate: &Path) -> Option<String> {
    let relative = candidate.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Some(parts.join("/"))
}
