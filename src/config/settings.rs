//! Configuration settings for qcp
//!
//! Defines all configuration options, CLI arguments, and defaults
//! for a selective copy run.

use crate::config::{expand_path, load_patterns};
use crate::error::{QcpError, Result, RootKind};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Well-known location of the inclusion pattern file
pub const DEFAULT_INCLUDE_FILE: &str = "/etc/qcpinclude";

/// File name suffixes that are never copied by default
pub const DEFAULT_IGNORE_SUFFIXES: &[&str] = &[".DS_Store"];

/// qcp - selectively copy a source tree into a destination tree
#[derive(Parser, Debug, Clone)]
#[command(name = "qcp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Copy the parts of a tree listed in an include file, in parallel")]
#[command(long_about = r#"
qcp walks SOURCE, keeps every file whose path relative to SOURCE matches one
of the patterns in the include file, prints the plan, asks for confirmation
and then copies the selected files to the same relative paths under
DESTINATION, preserving permission bits.

Include file format: one pattern per line; blank lines and lines starting
with '#' are ignored; a leading '/' is ignored.

Examples:
  qcp ~ /mnt/backup                     # Plan, confirm, copy
  qcp -y ~ /mnt/backup                  # Copy without prompting
  qcp --match-style glob ~ /mnt/backup  # Treat patterns as globs
"#)]
pub struct CliArgs {
    /// Source root (a leading ~ expands to the home directory)
    #[arg(value_name = "SOURCE")]
    pub source: Option<String>,

    /// Destination root (a leading ~ expands to the home directory)
    #[arg(value_name = "DESTINATION")]
    pub destination: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long, env = "QCP_SKIP_CONFIRMATION")]
    pub skip_confirmation: bool,

    /// Path of the inclusion pattern file
    #[arg(long, env = "QCP_INCLUDE_FILE", default_value = DEFAULT_INCLUDE_FILE, value_name = "PATH")]
    pub include_file: PathBuf,

    /// How include patterns are matched against relative paths
    #[arg(long, value_enum, default_value = "prefix")]
    pub match_style: MatchStyle,

    /// File name suffix that is never copied (repeatable)
    #[arg(long = "ignore", value_name = "SUFFIX", default_values_t = DEFAULT_IGNORE_SUFFIXES.iter().map(|s| s.to_string()).collect::<Vec<_>>())]
    pub ignore_suffixes: Vec<String>,

    /// Number of copy workers (0 = number of CPUs)
    #[arg(short = 't', long, default_value = "0", value_name = "NUM")]
    pub threads: usize,

    /// What to do when the directory walk hits an unreadable entry
    #[arg(long, value_enum, default_value = "abort")]
    pub on_walk_error: WalkErrorPolicy,

    /// Follow symbolic links while walking the source tree
    #[arg(short = 'L', long)]
    pub follow_symlinks: bool,

    /// Print the plan and exit without copying
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Show a progress bar while copying
    #[arg(short = 'p', long)]
    pub progress: bool,

    /// Quiet mode (only errors and the summary are printed)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Output format for the final summary
    #[arg(long, value_enum, default_value = "text")]
    pub output_format: OutputFormat,

    /// Verbose logging (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Inclusion pattern matching style
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchStyle {
    /// The relative path must start with the literal pattern
    #[default]
    Prefix,
    /// The pattern is a shell glob; `*` stops at `/`, `**` crosses it
    Glob,
}

/// Policy for errors raised by the directory walk itself
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WalkErrorPolicy {
    /// Stop the walk and fail the run
    #[default]
    Abort,
    /// Log the error and keep walking
    Skip,
}

/// Output format for the final summary
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON object
    Json,
}

/// Runtime configuration derived from CLI args
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyConfig {
    /// Absolute source root
    pub source: PathBuf,
    /// Absolute destination root
    pub destination: PathBuf,
    /// Inclusion patterns, in file order
    pub patterns: Vec<String>,
    /// How patterns are matched
    pub match_style: MatchStyle,
    /// File name suffixes that are never copied
    pub ignore_suffixes: Vec<String>,
    /// Worker count (0 = auto-detect)
    pub threads: usize,
    /// Traversal error policy
    pub on_walk_error: WalkErrorPolicy,
    /// Follow symlinks during the walk
    pub follow_symlinks: bool,
    /// Skip the confirmation prompt
    pub skip_confirmation: bool,
    /// Plan only
    pub dry_run: bool,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::new(),
            destination: PathBuf::new(),
            patterns: Vec::new(),
            match_style: MatchStyle::Prefix,
            ignore_suffixes: DEFAULT_IGNORE_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            threads: 0,
            on_walk_error: WalkErrorPolicy::Abort,
            follow_symlinks: false,
            skip_confirmation: false,
            dry_run: false,
        }
    }
}

impl CopyConfig {
    /// Create config from CLI arguments
    ///
    /// Resolves both roots and loads the pattern file, in that order, so
    /// each failure surfaces with its own exit code.
    pub fn from_cli(args: &CliArgs) -> Result<Self> {
        let (Some(source), Some(destination)) = (&args.source, &args.destination) else {
            return Err(QcpError::MissingArguments);
        };

        let source = expand_path(source).map_err(|e| QcpError::resolve(RootKind::Source, source, e))?;
        let destination = expand_path(destination)
            .map_err(|e| QcpError::resolve(RootKind::Destination, destination, e))?;
        let patterns = load_patterns(&args.include_file)?;

        Ok(Self {
            source,
            destination,
            patterns,
            match_style: args.match_style,
            ignore_suffixes: args.ignore_suffixes.clone(),
            threads: args.threads,
            on_walk_error: args.on_walk_error,
            follow_symlinks: args.follow_symlinks,
            skip_confirmation: args.skip_confirmation,
            dry_run: args.dry_run,
        })
    }

    /// Worker count with auto-detection applied
    pub fn effective_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn parse(argv: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_cli_defaults() {
        let args = parse(&["qcp", "/a", "/b"]);
        assert_eq!(args.match_style, MatchStyle::Prefix);
        assert_eq!(args.on_walk_error, WalkErrorPolicy::Abort);
        assert_eq!(args.ignore_suffixes, vec![".DS_Store".to_string()]);
        assert_eq!(args.threads, 0);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_cli_flags() {
        let args = parse(&[
            "qcp", "-y", "--match-style", "glob", "--ignore", ".tmp", "--ignore", "~", "-t", "3", "/a", "/b",
        ]);
        assert!(args.skip_confirmation);
        assert_eq!(args.match_style, MatchStyle::Glob);
        assert_eq!(args.ignore_suffixes, vec![".tmp".to_string(), "~".to_string()]);
        assert_eq!(args.threads, 3);
    }

    #[test]
    fn test_from_cli_missing_arguments() {
        let args = parse(&["qcp", "/only-source"]);
        let err = CopyConfig::from_cli(&args).unwrap_err();
        assert!(matches!(err, QcpError::MissingArguments));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_from_cli_missing_pattern_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let args = parse(&["qcp", "--include-file", missing.to_str().unwrap(), "/a", "/b"]);
        let err = CopyConfig::from_cli(&args).unwrap_err();
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_from_cli_loads_everything() {
        let dir = TempDir::new().unwrap();
        let include = dir.path().join("include");
        let mut file = std::fs::File::create(&include).unwrap();
        writeln!(file, "# backup list\nDocuments/\n\nPictures/").unwrap();

        let args = parse(&["qcp", "--include-file", include.to_str().unwrap(), "/a/./b", "/c/d/.."]);
        let config = CopyConfig::from_cli(&args).unwrap();

        assert_eq!(config.source, PathBuf::from("/a/b"));
        assert_eq!(config.destination, PathBuf::from("/c"));
        assert_eq!(config.patterns, vec!["Documents/", "Pictures/"]);
    }

    #[test]
    fn test_effective_threads() {
        let config = CopyConfig {
            threads: 5,
            ..Default::default()
        };
        assert_eq!(config.effective_threads(), 5);
        assert!(CopyConfig::default().effective_threads() >= 1);
    }
}
