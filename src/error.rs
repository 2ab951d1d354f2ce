//! Error types for qcp
//!
//! Errors fall into two groups. Preflight errors (bad arguments, unresolvable
//! paths, unreadable pattern file, declined confirmation, traversal failures)
//! end the run and map to a distinct process exit code. Job errors describe a
//! single failed file copy; they are reported and counted but never end the run.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which positional root a path error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    /// The tree being read from
    Source,
    /// The tree being written to
    Destination,
}

impl fmt::Display for RootKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Destination => f.write_str("destination"),
        }
    }
}

/// The step of a copy job that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStep {
    /// Opening the source for reading
    Open,
    /// Reading the source permission bits
    Stat,
    /// Creating the destination parent directories
    CreateDir,
    /// Creating or truncating the destination file
    Create,
    /// Applying the source permission bits to the destination
    SetPermissions,
}

impl fmt::Display for CopyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            Self::Open => "open",
            Self::Stat => "stat",
            Self::CreateDir => "create directory",
            Self::Create => "create",
            Self::SetPermissions => "set permissions on",
        };
        f.write_str(step)
    }
}

/// Main error type for qcp operations
#[derive(Error, Debug)]
pub enum QcpError {
    /// Source or destination positional argument not supplied
    #[error("specify src and dst path")]
    MissingArguments,

    /// The command line could not be parsed
    #[error("{0}")]
    Usage(String),

    /// A positional root could not be turned into an absolute path
    #[error("failed to resolve {which} path '{input}': {message}")]
    PathResolution {
        which: RootKind,
        input: String,
        message: String,
    },

    /// The inclusion pattern file could not be read
    #[error("failed to read pattern file '{path}': {source}")]
    PatternFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration detected before traversal
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The user answered anything other than "y" at the prompt
    #[error("aborted by user")]
    Aborted,

    /// The directory walk hit an unreadable or broken entry
    #[error("traversal failed at '{path}': {message}")]
    Traversal { path: PathBuf, message: String },

    /// A single copy job failed at the given step
    #[error("failed to {step} '{path}': {source}")]
    Job {
        step: CopyStep,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Streaming bytes into the destination failed
    ///
    /// A read error on the source and a write error on the destination are
    /// not told apart by the copy loop, so both paths are named.
    #[error("failed to copy '{from}' to '{to}': {source}")]
    Transfer {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error outside of a copy job
    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl QcpError {
    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a copy job error for the given step
    pub fn job(step: CopyStep, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Job {
            step,
            path: path.into(),
            source,
        }
    }

    /// Create a copy error naming both ends of the stream
    pub fn transfer(from: impl Into<PathBuf>, to: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Transfer {
            from: from.into(),
            to: to.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError(message.into())
    }

    /// Create a path resolution error for one of the roots
    pub fn resolve(which: RootKind, input: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::PathResolution {
            which,
            input: input.into(),
            message: message.to_string(),
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingArguments | Self::Usage(_) => 1,
            Self::PathResolution {
                which: RootKind::Source,
                ..
            } => 2,
            Self::PathResolution {
                which: RootKind::Destination,
                ..
            } => 3,
            Self::Aborted => 4,
            Self::PatternFile { .. } => 5,
            Self::Traversal { .. } => 6,
            Self::ConfigError(_) => 7,
            Self::Job { .. } | Self::Transfer { .. } | Self::Io { .. } => 1,
        }
    }
}

/// Result type alias for qcp operations
pub type Result<T> = std::result::Result<T, QcpError>;

/// Extension trait for adding path context to std::io::Result
pub trait IoResultExt<T> {
    /// Add path context to an I/O error
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;

    /// Tag an I/O error as a failed copy job step
    fn at_step(self, step: CopyStep, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| QcpError::io(path, e))
    }

    fn at_step(self, step: CopyStep, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| QcpError::job(step, path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    #[test]
    fn test_job_error_message_names_step_and_path() {
        let err = QcpError::job(
            CopyStep::Open,
            "/src/a.txt",
            std::io::Error::new(ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "failed to open '/src/a.txt': denied");
    }

    #[test]
    fn test_transfer_error_names_both_paths() {
        let err = QcpError::transfer(
            "/src/a.bin",
            "/dst/a.bin",
            std::io::Error::new(ErrorKind::Other, "No space left on device"),
        );
        assert_eq!(
            err.to_string(),
            "failed to copy '/src/a.bin' to '/dst/a.bin': No space left on device"
        );
    }

    #[test]
    fn test_usage_error_shares_missing_arguments_code() {
        let err = QcpError::Usage("unexpected argument '--bogus' found".into());
        assert_eq!(err.exit_code(), QcpError::MissingArguments.exit_code());
        assert_eq!(err.to_string(), "unexpected argument '--bogus' found");
    }

    #[test]
    fn test_exit_codes_are_distinct_per_preflight_category() {
        let codes = [
            QcpError::MissingArguments.exit_code(),
            QcpError::resolve(RootKind::Source, "~x", "no home").exit_code(),
            QcpError::resolve(RootKind::Destination, "~x", "no home").exit_code(),
            QcpError::Aborted.exit_code(),
            QcpError::PatternFile {
                path: PathBuf::from("/etc/qcpinclude"),
                source: std::io::Error::new(ErrorKind::NotFound, "missing"),
            }
            .exit_code(),
            QcpError::Traversal {
                path: PathBuf::from("/src"),
                message: "denied".into(),
            }
            .exit_code(),
            QcpError::config("bad glob").exit_code(),
        ];
        assert_eq!(codes, [1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_with_path_and_at_step() {
        let res: std::io::Result<()> = Err(std::io::Error::new(ErrorKind::NotFound, "gone"));
        let err = res.with_path("/x").unwrap_err();
        assert!(matches!(err, QcpError::Io { .. }));

        let res: std::io::Result<()> = Err(std::io::Error::new(ErrorKind::Other, "disk"));
        let err = res.at_step(CopyStep::Create, "/y").unwrap_err();
        assert!(matches!(err, QcpError::Job { step: CopyStep::Create, .. }));
    }
}
