//! # qcp - Selective Parallel Backup Copy
//!
//! qcp reproduces a filtered subset of a source tree under a destination
//! tree. Only files whose path relative to the source root matches an
//! inclusion pattern are copied; the copies run on a fixed-size worker pool
//! and keep the source permission bits.
//!
//! ## Pipeline
//!
//! - **Walk**: a producer thread walks the source root and emits a
//!   [`PlannedOperation`](core::PlannedOperation) for every matching file
//!   over a channel of capacity 1
//! - **Plan**: the operations are collected into a list so they can be
//!   previewed and confirmed
//! - **Dispatch**: each operation becomes a job on the
//!   [`WorkerPool`](core::WorkerPool)
//! - **Aggregate**: every job reports one line, successful byte counts are
//!   summed atomically, and the engine waits for all jobs before summarizing
//!
//! ## Quick Start
//!
//! ```no_run
//! use qcp::core::selective_copy;
//! use std::path::PathBuf;
//!
//! let result = selective_copy(
//!     PathBuf::from("/home/me"),
//!     PathBuf::from("/mnt/backup"),
//!     vec!["Documents/".to_string(), ".ssh/".to_string()],
//! ).unwrap();
//!
//! println!("Copied {} files ({} bytes)", result.files_copied, result.bytes_copied);
//! ```
//!
//! ## Plan, Confirm, Execute
//!
//! ```no_run
//! use qcp::config::{CopyConfig, MatchStyle};
//! use qcp::core::CopyEngine;
//! use qcp::progress::{confirm, ConsoleReporter};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! let config = CopyConfig {
//!     source: PathBuf::from("/home/me"),
//!     destination: PathBuf::from("/mnt/backup"),
//!     patterns: vec!["Documents/**".to_string()],
//!     match_style: MatchStyle::Glob,
//!     ..Default::default()
//! };
//!
//! let engine = CopyEngine::new(config)?
//!     .with_reporter(Arc::new(ConsoleReporter::default()));
//! let plan = engine.plan()?;
//!
//! if confirm(std::io::stdin().lock(), std::io::stdout())? {
//!     let result = engine.execute(plan)?;
//!     assert_eq!(result.files_failed, 0);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod error;
pub mod fs;
pub mod progress;

// Re-export commonly used types
pub use config::{CopyConfig, MatchStyle, WalkErrorPolicy};
pub use core::{CopyEngine, CopyResult, PlannedOperation};
pub use error::{QcpError, Result};
pub use progress::ReportSink;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use qcp::prelude::*;
    //! ```

    pub use crate::config::{expand_path, load_patterns, CopyConfig, MatchStyle, WalkErrorPolicy};
    pub use crate::core::{
        selective_copy, CopyEngine, CopyResult, FileCopyExecutor, JobExecutor, PlannedOperation, WorkerPool,
    };
    pub use crate::error::{QcpError, Result};
    pub use crate::fs::{copy_file, walk, InclusionMatcher, PathMatcher, WalkOptions};
    pub use crate::progress::{confirm, ConsoleReporter, RecordingReporter, ReportSink};
}
