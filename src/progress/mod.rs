//! Progress reporting module
//!
//! Provides the sinks that print plan lines, per-job outcomes and the final
//! summary, plus the interactive confirmation prompt.

mod prompt;
mod reporter;

pub use prompt::*;
pub use reporter::*;
