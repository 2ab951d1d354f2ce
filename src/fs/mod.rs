//! File system operations module
//!
//! Provides the inclusion predicate, the tree walker that turns the source
//! tree into planned operations, and the single-file copy job.

mod matcher;
mod operations;
mod walker;

pub use matcher::*;
pub use operations::*;
pub use walker::*;
