//! Configuration module for qcp
//!
//! Provides CLI arguments, runtime settings, root path resolution
//! and loading of the inclusion pattern file.

mod paths;
mod patterns;
mod settings;

pub use paths::*;
pub use patterns::*;
pub use settings::*;
