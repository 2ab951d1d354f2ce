//! Core copy engine module
//!
//! Provides planned operations, the bounded worker pool, and the engine
//! that dispatches jobs and aggregates their results.

mod copier;
mod plan;
mod pool;

pub use copier::*;
pub use plan::*;
pub use pool::*;
