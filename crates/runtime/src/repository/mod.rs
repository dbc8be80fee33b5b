//! Persistence of finished battles.
//!
//! The runtime hands every ended battle to a [`ResultSink`] exactly once. Sinks
//! are fire-and-forget from the session's point of view: failures are logged
//! and never retried.

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::JsonLinesResultSink;
pub use memory::InMemoryResultSink;
pub use traits::{BattleRecord, ResultSink};
