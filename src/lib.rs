//! Typed async facade over the restic backup CLI.
//!
//! Compiles typed option records into restic argument vectors, runs the
//! `restic` binary as a subprocess with a controlled environment, and
//! parses its line-delimited JSON output into typed summaries. Recognized
//! stderr text is translated into a closed error taxonomy.

pub mod error;
pub mod exec;
pub mod options;
mod output;
pub mod repo;
pub mod types;
pub mod version;

// Re-export commonly used types
pub use error::{Error, Result};
pub use exec::OpContext;
pub use options::{BackupOptions, FilterOptions, ForgetOptions, RestoreOptions};
pub use repo::Repository;
pub use types::{BackupSummary, ForgetSummary, Id, RestoreSummary, Snapshot};
