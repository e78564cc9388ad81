//! Error taxonomy and restic stderr classification.

use thiserror::Error;

/// Errors returned by repository operations.
///
/// Every public operation returns either a populated result or exactly one
/// of these variants. Validation failures are raised before any subprocess
/// is spawned; execution failures are classified once from stderr and
/// never re-interpreted further up.
#[derive(Debug, Error)]
pub enum Error {
    #[error("repository already exists")]
    RepoExists,

    #[error("repository not found")]
    RepoNotFound,

    #[error("invalid repository password")]
    InvalidPassword,

    #[error("invalid snapshot ID")]
    InvalidId,

    #[error("repository is locked by another process")]
    RepoLocked,

    #[error("no snapshot with ID '{0}'")]
    SnapshotNotFound(String),

    #[error("restic binary not found in PATH")]
    BinaryNotFound,

    #[error("restic {found} is older than the required minimum {required}")]
    VersionTooOld { found: String, required: String },

    #[error("{0}")]
    Usage(String),

    /// The operation ran, but its structured output could not be decoded.
    #[error("failed to parse restic output: {0}")]
    Parse(String),

    #[error("no summary record found in restic output")]
    NoSummary,

    #[error("captured output exceeded {limit} bytes")]
    OutputLimit { limit: usize },

    #[error("operation cancelled")]
    Cancelled,

    #[error("operation deadline exceeded")]
    DeadlineExceeded,

    #[error("restic failed: {0}")]
    CommandFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Maps restic stderr text to a typed error.
///
/// restic has no structured error channel, so ordered case-sensitive
/// substring matching on the human-readable text is the only signal.
/// First match wins; unrecognized text falls through to
/// [`Error::CommandFailed`] carrying the raw output.
pub(crate) fn classify_stderr(stderr: &str) -> Error {
    if stderr.contains("config file already exists") {
        Error::RepoExists
    } else if stderr.contains("wrong password") || stderr.contains("invalid password") {
        Error::InvalidPassword
    } else if stderr.contains("Is there a repository at the following location?") {
        Error::RepoNotFound
    } else if stderr.contains("unable to create lock in backend")
        || stderr.contains("repository is already locked")
    {
        Error::RepoLocked
    } else if stderr.contains("returned error, retrying after") {
        Error::InvalidId
    } else {
        Error::CommandFailed(stderr.trim().to_string())
    }
}
