//! Subprocess execution for the restic binary.
//!
//! One call spawns exactly one subprocess and suspends only at its exit.
//! Cancellation is cooperative: the caller's [`OpContext`] is checked
//! before the spawn and raced against the subprocess afterwards, so a
//! cancelled or expired context kills restic and returns promptly with no
//! partial result. No retries happen at this layer.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{classify_stderr, Error, Result};
use crate::version;

/// Name of the wrapped binary, resolved via the system search path.
pub(crate) const RESTIC_BIN: &str = "restic";

/// Upper bound on captured stdout. Snapshot listings grow with repository
/// history, so this is generous.
const MAX_STDOUT_BYTES: usize = 64 * 1024 * 1024;

/// Upper bound on captured stderr.
const MAX_STDERR_BYTES: usize = 1024 * 1024;

/// Cancellation and deadline carrier threaded through every operation.
///
/// The default context never cancels and never expires. Cancel a running
/// operation through [`OpContext::token`], or bound it up front with
/// [`OpContext::with_timeout`].
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl OpContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context driven by an externally owned cancellation token.
    pub fn with_token(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    /// Context that expires after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// The token observed by running operations; cancelling it terminates
    /// the subprocess.
    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Fails fast when the context is already cancelled or past its
    /// deadline.
    pub(crate) fn check(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(Error::DeadlineExceeded);
            }
        }
        Ok(())
    }

    /// Resolves when the deadline passes; pends forever without one.
    async fn expired(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }
}

/// Output capture that rejects writes past a fixed limit instead of
/// growing unbounded or truncating silently.
#[derive(Debug)]
pub(crate) struct LimitedBuffer {
    buf: Vec<u8>,
    limit: usize,
}

impl LimitedBuffer {
    pub(crate) fn with_limit(limit: usize) -> Self {
        Self {
            buf: Vec::new(),
            limit,
        }
    }

    pub(crate) fn write(&mut self, chunk: &[u8]) -> Result<()> {
        if self.buf.len() + chunk.len() > self.limit {
            return Err(Error::OutputLimit { limit: self.limit });
        }
        self.buf.extend_from_slice(chunk);
        Ok(())
    }

    pub(crate) fn into_string(self) -> String {
        String::from_utf8_lossy(&self.buf).into_owned()
    }
}

async fn read_limited<R>(mut reader: R, limit: usize) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut out = LimitedBuffer::with_limit(limit);
    let mut chunk = [0u8; 8192];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        out.write(&chunk[..n])?;
    }
    Ok(out.into_string())
}

/// Runs `restic` with the given arguments and returns its stdout text.
///
/// The environment is cleared down to `RESTIC_REPOSITORY`,
/// `RESTIC_PASSWORD`, the inherited `PATH` and a best-effort `HOME`.
/// `dir`, when given, becomes the subprocess working directory (backup
/// targets `.` relative to its source so recorded snapshot paths stay
/// portable). A non-zero exit is classified from stderr.
pub(crate) async fn run(
    ctx: &OpContext,
    location: &str,
    password: &str,
    dir: Option<&Path>,
    args: &[String],
) -> Result<String> {
    ctx.check()?;
    version::ensure_ready().await?;

    debug!(?args, cwd = ?dir, "running restic");

    let mut cmd = Command::new(RESTIC_BIN);
    cmd.args(args)
        .env_clear()
        .env("RESTIC_REPOSITORY", location)
        .env("RESTIC_PASSWORD", password)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(path) = std::env::var_os("PATH") {
        cmd.env("PATH", path);
    }
    // HOME is best-effort: restic only wants it for its cache directory.
    if let Some(home) = std::env::var_os("HOME") {
        cmd.env("HOME", home);
    }
    if let Some(dir) = dir {
        cmd.current_dir(dir);
    }

    let mut child = cmd.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::BinaryNotFound
        } else {
            Error::Io(e)
        }
    })?;

    let stdout = child.stdout.take().ok_or_else(pipe_error)?;
    let stderr = child.stderr.take().ok_or_else(pipe_error)?;

    let wait = async {
        let (out, err) = tokio::try_join!(
            read_limited(stdout, MAX_STDOUT_BYTES),
            read_limited(stderr, MAX_STDERR_BYTES),
        )?;
        let status = child.wait().await?;
        Ok::<_, Error>((out, err, status))
    };
    tokio::pin!(wait);

    // kill_on_drop terminates restic when either cancel branch wins.
    let (out, err, status) = tokio::select! {
        res = &mut wait => res?,
        _ = ctx.cancel.cancelled() => return Err(Error::Cancelled),
        _ = ctx.expired() => return Err(Error::DeadlineExceeded),
    };

    if !status.success() {
        let classified = classify_stderr(&err);
        warn!(code = ?status.code(), error = %classified, "restic exited with an error");
        return Err(classified);
    }

    Ok(out)
}

fn pipe_error() -> Error {
    Error::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        "failed to capture restic output pipes",
    ))
}
