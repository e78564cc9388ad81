//! One-shot readiness probe for the restic binary.
//!
//! The probe runs once per process and the outcome is cached, so
//! concurrent first callers share a single computation and every later
//! call observes the same result.

use std::process::Stdio;

use tokio::process::Command;
use tokio::sync::OnceCell;

use crate::error::{Error, Result};
use crate::exec::RESTIC_BIN;

/// Minimum restic version the facade supports.
const MIN_VERSION: (u64, u64, u64) = (0, 16, 0);

static PROBE: OnceCell<std::result::Result<(), ProbeFailure>> = OnceCell::const_new();

#[derive(Debug, Clone)]
enum ProbeFailure {
    NotFound,
    TooOld { found: String },
    Unreadable(String),
}

/// Checks that `restic` resolves on the search path and reports at least
/// the minimum supported version.
///
/// Callers decide whether a failure is process-fatal; the executor simply
/// refuses to spawn anything until this passes.
pub async fn ensure_ready() -> Result<()> {
    match PROBE.get_or_init(probe).await {
        Ok(()) => Ok(()),
        Err(ProbeFailure::NotFound) => Err(Error::BinaryNotFound),
        Err(ProbeFailure::TooOld { found }) => Err(Error::VersionTooOld {
            found: found.clone(),
            required: format!("{}.{}.{}", MIN_VERSION.0, MIN_VERSION.1, MIN_VERSION.2),
        }),
        Err(ProbeFailure::Unreadable(msg)) => Err(Error::CommandFailed(msg.clone())),
    }
}

async fn probe() -> std::result::Result<(), ProbeFailure> {
    let output = match Command::new(RESTIC_BIN)
        .arg("version")
        .stdin(Stdio::null())
        .output()
        .await
    {
        Ok(output) => output,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(ProbeFailure::NotFound),
        Err(e) => return Err(ProbeFailure::Unreadable(e.to_string())),
    };

    if !output.status.success() {
        return Err(ProbeFailure::Unreadable(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    let text = String::from_utf8_lossy(&output.stdout);
    let Some(found) = version_token(&text) else {
        return Err(ProbeFailure::Unreadable(format!(
            "could not find a version in {:?}",
            text.trim()
        )));
    };

    match parse_version(found) {
        Some(version) if version >= MIN_VERSION => Ok(()),
        Some(_) => Err(ProbeFailure::TooOld {
            found: found.to_string(),
        }),
        None => Err(ProbeFailure::Unreadable(format!(
            "unrecognized version token {found:?}"
        ))),
    }
}

/// Pulls the `x.y.z` token out of output like
/// `restic 0.16.4 compiled with go1.21.6 on linux/amd64`.
fn version_token(output: &str) -> Option<&str> {
    output
        .split_whitespace()
        .find(|token| parse_version(token).is_some())
}

fn parse_version(token: &str) -> Option<(u64, u64, u64)> {
    let mut parts = token.splitn(3, '.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    // The patch field may carry a suffix like "4-dev".
    let patch: String = parts
        .next()?
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let patch = patch.parse().ok()?;
    Some((major, minor, patch))
}
