//! Repository facade: typed operations over a restic repository.

use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::exec::{self, OpContext};
use crate::options::{BackupOptions, FilterOptions, ForgetOptions, RestoreOptions};
use crate::output::extract_summary;
use crate::types::{BackupSummary, ForgetSummary, RestoreSummary, Snapshot};

/// Handle to a restic repository: a backend location plus its password.
///
/// The handle holds no live resources; every operation spawns one restic
/// subprocess and suspends only at its exit. Concurrent callers sharing a
/// handle are not serialized by this layer — restic's own repository
/// locking arbitrates writers. [`Error::RepoLocked`] surfaces contention,
/// and [`Repository::unlock`] clears locks left behind by a crash.
#[derive(Debug, Clone)]
pub struct Repository {
    location: String,
    password: String,
}

impl Repository {
    /// Creates a handle without touching the backend.
    ///
    /// This always succeeds locally; reachability and the password stay
    /// unverified until [`validate`](Self::validate) or any other
    /// operation runs.
    pub fn open(location: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            password: password.into(),
        }
    }

    /// Opens a handle and verifies it with an immediate listing.
    pub async fn connect(
        ctx: &OpContext,
        location: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let repo = Self::open(location, password);
        repo.validate(ctx).await?;
        Ok(repo)
    }

    /// Initializes a new repository at the location.
    ///
    /// Fails with [`Error::RepoExists`] when the location already holds
    /// one.
    pub async fn init(
        ctx: &OpContext,
        location: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let repo = Self::open(location, password);
        repo.run(ctx, None, vec!["init".into(), "--json".into()])
            .await?;
        debug!(location = %repo.location, "initialized repository");
        Ok(repo)
    }

    /// The backend address this handle points at.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Verifies the repository is reachable and the password is correct
    /// via a minimal read-only listing.
    pub async fn validate(&self, ctx: &OpContext) -> Result<()> {
        let args = ["snapshots", "--json", "--no-lock", "--latest", "1"]
            .map(String::from)
            .to_vec();
        self.run(ctx, None, args).await.map(drop)
    }

    /// Backs up `source`, returning the summary restic reports.
    ///
    /// Runs with the working directory set to `source` and backs up `.`,
    /// so the snapshot's recorded paths stay relative and portable.
    pub async fn backup(
        &self,
        ctx: &OpContext,
        source: impl AsRef<Path>,
        options: &BackupOptions,
    ) -> Result<BackupSummary> {
        let source = source.as_ref();
        if source.as_os_str().is_empty() {
            return Err(Error::Usage("backup source path is empty".into()));
        }
        tokio::fs::metadata(source).await?;

        let mut args = vec!["backup".to_string(), "--json".to_string()];
        args.extend(options.to_args());
        args.push(".".to_string());

        let out = self.run(ctx, Some(source), args).await?;
        let line = extract_summary(&out)?;
        serde_json::from_str(line).map_err(|e| Error::Parse(e.to_string()))
    }

    /// Lists snapshots matching the filter, in read-only (no-lock) mode.
    pub async fn snapshots(
        &self,
        ctx: &OpContext,
        filter: &FilterOptions,
    ) -> Result<Vec<Snapshot>> {
        let mut args = snapshots_base();
        args.extend(filter.to_args());
        let out = self.run(ctx, None, args).await?;
        serde_json::from_str(&out).map_err(|e| Error::Parse(e.to_string()))
    }

    /// Returns the single snapshot with the given id.
    pub async fn snapshot_by_id(&self, ctx: &OpContext, id: &str) -> Result<Snapshot> {
        let mut args = snapshots_base();
        args.push(id.to_string());
        let out = self.run(ctx, None, args).await?;
        let mut snapshots: Vec<Snapshot> =
            serde_json::from_str(&out).map_err(|e| Error::Parse(e.to_string()))?;
        if snapshots.is_empty() {
            return Err(Error::SnapshotNotFound(id.to_string()));
        }
        Ok(snapshots.remove(0))
    }

    /// Restores a snapshot into `target`, creating the directory (and its
    /// parents) when absent.
    ///
    /// `snapshot_ref` accepts `latest`, an 8- or 64-character hex id, each
    /// with an optional `:sub/path` suffix.
    pub async fn restore(
        &self,
        ctx: &OpContext,
        snapshot_ref: &str,
        target: impl AsRef<Path>,
        options: &RestoreOptions,
    ) -> Result<RestoreSummary> {
        let target = target.as_ref();
        if target.as_os_str().is_empty() {
            return Err(Error::Usage("restore target path is empty".into()));
        }
        // Lossy conversion would silently restore into a different
        // directory name.
        let Some(target_str) = target.to_str() else {
            return Err(Error::Usage("restore target path is not valid UTF-8".into()));
        };
        if !is_snapshot_ref(snapshot_ref) {
            return Err(Error::InvalidId);
        }
        tokio::fs::create_dir_all(target).await?;

        let mut args = vec![
            "restore".to_string(),
            snapshot_ref.to_string(),
            "--target".to_string(),
            target_str.to_string(),
            "--json".to_string(),
        ];
        args.extend(options.to_args());

        let out = self.run(ctx, None, args).await?;
        let line = extract_summary(&out)?;
        serde_json::from_str(line).map_err(|e| Error::Parse(e.to_string()))
    }

    /// Applies a retention policy and reports what was kept and removed.
    ///
    /// At least one option must be set. When a snapshot id is given,
    /// restic ignores the host/path/tag filters. restic's JSON support is
    /// weakest here: if the run succeeds but the record does not decode,
    /// the result is [`Error::Parse`] — the snapshots are gone even though
    /// the report is unreadable.
    pub async fn forget(
        &self,
        ctx: &OpContext,
        options: &ForgetOptions,
    ) -> Result<Vec<ForgetSummary>> {
        if options.is_empty() {
            return Err(Error::Usage("forget requires at least one option".into()));
        }

        let mut args = vec!["forget".to_string(), "--json".to_string()];
        args.extend(options.to_args());

        let out = self.run(ctx, None, args).await?;
        let line = extract_summary(&out)?;
        serde_json::from_str(line).map_err(|e| Error::Parse(e.to_string()))
    }

    /// Removes all locks on the repository.
    pub async fn unlock(&self, ctx: &OpContext) -> Result<()> {
        self.run(ctx, None, vec!["unlock".into(), "--json".into()])
            .await
            .map(drop)
    }

    async fn run(&self, ctx: &OpContext, dir: Option<&Path>, args: Vec<String>) -> Result<String> {
        exec::run(ctx, &self.location, &self.password, dir, &args).await
    }
}

fn snapshots_base() -> Vec<String> {
    ["snapshots", "--json", "--no-lock"]
        .map(String::from)
        .to_vec()
}

/// Accepts `latest`, an 8- or 64-character lowercase-hex id, each with an
/// optional `:sub/path` suffix.
pub(crate) fn is_snapshot_ref(s: &str) -> bool {
    let head = match s.split_once(':') {
        Some((head, _path)) => head,
        None => s,
    };
    if head == "latest" {
        return true;
    }
    (head.len() == 8 || head.len() == 64)
        && head.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX_ID: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    #[test]
    fn accepts_latest_with_and_without_path() {
        assert!(is_snapshot_ref("latest"));
        assert!(is_snapshot_ref("latest:/x"));
        assert!(is_snapshot_ref("latest:sub/dir"));
    }

    #[test]
    fn accepts_short_and_full_hex_ids() {
        assert!(is_snapshot_ref("0a1b2c3d"));
        assert!(is_snapshot_ref("0a1b2c3d:/etc"));
        assert!(is_snapshot_ref(HEX_ID));
        assert!(is_snapshot_ref(&format!("{HEX_ID}:/var/lib")));
    }

    #[test]
    fn rejects_malformed_references() {
        assert!(!is_snapshot_ref(""));
        assert!(!is_snapshot_ref("0a1b2c")); // 6 chars
        assert!(!is_snapshot_ref("0a1b2c3g")); // non-hex
        assert!(!is_snapshot_ref("0A1B2C3D")); // uppercase
        assert!(!is_snapshot_ref("latestx"));
        assert!(!is_snapshot_ref(&HEX_ID[..32])); // wrong length
    }

    #[tokio::test]
    async fn backup_rejects_an_empty_source_before_spawning() {
        let repo = Repository::open("/tmp/repo", "pw");
        let err = repo
            .backup(&OpContext::new(), "", &BackupOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Usage(_)));
    }

    #[tokio::test]
    async fn backup_surfaces_a_missing_source_as_io() {
        let repo = Repository::open("/tmp/repo", "pw");
        let missing = std::env::temp_dir().join("restic-bridge-no-such-source");
        let err = repo
            .backup(&OpContext::new(), &missing, &BackupOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn restore_rejects_an_empty_target_before_spawning() {
        let repo = Repository::open("/tmp/repo", "pw");
        let err = repo
            .restore(&OpContext::new(), "latest", "", &RestoreOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Usage(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn restore_rejects_a_non_utf8_target() {
        use std::os::unix::ffi::OsStrExt;

        let repo = Repository::open("/tmp/repo", "pw");
        let bad = std::ffi::OsStr::from_bytes(b"/tmp/restic-bridge-\xff-target");
        let err = repo
            .restore(
                &OpContext::new(),
                "latest",
                Path::new(bad),
                &RestoreOptions::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Usage(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn restore_rejects_an_invalid_reference_before_spawning() {
        let repo = Repository::open("/tmp/repo", "pw");
        let target = tempfile::tempdir().expect("tempdir");
        let err = repo
            .restore(
                &OpContext::new(),
                "not-a-reference",
                target.path(),
                &RestoreOptions::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidId));
    }

    #[tokio::test]
    async fn forget_requires_at_least_one_option() {
        let repo = Repository::open("/tmp/repo", "pw");
        let err = repo
            .forget(&OpContext::new(), &ForgetOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Usage(_)));
    }
}
