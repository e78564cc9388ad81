use super::push_flag_values;

/// Options for a forget (retention) run.
///
/// When a snapshot id is set, restic ignores the host/path/tag filters for
/// that invocation.
#[derive(Debug, Clone, Default)]
pub struct ForgetOptions {
    snapshot: Option<String>,
    hosts: Vec<String>,
    paths: Vec<String>,
    tags: Vec<String>,
    keep_last: u32,
    prune: bool,
}

impl ForgetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets one specific snapshot.
    pub fn snapshot(mut self, id: impl Into<String>) -> Self {
        self.snapshot = Some(id.into());
        self
    }

    /// Restricts the policy to snapshots recorded by this host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.hosts.push(host.into());
        self
    }

    pub fn hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hosts.extend(hosts.into_iter().map(Into::into));
        self
    }

    /// Restricts the policy to snapshots containing this path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.paths.push(path.into());
        self
    }

    pub fn paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Restricts the policy to snapshots carrying this tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Keeps the most recent `n` snapshots. Zero means unset.
    pub fn keep_last(mut self, n: u32) -> Self {
        self.keep_last = n;
        self
    }

    /// Reclaims storage after removing snapshots.
    pub fn prune(mut self) -> Self {
        self.prune = true;
        self
    }

    /// True when no option has been set at all.
    pub(crate) fn is_empty(&self) -> bool {
        self.snapshot.is_none()
            && self.hosts.is_empty()
            && self.paths.is_empty()
            && self.tags.is_empty()
            && self.keep_last == 0
            && !self.prune
    }

    /// Compiles to restic arguments. The bare snapshot id comes first —
    /// restic treats it positionally — then the identifying filters, then
    /// the keep limit, then `--prune` last.
    pub(crate) fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(snapshot) = &self.snapshot {
            args.push(snapshot.clone());
        }
        push_flag_values(&mut args, "--host", &self.hosts);
        push_flag_values(&mut args, "--path", &self.paths);
        push_flag_values(&mut args, "--tag", &self.tags);
        if self.keep_last > 0 {
            args.push("--keep-last".to_string());
            args.push(self.keep_last.to_string());
        }
        if self.prune {
            args.push("--prune".to_string());
        }
        args
    }
}
