use super::push_flag_values;

/// Snapshot selection filters, shared by listing and restore-style
/// operations.
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    hosts: Vec<String>,
    paths: Vec<String>,
    tags: Vec<String>,
    latest: u32,
}

impl FilterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to snapshots recorded by this host.
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

    /// Restricts to snapshots containing this path.
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

    /// Restricts to snapshots carrying this tag.
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

    /// Limits the result to the latest `n` snapshots. Zero means no limit.
    pub fn latest(mut self, n: u32) -> Self {
        self.latest = n;
        self
    }

    /// Compiles to restic arguments: identifying filters first, then the
    /// numeric limit.
    pub(crate) fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        push_flag_values(&mut args, "--host", &self.hosts);
        push_flag_values(&mut args, "--path", &self.paths);
        push_flag_values(&mut args, "--tag", &self.tags);
        if self.latest > 0 {
            args.push("--latest".to_string());
            args.push(self.latest.to_string());
        }
        args
    }
}
