use super::push_flag_values;

/// Options for a restore run.
#[derive(Debug, Clone, Default)]
pub struct RestoreOptions {
    hosts: Vec<String>,
    paths: Vec<String>,
    tags: Vec<String>,
    exclude: Vec<String>,
    include: Vec<String>,
}

impl RestoreOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts snapshot selection to this host.
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

    /// Restricts snapshot selection to this path.
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

    /// Restricts snapshot selection to this tag.
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

    /// Leaves files matching the pattern out of the restore.
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    /// Restores only files matching the pattern.
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include.push(pattern.into());
        self
    }

    /// Compiles to restic arguments: selection filters, then exclude
    /// pairs, then include pairs.
    pub(crate) fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        push_flag_values(&mut args, "--host", &self.hosts);
        push_flag_values(&mut args, "--path", &self.paths);
        push_flag_values(&mut args, "--tag", &self.tags);
        push_flag_values(&mut args, "--exclude", &self.exclude);
        push_flag_values(&mut args, "--include", &self.include);
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_options_compile_to_nothing() {
        assert!(RestoreOptions::new().to_args().is_empty());
    }

    #[test]
    fn filters_precede_exclude_and_include() {
        let args = RestoreOptions::new()
            .include("*.txt")
            .exclude("*.tmp")
            .host("host-1")
            .tag("daily")
            .path("/data")
            .to_args();

        assert_eq!(
            args,
            vec![
                "--host", "host-1", "--path", "/data", "--tag", "daily", "--exclude", "*.tmp",
                "--include", "*.txt",
            ]
        );
    }
}
