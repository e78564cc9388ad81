use super::push_flag_values;

/// Options for a backup run.
#[derive(Debug, Clone, Default)]
pub struct BackupOptions {
    host: Option<String>,
    tags: Vec<String>,
    exclude: Vec<String>,
    include: Vec<String>,
}

impl BackupOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the snapshot under this hostname instead of the local one.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Adds a tag to the snapshot.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Adds several tags at once, preserving their order.
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Excludes files matching the pattern from the backup.
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    /// Explicitly includes files matching the pattern.
    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include.push(pattern.into());
        self
    }

    /// Compiles to restic arguments: host flag, then tag pairs, then
    /// exclude pairs, then include pairs.
    pub(crate) fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(host) = &self.host {
            args.push("--host".to_string());
            args.push(host.clone());
        }
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
        assert!(BackupOptions::new().to_args().is_empty());
    }

    #[test]
    fn flag_ordering_is_fixed_regardless_of_build_order() {
        let args = BackupOptions::new()
            .include("*.txt")
            .tag("daily")
            .exclude("*.tmp")
            .host("host-1")
            .tag("weekly")
            .to_args();

        assert_eq!(
            args,
            vec![
                "--host", "host-1", "--tag", "daily", "--tag", "weekly", "--exclude", "*.tmp",
                "--include", "*.txt",
            ]
        );
    }

    #[test]
    fn compilation_is_idempotent() {
        let options = BackupOptions::new().host("h").tags(["a", "b"]);
        assert_eq!(options.to_args(), options.to_args());
    }

    #[test]
    fn every_flag_is_followed_by_its_value() {
        let args = BackupOptions::new()
            .host("h")
            .tags(["a", "b"])
            .exclude("x")
            .include("y")
            .to_args();
        assert_eq!(args.len() % 2, 0);
        for pair in args.chunks(2) {
            assert!(pair[0].starts_with("--"));
            assert!(!pair[1].starts_with("--"));
        }
    }
}
