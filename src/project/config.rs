//! Loader and side-file configuration.

use std::time::Duration;

use crate::merge::MergeConfig;

const DEFAULT_STALE_LOCK: Duration = Duration::from_secs(30);

/// Retry policy for contended side-file locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Number of retry attempts after the first try.
    pub retries: usize,
    /// Initial backoff duration between retries.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Age after which a lock file is treated as abandoned.
    pub stale_lock: Duration,
}

impl RetryConfig {
    pub fn new(retries: usize, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            retries,
            initial_backoff: Duration::from_millis(initial_backoff_ms),
            max_backoff: Duration::from_millis(max_backoff_ms),
            stale_lock: DEFAULT_STALE_LOCK,
        }
    }

    pub fn with_stale_lock(mut self, stale_lock: Duration) -> Self {
        self.stale_lock = stale_lock;
        self
    }

    /// Backoff before retry number `attempt` (0-based), doubling up to the cap.
    pub fn backoff(&self, attempt: usize) -> Duration {
        let mut backoff = self.initial_backoff;
        for _ in 0..attempt {
            backoff = std::cmp::min(backoff * 2, self.max_backoff);
        }
        std::cmp::min(backoff, self.max_backoff)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: 8,
            initial_backoff: Duration::from_millis(25),
            max_backoff: Duration::from_millis(1000),
            stale_lock: DEFAULT_STALE_LOCK,
        }
    }
}

/// Options for [`WorkspaceLoader`](super::WorkspaceLoader).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// File extensions treated as per-file results, without the dot.
    pub extensions: Vec<String>,
    /// Decode and validate files on the rayon pool.
    pub parallel: bool,
    pub merge: MergeConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            extensions: crate::loader::supported_extensions()
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            parallel: true,
            merge: MergeConfig::default(),
        }
    }
}

impl LoaderConfig {
    /// Only pick up files with the given extensions.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_merge(mut self, merge: MergeConfig) -> Self {
        self.merge = merge;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}
