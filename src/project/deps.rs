//! Dependency-tracking side file.
//!
//! Records, per source file, when it was last parsed and which files it
//! depends on, so a build can skip sources whose results are still fresh.
//!
//! ```text
//! <source>|<unix seconds>|<dep>;<dep>;...
//! ```
//!
//! Fields use the same escaping as the `.cmr` record dialect. Several
//! processes may update the file at once: every mutation holds an exclusive
//! `<path>.lock` file, and the new content is written to `<path>.tmp` and
//! renamed over the old one. A lock older than [`RetryConfig::stale_lock`]
//! was left by a process that died holding it and is removed.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use super::config::RetryConfig;
use crate::error::{ModelError, ModelResult};
use crate::loader::{escape, split_escaped, unescape};

/// One source file's entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEntry {
    pub source: String,
    /// Unix seconds of the last parse.
    pub parsed_at: u64,
    pub dependencies: Vec<String>,
}

/// Handle to a dependency side file on disk.
#[derive(Debug, Clone)]
pub struct DependencyFile {
    path: PathBuf,
    retry: RetryConfig,
}

/// Removes the lock file when dropped.
struct LockGuard {
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            debug!("Failed to release lock {}: {}", self.path.display(), e);
        }
    }
}

impl DependencyFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock_path(&self) -> PathBuf {
        sibling(&self.path, ".lock")
    }

    /// All entries, keyed by source. A missing file has no entries.
    pub fn read(&self) -> ModelResult<IndexMap<String, DependencyEntry>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(IndexMap::new()),
            Err(e) => return Err(ModelError::io(&self.path, e)),
        };
        self.parse(&content)
    }

    /// Record that `source` was parsed now, with the given dependencies.
    pub fn update(&self, source: &str, dependencies: &[String]) -> ModelResult<()> {
        self.update_at(source, unix_now(), dependencies)
    }

    /// Record that `source` was parsed at `parsed_at` (unix seconds).
    pub fn update_at(&self, source: &str, parsed_at: u64, dependencies: &[String]) -> ModelResult<()> {
        self.modify(|entries| {
            entries.insert(
                source.to_string(),
                DependencyEntry {
                    source: source.to_string(),
                    parsed_at,
                    dependencies: dependencies.to_vec(),
                },
            );
        })
    }

    /// Forget `source`. Returns true if it had an entry.
    pub fn remove(&self, source: &str) -> ModelResult<bool> {
        self.modify(|entries| entries.shift_remove(source).is_some())
    }

    /// Returns true if `source` has no entry or was last parsed before
    /// `modified` (unix seconds).
    pub fn is_stale(&self, source: &str, modified: u64) -> ModelResult<bool> {
        Ok(self
            .read()?
            .get(source)
            .is_none_or(|entry| entry.parsed_at < modified))
    }

    /// Sources that list `dependency` among their dependencies.
    pub fn dependents_of(&self, dependency: &str) -> ModelResult<Vec<String>> {
        Ok(self
            .read()?
            .into_values()
            .filter(|entry| entry.dependencies.iter().any(|d| d == dependency))
            .map(|entry| entry.source)
            .collect())
    }

    fn modify<T>(&self, f: impl FnOnce(&mut IndexMap<String, DependencyEntry>) -> T) -> ModelResult<T> {
        let _guard = self.lock()?;
        let mut entries = self.read()?;
        let result = f(&mut entries);
        entries.sort_keys();
        self.write(&entries)?;
        Ok(result)
    }

    fn lock(&self) -> ModelResult<LockGuard> {
        let lock_path = self.lock_path();
        for attempt in 0..=self.retry.retries {
            if let Some(guard) = try_lock(&lock_path)? {
                return Ok(guard);
            }
            if self.break_stale_lock(&lock_path) || attempt == self.retry.retries {
                continue;
            }
            let backoff = self.retry.backoff(attempt);
            trace!(
                "{} is locked, retrying in {:?} ({}/{})",
                self.path.display(),
                backoff,
                attempt + 1,
                self.retry.retries
            );
            std::thread::sleep(backoff);
        }
        Err(ModelError::LockContention {
            path: lock_path,
            attempts: self.retry.retries + 1,
        })
    }

    /// Remove `lock_path` if it is older than the stale-lock age.
    /// Returns true if the lock is gone.
    fn break_stale_lock(&self, lock_path: &Path) -> bool {
        let age = match fs::metadata(lock_path).and_then(|m| m.modified()) {
            Ok(modified) => SystemTime::now()
                .duration_since(modified)
                .unwrap_or_default(),
            Err(e) => return e.kind() == ErrorKind::NotFound,
        };
        if age < self.retry.stale_lock {
            return false;
        }
        warn!(
            "Removing stale lock {} (held for {:?})",
            lock_path.display(),
            age
        );
        match fs::remove_file(lock_path) {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => true,
            Err(e) => {
                debug!("Failed to remove stale lock {}: {}", lock_path.display(), e);
                false
            }
        }
    }

    fn write(&self, entries: &IndexMap<String, DependencyEntry>) -> ModelResult<()> {
        let mut out = String::new();
        for entry in entries.values() {
            let deps: Vec<String> = entry.dependencies.iter().map(|d| escape(d)).collect();
            out.push_str(&format!(
                "{}|{}|{}\n",
                escape(&entry.source),
                entry.parsed_at,
                deps.join(";")
            ));
        }

        let tmp = sibling(&self.path, ".tmp");
        fs::write(&tmp, out).map_err(|e| ModelError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| ModelError::io(&self.path, e))
    }

    fn parse(&self, content: &str) -> ModelResult<IndexMap<String, DependencyEntry>> {
        let file = self.path.display().to_string();
        let mut entries = IndexMap::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let fields = split_escaped(line, '|');
            if fields.len() != 3 {
                return Err(ModelError::malformed(
                    &file,
                    line,
                    0,
                    format!("line {}: expected source|time|deps", idx + 1),
                ));
            }
            let source = unescape(fields[0]);
            let parsed_at = fields[1].trim().parse().map_err(|_| {
                ModelError::malformed(
                    &file,
                    &source,
                    0,
                    format!("line {}: invalid time '{}'", idx + 1, fields[1]),
                )
            })?;
            let dependencies = if fields[2].is_empty() {
                Vec::new()
            } else {
                split_escaped(fields[2], ';').into_iter().map(unescape).collect()
            };
            entries.insert(
                source.clone(),
                DependencyEntry {
                    source,
                    parsed_at,
                    dependencies,
                },
            );
        }
        Ok(entries)
    }
}

/// Create `lock_path` exclusively. `None` if another process holds it.
fn try_lock(lock_path: &Path) -> ModelResult<Option<LockGuard>> {
    match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(lock_path)
    {
        Ok(_) => Ok(Some(LockGuard {
            path: lock_path.to_path_buf(),
        })),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(None),
        Err(e) => Err(ModelError::io(lock_path, e)),
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
