//! Directory loading: per-file results are decoded and validated in
//! parallel, then merged one at a time in path order.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};

use super::config::LoaderConfig;
use super::file_loader::{self, file_key, load_result_file};
use crate::error::{ModelError, ModelResult};
use crate::loader::LocalGraph;
use crate::merge::{FileSummary, MergeEngine, MergeReport};
use crate::model::ModelGraph;

/// Loads a directory (or list) of per-file results into one model.
///
/// Files are decoded and validated on the rayon pool, then merged one at a
/// time in sorted path order, so the resulting handles do not depend on
/// thread scheduling.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceLoader {
    config: LoaderConfig,
}

impl WorkspaceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Loads every result file under a directory.
    pub fn load_directory<P: AsRef<Path>>(&self, path: P) -> ModelResult<(ModelGraph, MergeReport)> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(ModelError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "directory not found"),
            ));
        }
        let paths = file_loader::collect_result_files(path, &self.config.extensions)?;
        debug!("Found {} result file(s) in {}", paths.len(), path.display());
        self.load_files(&paths)
    }

    /// Loads the given result files.
    pub fn load_files(&self, paths: &[PathBuf]) -> ModelResult<(ModelGraph, MergeReport)> {
        let mut engine = MergeEngine::with_config(self.config.merge);
        engine.merge_all(self.decode_all(paths))?;
        let (graph, report) = engine.finish()?;

        if !report.failures.is_empty() {
            warn!(
                "Failed to load {} file(s):\n  {}",
                report.failures.len(),
                report
                    .failures
                    .iter()
                    .map(|f| format!("{}: {}", f.file, f.message))
                    .collect::<Vec<_>>()
                    .join("\n  ")
            );
        }
        Ok((graph, report))
    }

    /// Merges a single file into an existing engine.
    pub fn load_file_into<P: AsRef<Path>>(
        &self,
        path: P,
        engine: &mut MergeEngine,
    ) -> ModelResult<FileSummary> {
        let path = path.as_ref();
        engine.merge_loaded(&file_key(path), load_result_file(path))
    }

    fn decode_all(&self, paths: &[PathBuf]) -> Vec<(String, ModelResult<LocalGraph>)> {
        let mut sorted = paths.to_vec();
        sorted.sort();
        sorted.dedup();

        let decode = |path: &PathBuf| (file_key(path), load_result_file(path));
        if self.config.parallel {
            sorted.par_iter().map(decode).collect()
        } else {
            sorted.iter().map(decode).collect()
        }
    }
}
