//! Discovery and decoding of per-file result files.

use std::path::{Path, PathBuf};

use crate::error::{ModelError, ModelResult};
use crate::loader::{LocalGraph, detect_format};

/// Recursively collect result files under `dir` whose extension is in
/// `extensions`, sorted by path.
pub fn collect_result_files(dir: &Path, extensions: &[String]) -> ModelResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_recursive(dir, extensions, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_recursive(dir: &Path, extensions: &[String], out: &mut Vec<PathBuf>) -> ModelResult<()> {
    let entries = std::fs::read_dir(dir).map_err(|e| ModelError::io(dir, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| ModelError::io(dir, e))?;
        let path = entry.path();

        if path.is_dir() {
            collect_recursive(&path, extensions, out)?;
        } else if path.is_file() && has_extension(&path, extensions) {
            out.push(path);
        }
    }

    Ok(())
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// File identity used in reports and error messages.
pub fn file_key(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Read, decode and validate one result file.
pub fn load_result_file(path: &Path) -> ModelResult<LocalGraph> {
    let format = detect_format(path).ok_or_else(|| {
        ModelError::Unsupported(format!("Unsupported file extension: {}", path.display()))
    })?;
    let bytes = std::fs::read(path).map_err(|e| ModelError::io(path, e))?;
    LocalGraph::decode(&file_key(path), &bytes, format.as_ref())
}
