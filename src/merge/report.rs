//! Outcome of a merge run.

use std::fmt;

use crate::base::TypeId;

/// What merging one file did to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub file: String,
    /// First global id that was free when the file was merged.
    pub offset: TypeId,
    /// Local types that became new entities.
    pub promoted: usize,
    /// Local types that matched existing entities.
    pub folded: usize,
    /// DataTypes turned into classifiers.
    pub upgraded: usize,
    pub attributes_added: usize,
    pub operations_added: usize,
    /// Declarations replaced by a definition.
    pub operations_replaced: usize,
    pub associations_added: usize,
    pub warnings: usize,
}

impl FileSummary {
    pub(crate) fn new(file: &str, offset: TypeId) -> Self {
        Self {
            file: file.to_string(),
            offset,
            promoted: 0,
            folded: 0,
            upgraded: 0,
            attributes_added: 0,
            operations_added: 0,
            operations_replaced: 0,
            associations_added: 0,
            warnings: 0,
        }
    }
}

/// A recoverable oddity found while merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeWarning {
    /// A classifier is defined in two modules with conflicting members; the
    /// later version of each listed member was dropped.
    AmbiguousClassifier {
        file: String,
        name: String,
        kept_module: String,
        discarded_module: String,
        members: Vec<String>,
    },
    /// An operation has bodies in two modules; the later body was dropped.
    AmbiguousOperation {
        file: String,
        classifier: String,
        operation: String,
        kept_module: String,
        discarded_module: String,
    },
}

impl fmt::Display for MergeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmbiguousClassifier {
                file,
                name,
                kept_module,
                discarded_module,
                members,
            } => write!(
                f,
                "{file}: classifier '{name}' defined in '{kept_module}' and '{discarded_module}' disagrees on {}; keeping '{kept_module}'",
                members.join(", ")
            ),
            Self::AmbiguousOperation {
                file,
                classifier,
                operation,
                kept_module,
                discarded_module,
            } => write!(
                f,
                "{file}: '{classifier}::{operation}' has bodies in '{kept_module}' and '{discarded_module}'; keeping '{kept_module}'"
            ),
        }
    }
}

/// A file whose contribution was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub file: String,
    /// Rendered [`ModelError`](crate::error::ModelError).
    pub message: String,
}

/// Everything that happened during a merge run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub files: Vec<FileSummary>,
    pub failures: Vec<FileFailure>,
    pub warnings: Vec<MergeWarning>,
    /// Entities removed by garbage collection or explicit erasure.
    pub erased: usize,
}

impl MergeReport {
    pub fn merged_files(&self) -> usize {
        self.files.len()
    }

    pub fn failed_files(&self) -> usize {
        self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.warnings.is_empty()
    }

    pub fn summary(&self, file: &str) -> Option<&FileSummary> {
        self.files.iter().find(|s| s.file == file)
    }
}
