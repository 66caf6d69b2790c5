//! Error types for loading and merging per-file results.

use std::path::PathBuf;
use thiserror::Error;

use crate::base::TypeId;

/// Errors that can occur while loading, merging or editing the model.
///
/// [`MalformedInput`](ModelError::MalformedInput) and
/// [`CorruptSequence`](ModelError::CorruptSequence) are local to one per-file
/// result: that file's contribution is dropped and the merge continues.
/// [`ReferenceIntegrityViolation`](ModelError::ReferenceIntegrityViolation)
/// is an engine bug and aborts the whole merge.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A record references an undefined local id or has the wrong arity.
    #[error("Malformed input in {file}: {message} (entity '{entity}', local id {local_id})")]
    MalformedInput {
        file: String,
        entity: String,
        local_id: u32,
        message: String,
    },

    /// Unbalanced statement nesting in an operation.
    #[error("Corrupt statement sequence in {file}: operation '{operation}': {message}")]
    CorruptSequence {
        file: String,
        operation: String,
        message: String,
    },

    /// A model invariant failed after a merge step.
    #[error("Reference integrity violation after {context}: entity '{entity}': {message}")]
    ReferenceIntegrityViolation {
        context: String,
        entity: String,
        message: String,
    },

    /// An entity cannot be erased while reference sites still target it.
    #[error("Entity '{name}' ({id}) is still referenced from {sites} site(s)")]
    StillReferenced { id: TypeId, name: String, sites: usize },

    /// A handle does not name a live entity.
    #[error("Unknown entity {0}")]
    UnknownEntity(TypeId),

    /// Serialization error in one of the record formats.
    #[error("{format} error: {message}")]
    Format {
        format: &'static str,
        message: String,
    },

    /// Unsupported format or format variant.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Exclusive access to a shared side file could not be obtained.
    #[error("Could not lock {} after {attempts} attempt(s)", path.display())]
    LockContention { path: PathBuf, attempts: usize },

    /// IO error during read/write.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ModelError {
    /// Create a malformed input error.
    pub fn malformed(
        file: impl Into<String>,
        entity: impl Into<String>,
        local_id: u32,
        message: impl Into<String>,
    ) -> Self {
        Self::MalformedInput {
            file: file.into(),
            entity: entity.into(),
            local_id,
            message: message.into(),
        }
    }

    /// Create a corrupt sequence error.
    pub fn corrupt_sequence(
        file: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::CorruptSequence {
            file: file.into(),
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a reference integrity violation.
    pub fn integrity(
        context: impl Into<String>,
        entity: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ReferenceIntegrityViolation {
            context: context.into(),
            entity: entity.into(),
            message: message.into(),
        }
    }

    /// Create a format error.
    pub fn format(format: &'static str, message: impl Into<String>) -> Self {
        Self::Format {
            format,
            message: message.into(),
        }
    }

    /// Create an IO error bound to a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true if this error must abort the whole merge rather than one file.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ReferenceIntegrityViolation { .. })
    }

    /// Attach the file identity to a per-file error raised before it was known.
    pub fn in_file(self, path: &str) -> Self {
        match self {
            Self::MalformedInput {
                entity,
                local_id,
                message,
                ..
            } => Self::MalformedInput {
                file: path.to_string(),
                entity,
                local_id,
                message,
            },
            Self::CorruptSequence {
                operation, message, ..
            } => Self::CorruptSequence {
                file: path.to_string(),
                operation,
                message,
            },
            other => other,
        }
    }
}

/// Result alias used across the crate.
pub type ModelResult<T> = Result<T, ModelError>;
