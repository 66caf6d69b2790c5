//! # codemodel-base
//!
//! Cross-file code model: an entity store for types, classifiers and their
//! members, and the engine that merges independently produced per-file
//! analysis results into one deduplicated model.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project   → Directory loading, dependency side file
//!   ↓
//! integrity → Reference sites, reachability, checked edits
//!   ↓
//! merge     → Two-pass per-file merge, policy, reports
//!   ↓
//! loader    → Record formats, per-file validation, id remapping
//!   ↓
//! model     → Arena, sorted entity store, classifiers and operations
//!   ↓
//! base      → Primitives (TypeId, LocalId, ModuleId, name keys)
//! ```

// ============================================================================
// MODULES (dependency order: base → model → loader → merge → integrity → project)
// ============================================================================

/// Foundation types: ids and normalized name keys
pub mod base;

/// Error type shared by every layer
pub mod error;

/// Entity model: arena, sorted store, classifiers, operations
pub mod model;

/// Per-file results: formats, validation, id remapping
pub mod loader;

/// Cross-file merge engine
pub mod merge;

/// Reference integrity queries and checked edits
pub mod integrity;

/// Directory loading and dependency tracking
pub mod project;

// Re-export commonly needed items
pub use base::{LocalId, ModuleId, TypeId, normalize};
pub use error::{ModelError, ModelResult};
pub use integrity::ReferenceIntegrityChecker;
pub use loader::{FileRecords, LocalGraph, ResultFormat, TextRecords};
pub use merge::{MergeConfig, MergeEngine, MergeReport};
pub use model::{Classifier, ModelGraph, TypeEntity, TypeKind};
pub use project::{DependencyFile, WorkspaceLoader};
