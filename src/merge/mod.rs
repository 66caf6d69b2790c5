//! # Cross-file Merge
//!
//! Folds validated per-file results into one deduplicated [`ModelGraph`](crate::model::ModelGraph).
//!
//! ## Key Types
//!
//! - [`MergeEngine`] - owns the graph while files are merged
//! - [`MergeSession`] - global id allocation for one run
//! - [`MergeConfig`] - when to check invariants, whether to collect garbage
//! - [`MergeReport`] - per-file summaries, dropped files and warnings
//!
//! Files are merged sequentially. Decoding and validation are independent per
//! file and can run in parallel beforehand (see
//! [`WorkspaceLoader`](crate::project::WorkspaceLoader)).

mod config;
mod engine;
mod policy;
mod report;
mod session;

pub use config::{IntegrityCheck, MergeConfig};
pub use engine::MergeEngine;
pub use report::{FileFailure, FileSummary, MergeReport, MergeWarning};
pub use session::MergeSession;
