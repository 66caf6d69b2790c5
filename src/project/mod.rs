//! # Project Loading
//!
//! Turns a directory of per-file results into one merged model, and keeps
//! the dependency side file that tells a build which sources to re-analyze.
//!
//! - [`WorkspaceLoader`] - collect, decode in parallel, merge in path order
//! - [`DependencyFile`] - locked, atomically rewritten `source|time|deps` file
//! - [`LoaderConfig`] / [`RetryConfig`] - loader and lock-retry options

mod config;
pub mod deps;
pub mod file_loader;
mod workspace_loader;

pub use config::{LoaderConfig, RetryConfig};
pub use deps::{DependencyEntry, DependencyFile};
pub use file_loader::{collect_result_files, file_key, load_result_file};
pub use workspace_loader::WorkspaceLoader;
