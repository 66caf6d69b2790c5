//! Project loading tests
//!
//! On-disk behavior:
//! - Directory loading with mixed and broken files
//! - Dependency side file under concurrent writers

pub mod tests_deps;
pub mod tests_workspace;
