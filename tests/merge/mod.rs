//! Merge engine tests
//!
//! Cross-file behavior of the two-pass merge:
//! - Identity folding and DataType upgrades
//! - Declaration/definition reconciliation
//! - Template definition lookup
//! - Failure isolation and ambiguity warnings

pub mod tests_failures;
pub mod tests_properties;
pub mod tests_scenarios;
