//! # Reference Integrity
//!
//! Queries over the handles the model holds, and the edits that must not
//! leave any of them dangling.
//!
//! - [`ReferenceIntegrityChecker`] - reference sites, reachability, invariant checks
//! - [`replace_type`] / [`erase_type`] / [`collect_garbage`] - checked removal
//!
//! A failed [`verify`](ReferenceIntegrityChecker::verify) is a
//! [`ReferenceIntegrityViolation`](crate::error::ModelError::ReferenceIntegrityViolation):
//! it means the merge itself is wrong and aborts the run.

mod checker;
mod edit;

pub use checker::{ReferenceIntegrityChecker, ReferenceSite};
pub use edit::{collect_garbage, erase_type, replace_type};
