//! Reference integrity tests
//!
//! Checked edits on a merged model:
//! - Replacing one entity with another
//! - Erasing referenced and unreferenced entities
//! - Garbage collection after a merge

pub mod tests_edits;
