//! Foundation types for the code model.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`LocalId`], [`TypeId`], [`ModuleId`] - file-local and global identifiers
//! - [`normalize`], [`template_definition_key`] - type name lookup keys
//!
//! This module has NO dependencies on other codemodel modules.

mod ids;
pub mod name;

pub use ids::{LocalId, ModuleId, TypeId};
pub use name::{compare_keys, is_template_spelling, normalize, template_definition_key};
