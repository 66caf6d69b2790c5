//! # Code Model
//!
//! The entity model shared by every downstream consumer: types and
//! classifiers, their attributes and operations, flattened operation bodies,
//! inheritance edges and the modules things were defined in.
//!
//! ## Key Types
//!
//! - [`ModelGraph`] - arena owning every entity, addressed by [`TypeId`](crate::base::TypeId)
//! - [`EntityStore`] - sorted normalized-name index used for dedupe and lookup
//! - [`TypeEntity`] / [`TypeKind`] - a DataType or a [`Classifier`]
//! - [`Operation`] / [`Statements`] - member functions and their bodies
//! - [`TypeRef`] - non-owning, possibly still file-local, type reference

mod graph;
mod operation;
mod store;
mod types;

pub use graph::{Association, ModelGraph, ModelStats};
pub use operation::{NestingError, Operation, Param, Statement, Statements};
pub use store::{EntityStore, StoreEntry};
pub use types::{
    Attribute, Classifier, RefSite, TypeEntity, TypeKind, TypeRef, TypeTarget, Visibility,
};
