//! Entity identifiers.
//!
//! Two id spaces exist while a file is being merged:
//!
//! - [`LocalId`] - assigned by the front-end, valid only inside one per-file result.
//!   `0` is reserved for "no type / intrinsic" and is never remapped.
//! - [`TypeId`] - a global handle into the [`ModelGraph`](crate::model::ModelGraph)
//!   type arena. Handles are stable for the rest of the process, including across
//!   a DataType → Classifier upgrade.

use std::fmt;

/// File-local entity identifier, as written by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LocalId(pub u32);

impl LocalId {
    /// The reserved "no type / intrinsic" id.
    pub const NONE: LocalId = LocalId(0);

    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns true for the reserved id `0`.
    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Global handle of a Type or Classifier in the model arena.
///
/// Uses u32 for compact storage. Index `0` is never allocated so that a
/// global id can never be confused with the reserved local id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Get the index into the arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle of a module (source file) in the model's module table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(pub u32);

impl ModuleId {
    pub fn new(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
