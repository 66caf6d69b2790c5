//! Global id allocation for one merge run.

use crate::base::TypeId;

/// Counter state threaded through a merge run.
///
/// Handles are allocated compactly: only entities that are actually created
/// consume an id. Id `0` is never handed out.
#[derive(Debug, Clone)]
pub struct MergeSession {
    next_id: u32,
    files_merged: usize,
}

impl Default for MergeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeSession {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            files_merged: 0,
        }
    }

    /// The next id that would be allocated.
    pub fn next_id(&self) -> TypeId {
        TypeId(self.next_id)
    }

    pub(crate) fn allocate(&mut self) -> TypeId {
        let id = TypeId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn files_merged(&self) -> usize {
        self.files_merged
    }

    pub(crate) fn file_done(&mut self) {
        self.files_merged += 1;
    }
}
