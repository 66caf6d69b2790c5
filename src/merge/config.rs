//! Merge configuration.

/// When the reference integrity checker runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityCheck {
    /// After every merged file.
    EachFile,
    /// Once, when the merge is finished.
    Final,
    /// Never.
    Never,
}

impl Default for IntegrityCheck {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::EachFile
        } else {
            Self::Final
        }
    }
}

/// Options for [`MergeEngine`](super::MergeEngine).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeConfig {
    pub integrity_check: IntegrityCheck,
    /// Erase unreachable, undefined entities when the merge finishes.
    /// Off by default: merged entities live until explicitly erased.
    pub collect_garbage: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            integrity_check: IntegrityCheck::default(),
            collect_garbage: false,
        }
    }
}

impl MergeConfig {
    /// Check after every file and keep every entity. Used by tests.
    pub fn strict() -> Self {
        Self {
            integrity_check: IntegrityCheck::EachFile,
            collect_garbage: false,
        }
    }
}
