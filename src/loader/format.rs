//! Common trait for per-file result formats.

use std::path::Path;

use super::json::JsonRecords;
use super::records::FileRecords;
use super::text::TextRecords;
use super::yaml::YamlRecords;
use crate::error::ModelResult;

/// File name used in errors raised before the real path is known.
pub(crate) const UNNAMED_INPUT: &str = "<input>";

/// Capabilities supported by a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatCapability {
    /// Can read per-file results.
    pub read: bool,
    /// Can write per-file results.
    pub write: bool,
    /// Preserves every field of [`FileRecords`].
    pub lossless: bool,
}

impl FormatCapability {
    /// Full capability (read, write, lossless).
    pub const FULL: Self = Self {
        read: true,
        write: true,
        lossless: true,
    };
}

/// Trait for per-file result formats.
///
/// A format converts between raw bytes and an unvalidated [`FileRecords`]
/// set. Validation (local ids, module ids, nesting) happens later, in
/// [`LocalGraph::build`](super::LocalGraph::build), so every format gets
/// the same checks.
///
/// Errors raised by `read` are reported against the placeholder file
/// `<input>`; callers that know the path rebind them with
/// [`ModelError::in_file`](crate::error::ModelError::in_file).
pub trait ResultFormat: Send + Sync {
    /// Human-readable name of the format.
    fn name(&self) -> &'static str;

    /// File extension(s) for this format.
    fn extensions(&self) -> &'static [&'static str];

    /// Capabilities of this format implementation.
    fn capabilities(&self) -> FormatCapability;

    /// Read a record set from bytes.
    fn read(&self, input: &[u8]) -> ModelResult<FileRecords>;

    /// Write a record set to bytes.
    fn write(&self, records: &FileRecords) -> ModelResult<Vec<u8>>;

    /// Validate that the input is well-formed for this format.
    ///
    /// This is a quick check that doesn't fully parse the content.
    fn validate(&self, input: &[u8]) -> ModelResult<()> {
        let _ = input;
        Ok(())
    }
}

/// Supported file extensions for per-file results.
pub fn supported_extensions() -> &'static [&'static str] {
    &["cmr", "json", "yaml", "yml"]
}

/// Detect format from file extension.
pub fn detect_format(path: &Path) -> Option<Box<dyn ResultFormat>> {
    let ext = path.extension()?.to_str()?;
    match ext.to_lowercase().as_str() {
        "cmr" => Some(Box::new(TextRecords)),
        "json" => Some(Box::new(JsonRecords)),
        "yaml" | "yml" => Some(Box::new(YamlRecords)),
        _ => None,
    }
}
