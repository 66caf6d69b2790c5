//! # Per-file Result Loading
//!
//! Turns the output of one per-file analysis into something the merge can
//! consume.
//!
//! ```text
//! bytes ──ResultFormat::read──▶ FileRecords ──LocalGraph::build──▶ LocalGraph
//!                                                 (validation)         │
//!                                                                      ▼
//!                                                    IdRemap (during merge)
//! ```
//!
//! ## Formats
//!
//! - [`TextRecords`] - line-oriented `.cmr` dialect, always available
//! - [`JsonRecords`] / [`YamlRecords`] - serde renderings of [`FileRecords`],
//!   behind the `interchange` feature

mod format;
mod json;
mod local;
mod records;
mod remap;
mod text;
mod yaml;

pub use format::{FormatCapability, ResultFormat, detect_format, supported_extensions};
pub use json::JsonRecords;
pub use local::{LocalGeneralization, LocalGraph, LocalType};
pub use records::{
    AttributeRecord, ClassRecord, FileRecords, GeneralizationRecord, ModuleRecord,
    OperationRecord, ParamRecord, StatementRecord, TypeRecord,
};
pub use remap::{IdRemap, Placement};
pub use text::TextRecords;
pub(crate) use text::{escape, split_escaped, unescape};
pub use yaml::YamlRecords;
