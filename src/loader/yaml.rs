//! YAML format support.
//!
//! Same structure as the JSON form, in YAML syntax:
//!
//! ```yaml
//! modules:
//!   - id: 1
//!     path: src/widget.h
//! types:
//!   - id: 2
//!     name: int
//!   - id: 3
//!     name: Widget
//!     class:
//!       module: 1
//!       line: 12
//! ```

use super::format::{FormatCapability, ResultFormat};
use super::records::FileRecords;
use crate::error::{ModelError, ModelResult};

/// YAML format handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlRecords;

impl ResultFormat for YamlRecords {
    fn name(&self) -> &'static str {
        "YAML"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["yaml", "yml"]
    }

    fn capabilities(&self) -> FormatCapability {
        FormatCapability::FULL
    }

    fn read(&self, input: &[u8]) -> ModelResult<FileRecords> {
        #[cfg(feature = "interchange")]
        {
            serde_yaml::from_slice(input)
                .map_err(|e| ModelError::format("YAML", format!("YAML parse error: {e}")))
        }
        #[cfg(not(feature = "interchange"))]
        {
            let _ = input;
            Err(ModelError::Unsupported(
                "YAML reading requires the 'interchange' feature".to_string(),
            ))
        }
    }

    fn write(&self, records: &FileRecords) -> ModelResult<Vec<u8>> {
        #[cfg(feature = "interchange")]
        {
            serde_yaml::to_string(records)
                .map(String::into_bytes)
                .map_err(|e| ModelError::format("YAML", format!("YAML write error: {e}")))
        }
        #[cfg(not(feature = "interchange"))]
        {
            let _ = records;
            Err(ModelError::Unsupported(
                "YAML writing requires the 'interchange' feature".to_string(),
            ))
        }
    }

    fn validate(&self, input: &[u8]) -> ModelResult<()> {
        let content = std::str::from_utf8(input)
            .map_err(|e| ModelError::format("YAML", format!("Invalid UTF-8: {e}")))?;

        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(ModelError::format("YAML", "Empty YAML content"));
        }

        Ok(())
    }
}
