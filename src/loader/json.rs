//! JSON format support.
//!
//! The JSON form is the serde rendering of [`FileRecords`]:
//!
//! ```json
//! {
//!   "modules": [{ "id": 1, "path": "src/widget.h" }],
//!   "types": [
//!     { "id": 2, "name": "int" },
//!     { "id": 3, "name": "Widget", "class": { "module": 1, "line": 12,
//!       "attributes": [{ "name": "count", "type_id": 2 }] } }
//!   ],
//!   "generalizations": []
//! }
//! ```

use super::format::{FormatCapability, ResultFormat};
use super::records::FileRecords;
use crate::error::{ModelError, ModelResult};

/// JSON format handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRecords;

impl ResultFormat for JsonRecords {
    fn name(&self) -> &'static str {
        "JSON"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["json"]
    }

    fn capabilities(&self) -> FormatCapability {
        FormatCapability::FULL
    }

    fn read(&self, input: &[u8]) -> ModelResult<FileRecords> {
        #[cfg(feature = "interchange")]
        {
            serde_json::from_slice(input)
                .map_err(|e| ModelError::format("JSON", format!("JSON parse error: {e}")))
        }
        #[cfg(not(feature = "interchange"))]
        {
            let _ = input;
            Err(ModelError::Unsupported(
                "JSON reading requires the 'interchange' feature".to_string(),
            ))
        }
    }

    fn write(&self, records: &FileRecords) -> ModelResult<Vec<u8>> {
        #[cfg(feature = "interchange")]
        {
            serde_json::to_vec_pretty(records)
                .map_err(|e| ModelError::format("JSON", format!("JSON write error: {e}")))
        }
        #[cfg(not(feature = "interchange"))]
        {
            let _ = records;
            Err(ModelError::Unsupported(
                "JSON writing requires the 'interchange' feature".to_string(),
            ))
        }
    }

    fn validate(&self, input: &[u8]) -> ModelResult<()> {
        let content = std::str::from_utf8(input)
            .map_err(|e| ModelError::format("JSON", format!("Invalid UTF-8: {e}")))?;
        if !content.trim_start().starts_with('{') {
            return Err(ModelError::format("JSON", "Expected a JSON object"));
        }
        Ok(())
    }
}
