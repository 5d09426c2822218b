//! Serialization layer. Defaults to pretty JSON via serde_json.
//!
//! Implement [`Serializer`] if you need a different on-disk encoding.

use crate::document::Document;
use crate::error::{Error, Result};

/// Converts documents to/from bytes for persistence.
pub trait Serializer: Send + Sync {
    /// Encode a document to bytes.
    fn serialize(&self, doc: &Document) -> Result<Vec<u8>>;

    /// Decode bytes back into a document.
    fn deserialize(&self, bytes: &[u8]) -> Result<Document>;
}

/// JSON serializer, pretty (2-space indent) or compact.
#[derive(Debug, Clone)]
pub struct JsonSerializer {
    pretty: bool,
}

impl Default for JsonSerializer {
    fn default() -> Self {
        Self::pretty()
    }
}

impl JsonSerializer {
    /// Compact JSON (single line, no extra whitespace).
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    /// Pretty-printed JSON with 2-space indentation. This is the file format
    /// the backend ships with.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Serializer for JsonSerializer {
    fn serialize(&self, doc: &Document) -> Result<Vec<u8>> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(doc)
        } else {
            serde_json::to_vec(doc)
        };
        bytes.map_err(|e| Error::Serialize(e.to_string()))
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<Document> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
