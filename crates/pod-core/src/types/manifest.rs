//! Package manifest document.
//!
//! Models the npm package document ("packument") served for `GET /<name>`.
//! The document is kept as an ordered JSON object: the only field Pod ever
//! changes is `_attachments`, so nothing else is interpreted or validated.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key holding inline tarball payloads
pub const ATTACHMENTS_FIELD: &str = "_attachments";

/// Package document keyed by package name
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageManifest {
    fields: Map<String, Value>,
}

impl PackageManifest {
    /// Parse a manifest from stored bytes
    ///
    /// Anything other than a JSON object is rejected.
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Replace `_attachments` with an empty object
    ///
    /// An existing key keeps its position; a missing one is appended.
    pub fn strip_attachments(&mut self) {
        self.fields
            .insert(ATTACHMENTS_FIELD.to_string(), Value::Object(Map::new()));
    }

    /// Number of inline attachments; non-object values count as none
    pub fn attachment_count(&self) -> usize {
        self.fields
            .get(ATTACHMENTS_FIELD)
            .and_then(Value::as_object)
            .map_or(0, Map::len)
    }
}
