// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Result envelope produced by plugins.
//!
//! A [`ProcessResult`] is a value object: its id is assigned once in
//! [`make_result`] and none of its fields can change afterwards. Results are
//! shared as `Arc<ProcessResult>` between the dispatcher, its cache and callers.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use indexmap::IndexMap;
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Ordered, plugin-defined metadata attached to a result.
pub type Metadata = IndexMap<String, Value>;

/// Processing input or output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Payload {
    Text(String),
    Bytes(Vec<u8>),
}

impl Payload {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Text(text) => text.as_bytes(),
            Payload::Bytes(bytes) => bytes,
        }
    }

    /// Text view of the payload; binary payloads qualify when they are valid UTF-8.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            Payload::Bytes(bytes) => std::str::from_utf8(bytes).ok(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Payload::Text(text) => text.into_bytes(),
            Payload::Bytes(bytes) => bytes,
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Bytes(bytes.to_vec())
    }
}

// Binary payloads travel as base64 so results can be returned as JSON as-is.
impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Payload", 2)?;
        match self {
            Payload::Text(text) => {
                state.serialize_field("encoding", "utf8")?;
                state.serialize_field("value", text)?;
            }
            Payload::Bytes(bytes) => {
                state.serialize_field("encoding", "base64")?;
                state.serialize_field("value", &STANDARD.encode(bytes))?;
            }
        }
        state.end()
    }
}

/// Immutable processing output: id, payload, format tag and metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessResult {
    result_id: String,
    data: Payload,
    format: String,
    metadata: Metadata,
}

impl ProcessResult {
    pub fn result_id(&self) -> &str {
        &self.result_id
    }

    pub fn data(&self) -> &Payload {
        &self.data
    }

    /// Short shape tag, e.g. `text`, `json`, `wav`.
    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

/// Build a result with a fresh, unique `result_id`.
///
/// # Example
/// ```
/// use process_engine::result::{make_result, Metadata};
///
/// let a = make_result("HELLO", "text", Metadata::new());
/// let b = make_result("HELLO", "text", Metadata::new());
/// assert_ne!(a.result_id(), b.result_id());
/// assert_eq!(a.data().as_text(), Some("HELLO"));
/// ```
pub fn make_result(data: impl Into<Payload>, format: impl Into<String>, metadata: Metadata) -> ProcessResult {
    ProcessResult {
        result_id: Uuid::new_v4().to_string(),
        data: data.into(),
        format: format.into(),
        metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_result_ids_are_unique_and_non_empty() {
        let ids: HashSet<String> = (0..1000)
            .map(|_| make_result("x", "text", Metadata::new()).result_id().to_string())
            .collect();
        assert_eq!(ids.len(), 1000);
        assert!(ids.iter().all(|id| !id.is_empty()));
    }

    #[test]
    fn test_metadata_keeps_insertion_order() {
        let mut metadata = Metadata::new();
        metadata.insert("zeta".to_string(), json!(1));
        metadata.insert("alpha".to_string(), json!("two"));
        metadata.insert("mid".to_string(), json!({"nested": true}));

        let result = make_result("x", "text", metadata);
        let keys: Vec<&str> = result.metadata().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_payload_views() {
        let text = Payload::from("héllo");
        assert_eq!(text.as_text(), Some("héllo"));
        assert_eq!(text.len(), "héllo".len());

        let binary = Payload::from(vec![0xff, 0x00]);
        assert_eq!(binary.as_text(), None);
        assert_eq!(binary.as_bytes(), &[0xff, 0x00]);
        assert!(!binary.is_empty());
    }

    #[test]
    fn test_serialization_encodes_binary_as_base64() {
        let result = make_result(b"RIFF".to_vec(), "wav", Metadata::new());
        let doc = serde_json::to_value(&result).unwrap();

        assert_eq!(doc["format"], "wav");
        assert_eq!(doc["data"]["encoding"], "base64");
        assert_eq!(doc["data"]["value"], "UklGRg==");
        assert_eq!(doc["result_id"], result.result_id());
    }

    #[test]
    fn test_serialization_keeps_text_readable() {
        let result = make_result("HELLO", "text", Metadata::new());
        let doc = serde_json::to_value(&result).unwrap();
        assert_eq!(doc["data"], json!({"encoding": "utf8", "value": "HELLO"}));
    }
}
