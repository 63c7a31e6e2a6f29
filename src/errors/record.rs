// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The standardized failure value returned by every public engine operation.

use indexmap::IndexMap;
use serde_json::{json, Value};
use thiserror::Error;

use super::kind::ErrorKind;

/// Boxed underlying cause held exclusively by an [`ErrorRecord`].
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Standardized failure object: kind (and therefore code), message, structured
/// details and an optional wrapped cause.
///
/// # Example
/// ```
/// use process_engine::errors::{ErrorKind, ErrorRecord};
///
/// let err = ErrorRecord::plugin_not_found("missing");
/// assert_eq!(err.kind(), ErrorKind::PluginNotFound);
/// assert_eq!(err.code(), 300);
/// assert_eq!(err.to_string(), "[PLUGIN_NOT_FOUND] plugin 'missing' is not registered");
/// ```
#[derive(Debug, Error)]
#[error("[{}] {}", .kind.name(), .message)]
pub struct ErrorRecord {
    kind: ErrorKind,
    message: String,
    details: IndexMap<String, Value>,
    #[source]
    cause: Option<Cause>,
}

impl ErrorRecord {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: IndexMap::new(),
            cause: None,
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ProcessingFailure, message)
    }

    pub fn unsupported_format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedFormat, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SerializationFailure, message)
    }

    pub fn plugin_not_found(name: &str) -> Self {
        Self::new(
            ErrorKind::PluginNotFound,
            format!("plugin '{}' is not registered", name),
        )
        .with_detail("plugin", name)
    }

    pub fn plugin_init(name: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PluginInitFailure, message).with_detail("plugin", name)
    }

    pub fn plugin_execution(name: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PluginExecutionFailure, message).with_detail("plugin", name)
    }

    /// Attach (or overwrite) one structured detail.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Wrap an underlying error. The record takes sole ownership of it.
    pub fn with_cause(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Convert an arbitrary error into a record, picking the kind from what the
    /// error looks like. Records pass through untouched.
    pub fn classify(err: Cause) -> Self {
        let err = match err.downcast::<ErrorRecord>() {
            Ok(record) => return *record,
            Err(other) => other,
        };

        let kind = match err.downcast_ref::<std::io::Error>().map(|e| e.kind()) {
            Some(std::io::ErrorKind::NotFound) => ErrorKind::NotFound,
            Some(std::io::ErrorKind::PermissionDenied) => ErrorKind::PermissionDenied,
            Some(std::io::ErrorKind::TimedOut) => ErrorKind::Timeout,
            Some(std::io::ErrorKind::ConnectionRefused)
            | Some(std::io::ErrorKind::ConnectionReset)
            | Some(std::io::ErrorKind::ConnectionAborted) => ErrorKind::NetworkFailure,
            Some(std::io::ErrorKind::InvalidInput) | Some(std::io::ErrorKind::InvalidData) => {
                ErrorKind::Validation
            }
            _ if err.is::<serde_json::Error>() => ErrorKind::SerializationFailure,
            _ => ErrorKind::Unknown,
        };

        Self::new(kind, err.to_string()).with_cause(err)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> u16 {
        self.kind.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> &IndexMap<String, Value> {
        &self.details
    }

    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Standardized response document for transport adapters.
    pub fn to_json(&self) -> Value {
        let mut doc = json!({
            "error": true,
            "code": self.code(),
            "code_name": self.kind.name(),
            "message": self.message,
        });

        if !self.details.is_empty() {
            doc["details"] = Value::Object(
                self.details
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            );
        }

        if let Some(cause) = &self.cause {
            doc["cause"] = json!({ "message": cause.to_string() });
        }

        doc
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ErrorRecord>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_carries_kind_name() {
        let err = ErrorRecord::validation("plugin name must not be empty");
        assert_eq!(err.to_string(), "[VALIDATION] plugin name must not be empty");
    }

    #[test]
    fn test_cause_is_exposed_as_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = ErrorRecord::plugin_execution("tts", "synthesis failed").with_cause(io);

        let source = err.source().expect("source should be set");
        assert_eq!(source.to_string(), "disk on fire");
        assert_eq!(err.cause().map(|c| c.to_string()), Some("disk on fire".to_string()));
    }

    #[test]
    fn test_to_json_document() {
        let err = ErrorRecord::plugin_not_found("missing").with_detail("attempt", 2);
        let doc = err.to_json();

        assert_eq!(doc["error"], true);
        assert_eq!(doc["code"], 300);
        assert_eq!(doc["code_name"], "PLUGIN_NOT_FOUND");
        assert_eq!(doc["details"]["plugin"], "missing");
        assert_eq!(doc["details"]["attempt"], 2);
        assert!(doc.get("cause").is_none());
    }

    #[test]
    fn test_classify_io_errors_table_driven() {
        struct TestCase {
            name: &'static str,
            io_kind: std::io::ErrorKind,
            expected: ErrorKind,
        }

        let test_cases = vec![
            TestCase {
                name: "not found",
                io_kind: std::io::ErrorKind::NotFound,
                expected: ErrorKind::NotFound,
            },
            TestCase {
                name: "timed out",
                io_kind: std::io::ErrorKind::TimedOut,
                expected: ErrorKind::Timeout,
            },
            TestCase {
                name: "connection refused",
                io_kind: std::io::ErrorKind::ConnectionRefused,
                expected: ErrorKind::NetworkFailure,
            },
            TestCase {
                name: "invalid data",
                io_kind: std::io::ErrorKind::InvalidData,
                expected: ErrorKind::Validation,
            },
            TestCase {
                name: "other",
                io_kind: std::io::ErrorKind::Other,
                expected: ErrorKind::Unknown,
            },
        ];

        for test_case in test_cases {
            let io = std::io::Error::new(test_case.io_kind, test_case.name);
            let record = ErrorRecord::classify(Box::new(io));
            assert_eq!(record.kind(), test_case.expected, "case '{}'", test_case.name);
            assert!(record.cause().is_some(), "case '{}'", test_case.name);
        }
    }

    #[test]
    fn test_classify_passes_records_through() {
        let original = ErrorRecord::timeout("too slow").with_detail("plugin", "slow");
        let record = ErrorRecord::classify(Box::new(original));
        assert_eq!(record.kind(), ErrorKind::Timeout);
        assert_eq!(record.details()["plugin"], "slow");
        assert!(record.cause().is_none());
    }
}
