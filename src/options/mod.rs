// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed per-call options.
//!
//! Options are a sorted key→[`OptionValue`] map. Plugins declare the keys they
//! understand through [`OptionSpec`]s and the dispatcher rejects anything else
//! before a plugin is invoked. Two keys are reserved for the dispatcher itself
//! and are never forwarded: [`CACHE_OPTION`] and [`TIMEOUT_OPTION`].

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::errors::{ErrorRecord, Result};
use crate::result::Payload;

/// Enables cache lookup/store under the derived cache key.
pub const CACHE_OPTION: &str = "cache";
/// Per-call timeout override in milliseconds.
pub const TIMEOUT_OPTION: &str = "timeout_ms";

const REDACTED: &str = "***";
const SECRET_MARKERS: [&str; 7] = [
    "password",
    "secret",
    "token",
    "api_key",
    "apikey",
    "credential",
    "auth",
];

/// A single option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<OptionValue>),
}

impl OptionValue {
    pub fn kind(&self) -> OptionKind {
        match self {
            OptionValue::Bool(_) => OptionKind::Bool,
            OptionValue::Int(_) => OptionKind::Int,
            OptionValue::Float(_) => OptionKind::Float,
            OptionValue::Text(_) => OptionKind::Text,
            OptionValue::List(_) => OptionKind::List,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            OptionValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Float(n) => Some(*n),
            OptionValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(flag: bool) -> Self {
        OptionValue::Bool(flag)
    }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        OptionValue::Int(n)
    }
}

impl From<f64> for OptionValue {
    fn from(n: f64) -> Self {
        OptionValue::Float(n)
    }
}

impl From<&str> for OptionValue {
    fn from(text: &str) -> Self {
        OptionValue::Text(text.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(text: String) -> Self {
        OptionValue::Text(text)
    }
}

/// The shape an option is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Bool,
    Int,
    /// Accepts integers as well.
    Float,
    Text,
    List,
}

impl OptionKind {
    fn accepts(&self, value: &OptionValue) -> bool {
        matches!((*self, value.kind()), (OptionKind::Float, OptionKind::Int)) || *self == value.kind()
    }
}

impl Display for OptionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OptionKind::Bool => "bool",
            OptionKind::Int => "int",
            OptionKind::Float => "float",
            OptionKind::Text => "text",
            OptionKind::List => "list",
        };
        f.write_str(name)
    }
}

/// One option key a plugin recognizes.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSpec {
    pub key: &'static str,
    pub kind: OptionKind,
    pub description: &'static str,
}

impl OptionSpec {
    pub const fn new(key: &'static str, kind: OptionKind, description: &'static str) -> Self {
        Self { key, kind, description }
    }
}

/// Dispatcher-level controls pulled out of the reserved option keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchControls {
    pub cache: bool,
    pub timeout: Option<Duration>,
}

/// Sorted option map handed to plugins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(BTreeMap<String, OptionValue>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Option<OptionValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<OptionValue> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(OptionValue::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(OptionValue::as_bool)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(OptionValue::as_f64)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterate in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &OptionValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Remove the reserved dispatcher keys and interpret them.
    pub fn split_reserved(mut self) -> Result<(DispatchControls, Options)> {
        let mut controls = DispatchControls::default();

        if let Some(value) = self.0.remove(CACHE_OPTION) {
            controls.cache = value.as_bool().ok_or_else(|| {
                ErrorRecord::validation(format!("option '{}' must be a bool", CACHE_OPTION))
                    .with_detail("option", CACHE_OPTION)
            })?;
        }

        if let Some(value) = self.0.remove(TIMEOUT_OPTION) {
            let millis = integer_like(&value).filter(|ms| *ms > 0).ok_or_else(|| {
                ErrorRecord::validation(format!(
                    "option '{}' must be a positive integer",
                    TIMEOUT_OPTION
                ))
                .with_detail("option", TIMEOUT_OPTION)
            })?;
            controls.timeout = Some(Duration::from_millis(millis as u64));
        }

        Ok((controls, self))
    }

    /// Check every key against the plugin's declared specs.
    pub fn validate(&self, plugin: &str, specs: &[OptionSpec]) -> Result<()> {
        for (key, value) in &self.0 {
            let spec = specs.iter().find(|spec| spec.key == key).ok_or_else(|| {
                ErrorRecord::validation(format!(
                    "plugin '{}' does not recognize option '{}'",
                    plugin, key
                ))
                .with_detail("plugin", plugin)
                .with_detail("option", key.as_str())
            })?;

            if !spec.kind.accepts(value) {
                return Err(ErrorRecord::validation(format!(
                    "option '{}' for plugin '{}' must be {}, got {}",
                    key,
                    plugin,
                    spec.kind,
                    value.kind()
                ))
                .with_detail("plugin", plugin)
                .with_detail("option", key.as_str()));
            }
        }
        Ok(())
    }

    /// JSON view with secret-looking values masked, for error details and logs.
    pub fn redacted(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(key, value)| {
                    let shown = if is_secret_key(key) {
                        Value::String(REDACTED.to_string())
                    } else {
                        serde_json::to_value(value).unwrap_or(Value::Null)
                    };
                    (key.clone(), shown)
                })
                .collect(),
        )
    }
}

impl From<BTreeMap<String, OptionValue>> for Options {
    fn from(map: BTreeMap<String, OptionValue>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for Options {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

fn is_secret_key(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    SECRET_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// `"1"` coerces to `true` on the way in from env vars and the CLI, so a bool
/// stands in for 1 where an integer is expected.
fn integer_like(value: &OptionValue) -> Option<i64> {
    match value {
        OptionValue::Bool(true) => Some(1),
        other => other.as_i64(),
    }
}

/// Deterministic cache key for `(plugin, input, options)`.
///
/// Options are hashed in key order, so insertion order never changes the key.
pub fn derive_cache_key(plugin: &str, input: &Payload, options: &Options) -> String {
    let mut hasher = Sha256::new();
    hash_field(&mut hasher, plugin.as_bytes());
    hash_field(&mut hasher, input.as_bytes());
    for (key, value) in options.iter() {
        hash_field(&mut hasher, key.as_bytes());
        let encoded = serde_json::to_vec(value).unwrap_or_default();
        hash_field(&mut hasher, &encoded);
    }
    format!("{:x}", hasher.finalize())
}

fn hash_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPECS: [OptionSpec; 3] = [
        OptionSpec::new("language", OptionKind::Text, "locale"),
        OptionSpec::new("temperature", OptionKind::Float, "sampling temperature"),
        OptionSpec::new("verbose", OptionKind::Bool, "extra metadata"),
    ];

    #[test]
    fn test_cache_key_ignores_insertion_order() {
        let a = Options::new().with("language", "en-US").with("temperature", 0.5);
        let b = Options::new().with("temperature", 0.5).with("language", "en-US");
        let input = Payload::from("hello");

        assert_eq!(
            derive_cache_key("tts", &input, &a),
            derive_cache_key("tts", &input, &b)
        );
    }

    #[test]
    fn test_cache_key_distinguishes_inputs_table_driven() {
        struct TestCase {
            name: &'static str,
            plugin: &'static str,
            input: &'static str,
            options: Options,
        }

        let base = derive_cache_key("echo", &Payload::from("hello"), &Options::new());
        let test_cases = vec![
            TestCase { name: "other plugin", plugin: "reverse", input: "hello", options: Options::new() },
            TestCase { name: "other input", plugin: "echo", input: "hellO", options: Options::new() },
            TestCase {
                name: "extra option",
                plugin: "echo",
                input: "hello",
                options: Options::new().with("language", "pl-PL"),
            },
            // Length prefixes keep field boundaries apart.
            TestCase { name: "shifted boundary", plugin: "echoh", input: "ello", options: Options::new() },
        ];

        for test_case in test_cases {
            let key = derive_cache_key(test_case.plugin, &Payload::from(test_case.input), &test_case.options);
            assert_ne!(key, base, "case '{}' collided", test_case.name);
        }
    }

    #[test]
    fn test_split_reserved() {
        let options = Options::new()
            .with(CACHE_OPTION, true)
            .with(TIMEOUT_OPTION, 250i64)
            .with("language", "en-US");

        let (controls, rest) = options.split_reserved().unwrap();
        assert!(controls.cache);
        assert_eq!(controls.timeout, Some(Duration::from_millis(250)));
        assert_eq!(rest.len(), 1);
        assert!(!rest.contains_key(CACHE_OPTION));
    }

    #[test]
    fn test_split_reserved_rejects_bad_types() {
        let err = Options::new().with(CACHE_OPTION, "yes").split_reserved().unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Validation);

        let err = Options::new().with(TIMEOUT_OPTION, 0i64).split_reserved().unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Validation);

        let err = Options::new().with(TIMEOUT_OPTION, false).split_reserved().unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Validation);
    }

    #[test]
    fn test_split_reserved_reads_coerced_one_as_timeout() {
        let value: OptionValue = serde_json::from_value(crate::config::coerce_env_value("1")).unwrap();
        let (controls, _) = Options::new().with(TIMEOUT_OPTION, value).split_reserved().unwrap();
        assert_eq!(controls.timeout, Some(Duration::from_millis(1)));
    }

    #[test]
    fn test_validate_table_driven() {
        struct TestCase {
            name: &'static str,
            options: Options,
            ok: bool,
        }

        let test_cases = vec![
            TestCase { name: "empty", options: Options::new(), ok: true },
            TestCase { name: "known text", options: Options::new().with("language", "en-US"), ok: true },
            TestCase { name: "int accepted as float", options: Options::new().with("temperature", 1i64), ok: true },
            TestCase { name: "unknown key", options: Options::new().with("volume", 3i64), ok: false },
            TestCase { name: "wrong kind", options: Options::new().with("verbose", "true"), ok: false },
        ];

        for test_case in test_cases {
            let outcome = test_case.options.validate("tts", &SPECS);
            assert_eq!(outcome.is_ok(), test_case.ok, "case '{}'", test_case.name);
        }
    }

    #[test]
    fn test_redacted_masks_secret_keys() {
        let options = Options::new()
            .with("api_key", "sk-123")
            .with("AuthHeader", "Bearer x")
            .with("language", "en-US");

        let shown = options.redacted();
        assert_eq!(shown["api_key"], "***");
        assert_eq!(shown["AuthHeader"], "***");
        assert_eq!(shown["language"], "en-US");
    }

    #[test]
    fn test_options_deserialize_from_json() {
        let options: Options =
            serde_json::from_str(r#"{"cache": true, "temperature": 0.7, "tags": ["a", "b"]}"#).unwrap();
        assert_eq!(options.get_bool("cache"), Some(true));
        assert_eq!(options.get_f64("temperature"), Some(0.7));
        assert_eq!(options.get("tags").map(|v| v.kind()), Some(OptionKind::List));
    }
}
