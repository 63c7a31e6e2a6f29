// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::consts::{
    CACHE_CAPACITY_KEY, CACHE_TTL_SECS_KEY, DEFAULT_CACHE_CAPACITY, DEFAULT_ENVIRONMENT,
    DEFAULT_LOG_LEVEL, DEFAULT_TIMEOUT_MS, ENVIRONMENT_KEY, LOG_LEVEL_KEY, PLUGINS_KEY,
    TIMEOUT_MS_KEY,
};
use crate::config::ConfigSnapshot;
use crate::errors::{ErrorRecord, Result};

/// Typed engine knobs extracted from a [`ConfigSnapshot`].
///
/// # Fields
/// * `timeout` - Default per-call plugin timeout (`timeout_ms`)
/// * `cache_capacity` - Maximum number of cached results (`cache_capacity`)
/// * `cache_ttl` - Optional lifetime of cached results (`cache_ttl_secs`)
/// * `environment` - Active environment name
/// * `log_level` - Default tracing filter when `RUST_LOG` is unset
/// * `plugins` - Plugins to register from configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub timeout: Duration,
    pub cache_capacity: NonZeroUsize,
    pub cache_ttl: Option<Duration>,
    pub environment: String,
    pub log_level: String,
    pub plugins: Vec<PluginEntry>,
}

/// A plugin declared in configuration, bound to a built-in implementation.
///
/// # Example
/// ```yaml
/// plugins:
///   - name: shout
///     implementation: change_text_case
///     options:
///       case: upper
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginEntry {
    pub name: String,
    pub implementation: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub options: IndexMap<String, Value>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            cache_capacity: NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            cache_ttl: None,
            environment: DEFAULT_ENVIRONMENT.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            plugins: Vec::new(),
        }
    }
}

impl EngineSettings {
    /// Extract and validate settings. Absent keys fall back to the defaults.
    ///
    /// # Errors
    /// `configuration` for non-positive or mistyped numbers, a malformed
    /// `plugins` list, or duplicate plugin names.
    pub fn from_snapshot(snapshot: &ConfigSnapshot) -> Result<Self> {
        let defaults = Self::default();

        let timeout = match positive_u64(snapshot, TIMEOUT_MS_KEY)? {
            Some(ms) => Duration::from_millis(ms),
            None => defaults.timeout,
        };

        let cache_capacity = match positive_u64(snapshot, CACHE_CAPACITY_KEY)? {
            Some(capacity) => usize::try_from(capacity)
                .ok()
                .and_then(NonZeroUsize::new)
                .ok_or_else(|| invalid(CACHE_CAPACITY_KEY, "is too large"))?,
            None => defaults.cache_capacity,
        };

        let cache_ttl = positive_u64(snapshot, CACHE_TTL_SECS_KEY)?.map(Duration::from_secs);

        let environment = string(snapshot, ENVIRONMENT_KEY)?.unwrap_or(defaults.environment);
        let log_level = string(snapshot, LOG_LEVEL_KEY)?.unwrap_or(defaults.log_level);

        let plugins = match snapshot.get(PLUGINS_KEY) {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => serde_json::from_value::<Vec<PluginEntry>>(value.clone()).map_err(|e| {
                invalid(PLUGINS_KEY, &format!("is malformed: {}", e)).with_cause(e)
            })?,
        };

        let mut seen = HashSet::new();
        if let Some(duplicate) = plugins.iter().find(|entry| !seen.insert(entry.name.as_str())) {
            return Err(invalid(
                PLUGINS_KEY,
                &format!("declares plugin '{}' more than once", duplicate.name),
            ));
        }

        Ok(Self {
            timeout,
            cache_capacity,
            cache_ttl,
            environment,
            log_level,
            plugins,
        })
    }
}

fn invalid(key: &str, problem: &str) -> ErrorRecord {
    ErrorRecord::configuration(format!("setting '{}' {}", key, problem)).with_detail("setting", key)
}

fn positive_u64(snapshot: &ConfigSnapshot, key: &str) -> Result<Option<u64>> {
    match snapshot.get(key) {
        None | Some(Value::Null) => Ok(None),
        // `PROCESS_*=1` arrives as `true`; see `coerce_env_value`.
        Some(Value::Bool(true)) => Ok(Some(1)),
        Some(value) => match value.as_u64() {
            Some(n) if n > 0 => Ok(Some(n)),
            _ => Err(invalid(key, &format!("must be a positive integer, got {}", value))),
        },
    }
}

fn string(snapshot: &ConfigSnapshot, key: &str) -> Result<Option<String>> {
    match snapshot.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(Some(s.clone())),
        Some(value) => Err(invalid(key, &format!("must be a non-empty string, got {}", value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::errors::ErrorKind;
    use serde_json::json;

    fn snapshot_with(pairs: &[(&str, Value)]) -> ConfigSnapshot {
        pairs
            .iter()
            .fold(ConfigLoader::new("process").with_env_vars(Vec::new()), |loader, (k, v)| {
                loader.with_override(*k, v.clone())
            })
            .load()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = EngineSettings::from_snapshot(&snapshot_with(&[])).unwrap();
        assert_eq!(settings, EngineSettings::default());
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.cache_capacity.get(), 256);
        assert_eq!(settings.cache_ttl, None);
    }

    #[test]
    fn test_explicit_values() {
        let settings = EngineSettings::from_snapshot(&snapshot_with(&[
            (TIMEOUT_MS_KEY, json!(250)),
            (CACHE_CAPACITY_KEY, json!(8)),
            (CACHE_TTL_SECS_KEY, json!(60)),
            (LOG_LEVEL_KEY, json!("debug")),
            (
                PLUGINS_KEY,
                json!([
                    {"name": "shout", "implementation": "change_text_case", "options": {"case": "upper"}},
                    {"name": "tts", "implementation": "speech_synthesis"}
                ]),
            ),
        ]))
        .unwrap();

        assert_eq!(settings.timeout, Duration::from_millis(250));
        assert_eq!(settings.cache_capacity.get(), 8);
        assert_eq!(settings.cache_ttl, Some(Duration::from_secs(60)));
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.plugins.len(), 2);
        assert_eq!(settings.plugins[0].options["case"], "upper");
        assert!(settings.plugins[1].options.is_empty());
    }

    #[test]
    fn test_env_value_of_one_is_read_as_integer() {
        let snapshot = ConfigLoader::new("process")
            .with_env_vars(vec![
                ("PROCESS_CACHE_CAPACITY".to_string(), "1".to_string()),
                ("PROCESS_TIMEOUT_MS".to_string(), "1".to_string()),
            ])
            .load()
            .unwrap();

        let settings = EngineSettings::from_snapshot(&snapshot).unwrap();
        assert_eq!(settings.cache_capacity.get(), 1);
        assert_eq!(settings.timeout, Duration::from_millis(1));
    }

    #[test]
    fn test_invalid_values_table_driven() {
        struct TestCase {
            name: &'static str,
            key: &'static str,
            value: Value,
        }

        let test_cases = vec![
            TestCase {
                name: "zero timeout",
                key: TIMEOUT_MS_KEY,
                value: json!(0),
            },
            TestCase {
                name: "negative timeout",
                key: TIMEOUT_MS_KEY,
                value: json!(-5),
            },
            TestCase {
                name: "false capacity",
                key: CACHE_CAPACITY_KEY,
                value: json!(false),
            },
            TestCase {
                name: "text capacity",
                key: CACHE_CAPACITY_KEY,
                value: json!("lots"),
            },
            TestCase {
                name: "zero ttl",
                key: CACHE_TTL_SECS_KEY,
                value: json!(0),
            },
            TestCase {
                name: "numeric log level",
                key: LOG_LEVEL_KEY,
                value: json!(3),
            },
            TestCase {
                name: "plugins not a list",
                key: PLUGINS_KEY,
                value: json!({"name": "x"}),
            },
            TestCase {
                name: "plugin without implementation",
                key: PLUGINS_KEY,
                value: json!([{"name": "x"}]),
            },
            TestCase {
                name: "duplicate plugin names",
                key: PLUGINS_KEY,
                value: json!([
                    {"name": "x", "implementation": "reverse_text"},
                    {"name": "x", "implementation": "token_counter"}
                ]),
            },
        ];

        for test_case in test_cases {
            let snapshot = snapshot_with(&[(test_case.key, test_case.value)]);
            let err = EngineSettings::from_snapshot(&snapshot).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Configuration, "case '{}'", test_case.name);
            assert_eq!(err.details()["setting"], test_case.key, "case '{}'", test_case.name);
        }
    }
}
