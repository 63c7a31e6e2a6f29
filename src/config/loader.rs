// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::config::consts::{
    CACHE_CAPACITY_KEY, DEFAULT_CACHE_CAPACITY, DEFAULT_ENVIRONMENT, DEFAULT_ENV_PREFIX,
    DEFAULT_LOG_LEVEL, DEFAULT_TIMEOUT_MS, ENVIRONMENT_KEY, ENV_SECTION_PREFIX, LOG_LEVEL_KEY,
    TIMEOUT_MS_KEY,
};
use crate::config::ConfigSnapshot;
use crate::errors::{ErrorRecord, Result};
use crate::observability::messages::config::{ConfigLayerApplied, ConfigLoaded};
use crate::observability::messages::StructuredLog;

/// Layered configuration loader.
///
/// Layers are merged key by key, each one overriding the previous:
/// 1. built-in defaults (`timeout_ms`, `cache_capacity`, `environment`, `log_level`)
/// 2. the config file, if any
/// 3. the file's `env_<environment>` section for the active environment
/// 4. environment variables starting with `<prefix>_`
/// 5. explicit overrides
///
/// The active environment is the highest-precedence `environment` value across
/// all layers, so `PROCESS_ENVIRONMENT=production` selects `env_production`
/// even though the section itself sits below environment variables.
///
/// # Example
/// ```yaml
/// timeout_ms: 10000
/// cache_capacity: 64
/// plugins:
///   - name: shout
///     implementation: change_text_case
///     options:
///       case: upper
/// env_production:
///   log_level: warn
/// ```
///
/// ```
/// use process_engine::config::ConfigLoader;
///
/// let snapshot = ConfigLoader::new("process")
///     .with_env_vars(vec![("PROCESS_TIMEOUT_MS".to_string(), "5000".to_string())])
///     .with_override("log_level", "debug")
///     .load()
///     .unwrap();
///
/// assert_eq!(snapshot.get_u64("timeout_ms"), Some(5000));
/// assert_eq!(snapshot.get_str("log_level"), Some("debug"));
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    component: String,
    defaults: IndexMap<String, Value>,
    file: Option<PathBuf>,
    env_prefix: String,
    env_vars: Option<Vec<(String, String)>>,
    overrides: IndexMap<String, Value>,
}

impl ConfigLoader {
    pub fn new(component: impl Into<String>) -> Self {
        let mut defaults = IndexMap::new();
        defaults.insert(TIMEOUT_MS_KEY.to_string(), Value::from(DEFAULT_TIMEOUT_MS));
        defaults.insert(CACHE_CAPACITY_KEY.to_string(), Value::from(DEFAULT_CACHE_CAPACITY));
        defaults.insert(ENVIRONMENT_KEY.to_string(), Value::from(DEFAULT_ENVIRONMENT));
        defaults.insert(LOG_LEVEL_KEY.to_string(), Value::from(DEFAULT_LOG_LEVEL));

        Self {
            component: component.into(),
            defaults,
            file: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            env_vars: None,
            overrides: IndexMap::new(),
        }
    }

    /// Add or replace a built-in default.
    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    /// Read a `.yaml`, `.yml`, `.toml` or `.json` file as the second layer.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Prefix without the trailing underscore, e.g. `PROCESS`.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Use these variables instead of the process environment.
    pub fn with_env_vars(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env_vars = Some(vars.into_iter().collect());
        self
    }

    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    /// Merge every layer into a snapshot.
    ///
    /// # Errors
    /// `configuration` when the file is missing, unreadable, malformed, has an
    /// unsupported extension, or its top level is not a mapping.
    pub fn load(&self) -> Result<ConfigSnapshot> {
        let mut values = self.defaults.clone();

        let file_values = match &self.file {
            Some(path) => {
                let file_values = read_config_file(path)?;
                let label = format!("file {}", path.display());
                apply_layer(&mut values, &label, file_values.clone());
                file_values
            }
            None => IndexMap::new(),
        };

        let env_values = self.env_layer();

        let environment = self
            .overrides
            .get(ENVIRONMENT_KEY)
            .or_else(|| env_values.get(ENVIRONMENT_KEY))
            .or_else(|| values.get(ENVIRONMENT_KEY))
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_ENVIRONMENT)
            .to_string();

        let section_key = format!("{}{}", ENV_SECTION_PREFIX, environment);
        match file_values.get(&section_key) {
            Some(Value::Object(section)) => {
                let section: IndexMap<String, Value> = section
                    .iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                apply_layer(&mut values, &format!("{} section", section_key), section);
            }
            Some(_) => {
                return Err(ErrorRecord::configuration(format!(
                    "configuration section '{}' must be a mapping",
                    section_key
                ))
                .with_detail("section", section_key))
            }
            None => {}
        }

        apply_layer(&mut values, "environment variables", env_values);
        apply_layer(&mut values, "overrides", self.overrides.clone());

        // Overlay sections for other environments are not settings in their own right.
        values.retain(|key, value| !(key.starts_with(ENV_SECTION_PREFIX) && value.is_object()));
        values.insert(ENVIRONMENT_KEY.to_string(), Value::from(environment.clone()));

        ConfigLoaded {
            component: &self.component,
            environment: &environment,
            keys: values.len(),
        }
        .log();

        Ok(ConfigSnapshot::new(self.component.clone(), values))
    }

    fn env_layer(&self) -> IndexMap<String, Value> {
        let prefix = format!("{}_", self.env_prefix);
        let vars = match &self.env_vars {
            Some(vars) => vars.clone(),
            None => std::env::vars().collect(),
        };

        vars.into_iter()
            .filter_map(|(key, value)| {
                let name = key.strip_prefix(&prefix)?;
                if name.is_empty() {
                    return None;
                }
                Some((name.to_lowercase(), coerce_env_value(&value)))
            })
            .collect()
    }
}

fn apply_layer(values: &mut IndexMap<String, Value>, layer: &str, layer_values: IndexMap<String, Value>) {
    if layer_values.is_empty() {
        return;
    }

    ConfigLayerApplied {
        layer,
        keys: layer_values.len(),
    }
    .log();
    values.extend(layer_values);
}

/// Interpret an environment variable value the way a config file would type it.
///
/// `1` and `0` become booleans; integer settings and `timeout_ms` read
/// `true` back as 1.
pub fn coerce_env_value(raw: &str) -> Value {
    let lowered = raw.to_lowercase();
    match lowered.as_str() {
        "true" | "yes" | "1" => return Value::Bool(true),
        "false" | "no" | "0" => return Value::Bool(false),
        _ => {}
    }

    if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(n) = raw.parse::<u64>() {
            return Value::from(n);
        }
    }

    let is_single_dot_number = raw.matches('.').count() == 1
        && raw.len() > 1
        && raw.chars().all(|c| c.is_ascii_digit() || c == '.');
    if is_single_dot_number {
        if let Ok(n) = raw.parse::<f64>() {
            return Value::from(n);
        }
    }

    Value::String(raw.to_string())
}

fn read_config_file(path: &Path) -> Result<IndexMap<String, Value>> {
    let content = fs::read_to_string(path).map_err(|e| {
        ErrorRecord::configuration(format!(
            "failed to read configuration file {}: {}",
            path.display(),
            e
        ))
        .with_detail("path", path.display().to_string())
        .with_cause(e)
    })?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let parse_error = |e: Box<dyn std::error::Error + Send + Sync>| {
        ErrorRecord::configuration(format!(
            "failed to parse configuration file {}: {}",
            path.display(),
            e
        ))
        .with_detail("path", path.display().to_string())
        .with_cause(e)
    };

    let parsed: Value = match extension.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| parse_error(e.into()))?,
        "toml" => toml::from_str(&content).map_err(|e| parse_error(e.into()))?,
        "json" => serde_json::from_str(&content).map_err(|e| parse_error(e.into()))?,
        other => {
            return Err(ErrorRecord::configuration(format!(
                "unsupported configuration file extension '{}'",
                other
            ))
            .with_detail("path", path.display().to_string()))
        }
    };

    match parsed {
        Value::Object(map) => Ok(into_index_map(map)),
        // An empty YAML document parses as null.
        Value::Null => Ok(IndexMap::new()),
        _ => Err(ErrorRecord::configuration(format!(
            "configuration file {} must contain a mapping at the top level",
            path.display()
        ))
        .with_detail("path", path.display().to_string())),
    }
}

fn into_index_map(map: Map<String, Value>) -> IndexMap<String, Value> {
    map.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use serde_json::json;
    use std::io::Write;

    fn write_config(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn no_env() -> Vec<(String, String)> {
        Vec::new()
    }

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_only() {
        let snapshot = ConfigLoader::new("process").with_env_vars(no_env()).load().unwrap();

        assert_eq!(snapshot.get_u64(TIMEOUT_MS_KEY), Some(DEFAULT_TIMEOUT_MS));
        assert_eq!(snapshot.get_u64(CACHE_CAPACITY_KEY), Some(DEFAULT_CACHE_CAPACITY as u64));
        assert_eq!(snapshot.get_str(ENVIRONMENT_KEY), Some(DEFAULT_ENVIRONMENT));
        assert_eq!(snapshot.get_str(LOG_LEVEL_KEY), Some(DEFAULT_LOG_LEVEL));
        assert_eq!(snapshot.component(), "process");
    }

    #[test]
    fn test_file_formats() {
        struct TestCase {
            suffix: &'static str,
            content: &'static str,
        }

        let test_cases = vec![
            TestCase {
                suffix: ".yaml",
                content: "timeout_ms: 1234\nlog_level: warn\n",
            },
            TestCase {
                suffix: ".yml",
                content: "timeout_ms: 1234\nlog_level: warn\n",
            },
            TestCase {
                suffix: ".toml",
                content: "timeout_ms = 1234\nlog_level = \"warn\"\n",
            },
            TestCase {
                suffix: ".json",
                content: r#"{"timeout_ms": 1234, "log_level": "warn"}"#,
            },
        ];

        for test_case in test_cases {
            let file = write_config(test_case.suffix, test_case.content);
            let snapshot = ConfigLoader::new("process")
                .with_file(file.path())
                .with_env_vars(no_env())
                .load()
                .unwrap();

            assert_eq!(snapshot.get_u64(TIMEOUT_MS_KEY), Some(1234), "format {}", test_case.suffix);
            assert_eq!(snapshot.get_str(LOG_LEVEL_KEY), Some("warn"), "format {}", test_case.suffix);
        }
    }

    #[test]
    fn test_layer_precedence() {
        let file = write_config(
            ".yaml",
            r#"
timeout_ms: 1000
cache_capacity: 10
log_level: warn
env_production:
  timeout_ms: 2000
  cache_capacity: 20
env_staging:
  timeout_ms: 9999
"#,
        );

        let snapshot = ConfigLoader::new("process")
            .with_file(file.path())
            .with_env_vars(env(&[
                ("PROCESS_ENVIRONMENT", "production"),
                ("PROCESS_CACHE_CAPACITY", "30"),
                ("OTHER_TIMEOUT_MS", "1"),
            ]))
            .with_override(LOG_LEVEL_KEY, "trace")
            .load()
            .unwrap();

        // Environment section beats the file, env vars beat the section, overrides beat everything.
        assert_eq!(snapshot.get_u64(TIMEOUT_MS_KEY), Some(2000));
        assert_eq!(snapshot.get_u64(CACHE_CAPACITY_KEY), Some(30));
        assert_eq!(snapshot.get_str(LOG_LEVEL_KEY), Some("trace"));
        assert_eq!(snapshot.get_str(ENVIRONMENT_KEY), Some("production"));
        assert!(!snapshot.contains_key("env_production"));
        assert!(!snapshot.contains_key("env_staging"));
    }

    #[test]
    fn test_environment_section_selected_from_file() {
        let file = write_config(
            ".json",
            r#"{"environment": "staging", "env_staging": {"log_level": "error"}}"#,
        );

        let snapshot = ConfigLoader::new("process")
            .with_file(file.path())
            .with_env_vars(no_env())
            .load()
            .unwrap();

        assert_eq!(snapshot.get_str(LOG_LEVEL_KEY), Some("error"));
    }

    #[test]
    fn test_custom_env_prefix() {
        let snapshot = ConfigLoader::new("tts")
            .with_env_prefix("TTS")
            .with_env_vars(env(&[("TTS_VOICE", "anna"), ("PROCESS_VOICE", "hans")]))
            .load()
            .unwrap();

        assert_eq!(snapshot.get_str("voice"), Some("anna"));
    }

    #[test]
    fn test_env_value_coercion() {
        struct TestCase {
            raw: &'static str,
            expected: Value,
        }

        let test_cases = vec![
            TestCase { raw: "true", expected: json!(true) },
            TestCase { raw: "YES", expected: json!(true) },
            TestCase { raw: "1", expected: json!(true) },
            TestCase { raw: "no", expected: json!(false) },
            TestCase { raw: "0", expected: json!(false) },
            TestCase { raw: "5000", expected: json!(5000) },
            TestCase { raw: "2.5", expected: json!(2.5) },
            TestCase { raw: "1.2.3", expected: json!("1.2.3") },
            TestCase { raw: "-5", expected: json!("-5") },
            TestCase { raw: "en-US", expected: json!("en-US") },
            TestCase { raw: "", expected: json!("") },
        ];

        for test_case in test_cases {
            assert_eq!(coerce_env_value(test_case.raw), test_case.expected, "raw {:?}", test_case.raw);
        }
    }

    #[test]
    fn test_file_errors_are_configuration_errors() {
        let malformed = write_config(".yaml", "timeout_ms: [unclosed\n");
        let scalar = write_config(".json", "42");
        let unsupported = write_config(".ini", "timeout_ms=1");
        let bad_section = write_config(".yaml", "env_development: 5\n");
        let missing = std::env::temp_dir().join("process-engine-no-such-config.yaml");

        let test_cases: Vec<(&str, &Path, bool)> = vec![
            ("malformed", malformed.path(), true),
            ("scalar top level", scalar.path(), false),
            ("unsupported extension", unsupported.path(), false),
            ("section not a mapping", bad_section.path(), false),
            ("missing", missing.as_path(), true),
        ];

        for (name, path, has_cause) in test_cases {
            let err = ConfigLoader::new("process")
                .with_file(path)
                .with_env_vars(no_env())
                .load()
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Configuration, "case '{}'", name);
            assert_eq!(err.cause().is_some(), has_cause, "case '{}'", name);
        }
    }
}
