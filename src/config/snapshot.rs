// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::errors::{ErrorRecord, Result};

/// Immutable result of [`ConfigLoader::load`](super::ConfigLoader::load).
///
/// Keys keep the order in which they first appeared across layers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigSnapshot {
    #[serde(skip)]
    component: String,
    #[serde(flatten)]
    values: IndexMap<String, Value>,
}

impl ConfigSnapshot {
    pub fn new(component: impl Into<String>, values: IndexMap<String, Value>) -> Self {
        Self {
            component: component.into(),
            values,
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(Value::as_u64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    pub fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fail with a `configuration` error naming every absent key.
    pub fn validate_required(&self, keys: &[&str]) -> Result<()> {
        let missing: Vec<&str> = keys
            .iter()
            .copied()
            .filter(|key| !self.values.contains_key(*key))
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        Err(ErrorRecord::configuration(format!(
            "missing required configuration for {}: {}",
            self.component,
            missing.join(", ")
        ))
        .with_detail("missing", missing))
    }
}
