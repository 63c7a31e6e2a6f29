// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::errors::Result;
use crate::traits::Plugin;

/// Immutable configuration handed to a plugin factory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PluginConfig {
    name: String,
    settings: IndexMap<String, Value>,
}

impl PluginConfig {
    pub fn new(name: impl Into<String>, settings: IndexMap<String, Value>) -> Self {
        Self {
            name: name.into(),
            settings,
        }
    }

    /// Config with no settings.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, IndexMap::new())
    }

    /// Registered name of the plugin being built.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
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

    pub fn settings(&self) -> &IndexMap<String, Value> {
        &self.settings
    }
}

/// Builds plugin instances from configuration.
///
/// Implemented for any `Fn(&PluginConfig) -> Result<Arc<dyn Plugin>>`, so plain
/// closures can be registered directly.
pub trait PluginFactory: Send + Sync {
    fn create(&self, config: &PluginConfig) -> Result<Arc<dyn Plugin>>;
}

impl<F> PluginFactory for F
where
    F: Fn(&PluginConfig) -> Result<Arc<dyn Plugin>> + Send + Sync,
{
    fn create(&self, config: &PluginConfig) -> Result<Arc<dyn Plugin>> {
        self(config)
    }
}
