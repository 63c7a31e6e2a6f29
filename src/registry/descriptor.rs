// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::traits::{Plugin, PluginConfig, PluginFactory};

pub const DEFAULT_PLUGIN_VERSION: &str = "1.0.0";

/// Free-form descriptive metadata. Nothing here has to be unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMetadata {
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
}

impl PluginMetadata {
    pub fn new(version: impl Into<String>, description: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            description: description.into(),
            author: author.into(),
        }
    }
}

impl Default for PluginMetadata {
    fn default() -> Self {
        Self::new(DEFAULT_PLUGIN_VERSION, "", "")
    }
}

/// Registry entry: the name, how to build the plugin, and what it says about itself.
#[derive(Clone)]
pub struct PluginDescriptor {
    name: String,
    factory: Arc<dyn PluginFactory>,
    config: PluginConfig,
    metadata: PluginMetadata,
}

impl PluginDescriptor {
    pub fn new(
        name: impl Into<String>,
        factory: Arc<dyn PluginFactory>,
        config: PluginConfig,
        metadata: PluginMetadata,
    ) -> Self {
        Self {
            name: name.into(),
            factory,
            config,
            metadata,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    pub fn version(&self) -> &str {
        &self.metadata.version
    }

    pub fn description(&self) -> &str {
        &self.metadata.description
    }

    pub fn author(&self) -> &str {
        &self.metadata.author
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// Run the factory against the stored configuration.
    pub fn instantiate(&self) -> Result<Arc<dyn Plugin>> {
        self.factory.create(&self.config)
    }
}

impl std::fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("name", &self.name)
            .field("metadata", &self.metadata)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Wrap a constructor for a concrete plugin type as a [`PluginFactory`].
///
/// # Example
/// ```
/// use process_engine::registry::{from_fn, PluginMetadata, PluginRegistry};
/// use process_engine::plugins::ReverseTextPlugin;
///
/// let registry = PluginRegistry::new();
/// registry
///     .register("reverse", from_fn(|_config| Ok(ReverseTextPlugin::new())), PluginMetadata::default())
///     .unwrap();
/// assert!(registry.resolve("reverse").is_ok());
/// ```
pub fn from_fn<P, F>(build: F) -> impl PluginFactory
where
    P: Plugin + 'static,
    F: Fn(&PluginConfig) -> Result<P> + Send + Sync + 'static,
{
    move |config: &PluginConfig| -> Result<Arc<dyn Plugin>> {
        let plugin: Arc<dyn Plugin> = Arc::new(build(config)?);
        Ok(plugin)
    }
}
