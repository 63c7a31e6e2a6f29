// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::PluginEntry;
use crate::plugins::BuiltinPlugins;
use crate::registry::{DiscoveryFailure, PluginCandidate, PluginSource};
use crate::traits::PluginConfig;

/// Discovery source for plugins declared under `plugins` in configuration.
///
/// Each entry binds a new name to a built-in implementation and hands the
/// entry's `options` to the plugin factory. Entries naming an unknown
/// implementation come back as failed candidates.
#[derive(Debug, Clone)]
pub struct ConfigPluginSource {
    label: String,
    entries: Vec<PluginEntry>,
}

impl ConfigPluginSource {
    pub fn new(label: impl Into<String>, entries: Vec<PluginEntry>) -> Self {
        Self {
            label: label.into(),
            entries,
        }
    }
}

impl PluginSource for ConfigPluginSource {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn candidates(&self) -> Vec<Result<PluginCandidate, DiscoveryFailure>> {
        self.entries
            .iter()
            .map(|entry| {
                let factory = BuiltinPlugins::factory_for(&entry.implementation).map_err(|error| {
                    DiscoveryFailure {
                        candidate: entry.name.clone(),
                        error: error.with_detail("plugin", entry.name.as_str()),
                    }
                })?;

                let mut metadata = BuiltinPlugins::metadata_for(&entry.implementation);
                if let Some(description) = &entry.description {
                    metadata.description = description.clone();
                }

                Ok(PluginCandidate::new(entry.name.clone(), factory, metadata)
                    .with_config(PluginConfig::new(entry.name.clone(), entry.options.clone())))
            })
            .collect()
    }
}
