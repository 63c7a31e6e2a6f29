// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Storage-agnostic plugin discovery.
//!
//! Whatever finds plugin code (a packaging layer, a config file, a static
//! table) implements [`PluginSource`] and yields candidates. The registry only
//! sees `(name, factory, metadata)` triples plus optional config and hooks.

use std::sync::Arc;

use crate::errors::ErrorRecord;
use crate::registry::hooks::Hook;
use crate::registry::PluginMetadata;
use crate::traits::{PluginConfig, PluginFactory};

/// One plugin offered by a source.
#[derive(Clone)]
pub struct PluginCandidate {
    pub name: String,
    pub factory: Arc<dyn PluginFactory>,
    pub metadata: PluginMetadata,
    pub config: PluginConfig,
    /// `(hook point, hook)` pairs registered alongside the plugin.
    pub hooks: Vec<(String, Hook)>,
}

impl PluginCandidate {
    pub fn new(name: impl Into<String>, factory: Arc<dyn PluginFactory>, metadata: PluginMetadata) -> Self {
        let name = name.into();
        Self {
            config: PluginConfig::empty(name.clone()),
            name,
            factory,
            metadata,
            hooks: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: PluginConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_hook(mut self, hook_point: impl Into<String>, hook: Hook) -> Self {
        self.hooks.push((hook_point.into(), hook));
        self
    }
}

impl std::fmt::Debug for PluginCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginCandidate")
            .field("name", &self.name)
            .field("metadata", &self.metadata)
            .field("hooks", &self.hooks.len())
            .finish_non_exhaustive()
    }
}

/// A candidate that could not be turned into a registered plugin.
#[derive(Debug)]
pub struct DiscoveryFailure {
    pub candidate: String,
    pub error: ErrorRecord,
}

/// Enumerates plugin candidates.
pub trait PluginSource {
    /// Human-readable origin used in logs, e.g. a file path.
    fn label(&self) -> String;

    /// A finite listing; individual entries may already be failures.
    fn candidates(&self) -> Vec<Result<PluginCandidate, DiscoveryFailure>>;
}

/// Outcome of a discovery run.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    pub registered: Vec<String>,
    pub failures: Vec<DiscoveryFailure>,
}

impl DiscoveryReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
