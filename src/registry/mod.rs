// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Plugin registry: name → descriptor, with memoized instances.
//!
//! Names are unique. Registering an existing name replaces the entry in place
//! (its position in [`PluginRegistry::list_all`] stays where the name was first
//! seen) and drops the memoized instance so the next resolve uses the new
//! factory. Each registry is an ordinary value owned by its dispatcher; there
//! is no process-wide instance.

mod descriptor;
mod discovery;
pub mod hooks;

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::errors::{ErrorRecord, Result};
use crate::observability::messages::registry::{
    DiscoveryCandidateFailed, DiscoveryCompleted, PluginInstantiated, PluginInstantiationFailed,
    PluginRegistered, PluginReplaced, PluginUnregistered,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{Plugin, PluginConfig, PluginFactory};

pub use descriptor::{from_fn, PluginDescriptor, PluginMetadata, DEFAULT_PLUGIN_VERSION};
pub use discovery::{DiscoveryFailure, DiscoveryReport, PluginCandidate, PluginSource};
pub use hooks::{ErrorHook, Hook, HookRegistry, PRE_PROCESS_HOOK};

/// What `register` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Added,
    /// The name existed; the previous entry's metadata is returned.
    Replaced { previous: PluginMetadata },
}

struct RegistryEntry {
    descriptor: PluginDescriptor,
    instance: Option<Arc<dyn Plugin>>,
    // Bumped on every re-registration so a slow resolve cannot memoize a stale build.
    generation: u64,
}

/// Registry of plugin descriptors and their shared instances.
///
/// # Example
/// ```
/// use process_engine::errors::ErrorKind;
/// use process_engine::plugins::ReverseTextPlugin;
/// use process_engine::registry::{from_fn, PluginMetadata, PluginRegistry, Registration};
///
/// let registry = PluginRegistry::new();
/// let outcome = registry
///     .register("reverse", from_fn(|_| Ok(ReverseTextPlugin::new())), PluginMetadata::default())
///     .unwrap();
/// assert_eq!(outcome, Registration::Added);
///
/// let err = registry.resolve("missing").err().unwrap();
/// assert_eq!(err.kind(), ErrorKind::PluginNotFound);
/// ```
#[derive(Default)]
pub struct PluginRegistry {
    entries: RwLock<IndexMap<String, RegistryEntry>>,
    hooks: HookRegistry,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name` with an empty plugin configuration.
    pub fn register(
        &self,
        name: impl Into<String>,
        factory: impl PluginFactory + 'static,
        metadata: PluginMetadata,
    ) -> Result<Registration> {
        let name = name.into();
        let config = PluginConfig::empty(name.clone());
        self.register_descriptor(PluginDescriptor::new(name, Arc::new(factory), config, metadata))
    }

    /// Store or replace a descriptor.
    ///
    /// # Errors
    /// `validation` when the name is empty.
    pub fn register_descriptor(&self, descriptor: PluginDescriptor) -> Result<Registration> {
        self.insert(descriptor, None)
    }

    fn insert(&self, descriptor: PluginDescriptor, instance: Option<Arc<dyn Plugin>>) -> Result<Registration> {
        let name = descriptor.name().to_string();
        if name.trim().is_empty() {
            return Err(ErrorRecord::validation("plugin name must not be empty"));
        }

        let mut entries = self.entries.write();
        let registration = match entries.get_mut(&name) {
            Some(entry) => {
                let previous = entry.descriptor.metadata().clone();
                PluginReplaced {
                    name: &name,
                    previous_version: &previous.version,
                    version: descriptor.version(),
                }
                .log();

                entry.descriptor = descriptor;
                entry.instance = instance;
                entry.generation += 1;
                Registration::Replaced { previous }
            }
            None => {
                PluginRegistered {
                    name: &name,
                    version: descriptor.version(),
                }
                .log();

                entries.insert(
                    name,
                    RegistryEntry {
                        descriptor,
                        instance,
                        generation: 0,
                    },
                );
                Registration::Added
            }
        };
        Ok(registration)
    }

    /// Remove a plugin and its shared instance.
    pub fn unregister(&self, name: &str) -> Result<PluginDescriptor> {
        let removed = self
            .entries
            .write()
            .shift_remove(name)
            .ok_or_else(|| ErrorRecord::plugin_not_found(name))?;

        PluginUnregistered { name }.log();
        Ok(removed.descriptor)
    }

    /// The shared instance for `name`, built on first use.
    ///
    /// # Errors
    /// `plugin-not-found` when `name` is absent, `plugin-init-failure` when the
    /// factory fails.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Plugin>> {
        let (descriptor, generation) = {
            let entries = self.entries.read();
            let entry = entries
                .get(name)
                .ok_or_else(|| ErrorRecord::plugin_not_found(name))?;
            if let Some(instance) = &entry.instance {
                return Ok(instance.clone());
            }
            (entry.descriptor.clone(), entry.generation)
        };

        let built = instantiate(&descriptor, true)?;

        let mut entries = self.entries.write();
        match entries.get_mut(name) {
            // A concurrent resolve may have won; everyone shares the first stored instance.
            Some(entry) if entry.generation == generation => {
                Ok(entry.instance.get_or_insert_with(|| built).clone())
            }
            // Replaced or removed while building: hand the build back without memoizing.
            _ => Ok(built),
        }
    }

    /// A new instance that is not shared with anyone.
    pub fn resolve_fresh(&self, name: &str) -> Result<Arc<dyn Plugin>> {
        let descriptor = self.descriptor(name)?;
        instantiate(&descriptor, false)
    }

    pub fn descriptor(&self, name: &str) -> Result<PluginDescriptor> {
        self.entries
            .read()
            .get(name)
            .map(|entry| entry.descriptor.clone())
            .ok_or_else(|| ErrorRecord::plugin_not_found(name))
    }

    /// Register every candidate from `source`.
    ///
    /// Each candidate is instantiated up front; candidates that fail to
    /// enumerate, validate or construct are reported and skipped while the rest
    /// are still registered.
    pub fn discover(&self, source: &dyn PluginSource) -> DiscoveryReport {
        let label = source.label();
        let mut report = DiscoveryReport::default();

        for candidate in source.candidates() {
            match self.admit(candidate) {
                Ok(name) => report.registered.push(name),
                Err(failure) => {
                    DiscoveryCandidateFailed {
                        source: &label,
                        candidate: &failure.candidate,
                        error: &failure.error,
                    }
                    .log();
                    report.failures.push(failure);
                }
            }
        }

        DiscoveryCompleted {
            source: &label,
            registered: report.registered.len(),
            failed: report.failures.len(),
        }
        .log();
        report
    }

    fn admit(&self, candidate: std::result::Result<PluginCandidate, DiscoveryFailure>) -> std::result::Result<String, DiscoveryFailure> {
        let candidate = candidate?;
        let name = candidate.name.clone();
        let fail = |error: ErrorRecord| DiscoveryFailure {
            candidate: name.clone(),
            error,
        };

        if name.trim().is_empty() {
            return Err(fail(ErrorRecord::validation("plugin name must not be empty")));
        }

        let descriptor = PluginDescriptor::new(
            candidate.name,
            candidate.factory,
            candidate.config,
            candidate.metadata,
        );
        let instance = instantiate(&descriptor, true).map_err(fail)?;
        self.insert(descriptor, Some(instance)).map_err(fail)?;

        for (hook_point, hook) in candidate.hooks {
            self.hooks.register(hook_point, hook);
        }
        Ok(name)
    }

    /// Every descriptor, in first-registration order.
    pub fn list_all(&self) -> Vec<PluginDescriptor> {
        self.entries
            .read()
            .values()
            .map(|entry| entry.descriptor.clone())
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Drop all descriptors, instances and hooks. Returns how many plugins were held.
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write();
        let count = entries.len();
        entries.clear();
        self.hooks.clear();
        count
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .field("hooks", &self.hooks)
            .finish()
    }
}

fn instantiate(descriptor: &PluginDescriptor, memoized: bool) -> Result<Arc<dyn Plugin>> {
    let name = descriptor.name();
    match descriptor.instantiate() {
        Ok(instance) => {
            PluginInstantiated { name, memoized }.log();
            Ok(instance)
        }
        Err(error) => {
            PluginInstantiationFailed { name, error: &error }.log();
            Err(ErrorRecord::plugin_init(
                name,
                format!("failed to create plugin '{}': {}", name, error.message()),
            )
            .with_cause(error))
        }
    }
}
