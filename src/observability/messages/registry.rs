// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for plugin registry events.
//!
//! This module contains message types for logging events related to:
//! * Registration, replacement and removal of plugins
//! * Lazy instantiation through plugin factories
//! * Discovery runs and their per-candidate failures

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// Plugin registered under a new name.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use process_engine::observability::messages::registry::PluginRegistered;
///
/// let msg = PluginRegistered {
///     name: "reverse_text",
///     version: "1.0.0",
/// };
///
/// assert_eq!(msg.to_string(), "Registered plugin 'reverse_text' (version 1.0.0)");
/// ```
pub struct PluginRegistered<'a> {
    pub name: &'a str,
    pub version: &'a str,
}

impl Display for PluginRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Registered plugin '{}' (version {})", self.name, self.version)
    }
}

impl StructuredLog for PluginRegistered<'_> {
    fn log(&self) {
        tracing::info!(plugin = self.name, version = self.version, "{}", self);
    }
}

/// An existing registration was overwritten.
///
/// # Log Level
/// `warn!` - Last write wins; callers should know
pub struct PluginReplaced<'a> {
    pub name: &'a str,
    pub previous_version: &'a str,
    pub version: &'a str,
}

impl Display for PluginReplaced<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Plugin '{}' is already registered, replacing version {} with {}",
            self.name, self.previous_version, self.version
        )
    }
}

impl StructuredLog for PluginReplaced<'_> {
    fn log(&self) {
        tracing::warn!(
            plugin = self.name,
            previous_version = self.previous_version,
            version = self.version,
            "{}", self
        );
    }
}

/// # Log Level
/// `info!`
pub struct PluginUnregistered<'a> {
    pub name: &'a str,
}

impl Display for PluginUnregistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Unregistered plugin '{}'", self.name)
    }
}

impl StructuredLog for PluginUnregistered<'_> {
    fn log(&self) {
        tracing::info!(plugin = self.name, "{}", self);
    }
}

/// A factory produced an instance.
///
/// # Log Level
/// `debug!`
pub struct PluginInstantiated<'a> {
    pub name: &'a str,
    pub memoized: bool,
}

impl Display for PluginInstantiated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let mode = if self.memoized { "shared" } else { "fresh" };
        write!(f, "Created {} instance of plugin '{}'", mode, self.name)
    }
}

impl StructuredLog for PluginInstantiated<'_> {
    fn log(&self) {
        tracing::debug!(plugin = self.name, memoized = self.memoized, "{}", self);
    }
}

/// A factory failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct PluginInstantiationFailed<'a> {
    pub name: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for PluginInstantiationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Error creating instance of plugin '{}': {}", self.name, self.error)
    }
}

impl StructuredLog for PluginInstantiationFailed<'_> {
    fn log(&self) {
        tracing::error!(plugin = self.name, error = %self.error, "{}", self);
    }
}

/// One discovery candidate could not be registered.
///
/// # Log Level
/// `warn!` - Discovery continues with the remaining candidates
pub struct DiscoveryCandidateFailed<'a> {
    pub source: &'a str,
    pub candidate: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for DiscoveryCandidateFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Skipping plugin candidate '{}' from {}: {}",
            self.candidate, self.source, self.error
        )
    }
}

impl StructuredLog for DiscoveryCandidateFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            source = self.source,
            candidate = self.candidate,
            error = %self.error,
            "{}", self
        );
    }
}

/// # Log Level
/// `info!`
pub struct DiscoveryCompleted<'a> {
    pub source: &'a str,
    pub registered: usize,
    pub failed: usize,
}

impl Display for DiscoveryCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Discovered {} plugins in {} ({} failed)",
            self.registered, self.source, self.failed
        )
    }
}

impl StructuredLog for DiscoveryCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            source = self.source,
            registered = self.registered,
            failed = self.failed,
            "{}", self
        );
    }
}
