// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for dispatcher events.
//!
//! This module contains message types for logging events related to:
//! * Run lifecycle (start, completion, failure, timeout)
//! * Cache short-circuits
//! * Hook failures
//! * Dispatcher shutdown

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// A run was accepted for a plugin.
///
/// # Log Level
/// `debug!` - Per-request event
pub struct DispatchStarted<'a> {
    pub plugin: &'a str,
    pub input_size: usize,
    pub option_count: usize,
}

impl Display for DispatchStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dispatching to plugin '{}': input_size={} bytes, options={}",
            self.plugin, self.input_size, self.option_count
        )
    }
}

impl StructuredLog for DispatchStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            plugin = self.plugin,
            input_size = self.input_size,
            option_count = self.option_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "dispatch",
            span_name = name,
            plugin = self.plugin,
            input_size = self.input_size,
        )
    }
}

/// A run finished with a fresh result.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use process_engine::observability::messages::dispatch::DispatchCompleted;
/// use std::time::Duration;
///
/// let msg = DispatchCompleted {
///     plugin: "reverse_text",
///     result_id: "6f1c",
///     output_size: 5,
///     duration: Duration::from_millis(3),
/// };
///
/// assert!(msg.to_string().contains("reverse_text"));
/// ```
pub struct DispatchCompleted<'a> {
    pub plugin: &'a str,
    pub result_id: &'a str,
    pub output_size: usize,
    pub duration: Duration,
}

impl Display for DispatchCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Plugin '{}' produced result {}: output={} bytes, duration={:?}",
            self.plugin, self.result_id, self.output_size, self.duration
        )
    }
}

impl StructuredLog for DispatchCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            plugin = self.plugin,
            result_id = self.result_id,
            output_size = self.output_size,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// A run failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct DispatchFailed<'a> {
    pub plugin: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for DispatchFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Dispatch to plugin '{}' failed: {}", self.plugin, self.error)
    }
}

impl StructuredLog for DispatchFailed<'_> {
    fn log(&self) {
        tracing::error!(plugin = self.plugin, error = %self.error, "{}", self);
    }
}

/// The plugin did not answer within the bound.
///
/// # Log Level
/// `warn!` - The caller gets a timeout error; the in-flight call is aborted
pub struct DispatchTimedOut<'a> {
    pub plugin: &'a str,
    pub timeout: Duration,
}

impl Display for DispatchTimedOut<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Plugin '{}' timed out after {:?}, aborting call",
            self.plugin, self.timeout
        )
    }
}

impl StructuredLog for DispatchTimedOut<'_> {
    fn log(&self) {
        tracing::warn!(
            plugin = self.plugin,
            timeout_ms = self.timeout.as_millis() as u64,
            "{}", self
        );
    }
}

/// A run was answered from the cache without invoking the plugin.
///
/// # Log Level
/// `debug!`
pub struct CacheShortCircuit<'a> {
    pub plugin: &'a str,
    pub cache_key: &'a str,
    pub result_id: &'a str,
}

impl Display for CacheShortCircuit<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cache hit for plugin '{}' (key {}), returning result {}",
            self.plugin, self.cache_key, self.result_id
        )
    }
}

impl StructuredLog for CacheShortCircuit<'_> {
    fn log(&self) {
        tracing::debug!(
            plugin = self.plugin,
            cache_key = self.cache_key,
            result_id = self.result_id,
            "{}", self
        );
    }
}

/// A hook failed and was skipped.
///
/// # Log Level
/// `warn!`
pub struct HookFailed<'a> {
    pub hook_point: &'a str,
    pub position: usize,
    pub error: &'a dyn std::error::Error,
}

impl Display for HookFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Hook #{} at '{}' failed and was skipped: {}",
            self.position, self.hook_point, self.error
        )
    }
}

impl StructuredLog for HookFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            hook_point = self.hook_point,
            position = self.position,
            error = %self.error,
            "{}", self
        );
    }
}

/// Dispatcher torn down.
///
/// # Log Level
/// `info!`
pub struct DispatcherShutdown {
    pub plugins_cleared: usize,
    pub results_cleared: usize,
}

impl Display for DispatcherShutdown {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dispatcher shut down: {} plugins and {} cached results released",
            self.plugins_cleared, self.results_cleared
        )
    }
}

impl StructuredLog for DispatcherShutdown {
    fn log(&self) {
        tracing::info!(
            plugins_cleared = self.plugins_cleared,
            results_cleared = self.results_cleared,
            "{}", self
        );
    }
}
