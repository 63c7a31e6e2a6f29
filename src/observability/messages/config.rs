// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration loading.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// One configuration layer merged into the snapshot.
///
/// # Log Level
/// `debug!`
///
/// # Example
/// ```
/// use process_engine::observability::messages::config::ConfigLayerApplied;
///
/// let msg = ConfigLayerApplied {
///     layer: "environment variables",
///     keys: 2,
/// };
///
/// assert_eq!(msg.to_string(), "Applied 2 settings from environment variables");
/// ```
pub struct ConfigLayerApplied<'a> {
    pub layer: &'a str,
    pub keys: usize,
}

impl Display for ConfigLayerApplied<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Applied {} settings from {}", self.keys, self.layer)
    }
}

impl StructuredLog for ConfigLayerApplied<'_> {
    fn log(&self) {
        tracing::debug!(layer = self.layer, keys = self.keys, "{}", self);
    }
}

/// Snapshot finished.
///
/// # Log Level
/// `info!`
pub struct ConfigLoaded<'a> {
    pub component: &'a str,
    pub environment: &'a str,
    pub keys: usize,
}

impl Display for ConfigLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Configuration loaded for {} ({} environment, {} settings)",
            self.component, self.environment, self.keys
        )
    }
}

impl StructuredLog for ConfigLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            component = self.component,
            environment = self.environment,
            keys = self.keys,
            "{}", self
        );
    }
}
