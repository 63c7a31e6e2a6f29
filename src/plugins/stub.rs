// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Test-only plugins for exercising the registry and dispatcher.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::{ErrorRecord, Result};
use crate::options::{OptionKind, OptionSpec, Options};
use crate::result::{make_result, Metadata, Payload, ProcessResult};
use crate::traits::{Plugin, PluginState, PluginStatus, ResourceDescriptor};

/// Echoes its input and reports `label` as its version, so tests can tell
/// which factory built an instance.
pub struct StubPlugin {
    pub label: &'static str,
}

impl StubPlugin {
    pub fn new(label: &'static str) -> Self {
        Self { label }
    }
}

#[async_trait]
impl Plugin for StubPlugin {
    async fn process(&self, input: Payload, _options: Options) -> Result<ProcessResult> {
        Ok(make_result(input, "text", Metadata::new()))
    }

    fn list_resources(&self) -> Vec<ResourceDescriptor> {
        vec![ResourceDescriptor::new("stub-resource", "Stub", "Stub resource")]
    }

    fn status(&self) -> PluginStatus {
        PluginStatus {
            state: PluginState::Running,
            version: self.label.to_string(),
            name: "stub".to_string(),
        }
    }
}

/// Upper-cases text input and counts invocations.
pub struct EchoPlugin {
    pub calls: Arc<AtomicUsize>,
}

impl EchoPlugin {
    pub fn new(calls: Arc<AtomicUsize>) -> Self {
        Self { calls }
    }
}

#[async_trait]
impl Plugin for EchoPlugin {
    async fn process(&self, input: Payload, _options: Options) -> Result<ProcessResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = input
            .as_text()
            .ok_or_else(|| ErrorRecord::validation("echo expects text input"))?;
        Ok(make_result(text.to_uppercase(), "text", Metadata::new()))
    }

    fn list_resources(&self) -> Vec<ResourceDescriptor> {
        Vec::new()
    }

    fn status(&self) -> PluginStatus {
        PluginStatus {
            state: PluginState::Running,
            version: "1.0.0".to_string(),
            name: "echo".to_string(),
        }
    }

    fn option_specs(&self) -> Vec<OptionSpec> {
        vec![
            OptionSpec::new("language", OptionKind::Text, "ignored"),
            OptionSpec::new("api_key", OptionKind::Text, "ignored"),
        ]
    }
}

/// Never finishes unless it is cancelled.
pub struct NeverPlugin;

#[async_trait]
impl Plugin for NeverPlugin {
    async fn process(&self, _input: Payload, _options: Options) -> Result<ProcessResult> {
        std::future::pending::<Result<ProcessResult>>().await
    }

    fn list_resources(&self) -> Vec<ResourceDescriptor> {
        Vec::new()
    }

    fn status(&self) -> PluginStatus {
        PluginStatus {
            state: PluginState::Running,
            version: "1.0.0".to_string(),
            name: "never".to_string(),
        }
    }
}

/// Sleeps, then echoes.
pub struct SlowPlugin {
    pub delay: Duration,
}

#[async_trait]
impl Plugin for SlowPlugin {
    async fn process(&self, input: Payload, _options: Options) -> Result<ProcessResult> {
        tokio::time::sleep(self.delay).await;
        Ok(make_result(input, "text", Metadata::new()))
    }

    fn list_resources(&self) -> Vec<ResourceDescriptor> {
        Vec::new()
    }

    fn status(&self) -> PluginStatus {
        PluginStatus {
            state: PluginState::Running,
            version: "1.0.0".to_string(),
            name: "slow".to_string(),
        }
    }
}

/// Always fails.
pub struct FailingPlugin;

#[async_trait]
impl Plugin for FailingPlugin {
    async fn process(&self, _input: Payload, _options: Options) -> Result<ProcessResult> {
        Err(ErrorRecord::processing("simulated plugin failure"))
    }

    fn list_resources(&self) -> Vec<ResourceDescriptor> {
        Vec::new()
    }

    fn status(&self) -> PluginStatus {
        PluginStatus {
            state: PluginState::Degraded,
            version: "1.0.0".to_string(),
            name: "failing".to_string(),
        }
    }

    fn option_specs(&self) -> Vec<OptionSpec> {
        vec![
            OptionSpec::new("password", OptionKind::Text, "redacted in errors"),
            OptionSpec::new("language", OptionKind::Text, "kept in errors"),
        ]
    }
}

/// Panics inside `process`.
pub struct PanickingPlugin;

#[async_trait]
impl Plugin for PanickingPlugin {
    async fn process(&self, _input: Payload, _options: Options) -> Result<ProcessResult> {
        panic!("plugin bug")
    }

    fn list_resources(&self) -> Vec<ResourceDescriptor> {
        Vec::new()
    }

    fn status(&self) -> PluginStatus {
        PluginStatus {
            state: PluginState::Running,
            version: "1.0.0".to_string(),
            name: "panicking".to_string(),
        }
    }
}
