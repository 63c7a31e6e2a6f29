use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::errors::{ErrorRecord, Result};
use crate::options::{OptionSpec, Options};
use crate::result::{Payload, ProcessResult};

/// Something a plugin can serve besides processing output, e.g. a voice or a model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, Value>,
}

impl ResourceDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            attributes: IndexMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginState {
    Running,
    Idle,
    Degraded,
    Stopped,
}

/// Health snapshot reported by [`Plugin::status`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginStatus {
    pub state: PluginState,
    pub version: String,
    pub name: String,
}

/// Capability contract every plugin satisfies.
///
/// `process` reports failures as [`ErrorRecord`]s; the dispatcher wraps them as
/// plugin-execution failures. Resource listings are finite and side-effect free.
#[async_trait]
pub trait Plugin: Send + Sync {
    async fn process(&self, input: Payload, options: Options) -> Result<ProcessResult>;

    fn list_resources(&self) -> Vec<ResourceDescriptor>;

    fn get_resource(&self, id: &str) -> Result<ResourceDescriptor> {
        self.list_resources()
            .into_iter()
            .find(|resource| resource.id == id)
            .ok_or_else(|| {
                ErrorRecord::not_found(format!("resource '{}' not found", id))
                    .with_detail("resource_id", id)
            })
    }

    fn status(&self) -> PluginStatus;

    /// Option keys this plugin accepts. Anything else is rejected before `process`.
    fn option_specs(&self) -> Vec<OptionSpec> {
        Vec::new()
    }
}
