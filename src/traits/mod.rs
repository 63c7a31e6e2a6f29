pub mod factory;
pub mod plugin;

pub use factory::{PluginConfig, PluginFactory};
pub use plugin::{Plugin, PluginState, PluginStatus, ResourceDescriptor};
