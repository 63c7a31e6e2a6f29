// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Layered configuration: defaults, file, environment overlay, environment
//! variables and overrides, reduced to typed [`EngineSettings`].

pub mod consts;
mod loader;
mod settings;
mod snapshot;
mod source;

pub use loader::{coerce_env_value, ConfigLoader};
pub use settings::{EngineSettings, PluginEntry};
pub use snapshot::ConfigSnapshot;
pub use source::ConfigPluginSource;
