// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod cache;      // bounded result cache
pub mod config;     // layered configuration
pub mod engine;     // dispatcher
pub mod errors;     // error taxonomy
pub mod observability;
pub mod options;    // typed per-call options
pub mod plugins;    // built-in plugins
pub mod registry;   // plugin registry + discovery
pub mod result;     // result envelope
pub mod traits;     // plugin capability contract
