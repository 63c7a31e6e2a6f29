// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Message types live in [`messages`] and are grouped by subsystem, so log text
//! is not scattered through the engine as string literals. Counters and
//! histograms live in [`metrics`]. [`init_tracing`]
//! installs the subscriber used by the binary; the library itself only emits
//! events.
//!
//! # Usage
//!
//! ```rust
//! use process_engine::observability::messages::registry::PluginUnregistered;
//! use process_engine::observability::messages::StructuredLog;
//!
//! PluginUnregistered { name: "reverse_text" }.log();
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod messages;
pub mod metrics;

/// Install a fmt subscriber on stderr filtered by `RUST_LOG`, falling back to
/// `default_level` (e.g. `info` or `process_engine=debug`).
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing(default_level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .is_ok()
}
