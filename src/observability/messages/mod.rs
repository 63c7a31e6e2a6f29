// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable text and
//! [`StructuredLog`] to emit the same event with structured fields at the
//! level the message belongs to.
//!
//! # Organization
//!
//! * `dispatch` - run lifecycle, cache short-circuits, timeouts, hooks, shutdown
//! * `registry` - registration, instantiation and discovery events
//! * `cache` - eviction and expiry of cached results
//! * `config` - configuration layering
//!
//! # Usage Pattern
//!
//! ```rust
//! use process_engine::observability::messages::dispatch::DispatchStarted;
//! use process_engine::observability::messages::StructuredLog;
//!
//! let msg = DispatchStarted {
//!     plugin: "change_text_case",
//!     input_size: 5,
//!     option_count: 0,
//! };
//!
//! msg.log();
//! ```

use std::fmt::Display;
use tracing::Span;

pub mod cache;
pub mod config;
pub mod dispatch;
pub mod registry;

/// A log message that knows its level and structured fields.
pub trait StructuredLog: Display {
    /// Emit the event.
    fn log(&self);

    /// Span carrying the message fields.
    fn span(&self, name: &str) -> Span {
        tracing::info_span!("event", span_name = name, message = %self)
    }
}
