// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error taxonomy and the [`ErrorRecord`] failure value.
//!
//! Codes are grouped into five numeric bands (general, engine, service, plugin,
//! external). Anything that fails inside a component is converted into an
//! [`ErrorRecord`] before it crosses the component boundary.

mod kind;
mod record;

pub use kind::{ErrorBand, ErrorKind};
pub use record::{Cause, ErrorRecord, Result};
