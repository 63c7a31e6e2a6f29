// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Plugins that ship with the engine.
//!
//! Each one is an ordinary [`Plugin`](crate::traits::Plugin); nothing here is
//! special to the dispatcher. [`BuiltinPlugins`] offers all of them to
//! [`PluginRegistry::discover`](crate::registry::PluginRegistry::discover).

pub mod builtin;
pub mod change_text_case;
pub mod reverse_text;
pub mod speech_synthesis;
pub mod token_counter;

#[cfg(test)]
pub mod stub;

pub use builtin::BuiltinPlugins;
pub use change_text_case::{ChangeTextCasePlugin, TextCase};
pub use reverse_text::ReverseTextPlugin;
pub use speech_synthesis::{SpeechSynthesisPlugin, Voice};
pub use token_counter::TokenCounterPlugin;

use crate::errors::{ErrorRecord, Result};
use crate::result::Payload;

/// Version reported by every built-in plugin.
pub const BUILTIN_VERSION: &str = env!("CARGO_PKG_VERSION");

pub(crate) fn text_input<'a>(plugin: &str, input: &'a Payload) -> Result<&'a str> {
    input.as_text().ok_or_else(|| {
        ErrorRecord::unsupported_format(format!("plugin '{}' expects UTF-8 text input", plugin))
            .with_detail("plugin", plugin)
            .with_detail("input_size", input.len())
    })
}
