use std::sync::Arc;

use crate::errors::{ErrorRecord, Result};
use crate::registry::{from_fn, DiscoveryFailure, PluginCandidate, PluginMetadata, PluginSource};
use crate::traits::PluginFactory;

use super::{
    ChangeTextCasePlugin, ReverseTextPlugin, SpeechSynthesisPlugin, TokenCounterPlugin,
    BUILTIN_VERSION,
};

const AUTHOR: &str = "process-engine";

/// Source of the plugins compiled into this crate, registered under their
/// implementation names.
///
/// # Example
/// ```
/// use process_engine::plugins::BuiltinPlugins;
/// use process_engine::registry::PluginRegistry;
///
/// let registry = PluginRegistry::new();
/// let report = registry.discover(&BuiltinPlugins);
/// assert!(report.is_clean());
/// assert!(registry.contains("reverse_text"));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinPlugins;

impl BuiltinPlugins {
    /// Factory for a built-in implementation.
    ///
    /// - "change_text_case" -> ChangeTextCasePlugin (setting `case`)
    /// - "reverse_text" -> ReverseTextPlugin
    /// - "token_counter" -> TokenCounterPlugin
    /// - "speech_synthesis" -> SpeechSynthesisPlugin (setting `voices`)
    pub fn factory_for(implementation: &str) -> Result<Arc<dyn PluginFactory>> {
        let factory: Arc<dyn PluginFactory> = match implementation {
            ChangeTextCasePlugin::NAME => Arc::new(from_fn(ChangeTextCasePlugin::from_config)),
            ReverseTextPlugin::NAME => Arc::new(from_fn(|_| Ok(ReverseTextPlugin::new()))),
            TokenCounterPlugin::NAME => Arc::new(from_fn(|_| Ok(TokenCounterPlugin::new()))),
            SpeechSynthesisPlugin::NAME => Arc::new(from_fn(SpeechSynthesisPlugin::from_config)),
            _ => {
                return Err(ErrorRecord::configuration(format!(
                    "unknown plugin implementation: '{}'",
                    implementation
                ))
                .with_detail("implementation", implementation)
                .with_detail("available", Self::list_available_implementations()))
            }
        };
        Ok(factory)
    }

    pub fn list_available_implementations() -> Vec<&'static str> {
        vec![
            ChangeTextCasePlugin::NAME,
            ReverseTextPlugin::NAME,
            TokenCounterPlugin::NAME,
            SpeechSynthesisPlugin::NAME,
        ]
    }

    pub fn is_implementation_available(implementation: &str) -> bool {
        Self::list_available_implementations().contains(&implementation)
    }

    pub fn metadata_for(implementation: &str) -> PluginMetadata {
        let description = match implementation {
            ChangeTextCasePlugin::NAME => "Converts text to upper, lower, proper or title case",
            ReverseTextPlugin::NAME => "Reverses text",
            TokenCounterPlugin::NAME => "Counts characters, words and lines",
            SpeechSynthesisPlugin::NAME => "Synthesizes speech from text",
            _ => "",
        };
        PluginMetadata::new(BUILTIN_VERSION, description, AUTHOR)
    }
}

impl PluginSource for BuiltinPlugins {
    fn label(&self) -> String {
        "builtin".to_string()
    }

    fn candidates(&self) -> Vec<std::result::Result<PluginCandidate, DiscoveryFailure>> {
        Self::list_available_implementations()
            .into_iter()
            .map(|implementation| {
                Self::factory_for(implementation)
                    .map(|factory| {
                        PluginCandidate::new(implementation, factory, Self::metadata_for(implementation))
                    })
                    .map_err(|error| DiscoveryFailure {
                        candidate: implementation.to_string(),
                        error,
                    })
            })
            .collect()
    }
}
