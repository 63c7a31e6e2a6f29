// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::Result;
use crate::options::Options;
use crate::plugins::{text_input, BUILTIN_VERSION};
use crate::result::{make_result, Metadata, Payload, ProcessResult};
use crate::traits::{Plugin, PluginState, PluginStatus, ResourceDescriptor};

/// Reverses the input string by characters.
#[derive(Debug, Default)]
pub struct ReverseTextPlugin;

impl ReverseTextPlugin {
    pub const NAME: &'static str = "reverse_text";

    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Plugin for ReverseTextPlugin {
    async fn process(&self, input: Payload, _options: Options) -> Result<ProcessResult> {
        let reversed: String = text_input(Self::NAME, &input)?.chars().rev().collect();
        Ok(make_result(reversed, "text", Metadata::new()))
    }

    fn list_resources(&self) -> Vec<ResourceDescriptor> {
        Vec::new()
    }

    fn status(&self) -> PluginStatus {
        PluginStatus {
            state: PluginState::Running,
            version: BUILTIN_VERSION.to_string(),
            name: Self::NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reverse_text() {
        let test_cases = vec![("hello", "olleh"), ("", ""), ("héllo wörld", "dlröw olléh")];

        let plugin = ReverseTextPlugin::new();
        for (input, expected) in test_cases {
            let result = plugin.process(input.into(), Options::new()).await.unwrap();
            assert_eq!(result.data().as_text(), Some(expected), "input '{}'", input);
        }
    }

    #[test]
    fn test_has_no_resources() {
        let plugin = ReverseTextPlugin::new();
        assert!(plugin.list_resources().is_empty());
        assert!(plugin.get_resource("anything").is_err());
    }
}
