use async_trait::async_trait;
use serde::Serialize;

use crate::errors::{ErrorRecord, Result};
use crate::options::Options;
use crate::plugins::{text_input, BUILTIN_VERSION};
use crate::result::{make_result, Metadata, Payload, ProcessResult};
use crate::traits::{Plugin, PluginState, PluginStatus, ResourceDescriptor};

/// Counts characters, words and lines; answers with a JSON document.
#[derive(Debug, Default)]
pub struct TokenCounterPlugin;

impl TokenCounterPlugin {
    pub const NAME: &'static str = "token_counter";

    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Serialize)]
struct TokenCount {
    char_count: usize,
    word_count: usize,
    line_count: usize,
}

impl TokenCount {
    fn of(input: &str) -> Self {
        Self {
            char_count: input.chars().count(),
            word_count: input.split_whitespace().count(),
            // At least one line, even for empty input.
            line_count: input.lines().count().max(1),
        }
    }
}

#[async_trait]
impl Plugin for TokenCounterPlugin {
    async fn process(&self, input: Payload, _options: Options) -> Result<ProcessResult> {
        let counts = TokenCount::of(text_input(Self::NAME, &input)?);
        let json = serde_json::to_string(&counts).map_err(|e| {
            ErrorRecord::serialization(format!("failed to serialize token counts: {}", e)).with_cause(e)
        })?;

        let mut metadata = Metadata::new();
        metadata.insert("char_count".to_string(), counts.char_count.into());
        metadata.insert("word_count".to_string(), counts.word_count.into());
        metadata.insert("line_count".to_string(), counts.line_count.into());
        Ok(make_result(json, "json", metadata))
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
