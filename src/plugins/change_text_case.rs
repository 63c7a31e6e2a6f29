use std::str::FromStr;

use async_trait::async_trait;

use crate::errors::{ErrorRecord, Result};
use crate::options::{OptionKind, OptionSpec, Options};
use crate::plugins::{text_input, BUILTIN_VERSION};
use crate::result::{make_result, Metadata, Payload, ProcessResult};
use crate::traits::{Plugin, PluginConfig, PluginState, PluginStatus, ResourceDescriptor};

pub const CASE_OPTION: &str = "case";

const SMALL_WORDS: [&str; 14] = [
    "a", "an", "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextCase {
    #[default]
    Upper,
    Lower,
    /// First letter of every word capitalized.
    Proper,
    /// Like proper, but articles and short prepositions stay lower-case after the first word.
    Title,
}

impl TextCase {
    pub const ALL: [TextCase; 4] = [TextCase::Upper, TextCase::Lower, TextCase::Proper, TextCase::Title];

    pub fn as_str(&self) -> &'static str {
        match self {
            TextCase::Upper => "upper",
            TextCase::Lower => "lower",
            TextCase::Proper => "proper",
            TextCase::Title => "title",
        }
    }

    pub fn apply(&self, input: &str) -> String {
        match self {
            TextCase::Upper => input.to_uppercase(),
            TextCase::Lower => input.to_lowercase(),
            TextCase::Proper => input
                .split_whitespace()
                .map(capitalize)
                .collect::<Vec<_>>()
                .join(" "),
            TextCase::Title => input
                .split_whitespace()
                .enumerate()
                .map(|(i, word)| {
                    let lower = word.to_lowercase();
                    if i > 0 && SMALL_WORDS.contains(&lower.as_str()) {
                        lower
                    } else {
                        capitalize(word)
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl FromStr for TextCase {
    type Err = ErrorRecord;

    fn from_str(s: &str) -> Result<Self> {
        TextCase::ALL
            .into_iter()
            .find(|case| case.as_str() == s)
            .ok_or_else(|| {
                ErrorRecord::validation(format!("unknown case type: {}", s))
                    .with_detail("option", CASE_OPTION)
            })
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
    }
}

/// Converts text to a different case.
///
/// The plugin-level `case` setting picks the default; a per-call `case`
/// option overrides it.
pub struct ChangeTextCasePlugin {
    default_case: TextCase,
}

impl ChangeTextCasePlugin {
    pub const NAME: &'static str = "change_text_case";

    pub fn new(default_case: TextCase) -> Self {
        Self { default_case }
    }

    pub fn from_config(config: &PluginConfig) -> Result<Self> {
        let default_case = match config.get_str(CASE_OPTION) {
            Some(case) => case.parse::<TextCase>().map_err(|e: ErrorRecord| {
                ErrorRecord::configuration(e.message().to_string()).with_detail("plugin", config.name())
            })?,
            None => TextCase::default(),
        };
        Ok(Self::new(default_case))
    }
}

impl Default for ChangeTextCasePlugin {
    fn default() -> Self {
        Self::new(TextCase::default())
    }
}

#[async_trait]
impl Plugin for ChangeTextCasePlugin {
    async fn process(&self, input: Payload, options: Options) -> Result<ProcessResult> {
        let text = text_input(Self::NAME, &input)?;
        let case = match options.get_str(CASE_OPTION) {
            Some(case) => case.parse::<TextCase>()?,
            None => self.default_case,
        };

        let mut metadata = Metadata::new();
        metadata.insert("case".to_string(), case.as_str().into());
        Ok(make_result(case.apply(text), "text", metadata))
    }

    fn list_resources(&self) -> Vec<ResourceDescriptor> {
        TextCase::ALL
            .iter()
            .map(|case| ResourceDescriptor::new(case.as_str(), case.as_str(), "supported case conversion"))
            .collect()
    }

    fn status(&self) -> PluginStatus {
        PluginStatus {
            state: PluginState::Running,
            version: BUILTIN_VERSION.to_string(),
            name: Self::NAME.to_string(),
        }
    }

    fn option_specs(&self) -> Vec<OptionSpec> {
        vec![OptionSpec::new(
            CASE_OPTION,
            OptionKind::Text,
            "one of upper, lower, proper, title",
        )]
    }
}
