// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Text-to-speech plugin.
//!
//! Synthesis itself is a placeholder that returns fixed sample audio; the
//! plugin exists to exercise binary results and resource listings.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorRecord, Result};
use crate::options::{OptionKind, OptionSpec, Options};
use crate::plugins::{text_input, BUILTIN_VERSION};
use crate::result::{make_result, Metadata, Payload, ProcessResult};
use crate::traits::{Plugin, PluginConfig, PluginState, PluginStatus, ResourceDescriptor};

pub const VOICE_OPTION: &str = "voice";
pub const LANGUAGE_OPTION: &str = "language";
/// Plugin setting holding extra voices, a list of `{name, language, gender}`.
pub const VOICES_SETTING: &str = "voices";

const SAMPLE_AUDIO: &[u8] = b"SAMPLE_AUDIO_DATA";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub name: String,
    pub language: String,
    #[serde(default)]
    pub gender: String,
}

impl Voice {
    pub fn new(name: impl Into<String>, language: impl Into<String>, gender: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: language.into(),
            gender: gender.into(),
        }
    }

    fn descriptor(&self) -> ResourceDescriptor {
        ResourceDescriptor::new(
            self.name.clone(),
            self.name.clone(),
            format!("{} voice", self.language),
        )
        .with_attribute("language", self.language.clone())
        .with_attribute("gender", self.gender.clone())
    }
}

impl Default for Voice {
    fn default() -> Self {
        Self::new("default", "en-US", "female")
    }
}

pub struct SpeechSynthesisPlugin {
    voices: Vec<Voice>,
}

impl SpeechSynthesisPlugin {
    pub const NAME: &'static str = "speech_synthesis";

    /// The default voice followed by `extra` (a voice named `default` replaces it).
    pub fn new(extra: Vec<Voice>) -> Self {
        let mut voices = vec![Voice::default()];
        for voice in extra {
            match voices.iter_mut().find(|known| known.name == voice.name) {
                Some(known) => *known = voice,
                None => voices.push(voice),
            }
        }
        Self { voices }
    }

    pub fn from_config(config: &PluginConfig) -> Result<Self> {
        let extra = match config.get(VOICES_SETTING) {
            Some(value) => serde_json::from_value::<Vec<Voice>>(value.clone()).map_err(|e| {
                ErrorRecord::configuration(format!("invalid '{}' setting: {}", VOICES_SETTING, e))
                    .with_detail("plugin", config.name())
                    .with_cause(e)
            })?,
            None => Vec::new(),
        };
        Ok(Self::new(extra))
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    fn select_voice(&self, options: &Options) -> Result<&Voice> {
        let language = options.get_str(LANGUAGE_OPTION);
        let voice = match options.get_str(VOICE_OPTION) {
            Some(name) => self.voices.iter().find(|voice| voice.name == name),
            None => match language {
                Some(language) => self.voices.iter().find(|voice| voice.language == language),
                None => self.voices.first(),
            },
        };

        voice
            .filter(|voice| language.map_or(true, |language| voice.language == language))
            .ok_or_else(|| {
                ErrorRecord::validation("no voice matches the requested voice and language")
                    .with_detail(VOICE_OPTION, options.get_str(VOICE_OPTION).unwrap_or_default())
                    .with_detail(LANGUAGE_OPTION, language.unwrap_or_default())
            })
    }
}

impl Default for SpeechSynthesisPlugin {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl Plugin for SpeechSynthesisPlugin {
    async fn process(&self, input: Payload, options: Options) -> Result<ProcessResult> {
        let text = text_input(Self::NAME, &input)?;
        let voice = self.select_voice(&options)?;

        let mut metadata = Metadata::new();
        metadata.insert("voice".to_string(), voice.name.clone().into());
        metadata.insert("language".to_string(), voice.language.clone().into());
        metadata.insert("text_length".to_string(), text.chars().count().into());
        Ok(make_result(SAMPLE_AUDIO.to_vec(), "wav", metadata))
    }

    fn list_resources(&self) -> Vec<ResourceDescriptor> {
        self.voices.iter().map(Voice::descriptor).collect()
    }

    fn status(&self) -> PluginStatus {
        PluginStatus {
            state: PluginState::Running,
            version: BUILTIN_VERSION.to_string(),
            name: Self::NAME.to_string(),
        }
    }

    fn option_specs(&self) -> Vec<OptionSpec> {
        vec![
            OptionSpec::new(VOICE_OPTION, OptionKind::Text, "voice name, see list_resources"),
            OptionSpec::new(LANGUAGE_OPTION, OptionKind::Text, "BCP 47 language tag"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use serde_json::json;

    fn with_extra_voices() -> SpeechSynthesisPlugin {
        let mut settings = indexmap::IndexMap::new();
        settings.insert(
            VOICES_SETTING.to_string(),
            json!([
                {"name": "anna", "language": "pl-PL", "gender": "female"},
                {"name": "hans", "language": "de-DE"}
            ]),
        );
        SpeechSynthesisPlugin::from_config(&PluginConfig::new("tts", settings)).unwrap()
    }

    #[tokio::test]
    async fn test_synthesis_returns_wav_bytes() {
        let plugin = SpeechSynthesisPlugin::default();
        let result = plugin.process("Hello".into(), Options::new()).await.unwrap();

        assert_eq!(result.format(), "wav");
        assert_eq!(result.data(), &Payload::Bytes(SAMPLE_AUDIO.to_vec()));
        assert_eq!(result.metadata()["voice"], "default");
        assert_eq!(result.metadata()["text_length"], 5);
    }

    #[test]
    fn test_voices_are_resources() {
        let plugin = with_extra_voices();
        let ids: Vec<String> = plugin.list_resources().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["default", "anna", "hans"]);

        let anna = plugin.get_resource("anna").unwrap();
        assert_eq!(anna.attributes["language"], "pl-PL");
        assert_eq!(plugin.get_resource("nobody").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_voice_selection() {
        struct TestCase {
            name: &'static str,
            options: Options,
            expected: Option<&'static str>,
        }

        let test_cases = vec![
            TestCase {
                name: "by name",
                options: Options::new().with(VOICE_OPTION, "hans"),
                expected: Some("hans"),
            },
            TestCase {
                name: "by language",
                options: Options::new().with(LANGUAGE_OPTION, "pl-PL"),
                expected: Some("anna"),
            },
            TestCase {
                name: "name and language agree",
                options: Options::new().with(VOICE_OPTION, "anna").with(LANGUAGE_OPTION, "pl-PL"),
                expected: Some("anna"),
            },
            TestCase {
                name: "name and language disagree",
                options: Options::new().with(VOICE_OPTION, "anna").with(LANGUAGE_OPTION, "de-DE"),
                expected: None,
            },
            TestCase {
                name: "unknown voice",
                options: Options::new().with(VOICE_OPTION, "nobody"),
                expected: None,
            },
        ];

        let plugin = with_extra_voices();
        for test_case in test_cases {
            let outcome = plugin.process("hi".into(), test_case.options).await;
            match test_case.expected {
                Some(voice) => {
                    let result = outcome.unwrap();
                    assert_eq!(result.metadata()["voice"], voice, "case '{}'", test_case.name);
                }
                None => {
                    let err = outcome.unwrap_err();
                    assert_eq!(err.kind(), ErrorKind::Validation, "case '{}'", test_case.name);
                }
            }
        }
    }

    #[test]
    fn test_malformed_voice_setting_is_configuration_error() {
        let mut settings = indexmap::IndexMap::new();
        settings.insert(VOICES_SETTING.to_string(), json!("not a list"));
        let err = SpeechSynthesisPlugin::from_config(&PluginConfig::new("tts", settings))
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
