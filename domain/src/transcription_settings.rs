//! Typed transcription configuration.
//!
//! Bot settings arrive as free-form JSON. Rather than chasing values through
//! nested dictionaries, the recognized options per provider are explicit
//! structs; fields nobody recognizes are preserved in flattened maps so that
//! settings written by a newer API version survive a read-modify-write cycle.

use entity::transcription_provider::TranscriptionProvider;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Languages nova-3 cannot transcribe yet.
const DEEPGRAM_NOVA2_ONLY_LANGUAGES: &[&str] = &[
    "zh", "zh-CN", "zh-Hans", "zh-TW", "zh-Hant", "zh-HK", "th", "th-TH",
];

const DEEPGRAM_DEFAULT_MODEL: &str = "nova-3";
const DEEPGRAM_FALLBACK_MODEL: &str = "nova-2";
const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-transcribe";
const OPENAI_DIARIZE_MODEL: &str = "gpt-4o-transcribe-diarize";
const ELEVENLABS_DEFAULT_MODEL: &str = "scribe_v1";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai: Option<OpenAiSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assembly_ai: Option<AssemblyAiSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deepgram: Option<DeepgramSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gladia: Option<GladiaSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sarvam: Option<SarvamSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevenlabs: Option<ElevenLabsSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kyutai: Option<KyutaiSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_async: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_closed_captions: Option<ClosedCaptionSettings>,
    /// Escape hatch for options this build does not recognize.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunking_strategy: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyAiSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    pub language_detection: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyterms_prompt: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_model: Option<String>,
    pub speaker_labels: bool,
    pub use_eu_server: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_detection_options: Option<LanguageDetectionOptions>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageDetectionOptions {
    pub expected_languages: Vec<String>,
    pub fallback_language: String,
}

impl Default for LanguageDetectionOptions {
    fn default() -> Self {
        Self {
            expected_languages: vec!["all".to_string()],
            fallback_language: "auto".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeepgramSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detect_language: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyterms: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub redact: Vec<String>,
    pub replace: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeepgramSettings {
    /// The model to request. nova-3 unless the configured language still
    /// requires nova-2, and an explicit choice always wins.
    pub fn resolved_model(&self) -> &str {
        if let Some(model) = self.model.as_deref() {
            return model;
        }
        if let Some(language) = self.language.as_deref() {
            if DEEPGRAM_NOVA2_ONLY_LANGUAGES.contains(&language) {
                return DEEPGRAM_FALLBACK_MODEL;
            }
        }
        DEEPGRAM_DEFAULT_MODEL
    }

    /// Streaming mode is implied by the presence of a callback URL.
    pub fn use_streaming(&self) -> bool {
        self.callback.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GladiaSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_switching_languages: Option<Vec<String>>,
    pub enable_code_switching: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SarvamSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevenLabsSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_audio_events: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ElevenLabsSettings {
    pub fn resolved_model_id(&self) -> &str {
        self.model_id.as_deref().unwrap_or(ELEVENLABS_DEFAULT_MODEL)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KyutaiSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Closed caption capture, configured per meeting platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClosedCaptionSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_meet_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teams_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom_language: Option<String>,
    pub merge_consecutive_captions: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TranscriptionSettings {
    /// Parses the `transcription_settings` block out of a bot's settings
    /// document. Absent or malformed blocks parse as the empty settings.
    pub fn from_bot_settings(bot_settings: &Value) -> Self {
        bot_settings
            .get("transcription_settings")
            .cloned()
            .and_then(|block| serde_json::from_value(block).ok())
            .unwrap_or_default()
    }

    /// The provider implied by which settings block is present.
    pub fn provider_hint(&self) -> Option<TranscriptionProvider> {
        if self.deepgram.is_some() {
            Some(TranscriptionProvider::Deepgram)
        } else if self.openai.is_some() {
            Some(TranscriptionProvider::OpenAi)
        } else if self.assembly_ai.is_some() {
            Some(TranscriptionProvider::AssemblyAi)
        } else if self.gladia.is_some() {
            Some(TranscriptionProvider::Gladia)
        } else if self.sarvam.is_some() {
            Some(TranscriptionProvider::Sarvam)
        } else if self.elevenlabs.is_some() {
            Some(TranscriptionProvider::ElevenLabs)
        } else if self.kyutai.is_some() {
            Some(TranscriptionProvider::Kyutai)
        } else if self.custom_async.is_some() {
            Some(TranscriptionProvider::CustomAsync)
        } else if self.meeting_closed_captions.is_some() {
            Some(TranscriptionProvider::ClosedCaptionFromPlatform)
        } else {
            None
        }
    }

    /// The OpenAI model to request.
    pub fn openai_model(&self) -> &str {
        self.openai
            .as_ref()
            .and_then(|openai| openai.model.as_deref())
            .unwrap_or(OPENAI_DEFAULT_MODEL)
    }

    /// Response format only applies to the diarizing model.
    pub fn openai_response_format(&self) -> Option<&str> {
        if self.openai_model() != OPENAI_DIARIZE_MODEL {
            return None;
        }
        Some(
            self.openai
                .as_ref()
                .and_then(|openai| openai.response_format.as_deref())
                .unwrap_or("diarized_json"),
        )
    }

    /// AssemblyAI endpoint, honoring the EU residency flag.
    pub fn assemblyai_base_url(&self) -> &'static str {
        let use_eu_server = self
            .assembly_ai
            .as_ref()
            .map(|assembly_ai| assembly_ai.use_eu_server)
            .unwrap_or(false);
        if use_eu_server {
            "https://api.eu.assemblyai.com/v2"
        } else {
            "https://api.assemblyai.com/v2"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_settings_parse_as_defaults() {
        let parsed = TranscriptionSettings::from_bot_settings(&json!({}));
        assert_eq!(parsed, TranscriptionSettings::default());
        assert_eq!(parsed.provider_hint(), None);
    }

    #[test]
    fn deepgram_model_defaults_to_nova3() {
        let parsed = TranscriptionSettings::from_bot_settings(&json!({
            "transcription_settings": {"deepgram": {"language": "en"}}
        }));
        let deepgram = parsed.deepgram.as_ref().unwrap();
        assert_eq!(deepgram.resolved_model(), "nova-3");
        assert!(!deepgram.use_streaming());
    }

    #[test]
    fn deepgram_falls_back_to_nova2_for_chinese_and_thai() {
        for language in ["zh", "zh-TW", "zh-HK", "th", "th-TH"] {
            let parsed = TranscriptionSettings::from_bot_settings(&json!({
                "transcription_settings": {"deepgram": {"language": language}}
            }));
            assert_eq!(
                parsed.deepgram.as_ref().unwrap().resolved_model(),
                "nova-2",
                "language {language} should force nova-2"
            );
        }
    }

    #[test]
    fn explicit_deepgram_model_wins_over_the_fallback() {
        let parsed = TranscriptionSettings::from_bot_settings(&json!({
            "transcription_settings": {"deepgram": {"language": "zh", "model": "nova-3"}}
        }));
        assert_eq!(parsed.deepgram.as_ref().unwrap().resolved_model(), "nova-3");
    }

    #[test]
    fn openai_response_format_only_applies_to_the_diarize_model() {
        let plain = TranscriptionSettings::from_bot_settings(&json!({
            "transcription_settings": {"openai": {"model": "gpt-4o-transcribe"}}
        }));
        assert_eq!(plain.openai_response_format(), None);

        let diarize = TranscriptionSettings::from_bot_settings(&json!({
            "transcription_settings": {"openai": {"model": "gpt-4o-transcribe-diarize"}}
        }));
        assert_eq!(diarize.openai_response_format(), Some("diarized_json"));
    }

    #[test]
    fn assemblyai_eu_flag_switches_the_endpoint() {
        let parsed = TranscriptionSettings::from_bot_settings(&json!({
            "transcription_settings": {"assembly_ai": {"use_eu_server": true}}
        }));
        assert_eq!(
            parsed.assemblyai_base_url(),
            "https://api.eu.assemblyai.com/v2"
        );
        assert_eq!(
            TranscriptionSettings::default().assemblyai_base_url(),
            "https://api.assemblyai.com/v2"
        );
    }

    #[test]
    fn language_detection_options_fill_their_defaults() {
        let parsed = TranscriptionSettings::from_bot_settings(&json!({
            "transcription_settings": {
                "assembly_ai": {"language_detection_options": {}}
            }
        }));
        let options = parsed
            .assembly_ai
            .as_ref()
            .unwrap()
            .language_detection_options
            .as_ref()
            .unwrap();
        assert_eq!(options.expected_languages, vec!["all"]);
        assert_eq!(options.fallback_language, "auto");
    }

    #[test]
    fn unknown_fields_survive_a_roundtrip() {
        let original = json!({
            "deepgram": {"language": "en", "experimental_flag": true},
            "brand_new_provider": {"token": "t"}
        });
        let parsed: TranscriptionSettings = serde_json::from_value(original.clone()).unwrap();

        assert!(parsed
            .deepgram
            .as_ref()
            .unwrap()
            .extra
            .contains_key("experimental_flag"));
        assert!(parsed.extra.contains_key("brand_new_provider"));

        let reserialized = serde_json::to_value(&parsed).unwrap();
        assert_eq!(reserialized["deepgram"]["experimental_flag"], json!(true));
        assert_eq!(reserialized["brand_new_provider"]["token"], json!("t"));
    }

    #[test]
    fn provider_hint_prefers_the_present_block() {
        let deepgram = TranscriptionSettings::from_bot_settings(&json!({
            "transcription_settings": {"deepgram": {}}
        }));
        assert_eq!(
            deepgram.provider_hint(),
            Some(TranscriptionProvider::Deepgram)
        );

        let captions = TranscriptionSettings::from_bot_settings(&json!({
            "transcription_settings": {"meeting_closed_captions": {"zoom_language": "en"}}
        }));
        assert_eq!(
            captions.provider_hint(),
            Some(TranscriptionProvider::ClosedCaptionFromPlatform)
        );
    }
}
