use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub storage: StorageConfig,
    pub dialogue: DialogueConfig,
    pub speech: SpeechConfig,
    pub voice_input: VoiceInputConfig,
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageConfig {
    /// Directory for the persisted key-value store and line-editor history.
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.moodmate".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DialogueConfig {
    /// Pause between echoing the user's line and the bot's reply.
    pub reply_delay_ms: u64,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self { reply_delay_ms: 500 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpeechConfig {
    pub enabled: bool,
    /// BCP 47 language tag handed to the speech engine.
    pub lang: String,
    /// Substrings matched against voice names, in order of preference.
    pub preferred_voices: Vec<String>,
    /// Explicit speech command (e.g. "espeak-ng"). Auto-detected when unset.
    pub command: Option<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            lang: "en-GB".into(),
            preferred_voices: vec!["Daniel".into(), "Male".into()],
            command: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoiceInputConfig {
    pub enabled: bool,
    pub lang: String,
    /// Length of the one-shot microphone clip.
    pub record_secs: u64,
    /// Groq API key. Falls back to GROQ_API_KEY.
    pub api_key: Option<String>,
    /// ffmpeg input device override (e.g. "hw:1" or ":1").
    pub device: Option<String>,
}

impl Default for VoiceInputConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            lang: "en-US".into(),
            record_secs: 5,
            api_key: None,
            device: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 18790,
        }
    }
}
