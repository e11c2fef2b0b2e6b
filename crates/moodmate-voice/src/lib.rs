//! Speech adapters for the check-in bot.
//!
//! Output: the platform speech command (see [`tts`]).
//! Input: a one-shot microphone clip recorded with ffmpeg, transcribed by
//! the Groq Whisper API.

pub mod audio;
pub mod groq;
pub mod tts;

use anyhow::Result;
use async_trait::async_trait;
use moodmate_config::VoiceInputConfig;
use moodmate_core::SpeechInput;
use tracing::{debug, info};

pub use tts::{create_speech_output, CommandSpeaker};

/// Transcription backend trait.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file at the given path.
    async fn transcribe_file(&self, file_path: &str) -> Result<String>;
}

/// "en-US" -> "en".
pub fn language_code(locale: &str) -> Option<String> {
    let code = locale.split(['-', '_']).next()?.trim().to_lowercase();
    if code.is_empty() {
        None
    } else {
        Some(code)
    }
}

/// First non-empty line of a transcript.
fn first_transcript(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(String::from)
}

/// Resolve the Groq API key from config, falling back to GROQ_API_KEY.
pub fn resolve_api_key(config: &VoiceInputConfig) -> Option<String> {
    config
        .api_key
        .clone()
        .filter(|k| !k.is_empty())
        .or_else(|| std::env::var("GROQ_API_KEY").ok().filter(|k| !k.is_empty()))
}

/// Records a clip, transcribes it, returns the first line heard.
pub struct MicrophoneInput {
    transcriber: Box<dyn Transcriber>,
    device: Option<String>,
    record_secs: u64,
}

impl MicrophoneInput {
    pub fn new(transcriber: Box<dyn Transcriber>, device: Option<String>, record_secs: u64) -> Self {
        Self {
            transcriber,
            device,
            record_secs,
        }
    }

    pub fn record_secs(&self) -> u64 {
        self.record_secs
    }
}

#[async_trait]
impl SpeechInput for MicrophoneInput {
    async fn listen(&self) -> Result<Option<String>> {
        let clip = audio::record_clip(self.device.as_deref(), self.record_secs).await?;
        let clip_str = clip.to_string_lossy().to_string();
        let result = self.transcriber.transcribe_file(&clip_str).await;
        if let Err(e) = tokio::fs::remove_file(&clip).await {
            debug!("Failed to remove clip {clip_str}: {e}");
        }
        Ok(first_transcript(&result?))
    }

    fn engine_name(&self) -> &str {
        "groq-whisper"
    }
}

/// Detect speech input once. `None` means the control should be disabled.
pub fn create_speech_input(config: &VoiceInputConfig) -> Option<MicrophoneInput> {
    if !config.enabled {
        info!("Voice input disabled in config");
        return None;
    }
    if !audio::ffmpeg_available() {
        info!("ffmpeg not found, voice input unavailable");
        return None;
    }
    let Some(key) = resolve_api_key(config) else {
        info!("No Groq API key configured, voice input unavailable");
        return None;
    };
    let transcriber = groq::GroqTranscriber::new(key, language_code(&config.lang));
    info!("Voice input available ({}s clips)", config.record_secs);
    Some(MicrophoneInput::new(
        Box::new(transcriber),
        config.device.clone(),
        config.record_secs,
    ))
}
