//! Capability ports for speech. Implementations live in `moodmate-voice`.

use anyhow::Result;
use async_trait::async_trait;

/// Text-to-speech sink.
pub trait SpeechOutput: Send + Sync {
    /// Queue `text` for speaking and return immediately. Utterances are
    /// never cancelled and may overlap.
    fn speak(&self, text: &str);

    fn engine_name(&self) -> &str;
}

/// One-shot speech-to-text source.
#[async_trait]
pub trait SpeechInput: Send + Sync {
    /// Listen once. `Ok(None)` when nothing intelligible was heard.
    async fn listen(&self) -> Result<Option<String>>;

    fn engine_name(&self) -> &str;
}
