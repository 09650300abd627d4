//! Модуль для работы с TTS
//!
//! Содержит трейт синтезатора речи, клиент OpenAI и кэш аудиофайлов.

use bytes::Bytes;

use crate::error::Result;

pub mod cache;
pub mod openai;

pub use cache::{audio_filename, fingerprint, normalize_word, AudioAsset, AudioCache, AudioKind};
pub use openai::OpenAiSynthesizer;

/// Trait that all speech synthesizers must implement
#[async_trait::async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize speech for the exact text, returning the encoded audio (mp3)
    async fn synthesize(&self, text: &str) -> Result<Bytes>;
}
