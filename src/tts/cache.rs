//! Модуль для кэширования результатов TTS
//!
//! Кэшем служит сама директория с аудио: имя файла детерминированно
//! выводится из слова, типа озвучки и хэша текста, поэтому наличие файла
//! означает, что этот текст уже озвучен. Содержимое файла не проверяется.
//!
//! Хэш укорочен до 8 hex-символов MD5. Коллизии для одного слова и типа
//! не обнаруживаются и не исправляются.

use std::fmt;
use std::path::PathBuf;

use log::{debug, info};

use super::SpeechSynthesizer;
use crate::error::{CardError, Result};

/// Длина отпечатка текста в hex-символах
const FINGERPRINT_LEN: usize = 8;

/// Тип озвучиваемого поля карточки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioKind {
    Word,
    Meaning,
    Sentence,
}

impl AudioKind {
    /// Метка типа в имени файла
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Meaning => "meaning",
            Self::Sentence => "sentence",
        }
    }
}

impl fmt::Display for AudioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Аудиофайл для одного поля карточки
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioAsset {
    /// Текст, который озвучивается
    pub source_text: String,
    /// Слово карточки, к которой относится файл
    pub word: String,
    pub kind: AudioKind,
    /// Имя файла внутри директории аудио
    pub filename: String,
    /// Был ли файл на диске до обращения к синтезатору
    pub exists: bool,
}

impl AudioAsset {
    /// Ссылка на звук в разметке Anki
    pub fn sound_ref(&self) -> String {
        format!("[sound:{}]", self.filename)
    }
}

/// Преобразовать слово или фразу в безопасный для имени файла токен
pub fn normalize_word(word: &str) -> String {
    word.replace(' ', "_").to_lowercase()
}

/// Стабильный короткий отпечаток текста (первые 8 символов MD5)
pub fn fingerprint(text: &str) -> String {
    let digest = format!("{:x}", md5::compute(text.as_bytes()));
    digest[..FINGERPRINT_LEN].to_string()
}

/// Имя аудиофайла: `{слово}-{тип}-{отпечаток}.mp3`
pub fn audio_filename(word: &str, kind: AudioKind, text: &str) -> String {
    format!("{}-{}-{}.mp3", normalize_word(word), kind, fingerprint(text))
}

/// Директория аудиофайлов, работающая как кэш синтеза
#[derive(Debug, Clone)]
pub struct AudioCache {
    dir: PathBuf,
}

impl AudioCache {
    /// Создать кэш поверх директории (сама директория здесь не создается)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Описать файл для текста и проверить, есть ли он уже на диске
    pub fn asset(&self, word: &str, kind: AudioKind, text: &str) -> AudioAsset {
        let filename = audio_filename(word, kind, text);
        let exists = self.dir.join(&filename).exists();

        AudioAsset {
            source_text: text.to_string(),
            word: word.to_string(),
            kind,
            filename,
            exists,
        }
    }

    /// Гарантировать наличие файла: при промахе кэша вызвать синтезатор
    /// и записать результат. Ошибка синтеза возвращается как есть.
    pub async fn ensure(
        &self,
        synthesizer: &dyn SpeechSynthesizer,
        word: &str,
        kind: AudioKind,
        text: &str,
    ) -> Result<AudioAsset> {
        let asset = self.asset(word, kind, text);

        if asset.exists {
            debug!("Using cached audio {}", asset.filename);
            return Ok(asset);
        }

        let audio = synthesizer.synthesize(text).await?;
        let path = self.dir.join(&asset.filename);
        tokio::fs::write(&path, &audio)
            .await
            .map_err(|e| CardError::filesystem(&path, e))?;

        info!("Saved {} audio for '{}' to {}", kind, word, path.display());
        Ok(asset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSynthesizer {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl SpeechSynthesizer for CountingSynthesizer {
        async fn synthesize(&self, text: &str) -> Result<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Bytes::from(format!("audio:{}", text)))
        }
    }

    #[test]
    fn test_normalize_word() {
        assert_eq!(normalize_word("as good as"), "as_good_as");
        assert_eq!(normalize_word("Apple"), "apple");
        assert_eq!(normalize_word("Break The Ice"), "break_the_ice");
    }

    #[test]
    fn test_fingerprint_is_md5_prefix() {
        // md5("apple") = 1f3870be274f6c49b3e31a0c6728957f
        assert_eq!(fingerprint("apple"), "1f3870be");
        // md5("") = d41d8cd98f00b204e9800998ecf8427e
        assert_eq!(fingerprint(""), "d41d8cd9");
        assert_eq!(fingerprint("apple"), fingerprint("apple"));
        assert_ne!(fingerprint("apple"), fingerprint("Apple"));
    }

    #[test]
    fn test_audio_filename() {
        assert_eq!(audio_filename("apple", AudioKind::Word, "apple"), "apple-word-1f3870be.mp3");

        let name = audio_filename("as good as", AudioKind::Word, "as good as");
        assert!(name.starts_with("as_good_as-word-"));
        assert!(name.ends_with(".mp3"));
        assert_eq!(name, audio_filename("as good as", AudioKind::Word, "as good as"));

        let meaning = audio_filename("apple", AudioKind::Meaning, "a fruit");
        let sentence = audio_filename("apple", AudioKind::Sentence, "a fruit");
        assert!(meaning.starts_with("apple-meaning-"));
        assert!(sentence.starts_with("apple-sentence-"));
        assert_eq!(meaning[14..], sentence[15..]);
    }

    #[test]
    fn test_sound_ref() {
        let cache = AudioCache::new("/nonexistent");
        let asset = cache.asset("apple", AudioKind::Word, "apple");
        assert!(!asset.exists);
        assert_eq!(asset.sound_ref(), "[sound:apple-word-1f3870be.mp3]");
    }

    #[tokio::test]
    async fn test_ensure_synthesizes_once() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AudioCache::new(dir.path());
        let synthesizer = CountingSynthesizer { calls: AtomicUsize::new(0) };

        let first = cache
            .ensure(&synthesizer, "apple", AudioKind::Sentence, "I ate an apple.")
            .await
            .unwrap();
        assert!(!first.exists);
        assert_eq!(synthesizer.calls.load(Ordering::SeqCst), 1);

        let written = std::fs::read(dir.path().join(&first.filename)).unwrap();
        assert_eq!(written, b"audio:I ate an apple.");

        let second = cache
            .ensure(&synthesizer, "apple", AudioKind::Sentence, "I ate an apple.")
            .await
            .unwrap();
        assert!(second.exists);
        assert_eq!(second.filename, first.filename);
        assert_eq!(synthesizer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_existing_file_is_reused_without_verification() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AudioCache::new(dir.path());
        let synthesizer = CountingSynthesizer { calls: AtomicUsize::new(0) };

        let name = audio_filename("apple", AudioKind::Word, "apple");
        std::fs::write(dir.path().join(&name), b"not really mp3").unwrap();

        let asset = cache.ensure(&synthesizer, "apple", AudioKind::Word, "apple").await.unwrap();
        assert!(asset.exists);
        assert_eq!(synthesizer.calls.load(Ordering::SeqCst), 0);
        assert_eq!(std::fs::read(dir.path().join(&name)).unwrap(), b"not really mp3");
    }
}
