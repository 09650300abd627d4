//! Модуль конфигурации
//!
//! Конфигурация загружается один раз при старте процесса и дальше
//! передается по ссылке, не изменяясь.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::str::FromStr;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{CardError, Result};

/// Переменная окружения с API ключом OpenAI
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Переменная окружения с альтернативным адресом API
pub const API_BASE_VAR: &str = "OPENAI_API_BASE";
/// Переменная окружения с моделью TTS (необязательная)
pub const TTS_MODEL_VAR: &str = "OPENAI_TTS_MODEL";
/// Переменная окружения с голосом TTS (необязательная)
pub const TTS_VOICE_VAR: &str = "OPENAI_TTS_VOICE";
/// Адрес API OpenAI по умолчанию
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Модель TTS для использования с OpenAI API
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum TtsModel {
    /// Стандартная модель
    #[default]
    Standard,
    /// Модель высокого качества
    HighDefinition,
}

impl TtsModel {
    /// Получить строковое представление модели
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "tts-1",
            Self::HighDefinition => "tts-1-hd",
        }
    }
}

impl FromStr for TtsModel {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "tts-1" => Ok(Self::Standard),
            "tts-1-hd" => Ok(Self::HighDefinition),
            other => Err(CardError::Configuration(format!(
                "Unknown TTS model '{}' (expected tts-1 or tts-1-hd)",
                other
            ))),
        }
    }
}

/// Голос для использования с OpenAI API
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum TtsVoice {
    #[default]
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
}

impl TtsVoice {
    /// Получить строковое представление голоса
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alloy => "alloy",
            Self::Echo => "echo",
            Self::Fable => "fable",
            Self::Onyx => "onyx",
            Self::Nova => "nova",
            Self::Shimmer => "shimmer",
        }
    }

    /// Все поддерживаемые голоса
    pub fn all() -> [TtsVoice; 6] {
        [
            Self::Alloy,
            Self::Echo,
            Self::Fable,
            Self::Onyx,
            Self::Nova,
            Self::Shimmer,
        ]
    }
}

impl FromStr for TtsVoice {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_lowercase();
        Self::all()
            .into_iter()
            .find(|voice| voice.as_str() == name)
            .ok_or_else(|| CardError::Configuration(format!("Unknown TTS voice '{}'", name)))
    }
}

/// Конфигурация приложения
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API ключ для OpenAI
    pub openai_api_key: String,
    /// Альтернативный адрес API (если не задан, используется адрес по умолчанию)
    pub openai_api_base: Option<String>,
    /// Модель TTS
    pub tts_model: TtsModel,
    /// Голос TTS
    pub tts_voice: TtsVoice,
    /// Директория для файла импорта и аудио
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_api_base: None,
            tts_model: TtsModel::default(),
            tts_voice: TtsVoice::default(),
            output_dir: PathBuf::from("out/anki"),
        }
    }
}

impl AppConfig {
    /// Загрузить конфигурацию из окружения (и файла `.env`, если он есть)
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if let Some(message) = dotenv_warning(&e) {
                warn!("{}", message);
            }
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Собрать конфигурацию из произвольного источника переменных
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                CardError::Configuration(format!(
                    "Please set the {} environment variable.",
                    API_KEY_VAR
                ))
            })?;

        let optional = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let tts_model = match optional(TTS_MODEL_VAR) {
            Some(model) => model.parse()?,
            None => TtsModel::default(),
        };
        let tts_voice = match optional(TTS_VOICE_VAR) {
            Some(voice) => voice.parse()?,
            None => TtsVoice::default(),
        };

        Ok(Self {
            openai_api_key: api_key,
            openai_api_base: optional(API_BASE_VAR),
            tts_model,
            tts_voice,
            ..Self::default()
        })
    }

    /// Базовый адрес API с учетом переопределения
    pub fn api_base(&self) -> &str {
        self.openai_api_base
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
    }

    /// Полный адрес эндпоинта генерации речи
    pub fn speech_endpoint(&self) -> String {
        format!("{}/audio/speech", self.api_base())
    }

    /// Первые символы ключа, безопасные для вывода в лог
    pub fn masked_api_key(&self) -> String {
        let prefix: String = self.openai_api_key.chars().take(5).collect();
        format!("{}...", prefix)
    }

    /// Директория для аудиофайлов
    pub fn audio_dir(&self) -> PathBuf {
        self.output_dir.join("audio_files")
    }

    /// Путь к файлу импорта Anki
    pub fn import_file(&self) -> PathBuf {
        self.output_dir.join("anki_import.txt")
    }

    /// Вывести сведения о конфигурации в лог
    pub fn log_summary(&self) {
        info!("API Key (first 5 characters): {}", self.masked_api_key());
        match &self.openai_api_base {
            Some(base) => info!("Using custom OpenAI API base URL: {}", base),
            None => info!("Using default OpenAI API base URL"),
        }
        info!("TTS Configuration:");
        info!("  Model: {}", self.tts_model.as_str());
        info!("  Voice: {}", self.tts_voice.as_str());
        info!("  Output: {}", self.output_dir.display());
    }
}

/// Сообщение для лога об ошибке загрузки `.env`; отсутствие файла - не ошибка
fn dotenv_warning(err: &dotenvy::Error) -> Option<String> {
    match err {
        dotenvy::Error::Io(io) if io.kind() == ErrorKind::NotFound => None,
        other => Some(format!("Failed to load .env file: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let result = AppConfig::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(CardError::Configuration(_))));

        let result = AppConfig::from_lookup(lookup_from(&[(API_KEY_VAR, "   ")]));
        assert!(matches!(result, Err(CardError::Configuration(_))));
    }

    #[test]
    fn test_default_endpoint() {
        let config = AppConfig::from_lookup(lookup_from(&[(API_KEY_VAR, "sk-test-123")])).unwrap();
        assert_eq!(config.openai_api_base, None);
        assert_eq!(config.speech_endpoint(), "https://api.openai.com/v1/audio/speech");
        assert_eq!(config.tts_model.as_str(), "tts-1");
        assert_eq!(config.tts_voice.as_str(), "alloy");
    }

    #[test]
    fn test_custom_base_url() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (API_KEY_VAR, "sk-test-123"),
            (API_BASE_VAR, "https://proxy.example.com/v1/"),
        ]))
        .unwrap();
        assert_eq!(config.speech_endpoint(), "https://proxy.example.com/v1/audio/speech");
    }

    #[test]
    fn test_model_and_voice_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (API_KEY_VAR, "sk-test-123"),
            (TTS_MODEL_VAR, "tts-1-hd"),
            (TTS_VOICE_VAR, " Nova "),
        ]))
        .unwrap();
        assert_eq!(config.tts_model, TtsModel::HighDefinition);
        assert_eq!(config.tts_voice, TtsVoice::Nova);

        let result = AppConfig::from_lookup(lookup_from(&[
            (API_KEY_VAR, "sk-test-123"),
            (TTS_VOICE_VAR, "robot"),
        ]));
        assert!(matches!(result, Err(CardError::Configuration(_))));
    }

    #[test]
    fn test_dotenv_warning() {
        let missing = dotenvy::from_path(tempfile::tempdir().unwrap().path().join(".env"))
            .unwrap_err();
        assert_eq!(dotenv_warning(&missing), None);

        let malformed = dotenvy::Error::LineParse("NOT A VALID LINE".to_string(), 4);
        let message = dotenv_warning(&malformed).unwrap();
        assert!(message.starts_with("Failed to load .env file"));

        let denied = dotenvy::Error::Io(std::io::Error::new(ErrorKind::PermissionDenied, "denied"));
        assert!(dotenv_warning(&denied).is_some());
    }

    #[test]
    fn test_masked_key_and_paths() {
        let config = AppConfig {
            openai_api_key: "sk-abcdef".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(config.masked_api_key(), "sk-ab...");
        assert_eq!(config.import_file(), PathBuf::from("out/anki/anki_import.txt"));
        assert_eq!(config.audio_dir(), PathBuf::from("out/anki/audio_files"));
    }
}
