//! Модуль для интеграции с OpenAI API
//!
//! Один запрос на один текст, без повторных попыток: любая ошибка
//! возвращается вызывающему коду как `CardError::Synthesis`.

use bytes::Bytes;
use log::{error, info};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::SpeechSynthesizer;
use crate::config::AppConfig;
use crate::error::{CardError, Result};

/// Параметры запроса к API OpenAI TTS
#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
}

/// Клиент для работы с OpenAI TTS API
pub struct OpenAiSynthesizer {
    client: Client,
    api_key: String,
    endpoint: String,
    model: &'static str,
    voice: &'static str,
}

impl OpenAiSynthesizer {
    /// Создает новый клиент OpenAI TTS из конфигурации
    pub fn new(config: &AppConfig) -> Result<Self> {
        if config.openai_api_key.trim().is_empty() {
            return Err(CardError::Configuration(
                "OpenAI API key is required for TTS generation".to_string(),
            ));
        }

        Ok(Self {
            client: Client::new(),
            api_key: config.openai_api_key.clone(),
            endpoint: config.speech_endpoint(),
            model: config.tts_model.as_str(),
            voice: config.tts_voice.as_str(),
        })
    }

    /// Адрес, на который отправляются запросы
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for OpenAiSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Bytes> {
        info!("Sending TTS request to {} ({} chars)", self.endpoint, text.chars().count());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&SpeechRequest {
                model: self.model,
                voice: self.voice,
                input: text,
                response_format: "mp3",
            })
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send TTS request: {}", e);
                CardError::Synthesis(format!("Failed to send TTS request: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error response: {}", e));
            let message = api_error_message(&error_text);
            error!("OpenAI API error (status {}): {}", status, message);
            return Err(CardError::Synthesis(format!(
                "OpenAI API error ({}): {}",
                status, message
            )));
        }

        let bytes = response.bytes().await.map_err(|e| {
            CardError::Synthesis(format!("Failed to read response bytes: {}", e))
        })?;
        if bytes.is_empty() {
            return Err(CardError::Synthesis("Received empty audio response".to_string()));
        }

        info!("Received {} bytes of audio", bytes.len());
        Ok(bytes)
    }
}

/// Достать сообщение об ошибке из JSON ответа API, если оно там есть
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| json["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    /// Поднять сервер, который отвечает на один запрос заданным статусом и телом
    fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            read_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        });

        format!("http://{}/v1", addr)
    }

    /// Дочитать запрос целиком (заголовки и тело по Content-Length)
    fn read_request(stream: &mut impl Read) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    return;
                }
            }
        }
    }

    fn synthesizer_for(base: &str) -> OpenAiSynthesizer {
        let config = AppConfig {
            openai_api_key: "sk-test".to_string(),
            openai_api_base: Some(base.to_string()),
            ..AppConfig::default()
        };
        OpenAiSynthesizer::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_error_status_is_synthesis_error() {
        let base = serve_once("401 Unauthorized", r#"{"error":{"message":"bad key"}}"#);

        match synthesizer_for(&base).synthesize("apple").await {
            Err(CardError::Synthesis(message)) => {
                assert!(message.contains("bad key"));
                assert!(message.contains("401"));
            }
            other => panic!("expected synthesis error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_synthesis_error() {
        let result = synthesizer_for("http://127.0.0.1:1/v1").synthesize("apple").await;
        assert!(matches!(result, Err(CardError::Synthesis(_))));
    }

    #[tokio::test]
    async fn test_success_returns_audio_bytes() {
        let base = serve_once("200 OK", "ID3-fake-mp3");

        let audio = synthesizer_for(&base).synthesize("apple").await.unwrap();
        assert_eq!(&audio[..], b"ID3-fake-mp3");
    }

    #[test]
    fn test_api_error_message() {
        let body =
            r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(api_error_message(body), "Incorrect API key provided");
        assert_eq!(api_error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(SpeechRequest {
            model: "tts-1",
            voice: "alloy",
            input: "apple",
            response_format: "mp3",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "tts-1",
                "voice": "alloy",
                "input": "apple",
                "response_format": "mp3"
            })
        );
    }

    #[test]
    fn test_new_uses_config_endpoint() {
        let config = AppConfig {
            openai_api_key: "sk-test".to_string(),
            openai_api_base: Some("http://localhost:8080/v1".to_string()),
            ..AppConfig::default()
        };
        let synthesizer = OpenAiSynthesizer::new(&config).unwrap();
        assert_eq!(synthesizer.endpoint(), "http://localhost:8080/v1/audio/speech");

        let empty = AppConfig::default();
        assert!(matches!(
            OpenAiSynthesizer::new(&empty),
            Err(CardError::Configuration(_))
        ));
    }
}
