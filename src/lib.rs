//! Генератор карточек Anki с озвучкой OpenAI TTS
//!
//! Читает таблицу со словами, определениями и примерами, озвучивает каждое
//! поле и собирает файл импорта Anki. Аудиофайлы именуются по хэшу текста,
//! поэтому повторный запуск не обращается к API для уже озвученных текстов.

pub mod anki;
pub mod config;
pub mod error;
pub mod logger;
pub mod pipeline;
pub mod progress;
pub mod source;
pub mod tts;

pub use config::AppConfig;
pub use error::{CardError, Result};
pub use pipeline::CardGenerator;
pub use progress::RunSummary;
