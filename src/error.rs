//! Модуль обработки ошибок
//!
//! Все ошибки, кроме пустой выборки, фатальны: они поднимаются до `main`
//! без повторных попыток, а уже записанные файлы остаются на диске.

use std::path::PathBuf;
use thiserror::Error;

/// Ошибки генератора карточек
#[derive(Debug, Error)]
pub enum CardError {
    /// Отсутствует обязательная настройка (например, API ключ)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Файл с таблицей не выбран или недоступен
    #[error("Selection error: {0}")]
    Selection(String),

    /// Строка или заголовок таблицы не содержит нужных полей
    #[error("Validation error: {0}")]
    Validation(String),

    /// Ошибка генерации речи
    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    /// Не удалось создать директорию или записать файл
    #[error("Filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Не удалось прочитать книгу Excel
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),
}

impl CardError {
    /// Обернуть ошибку ввода-вывода вместе с путем, на котором она произошла
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CardError::Filesystem {
            path: path.into(),
            source,
        }
    }
}

impl From<calamine::Error> for CardError {
    fn from(err: calamine::Error) -> Self {
        CardError::Spreadsheet(err.to_string())
    }
}

/// Тип Result для всей библиотеки
pub type Result<T> = std::result::Result<T, CardError>;
