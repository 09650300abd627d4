//! Модуль выбора записей из таблицы
//!
//! Читает строки исходной таблицы и отбирает те, что еще не были
//! импортированы в Anki.

use std::path::Path;

use log::debug;

use crate::error::{CardError, Result};

pub mod picker;
pub mod workbook;

pub use picker::{DialogPicker, FixedPicker, SourcePicker};
pub use workbook::WorkbookSource;

/// Названия колонок исходной таблицы
pub const WORD_COLUMN: &str = "Word/Phrase";
pub const DEFINITION_COLUMN: &str = "Definition";
pub const EXAMPLE_COLUMN: &str = "Example Sentence";
pub const IMPORTED_COLUMN: &str = "Imported";

/// Строка таблицы в том виде, в каком она прочитана (пустая ячейка = `None`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRow {
    /// Номер строки в таблице (с единицы, заголовок = 1)
    pub row_number: usize,
    pub word: Option<String>,
    pub definition: Option<String>,
    pub example: Option<String>,
    pub imported: Option<String>,
}

/// Словарная запись, готовая к генерации карточки
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabEntry {
    pub word: String,
    pub definition: String,
    pub example: String,
}

/// Источник строк таблицы
pub trait RowSource {
    /// Прочитать все строки данных из файла
    fn read_rows(&self, path: &Path) -> Result<Vec<SourceRow>>;
}

/// Была ли строка уже импортирована.
///
/// Пустое значение считается как "No"; сравнение идет после обрезки
/// пробелов и без учета регистра.
pub fn is_imported(flag: Option<&str>) -> bool {
    flag.unwrap_or("No").trim().to_uppercase() == "YES"
}

/// Отобрать записи, которые нужно импортировать, сохраняя порядок строк
pub fn select_entries(rows: &[SourceRow]) -> Result<Vec<VocabEntry>> {
    let mut entries = Vec::new();

    for row in rows {
        if is_imported(row.imported.as_deref()) {
            debug!("Skipping row {}: already imported", row.row_number);
            continue;
        }

        let word = required_field(row, &row.word, WORD_COLUMN)?;
        if word.is_empty() {
            return Err(CardError::Validation(format!(
                "Row {}: column '{}' is empty",
                row.row_number, WORD_COLUMN
            )));
        }

        entries.push(VocabEntry {
            word,
            definition: required_field(row, &row.definition, DEFINITION_COLUMN)?,
            example: required_field(row, &row.example, EXAMPLE_COLUMN)?,
        });
    }

    Ok(entries)
}

fn required_field(row: &SourceRow, value: &Option<String>, column: &str) -> Result<String> {
    value
        .as_deref()
        .map(|text| text.trim().to_string())
        .ok_or_else(|| {
            CardError::Validation(format!(
                "Row {}: column '{}' has no value",
                row.row_number, column
            ))
        })
}
