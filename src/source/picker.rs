//! Выбор исходного файла
//!
//! Диалог выбора файла вынесен за трейт, чтобы конвейер можно было
//! запускать без графического окружения.

use std::path::PathBuf;

use crate::error::{CardError, Result};

/// Источник пути к исходной таблице
pub trait SourcePicker {
    /// Вернуть путь к выбранному файлу или `CardError::Selection`
    fn select_source(&self) -> Result<PathBuf>;
}

/// Нативный диалог выбора файла Excel
#[derive(Debug, Default, Clone, Copy)]
pub struct DialogPicker;

impl SourcePicker for DialogPicker {
    fn select_source(&self) -> Result<PathBuf> {
        rfd::FileDialog::new()
            .set_title("Select vocabulary spreadsheet")
            .add_filter("Excel files", &["xlsx", "xls"])
            .pick_file()
            .ok_or_else(|| CardError::Selection("No file selected. Exiting.".to_string()))
    }
}

/// Заранее известный путь, без взаимодействия с пользователем
#[derive(Debug, Clone)]
pub struct FixedPicker(pub PathBuf);

impl SourcePicker for FixedPicker {
    fn select_source(&self) -> Result<PathBuf> {
        Ok(self.0.clone())
    }
}
