//! Чтение книги Excel (`.xlsx` / `.xls`) через calamine

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use log::{debug, info};

use super::{
    RowSource, SourceRow, DEFINITION_COLUMN, EXAMPLE_COLUMN, IMPORTED_COLUMN, WORD_COLUMN,
};
use crate::error::{CardError, Result};

/// Чтение строк из первого листа книги Excel
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkbookSource;

impl RowSource for WorkbookSource {
    fn read_rows(&self, path: &Path) -> Result<Vec<SourceRow>> {
        if !path.is_file() {
            return Err(CardError::Selection(format!(
                "Input file not found: {}",
                path.display()
            )));
        }

        info!("Reading spreadsheet {}", path.display());
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| CardError::Spreadsheet("Workbook has no worksheets".to_string()))??;

        let table: Vec<Vec<Option<String>>> = range
            .rows()
            .map(|cells| cells.iter().map(cell_text).collect())
            .collect();

        rows_from_table(&table)
    }
}

/// Текстовое значение ячейки; пустые ячейки и ошибки формул дают `None`
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Разобрать таблицу: первая строка - заголовок, остальные - данные
pub(crate) fn rows_from_table(table: &[Vec<Option<String>>]) -> Result<Vec<SourceRow>> {
    let Some((header, data)) = table.split_first() else {
        return Ok(Vec::new());
    };

    let find = |name: &str| {
        header
            .iter()
            .position(|cell| cell.as_deref().map(str::trim) == Some(name))
    };
    let require = |name: &str| {
        find(name).ok_or_else(|| {
            CardError::Validation(format!("Spreadsheet is missing the '{}' column", name))
        })
    };

    let word_col = require(WORD_COLUMN)?;
    let definition_col = require(DEFINITION_COLUMN)?;
    let example_col = require(EXAMPLE_COLUMN)?;
    let imported_col = find(IMPORTED_COLUMN);
    if imported_col.is_none() {
        debug!("No '{}' column, every row counts as not imported", IMPORTED_COLUMN);
    }

    let cell = |cells: &[Option<String>], col: usize| cells.get(col).cloned().flatten();

    let rows = data
        .iter()
        .enumerate()
        // completely blank rows are not data
        .filter(|(_, cells)| cells.iter().any(Option::is_some))
        .map(|(i, cells)| SourceRow {
            row_number: i + 2,
            word: cell(cells, word_col),
            definition: cell(cells, definition_col),
            example: cell(cells, example_col),
            imported: imported_col.and_then(|col| cell(cells, col)),
        })
        .collect();

    Ok(rows)
}
