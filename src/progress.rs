//! Модуль для отслеживания прогресса выполнения
//!
//! Конвейер сообщает о каждом шаге наблюдателю; консольный наблюдатель
//! печатает сообщения в stdout, тихий - ничего не делает.

use std::path::PathBuf;

use crate::tts::AudioKind;

/// Итог одного запуска
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Количество записанных карточек
    pub entries: usize,
    /// Файлы, для которых был вызван синтезатор
    pub synthesized: usize,
    /// Файлы, взятые из кэша
    pub reused: usize,
    /// Директория с результатом
    pub output_dir: PathBuf,
}

/// Событие прогресса
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// В таблице нет новых записей
    NothingToImport,
    /// Найдено записей для импорта
    Found { total: usize },
    /// Начата обработка записи (индекс с единицы)
    EntryStarted { index: usize, total: usize, word: String },
    /// Начата подготовка аудио
    AssetStarted { kind: AudioKind },
    /// Аудио готово
    AssetReady { kind: AudioKind, cached: bool },
    /// Запись полностью обработана
    EntryCompleted,
    /// Все записи обработаны
    Finished { summary: RunSummary },
}

/// Трейт для наблюдателя, получающего уведомления о прогрессе
pub trait ProgressObserver: Send + Sync {
    /// Метод, вызываемый при каждом событии
    fn on_progress(&self, event: &ProgressEvent);
}

/// Наблюдатель, который ничего не выводит
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressObserver for SilentProgress {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

/// Вывод прогресса в консоль
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleProgress;

impl ConsoleProgress {
    fn asset_label(kind: AudioKind) -> &'static str {
        match kind {
            AudioKind::Word => "word pronunciation",
            AudioKind::Meaning => "definition audio",
            AudioKind::Sentence => "example sentence audio",
        }
    }

    fn print_import_guide(summary: &RunSummary) {
        println!(
            "Anki import file and audio files have been created in {}",
            summary.output_dir.display()
        );
        println!("\nImport instructions:");
        println!("1. In Anki, create a new note type with the following fields:");
        for column in crate::anki::COLUMNS {
            println!("   - {}", column);
        }
        println!("2. Copy every .mp3 file from the audio_files folder into Anki's media folder");
        println!("   (Tools -> Check Media shows where the media folder is)");
        println!("3. In Anki choose File -> Import");
        println!("4. Select the generated anki_import.txt file");
        println!("5. Import settings:");
        println!("   - Field separator: Tab");
        println!("   - Note type: the one created in step 1");
        println!("   - Check that the field mapping is correct");
        println!("6. Click Import");
    }
}

impl ProgressObserver for ConsoleProgress {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::NothingToImport => println!("No new entries to import"),
            ProgressEvent::Found { total } => println!("Found {} entries to import", total),
            ProgressEvent::EntryStarted { index, total, word } => {
                println!("\nProcessing entry {}/{}: {}", index, total, word)
            }
            ProgressEvent::AssetStarted { kind } => {
                println!("  Generating {}...", Self::asset_label(*kind))
            }
            ProgressEvent::AssetReady { cached: true, .. } => println!("    (cached)"),
            ProgressEvent::AssetReady { cached: false, .. } => {}
            ProgressEvent::EntryCompleted => println!("  ✓ Done"),
            ProgressEvent::Finished { summary } => {
                println!("\nAll entries processed!");
                println!(
                    "{} cards, {} audio files generated, {} reused from cache",
                    summary.entries, summary.synthesized, summary.reused
                );
                Self::print_import_guide(summary);
            }
        }
    }
}
