//! Конвейер генерации карточек
//!
//! Выбор файла → чтение строк → отбор записей → для каждой записи три
//! аудиофайла и строка в файле импорта. Все шаги выполняются строго
//! последовательно; первая ошибка прерывает запуск.

use std::path::Path;

use log::{info, warn};

use crate::anki::{CardRecord, ImportDocument};
use crate::config::AppConfig;
use crate::error::{CardError, Result};
use crate::progress::{ConsoleProgress, ProgressEvent, ProgressObserver, RunSummary};
use crate::source::{select_entries, RowSource, SourcePicker, VocabEntry, WorkbookSource};
use crate::tts::{AudioAsset, AudioCache, AudioKind, SpeechSynthesizer};

/// Генератор файла импорта Anki
pub struct CardGenerator {
    config: AppConfig,
    synthesizer: Box<dyn SpeechSynthesizer>,
    row_source: Box<dyn RowSource>,
    observer: Box<dyn ProgressObserver>,
}

impl CardGenerator {
    /// Создать генератор, читающий книги Excel и печатающий прогресс в консоль
    pub fn new(config: AppConfig, synthesizer: Box<dyn SpeechSynthesizer>) -> Self {
        Self {
            config,
            synthesizer,
            row_source: Box::new(WorkbookSource),
            observer: Box::new(ConsoleProgress),
        }
    }

    /// Заменить источник строк таблицы
    pub fn with_row_source(mut self, row_source: Box<dyn RowSource>) -> Self {
        self.row_source = row_source;
        self
    }

    /// Заменить наблюдателя прогресса
    pub fn with_observer(mut self, observer: Box<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Выполнить полный запуск
    pub async fn run(&self, picker: &dyn SourcePicker) -> Result<RunSummary> {
        let source_path = picker.select_source()?;
        info!("Selected source file: {}", source_path.display());

        let rows = self.row_source.read_rows(&source_path)?;
        let entries = select_entries(&rows)?;

        self.generate(&entries).await
    }

    /// Сгенерировать аудио и файл импорта для уже отобранных записей
    pub async fn generate(&self, entries: &[VocabEntry]) -> Result<RunSummary> {
        let mut summary = RunSummary {
            output_dir: self.config.output_dir.clone(),
            ..RunSummary::default()
        };

        if entries.is_empty() {
            info!("Nothing to import");
            self.observer.on_progress(&ProgressEvent::NothingToImport);
            return Ok(summary);
        }

        let total = entries.len();
        self.observer.on_progress(&ProgressEvent::Found { total });

        let audio_dir = self.config.audio_dir();
        create_dir(&audio_dir)?;
        let cache = AudioCache::new(audio_dir);
        let mut document = ImportDocument::create(self.config.import_file())?;

        for (i, entry) in entries.iter().enumerate() {
            self.observer.on_progress(&ProgressEvent::EntryStarted {
                index: i + 1,
                total,
                word: entry.word.clone(),
            });

            let word_audio = self
                .prepare(&cache, entry, AudioKind::Word, &entry.word, &mut summary)
                .await?;
            let meaning_audio = self
                .prepare(&cache, entry, AudioKind::Meaning, &entry.definition, &mut summary)
                .await?;
            let sentence_audio = self
                .prepare(&cache, entry, AudioKind::Sentence, &entry.example, &mut summary)
                .await?;

            let record = CardRecord::new(entry, &word_audio, &meaning_audio, &sentence_audio);
            document.append(&record)?;
            summary.entries += 1;

            self.observer.on_progress(&ProgressEvent::EntryCompleted);
        }

        info!(
            "Wrote {} cards to {} ({} synthesized, {} cached)",
            document.records(),
            document.path().display(),
            summary.synthesized,
            summary.reused
        );
        self.observer.on_progress(&ProgressEvent::Finished {
            summary: summary.clone(),
        });

        Ok(summary)
    }

    async fn prepare(
        &self,
        cache: &AudioCache,
        entry: &VocabEntry,
        kind: AudioKind,
        text: &str,
        summary: &mut RunSummary,
    ) -> Result<AudioAsset> {
        self.observer.on_progress(&ProgressEvent::AssetStarted { kind });

        let asset = cache
            .ensure(self.synthesizer.as_ref(), &entry.word, kind, text)
            .await
            .inspect_err(|e| {
                warn!("Failed to prepare {} audio for '{}': {}", kind, entry.word, e)
            })?;

        if asset.exists {
            summary.reused += 1;
        } else {
            summary.synthesized += 1;
        }
        self.observer.on_progress(&ProgressEvent::AssetReady {
            kind,
            cached: asset.exists,
        });

        Ok(asset)
    }
}

fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| CardError::filesystem(path, e))
}
