//! Файл импорта Anki
//!
//! Текстовый файл с разделителем-табуляцией: три строки заголовка и по одной
//! строке на карточку. Файл перезаписывается в начале каждого запуска, а
//! строки дописываются и сбрасываются на диск по одной.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{CardError, Result};
use crate::source::VocabEntry;
use crate::tts::AudioAsset;

/// Названия колонок в порядке следования полей
pub const COLUMNS: [&str; 6] = [
    "Word",
    "WordAudio",
    "Definition",
    "DefinitionAudio",
    "Example",
    "ExampleAudio",
];

/// Заголовок файла импорта
pub fn header() -> String {
    format!("#separator:tab\n#html:true\n#columns:{}\n", COLUMNS.join("\t"))
}

/// Одна карточка: текст и ссылка на звук для каждого из трех полей
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRecord {
    pub word: String,
    pub word_audio: String,
    pub definition: String,
    pub definition_audio: String,
    pub example: String,
    pub example_audio: String,
}

impl CardRecord {
    /// Собрать карточку из записи и трех ее аудиофайлов
    pub fn new(
        entry: &VocabEntry,
        word_audio: &AudioAsset,
        meaning_audio: &AudioAsset,
        sentence_audio: &AudioAsset,
    ) -> Self {
        Self {
            word: entry.word.clone(),
            word_audio: word_audio.sound_ref(),
            definition: entry.definition.clone(),
            definition_audio: meaning_audio.sound_ref(),
            example: entry.example.clone(),
            example_audio: sentence_audio.sound_ref(),
        }
    }

    /// Поля карточки в порядке колонок
    pub fn fields(&self) -> [&str; 6] {
        [
            self.word.as_str(),
            self.word_audio.as_str(),
            self.definition.as_str(),
            self.definition_audio.as_str(),
            self.example.as_str(),
            self.example_audio.as_str(),
        ]
    }

    /// Строка файла импорта, включая завершающий перевод строки
    pub fn to_line(&self) -> String {
        format!("{}\n", self.fields().join("\t"))
    }
}

/// Открытый на запись файл импорта
pub struct ImportDocument {
    path: PathBuf,
    file: File,
    records: usize,
}

impl ImportDocument {
    /// Создать (или обнулить) файл и записать заголовок
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut file = File::create(&path).map_err(|e| CardError::filesystem(&path, e))?;
        file.write_all(header().as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| CardError::filesystem(&path, e))?;

        Ok(Self {
            path,
            file,
            records: 0,
        })
    }

    /// Дописать карточку
    pub fn append(&mut self, record: &CardRecord) -> Result<()> {
        self.file
            .write_all(record.to_line().as_bytes())
            .and_then(|_| self.file.flush())
            .map_err(|e| CardError::filesystem(&self.path, e))?;
        self.records += 1;
        Ok(())
    }

    /// Путь к файлу
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Количество записанных карточек
    pub fn records(&self) -> usize {
        self.records
    }
}
