use std::error::Error;

use core_burn::BurnCoreError;
use thiserror::Error;
use utils_crate::UtilsError;

/// Ошибки крейта `model_loader`.
///
/// Покрывают файловый ввод/вывод, разбор `config.json`, валидацию параметров
/// и чтение/запись весов.
#[derive(Error, Debug)]
pub enum ModelLoaderError {
    /// Сбой файлового ввода/вывода.
    #[error("Ошибка ввода/вывода по пути '{path}': {source}")]
    Io {
        /// Путь к файлу, который вызвал ошибку.
        path: String,
        /// Исходная ошибка `std::io::Error`.
        #[source]
        source: std::io::Error,
    },

    /// `config.json` не удалось разобрать (синтаксис JSON или типы полей).
    #[error("Не удалось разобрать файл конфигурации '{path}': {source}")]
    ConfigParsing {
        /// Путь к файлу конфигурации.
        path: String,
        /// Исходная ошибка парсинга.
        #[source]
        source: Box<dyn Error + Send + Sync + 'static>,
    },

    /// Не удалось прочитать веса модели.
    #[error("Не удалось загрузить запись модели из '{path}': {message}")]
    RecordLoading {
        /// Путь к файлу весов.
        path: String,
        /// Описание ошибки рекордера Burn.
        message: String,
    },

    /// Не удалось записать веса модели.
    #[error("Не удалось сохранить запись модели в '{path}': {message}")]
    RecordSaving {
        /// Путь к файлу весов.
        path: String,
        /// Описание ошибки рекордера Burn.
        message: String,
    },

    /// Конфигурация модели невалидна; все найденные проблемы перечислены через "; ".
    #[error("Невалидная конфигурация модели: {message}")]
    InvalidConfig {
        /// Описание найденных проблем.
        message: String,
    },

    /// Ошибка построения сети в `core_burn`.
    #[error(transparent)]
    Core(#[from] BurnCoreError),

    /// Ошибка утилит (например, путь чекпоинта занят файлом).
    #[error(transparent)]
    Utils(#[from] UtilsError),
}

impl ModelLoaderError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
