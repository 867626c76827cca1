use thiserror::Error;

/// Общий тип ошибки для утилит `utils_crate`.
///
/// Агрегирует ошибки ввода-вывода, конфигурации и инициализации логгера,
/// предоставляя стандартизированный способ их обработки в воркспейсе.
#[derive(Error, Debug)]
pub enum UtilsError {
    /// Ошибка ввода-вывода (I/O).
    ///
    /// Содержит исходную ошибку `std::io::Error` и опционально путь к файлу/директории,
    /// с которым возникла проблема.
    #[error("Ошибка ввода-вывода: {source}")]
    Io {
        /// Исходная ошибка I/O.
        #[source]
        source: std::io::Error,
        /// Опциональный путь, связанный с ошибкой I/O.
        path: Option<String>,
    },

    /// Ошибка, связанная с конфигурацией приложения.
    ///
    /// Например, неверный формат TOML-файла или недопустимое значение поля.
    #[error("Ошибка конфигурации: {0}")]
    Config(String),

    /// В утилитарную функцию был передан неверный параметр.
    #[error("Неверный параметр: {0}")]
    InvalidParameter(String),

    /// Не удалось инициализировать глобальный подписчик `tracing`.
    #[error("Ошибка инициализации логгера: {0}")]
    Logger(String),
}

impl From<std::io::Error> for UtilsError {
    fn from(source: std::io::Error) -> Self {
        Self::Io { source, path: None }
    }
}

impl UtilsError {
    /// Вспомогательный конструктор для создания `UtilsError::Io` с указанием пути.
    ///
    /// # Аргументы
    ///
    /// * `source` - Исходная ошибка `std::io::Error`.
    /// * `path` - Путь, с которым возникла проблема.
    pub fn io_with_path(source: std::io::Error, path: impl Into<String>) -> Self {
        Self::Io {
            source,
            path: Some(path.into()),
        }
    }
}
