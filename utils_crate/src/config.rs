use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::error::UtilsError;

/// Глобальная конфигурация приложения.
///
/// Все секции необязательны: отсутствующие поля заполняются значениями по умолчанию.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Параметры сети, используемые CLI, когда они не переданы флагами.
    pub model_config: ModelConfigSub,

    /// Параметры входного тензора для прогона `forward`.
    pub input_config: InputConfigSub,

    /// Конфигурация логирования.
    pub logging_config: LoggingConfigSub,
}

/// Параметры сети (под-конфигурация для `AppConfig`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ModelConfigSub {
    /// Директория, где хранятся чекпоинты моделей.
    pub model_dir: String,
    /// Количество блоков в каждой из четырех стадий.
    pub depths: [usize; 4],
    /// Количество выходных классов.
    pub num_classes: usize,
    /// Количество групп в групповой свертке.
    pub cardinality: usize,
    /// Имя функции активации (`elu`, `relu`, `leaky-relu`, `gelu`, `silu`).
    pub activation: String,
}

impl Default for ModelConfigSub {
    fn default() -> Self {
        Self {
            model_dir: "./.model_cache".to_string(),
            depths: [2, 3, 2, 3],
            num_classes: 10,
            cardinality: 32,
            activation: "elu".to_string(),
        }
    }
}

/// Форма случайного входа (под-конфигурация для `AppConfig`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InputConfigSub {
    /// Размер батча.
    pub batch_size: usize,
    /// Высота и ширина изображения.
    pub image_size: usize,
}

impl Default for InputConfigSub {
    fn default() -> Self {
        Self {
            batch_size: 1,
            image_size: 224,
        }
    }
}

/// Конфигурация логирования (под-конфигурация для `AppConfig`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfigSub {
    /// Уровень логирования консоли.
    pub level: String,
    /// Директория для файлов логов (опционально).
    pub log_dir: Option<String>,
}

impl Default for LoggingConfigSub {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Загружает конфигурацию приложения из TOML файла.
    /// Если файл не найден, возвращается конфигурация по умолчанию.
    ///
    /// # Errors
    /// Возвращает `UtilsError::Io` при ошибках чтения файла или `UtilsError::Config`
    /// при ошибках парсинга TOML.
    pub fn load_from_toml(file_path: &Path) -> Result<Self, UtilsError> {
        if !file_path.exists() {
            warn!(
                "AppConfig file not found at {:?}, using default configuration.",
                file_path
            );
            return Ok(Self::default());
        }
        let config_str = std::fs::read_to_string(file_path)
            .map_err(|e| UtilsError::io_with_path(e, file_path.to_string_lossy().into_owned()))?;
        Self::from_toml_str(&config_str).map_err(|e| match e {
            UtilsError::Config(msg) => UtilsError::Config(format!("{msg} (file {file_path:?})")),
            other => other,
        })
    }

    /// Разбирает конфигурацию из строки TOML.
    ///
    /// # Errors
    /// `UtilsError::Config` при синтаксической ошибке или неверном типе поля.
    pub fn from_toml_str(config_str: &str) -> Result<Self, UtilsError> {
        toml::from_str(config_str)
            .map_err(|e| UtilsError::Config(format!("Failed to parse AppConfig from TOML: {e}")))
    }
}
