use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

/// "Сырая" конфигурация модели в том виде, в каком она лежит в `config.json`.
///
/// Все поля опциональны: отсутствие обязательных полей и недопустимые значения
/// обнаруживает [`crate::ModelConfigValidator`], который сообщает обо всех проблемах сразу.
/// Строковые перечисления (`block`, `activation`, `width_rule`) разбираются там же.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawResNeXtConfig {
    /// Тип модели; если указан, должен быть `"resnext"`.
    pub model_type: Option<String>,
    /// Количество блоков в каждой из четырех стадий.
    pub depths: Option<Vec<usize>>,
    /// Количество классов.
    pub num_classes: Option<usize>,
    /// Количество групп.
    pub cardinality: Option<usize>,
    /// Вид блока (`"bottleneck"`).
    pub block: Option<String>,
    /// Функция активации.
    pub activation: Option<String>,
    /// Базовые ширины стадий.
    pub stage_planes: Option<Vec<usize>>,
    /// Stride первого блока каждой стадии.
    pub stage_strides: Option<Vec<usize>>,
    /// Каналы после stem.
    pub stem_channels: Option<usize>,
    /// Каналы входного изображения.
    pub in_channels: Option<usize>,
    /// Правило ширины (`"doubling"` или `"recomputed"`).
    pub width_rule: Option<String>,

    /// Прочие поля (метаданные обучения и т.п.); на разбор не влияют.
    #[serde(flatten)]
    pub extra_fields: HashMap<String, serde_json::Value>,
}

/// Поддерживаемые типы моделей.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelType {
    /// Классификатор ResNeXt.
    ResNeXt,
    /// Неизвестный тип.
    Other,
}

impl From<&str> for ModelType {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "resnext" => Self::ResNeXt,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ResNeXt => write!(f, "resnext"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Пути файлов сохраненного чекпоинта.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointFiles {
    /// `config.json`.
    pub config_path: PathBuf,
    /// Файл весов (`model.mpk`).
    pub weights_path: PathBuf,
}
