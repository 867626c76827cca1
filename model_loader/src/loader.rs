use std::path::Path;

use burn::{
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder},
    tensor::backend::Backend,
};
use core_burn::{ActivationKind, BlockKind, ResNeXt, ResNeXtConfig, WidthRule, NUM_STAGES};
use tracing::{debug, info, warn};
use utils_crate::{ensure_dir_exists, find_file_in_dir};

use crate::{
    error::ModelLoaderError,
    types::{CheckpointFiles, RawResNeXtConfig},
    validation::{parse_kebab_enum, ModelConfigValidator},
};

/// Имя файла конфигурации внутри директории чекпоинта.
pub const CONFIG_FILE_NAME: &str = "config.json";
/// Имя файла весов внутри директории чекпоинта.
pub const WEIGHTS_FILE_NAME: &str = "model.mpk";
/// Рекордер добавляет расширение `.mpk` сам.
const WEIGHTS_FILE_STEM: &str = "model";

type CheckpointRecorder = NamedMpkFileRecorder<FullPrecisionSettings>;

/// Загрузчик и сохранитель чекпоинтов ResNeXt.
///
/// Работает только с локальной файловой системой. Веса хранятся с полной точностью.
#[derive(Debug, Clone)]
pub struct ModelLoader;

impl ModelLoader {
    /// Загружает и валидирует `config.json` из директории чекпоинта.
    ///
    /// 1. Читает и разбирает `RawResNeXtConfig`.
    /// 2. Валидирует "сырую" конфигурацию.
    /// 3. Собирает `ResNeXtConfig`, подставляя значения по умолчанию.
    /// 4. Валидирует собранную конфигурацию построением плана сети.
    ///
    /// # Errors
    /// `Io`, `ConfigParsing`, `InvalidConfig` или `Core`.
    pub async fn load_config(model_dir: &Path) -> Result<ResNeXtConfig, ModelLoaderError> {
        let config_path = model_dir.join(CONFIG_FILE_NAME);
        let raw_config = Self::load_json_config(&config_path).await?;
        Self::finish_config(&raw_config)
    }

    /// Разбирает и валидирует конфигурацию из JSON-строки.
    ///
    /// # Errors
    /// Те же, что у [`ModelLoader::load_config`], кроме `Io`.
    pub fn parse_config(json: &str) -> Result<ResNeXtConfig, ModelLoaderError> {
        let raw_config: RawResNeXtConfig =
            serde_json::from_str(json).map_err(|e| ModelLoaderError::ConfigParsing {
                path: "<строка>".to_string(),
                source: Box::new(e),
            })?;
        Self::finish_config(&raw_config)
    }

    /// Загружает модель из директории чекпоинта.
    ///
    /// Сеть строится по `config.json`, затем в нее загружаются веса из `model.mpk`.
    /// Если файла весов нет, возвращается свежеинициализированная сеть
    /// с предупреждением в логе.
    ///
    /// # Errors
    /// Любая ошибка [`ModelLoader::load_config`], `Core` при построении сети,
    /// `RecordLoading`, если веса не читаются или не совпадают со структурой сети.
    pub async fn load_model<B: Backend>(
        model_dir: &Path,
        device: &B::Device,
    ) -> Result<ResNeXt<B>, ModelLoaderError> {
        info!("Начало загрузки модели из: {:?}", model_dir);
        let config = Self::load_config(model_dir).await?;
        let model = config.init::<B>(device)?;

        let Some(weights_path) = find_file_in_dir(model_dir, WEIGHTS_FILE_NAME)? else {
            warn!(
                "Файл весов {} не найден в {:?}, используются случайно инициализированные веса.",
                WEIGHTS_FILE_NAME, model_dir
            );
            return Ok(model);
        };

        info!("Загрузка весов из: {:?}", weights_path);
        let model = model
            .load_file(
                model_dir.join(WEIGHTS_FILE_STEM),
                &CheckpointRecorder::new(),
                device,
            )
            .map_err(|e| ModelLoaderError::RecordLoading {
                path: weights_path.display().to_string(),
                message: format!("{e:?}"),
            })?;

        info!("Загрузка модели завершена.");
        Ok(model)
    }

    /// Сохраняет модель в директорию чекпоинта (`config.json` + `model.mpk`).
    ///
    /// Директория создается при необходимости; существующие файлы перезаписываются.
    ///
    /// # Errors
    /// `Utils`, если путь занят файлом, `Io` при записи конфигурации,
    /// `RecordSaving` при записи весов.
    pub async fn save_model<B: Backend>(
        model: &ResNeXt<B>,
        model_dir: &Path,
    ) -> Result<CheckpointFiles, ModelLoaderError> {
        ensure_dir_exists(model_dir)?;

        let config_path = model_dir.join(CONFIG_FILE_NAME);
        let json = serde_json::to_string_pretty(model.config()).map_err(|e| {
            ModelLoaderError::ConfigParsing {
                path: config_path.display().to_string(),
                source: Box::new(e),
            }
        })?;
        tokio::fs::write(&config_path, json)
            .await
            .map_err(|e| ModelLoaderError::io(&config_path, e))?;
        debug!("Конфигурация записана в {:?}", config_path);

        let weights_path = model_dir.join(WEIGHTS_FILE_NAME);
        model
            .clone()
            .save_file(model_dir.join(WEIGHTS_FILE_STEM), &CheckpointRecorder::new())
            .map_err(|e| ModelLoaderError::RecordSaving {
                path: weights_path.display().to_string(),
                message: format!("{e:?}"),
            })?;

        info!(
            params = model.num_params(),
            "Модель сохранена в {:?}", model_dir
        );
        Ok(CheckpointFiles {
            config_path,
            weights_path,
        })
    }

    async fn load_json_config(path: &Path) -> Result<RawResNeXtConfig, ModelLoaderError> {
        debug!("Загрузка JSON конфигурации из: {:?}", path);
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ModelLoaderError::io(path, e))?;

        let config: RawResNeXtConfig =
            serde_json::from_str(&contents).map_err(|e| ModelLoaderError::ConfigParsing {
                path: path.display().to_string(),
                source: Box::new(e),
            })?;

        if !config.extra_fields.is_empty() {
            debug!(
                "Дополнительные поля config.json проигнорированы: {:?}",
                config.extra_fields.keys().collect::<Vec<_>>()
            );
        }
        Ok(config)
    }

    fn finish_config(raw_config: &RawResNeXtConfig) -> Result<ResNeXtConfig, ModelLoaderError> {
        ModelConfigValidator::validate_raw_config(raw_config)?;
        let core_config = Self::convert_raw_config_to_core_config(raw_config)?;
        ModelConfigValidator::validate_core_config(&core_config)?;
        Ok(core_config)
    }

    /// Сопоставляет поля; отсутствующие опциональные поля получают значения
    /// по умолчанию из `ResNeXtConfig`.
    fn convert_raw_config_to_core_config(
        raw_config: &RawResNeXtConfig,
    ) -> Result<ResNeXtConfig, ModelLoaderError> {
        debug!("Конвертация 'сырой' конфигурации в 'ядерную'.");

        let missing = |name: &str| ModelLoaderError::InvalidConfig {
            message: format!("Отсутствует обязательное поле: '{name}'"),
        };
        let depths = raw_config.depths.as_deref().ok_or_else(|| missing("depths"))?;
        let depths = stage_array(depths, "depths")?;
        let num_classes = raw_config.num_classes.ok_or_else(|| missing("num_classes"))?;

        let mut config = ResNeXtConfig::new(depths, num_classes);
        if let Some(cardinality) = raw_config.cardinality {
            config = config.with_cardinality(cardinality);
        }
        if let Some(block) = &raw_config.block {
            let block: BlockKind = parse_kebab_enum(block, "block")
                .map_err(|message| ModelLoaderError::InvalidConfig { message })?;
            config = config.with_block(block);
        }
        if let Some(activation) = &raw_config.activation {
            config = config.with_activation(activation.parse::<ActivationKind>()?);
        }
        if let Some(planes) = &raw_config.stage_planes {
            config = config.with_stage_planes(stage_array(planes, "stage_planes")?);
        }
        if let Some(strides) = &raw_config.stage_strides {
            config = config.with_stage_strides(stage_array(strides, "stage_strides")?);
        }
        if let Some(stem_channels) = raw_config.stem_channels {
            config = config.with_stem_channels(stem_channels);
        }
        if let Some(in_channels) = raw_config.in_channels {
            config = config.with_in_channels(in_channels);
        }
        if let Some(width_rule) = &raw_config.width_rule {
            let width_rule: WidthRule = parse_kebab_enum(width_rule, "width_rule")
                .map_err(|message| ModelLoaderError::InvalidConfig { message })?;
            config = config.with_width_rule(width_rule);
        }

        debug!("'Сырая' конфигурация успешно конвертирована в 'ядерную': {:?}", config);
        Ok(config)
    }
}

fn stage_array(values: &[usize], name: &str) -> Result<[usize; NUM_STAGES], ModelLoaderError> {
    <[usize; NUM_STAGES]>::try_from(values).map_err(|_| ModelLoaderError::InvalidConfig {
        message: format!(
            "{name} должно содержать {NUM_STAGES} значения, получено {}",
            values.len()
        ),
    })
}
