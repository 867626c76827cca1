use core_burn::{ActivationKind, BlockKind, ResNeXtConfig, WidthRule, NUM_STAGES};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{
    error::ModelLoaderError,
    types::{ModelType, RawResNeXtConfig},
};

/// Валидация конфигураций модели, отделенная от загрузки.
///
/// Обе проверки собирают все найденные проблемы и возвращают их одним
/// `ModelLoaderError::InvalidConfig`.
pub struct ModelConfigValidator;

impl ModelConfigValidator {
    /// Проверяет "сырую" конфигурацию сразу после десериализации `config.json`.
    ///
    /// Обязательны `depths` (ровно четыре положительных значения) и `num_classes`.
    /// Опциональные поля, если заданы, должны быть положительными, а строковые
    /// перечисления должны разбираться.
    ///
    /// # Errors
    /// `ModelLoaderError::InvalidConfig` со списком всех проблем.
    pub fn validate_raw_config(raw_config: &RawResNeXtConfig) -> Result<(), ModelLoaderError> {
        debug!("Валидация 'сырой' конфигурации модели.");
        let mut errors: Vec<String> = Vec::new();

        macro_rules! check_field {
            ($field:expr, $name:expr) => {
                if $field.is_none() {
                    errors.push(format!("Отсутствует обязательное поле: '{}'", $name));
                }
            };
        }

        check_field!(raw_config.depths, "depths");
        check_field!(raw_config.num_classes, "num_classes");

        if let Some(model_type) = &raw_config.model_type {
            if ModelType::from(model_type.as_str()) == ModelType::Other {
                errors.push(format!(
                    "Неподдерживаемый model_type: '{model_type}' (ожидается '{}')",
                    ModelType::ResNeXt
                ));
            }
        }

        for (name, values) in [
            ("depths", &raw_config.depths),
            ("stage_planes", &raw_config.stage_planes),
            ("stage_strides", &raw_config.stage_strides),
        ] {
            if let Some(values) = values {
                if values.len() != NUM_STAGES {
                    errors.push(format!(
                        "{name} должно содержать {NUM_STAGES} значения, получено {}",
                        values.len()
                    ));
                }
                if values.contains(&0) {
                    errors.push(format!("{name} не может содержать нулей: {values:?}"));
                }
            }
        }

        for (name, value) in [
            ("num_classes", raw_config.num_classes),
            ("cardinality", raw_config.cardinality),
            ("stem_channels", raw_config.stem_channels),
            ("in_channels", raw_config.in_channels),
        ] {
            if value == Some(0) {
                errors.push(format!("{name} не может быть равен нулю."));
            }
        }

        if let Some(block) = &raw_config.block {
            if let Err(e) = parse_kebab_enum::<BlockKind>(block, "block") {
                errors.push(e);
            }
        }
        if let Some(activation) = &raw_config.activation {
            if let Err(e) = activation.parse::<ActivationKind>() {
                errors.push(e.to_string());
            }
        }
        if let Some(width_rule) = &raw_config.width_rule {
            if let Err(e) = parse_kebab_enum::<WidthRule>(width_rule, "width_rule") {
                errors.push(e);
            }
        }

        if !errors.is_empty() {
            let message = errors.join("; ");
            warn!("Валидация 'сырой' конфигурации модели не пройдена: {}", message);
            return Err(ModelLoaderError::InvalidConfig { message });
        }

        debug!("'Сырая' конфигурация модели успешно валидирована.");
        Ok(())
    }

    /// Проверяет собранную конфигурацию и строит по ней план сети.
    ///
    /// Простые проверки значений собираются в один список; согласованность
    /// ширин и skip-путей проверяет [`ResNeXtConfig::plan`].
    ///
    /// # Errors
    /// `ModelLoaderError::InvalidConfig` для нулевых значений,
    /// `ModelLoaderError::Core`, если план не строится.
    pub fn validate_core_config(core_config: &ResNeXtConfig) -> Result<(), ModelLoaderError> {
        debug!("Валидация 'ядерной' конфигурации ResNeXt.");
        let mut errors: Vec<String> = Vec::new();

        for (name, values) in [
            ("depths", core_config.depths),
            ("stage_planes", core_config.stage_planes),
            ("stage_strides", core_config.stage_strides),
        ] {
            if values.contains(&0) {
                errors.push(format!("{name} не может содержать нулей: {values:?}"));
            }
        }
        for (name, value) in [
            ("num_classes", core_config.num_classes),
            ("cardinality", core_config.cardinality),
            ("stem_channels", core_config.stem_channels),
            ("in_channels", core_config.in_channels),
        ] {
            if value == 0 {
                errors.push(format!("{name} не может быть равен нулю."));
            }
        }

        if !errors.is_empty() {
            let message = errors.join("; ");
            warn!("Валидация 'ядерной' конфигурации модели не пройдена: {}", message);
            return Err(ModelLoaderError::InvalidConfig { message });
        }

        let plan = core_config.plan().map_err(|e| {
            warn!("План сети не строится: {}", e);
            ModelLoaderError::Core(e)
        })?;

        debug!(
            blocks = plan.num_blocks(),
            classifier_in = plan.classifier_in,
            "'Ядерная' конфигурация модели успешно валидирована."
        );
        Ok(())
    }
}

/// Разбирает строковое значение перечисления, сериализуемого в kebab-case.
pub(crate) fn parse_kebab_enum<T: DeserializeOwned>(value: &str, field: &str) -> Result<T, String> {
    let normalized = value.trim().to_lowercase().replace('_', "-");
    serde_json::from_value(serde_json::Value::String(normalized))
        .map_err(|_| format!("Неизвестное значение поля '{field}': '{value}'"))
}
