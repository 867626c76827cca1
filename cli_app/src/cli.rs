//! Разбор аргументов командной строки.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use core_burn::{ActivationKind, ResNeXtConfig, WidthRule, NUM_STAGES};
use utils_crate::{config::ModelConfigSub, AppConfig};

/// Командная строка `resnext-cli`.
#[derive(Debug, Parser)]
#[command(name = "resnext-cli", version)]
#[command(about = "Построение, прогон и сохранение классификаторов ResNeXt", long_about = None)]
pub struct Cli {
    /// Путь к TOML-конфигурации приложения; отсутствующий файл заменяется значениями по умолчанию.
    #[arg(short, long, global = true, value_name = "FILE", default_value = "resnext.toml")]
    pub config: PathBuf,

    /// Подробность логов: -v для debug, -vv для trace.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Команда.
    #[command(subcommand)]
    pub command: Command,
}

/// Подкоманды CLI.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Строит сеть и печатает все слои и прогрессию каналов по стадиям.
    Summary {
        #[command(flatten)]
        model: ModelArgs,
        /// Печатать план в JSON.
        #[arg(long)]
        json: bool,
    },
    /// Прогоняет случайный батч через сеть и печатает форму логитов.
    Forward {
        #[command(flatten)]
        model: ModelArgs,
        #[command(flatten)]
        input: InputArgs,
        /// Загрузить модель из директории чекпоинта вместо новой инициализации.
        #[arg(long, value_name = "DIR")]
        model_dir: Option<PathBuf>,
    },
    /// Инициализирует сеть и сохраняет ее как чекпоинт.
    Init {
        #[command(flatten)]
        model: ModelArgs,
        /// Директория чекпоинта (по умолчанию `model_dir` из конфигурации).
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Загружает чекпоинт и печатает его план и число параметров.
    Inspect {
        /// Директория чекпоинта (по умолчанию `model_dir` из конфигурации).
        #[arg(value_name = "DIR")]
        model_dir: Option<PathBuf>,
    },
}

/// Правило ширины в виде значения флага.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WidthRuleArg {
    /// Удвоение ширины после каждой стадии.
    Doubling,
    /// Пересчет `cardinality * expansion / plane_width`.
    Recomputed,
}

impl From<WidthRuleArg> for WidthRule {
    fn from(value: WidthRuleArg) -> Self {
        match value {
            WidthRuleArg::Doubling => Self::Doubling,
            WidthRuleArg::Recomputed => Self::Recomputed,
        }
    }
}

/// Гиперпараметры сети; незаданные флаги берутся из `[model_config]`.
#[derive(Debug, Clone, Default, Args)]
pub struct ModelArgs {
    /// Блоков в каждой стадии, через запятую (например, `3,4,6,3`).
    #[arg(long, value_delimiter = ',', value_name = "N,N,N,N")]
    pub depths: Option<Vec<usize>>,

    /// Количество классов.
    #[arg(long)]
    pub num_classes: Option<usize>,

    /// Количество групп свертки.
    #[arg(long)]
    pub cardinality: Option<usize>,

    /// Функция активации: elu, relu, leaky-relu, gelu, silu.
    #[arg(long)]
    pub activation: Option<String>,

    /// Каналы после stem.
    #[arg(long)]
    pub stem_channels: Option<usize>,

    /// Базовые ширины стадий, через запятую.
    #[arg(long, value_delimiter = ',', value_name = "N,N,N,N")]
    pub stage_planes: Option<Vec<usize>>,

    /// Правило ширины bottleneck между стадиями.
    #[arg(long, value_enum)]
    pub width_rule: Option<WidthRuleArg>,
}

impl ModelArgs {
    /// Собирает конфигурацию сети: флаги имеют приоритет над `[model_config]`.
    ///
    /// # Errors
    /// Неверное число значений в списках или неизвестная активация.
    pub fn resolve(&self, defaults: &ModelConfigSub) -> Result<ResNeXtConfig> {
        let depths = match &self.depths {
            Some(depths) => stage_array(depths, "--depths")?,
            None => defaults.depths,
        };
        let activation: ActivationKind = self
            .activation
            .as_deref()
            .unwrap_or(defaults.activation.as_str())
            .parse()
            .context("неверное значение активации")?;

        let mut config = ResNeXtConfig::new(depths, self.num_classes.unwrap_or(defaults.num_classes))
            .with_cardinality(self.cardinality.unwrap_or(defaults.cardinality))
            .with_activation(activation);
        if let Some(stem_channels) = self.stem_channels {
            config = config.with_stem_channels(stem_channels);
        }
        if let Some(planes) = &self.stage_planes {
            config = config.with_stage_planes(stage_array(planes, "--stage-planes")?);
        }
        if let Some(width_rule) = self.width_rule {
            config = config.with_width_rule(width_rule.into());
        }
        Ok(config)
    }
}

/// Форма случайного входа; незаданные флаги берутся из `[input_config]`.
#[derive(Debug, Clone, Default, Args)]
pub struct InputArgs {
    /// Размер батча.
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Высота и ширина входного изображения.
    #[arg(long)]
    pub image_size: Option<usize>,
}

impl InputArgs {
    /// Форма `[batch, channels, height, width]` для сети с `in_channels` входными каналами.
    pub fn shape(&self, app_config: &AppConfig, in_channels: usize) -> [usize; 4] {
        let input = &app_config.input_config;
        let size = self.image_size.unwrap_or(input.image_size);
        [self.batch_size.unwrap_or(input.batch_size), in_channels, size, size]
    }
}

/// Директория чекпоинта: явный путь или `model_dir` из конфигурации.
pub fn model_dir_or_default(explicit: Option<&Path>, app_config: &AppConfig) -> PathBuf {
    explicit.map_or_else(
        || PathBuf::from(&app_config.model_config.model_dir),
        Path::to_path_buf,
    )
}

fn stage_array(values: &[usize], flag: &str) -> Result<[usize; NUM_STAGES]> {
    match <[usize; NUM_STAGES]>::try_from(values) {
        Ok(array) => Ok(array),
        Err(_) => bail!(
            "{flag} ожидает {NUM_STAGES} значения, получено {}",
            values.len()
        ),
    }
}
