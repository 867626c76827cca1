// core_burn/src/error.rs

use std::fmt;

/// Положение bottleneck-блока внутри сети.
///
/// Нумерация стадий и блоков начинается с 1, как в именах `stage2_block1`.
/// Блок, собранный вне сети (например, в тестах), не имеет положения.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockLocation {
    /// Номер стадии (1..=4).
    pub stage: Option<usize>,
    /// Номер блока внутри стадии.
    pub block: Option<usize>,
}

impl BlockLocation {
    /// Блок `block` стадии `stage`.
    pub const fn new(stage: usize, block: usize) -> Self {
        Self { stage: Some(stage), block: Some(block) }
    }

    /// Отдельный блок, не входящий в сеть.
    pub const fn standalone() -> Self {
        Self { stage: None, block: None }
    }
}

impl fmt::Display for BlockLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.stage, self.block) {
            (Some(stage), Some(block)) => write!(f, "stage{stage}_block{block}"),
            (Some(stage), None) => write!(f, "stage{stage}"),
            _ => write!(f, "отдельный блок"),
        }
    }
}

/// Перечисление всех возможных ошибок крейта `core_burn`.
///
/// Все варианты описывают дефекты конфигурации сети: они обнаруживаются при
/// построении или при первом прямом проходе и не предполагают восстановления.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BurnCoreError {
    /// Некорректная конфигурация модели или ее компонентов
    /// (нулевые размерности, неизвестная активация и т.п.).
    #[error("Некорректная конфигурация: {0}")]
    InvalidConfig(String),

    /// Skip-путь блока не может совпасть по форме с основным путем:
    /// каналы или разрешение меняются, а downsample не задан.
    #[error(
        "Несовместимый skip-путь в {location}: skip дает {skip_channels} каналов при stride {stride}, \
         основной путь дает {main_channels} каналов; требуется downsample"
    )]
    SkipPathMismatch {
        /// Положение блока в сети.
        location: BlockLocation,
        /// Каналы на входе блока (выход skip-пути без проекции).
        skip_channels: usize,
        /// Каналы на выходе основного пути (`planes * expansion`).
        main_channels: usize,
        /// Stride блока.
        stride: usize,
    },

    /// Правило ширины дало нулевую ширину bottleneck для стадии.
    #[error(
        "Нулевая ширина bottleneck в стадии {stage} (plane_width={plane_width}, cardinality={cardinality})"
    )]
    ZeroBottleneckWidth {
        /// Номер стадии (1..=4).
        stage: usize,
        /// Базовая ширина каналов стадии.
        plane_width: usize,
        /// Количество групп свертки.
        cardinality: usize,
    },

    /// Несовместимые размеры тензоров при прямом проходе.
    #[error("Несовместимые размеры или форма тензора: {0}")]
    IncompatibleShape(String),
}
