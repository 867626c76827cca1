// core_burn/src/architectures/mod.rs

//! Корневой модуль для определения архитектур моделей.
//!
//! Каждая архитектура представлена своим подмодулем. Здесь же определяется
//! общая сводка о построенной модели.

pub mod resnext;

use serde::Serialize;

use resnext::{ActivationKind, BlockKind, NUM_STAGES};

/// Сводная информация о построенной модели.
///
/// Используется CLI для вывода (`inspect`, `summary`) и в логах загрузчика.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ModelInfo {
    /// Вид residual-блока.
    pub block: BlockKind,
    /// Функция активации.
    pub activation: ActivationKind,
    /// Количество блоков в стадиях.
    pub depths: [usize; NUM_STAGES],
    /// Количество групп свертки.
    pub cardinality: usize,
    /// Выходные каналы каждой стадии (после расширения).
    pub stage_channels: Vec<usize>,
    /// Ширина bottleneck каждой стадии.
    pub stage_widths: Vec<usize>,
    /// Ширина входа классификатора.
    pub classifier_in: usize,
    /// Количество классов.
    pub num_classes: usize,
    /// Количество обучаемых параметров.
    pub num_params: usize,
}
