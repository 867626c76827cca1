// core_burn/src/lib.rs

// Включаем строгие правила линтинга для всего крейта.
#![warn(
    missing_docs, // Предупреждать об отсутствующей документации для публичных элементов.
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
// Запрещаем использование небезопасных конструкций и потенциально проблемных методов.
#![deny(unsafe_code, clippy::unwrap_used, clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

//! # `core_burn`
//!
//! Ядро проекта: классификатор ResNeXt на фреймворке [Burn](https://burn.dev/).
//! Свертки, нормализация, автодифференцирование и управление памятью выполняет Burn;
//! крейт отвечает за арифметику построения стадий (ширины каналов, группы,
//! условия downsample) и за порядок вычислений в bottleneck-блоке.
//!
//! ## Структура
//!
//! - `architectures::resnext`: план сети, bottleneck-блок, стадии и модель.
//! - `error`: тип ошибок конфигурации `BurnCoreError`.
//!
//! ## Пример
//!
//! ```no_run
//! use burn_ndarray::NdArray;
//! use core_burn::ResNeXtConfig;
//!
//! let config = ResNeXtConfig::new([2, 3, 2, 3], 10);
//! let plan = config.plan()?;
//! assert_eq!(plan.classifier_in, 2048);
//! let model = config.init::<NdArray<f32>>(&Default::default())?;
//! # let _ = model;
//! # Ok::<(), core_burn::BurnCoreError>(())
//! ```

pub mod architectures;
pub mod error;

// Ошибки
pub use error::{BlockLocation, BurnCoreError};

// Архитектура и ее конфигурации
pub use architectures::resnext::{
    resnext, ActivationKind, BlockKind, BlockPlan, Bottleneck, BottleneckConfig, LayerKind,
    LayerSpec, NetworkPlan, ResNeXt, ResNeXtConfig, ResNeXtRecord, Stage, StageAccumulator,
    StageBuilder, StagePlan, WidthRule, NUM_STAGES,
};
pub use architectures::ModelInfo;
