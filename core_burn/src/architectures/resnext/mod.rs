// core_burn/src/architectures/resnext/mod.rs

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![deny(unsafe_code, clippy::unwrap_used, clippy::expect_used)]

//! Архитектура ResNeXt: bottleneck-блоки с групповой сверткой, собранные в четыре стадии.
//!
//! Построение разделено на две ступени: [`ResNeXtConfig::plan`] вычисляет все формы
//! слоев без тензоров, [`ResNeXtConfig::init`] создает по плану модули Burn.

pub mod activation;
pub mod bottleneck;
mod layers;
pub mod model;
pub mod plan;

pub use activation::ActivationKind;
pub use bottleneck::{Bottleneck, BottleneckConfig, BottleneckRecord, Downsample};
pub use model::{resnext, ResNeXt, ResNeXtConfig, ResNeXtRecord, Stage, Stem, NUM_STAGES};
pub use plan::{
    BlockKind, BlockLayerSpecs, BlockPlan, LayerKind, LayerSpec, NetworkPlan, StageAccumulator,
    StageBuilder, StagePlan, WidthRule,
};
