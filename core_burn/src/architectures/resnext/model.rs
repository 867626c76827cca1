// core_burn/src/architectures/resnext/model.rs

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![deny(unsafe_code, clippy::unwrap_used, clippy::expect_used)]

//! Полная сеть ResNeXt: stem, четыре стадии bottleneck-блоков и классификатор.

use burn::{
    config::Config,
    module::{Ignored, Module},
    nn::{
        conv::Conv2d,
        pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig, MaxPool2d},
        BatchNorm, Linear,
    },
    tensor::{backend::Backend, Tensor},
};
use tracing::{debug, info};

use super::{
    activation::ActivationKind,
    bottleneck::{Bottleneck, BottleneckConfig},
    layers,
    plan::{BlockKind, NetworkPlan, StageAccumulator, StageBuilder, WidthRule},
};
use crate::{
    architectures::ModelInfo,
    error::{BlockLocation, BurnCoreError},
};

/// Количество стадий сети.
pub const NUM_STAGES: usize = 4;

/// Неизменяемый набор гиперпараметров, полностью определяющий форму каждого слоя.
#[derive(Config, Debug)]
pub struct ResNeXtConfig {
    /// Количество блоков в каждой стадии.
    pub depths: [usize; NUM_STAGES],
    /// Количество выходных классов.
    pub num_classes: usize,
    /// Количество групп в групповой свертке.
    #[config(default = 32)]
    pub cardinality: usize,
    /// Вид residual-блока.
    #[config(default = "BlockKind::Bottleneck")]
    pub block: BlockKind,
    /// Функция активации для всей сети.
    #[config(default = "ActivationKind::Elu")]
    pub activation: ActivationKind,
    /// Базовая ширина каналов каждой стадии (до расширения).
    #[config(default = "[64, 128, 256, 512]")]
    pub stage_planes: [usize; NUM_STAGES],
    /// Stride первого блока каждой стадии.
    #[config(default = "[1, 2, 2, 2]")]
    pub stage_strides: [usize; NUM_STAGES],
    /// Каналы после stem.
    #[config(default = 64)]
    pub stem_channels: usize,
    /// Каналы входного изображения.
    #[config(default = 3)]
    pub in_channels: usize,
    /// Правило ширины bottleneck между стадиями.
    ///
    /// По умолчанию `Doubling`, а не исходная формула `Recomputed`: см. [`WidthRule`].
    #[config(default = "WidthRule::Doubling")]
    pub width_rule: WidthRule,
}

/// Конфигурация сети с сигнатурой `(block, depths, num_classes, cardinality, activation)`.
pub fn resnext(
    block: BlockKind,
    depths: [usize; NUM_STAGES],
    num_classes: usize,
    cardinality: usize,
    activation: ActivationKind,
) -> ResNeXtConfig {
    ResNeXtConfig::new(depths, num_classes)
        .with_block(block)
        .with_cardinality(cardinality)
        .with_activation(activation)
}

impl ResNeXtConfig {
    /// Вычисляет план сети без создания тензоров.
    ///
    /// Стадии строятся сверткой (fold) по `(stage_planes, depths, stage_strides)`
    /// с явным [`StageAccumulator`].
    ///
    /// # Errors
    /// `InvalidConfig` для нулевых параметров, `ZeroBottleneckWidth`, если правило
    /// ширины обнулило ширину какой-либо стадии.
    pub fn plan(&self) -> Result<NetworkPlan, BurnCoreError> {
        for (name, value) in [
            ("num_classes", self.num_classes),
            ("cardinality", self.cardinality),
            ("stem_channels", self.stem_channels),
            ("in_channels", self.in_channels),
        ] {
            if value == 0 {
                return Err(BurnCoreError::InvalidConfig(format!(
                    "{name} должен быть положительным"
                )));
            }
        }

        // Параметры, общие для всех стадий.
        let builder = StageBuilder {
            block: self.block,
            cardinality: self.cardinality,
            width_rule: self.width_rule,
        };
        let initial =
            StageAccumulator::initial(self.stem_channels, self.block.expansion(), self.cardinality);

        // Итоговый аккумулятор не нужен: классификатор берет ширину из последней стадии.
        let (stages, _) = (0..NUM_STAGES).try_fold(
            (Vec::with_capacity(NUM_STAGES), initial),
            |(mut stages, acc), i| {
                let (stage, next) = builder.build_stage(
                    acc,
                    i + 1,
                    self.stage_planes[i],
                    self.depths[i],
                    self.stage_strides[i],
                )?;
                stages.push(stage);
                Ok::<_, BurnCoreError>((stages, next))
            },
        )?;

        let classifier_in = self.stage_planes[NUM_STAGES - 1] * self.block.expansion();
        Ok(NetworkPlan {
            in_channels: self.in_channels,
            stem_channels: self.stem_channels,
            stages,
            classifier_in,
            num_classes: self.num_classes,
        })
    }

    /// Создает сеть на устройстве `device`.
    ///
    /// # Errors
    /// Любая ошибка [`ResNeXtConfig::plan`] или построения блока; ошибка блока
    /// содержит номер стадии и блока.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<ResNeXt<B>, BurnCoreError> {
        let plan = self.plan()?; // Все формы проверены до выделения памяти под веса.

        let [stem_conv, stem_bn, stem_pool] = plan.stem_specs();
        let stem = Stem {
            conv: layers::conv2d(&stem_conv, device),
            bn: layers::batch_norm(&stem_bn, device),
            pool: layers::max_pool(&stem_pool),
            activation: Ignored(self.activation),
        };

        let stages = plan
            .stages
            .iter()
            .map(|stage_plan| -> Result<Stage<B>, BurnCoreError> {
                let blocks = stage_plan
                    .blocks
                    .iter()
                    .enumerate()
                    .map(|(i, block_plan)| {
                        BottleneckConfig::from_plan(block_plan, self.activation)
                            .init_at(BlockLocation::new(stage_plan.index, i + 1), device)
                    })
                    .collect::<Result<Vec<_>, BurnCoreError>>()?;
                debug!(
                    stage = stage_plan.index,
                    blocks = blocks.len(),
                    out_channels = stage_plan.out_channels(),
                    "Стадия инициализирована"
                );
                Ok(Stage {
                    blocks,
                    index: stage_plan.index,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Глобальный пулинг не имеет параметров; из головы создается только fc.
        let [_, fc_spec] = plan.head_specs();
        let model = ResNeXt {
            stem,
            stages,
            avgpool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            fc: layers::linear(&fc_spec, device),
            plan: Ignored(plan),
            config: Ignored(self.clone()),
        };
        info!(
            depths = ?self.depths,
            cardinality = self.cardinality,
            num_classes = self.num_classes,
            params = model.num_params(),
            "Модель ResNeXt инициализирована"
        );
        Ok(model)
    }
}

/// Stem: 7×7/2 свертка → нормализация → активация → 3×3/2 max-пулинг.
#[derive(Module, Debug)]
pub struct Stem<B: Backend> {
    conv: Conv2d<B>,
    bn: BatchNorm<B, 2>,
    pool: MaxPool2d,
    activation: Ignored<ActivationKind>,
}

impl<B: Backend> Stem<B> {
    /// Уменьшает разрешение в 4 раза и переводит вход в `stem_channels` каналов.
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.activation.forward(self.bn.forward(self.conv.forward(x)));
        self.pool.forward(x)
    }
}

/// Последовательность блоков одной стадии.
#[derive(Module, Debug)]
pub struct Stage<B: Backend> {
    blocks: Vec<Bottleneck<B>>,
    index: usize,
}

impl<B: Backend> Stage<B> {
    /// Прогоняет вход через все блоки стадии.
    ///
    /// # Errors
    /// `IncompatibleShape` с указанием стадии и блока.
    pub fn forward(&self, x: Tensor<B, 4>) -> Result<Tensor<B, 4>, BurnCoreError> {
        self.blocks
            .iter()
            .enumerate()
            .try_fold(x, |x, (i, block)| {
                block.forward(x).map_err(|e| match e {
                    BurnCoreError::IncompatibleShape(msg) => BurnCoreError::IncompatibleShape(
                        format!("{}: {msg}", BlockLocation::new(self.index, i + 1)),
                    ),
                    other => other,
                })
            })
    }

    /// Блоки стадии.
    pub fn blocks(&self) -> &[Bottleneck<B>] {
        &self.blocks
    }
}

/// Классификатор ResNeXt.
#[derive(Module, Debug)]
pub struct ResNeXt<B: Backend> {
    stem: Stem<B>,
    stages: Vec<Stage<B>>,
    avgpool: AdaptiveAvgPool2d,
    fc: Linear<B>,
    plan: Ignored<NetworkPlan>,
    config: Ignored<ResNeXtConfig>,
}

impl<B: Backend> ResNeXt<B> {
    /// Прямой проход: stem → stage1..4 → глобальный average-пулинг → flatten → linear.
    ///
    /// # Аргументы
    /// * `input`: тензор `[batch, in_channels, height, width]`.
    ///
    /// # Возвращает
    /// Ненормализованные оценки классов формы `[batch, num_classes]`.
    ///
    /// # Errors
    /// `IncompatibleShape`, если число каналов входа не совпадает с конфигурацией
    /// или вход пуст.
    pub fn forward(&self, input: Tensor<B, 4>) -> Result<Tensor<B, 2>, BurnCoreError> {
        let dims = input.dims();
        let [batch, channels, height, width] = dims;
        if channels != self.plan.in_channels {
            return Err(BurnCoreError::IncompatibleShape(format!(
                "сеть ожидает {} входных каналов, получен тензор {dims:?}",
                self.plan.in_channels
            )));
        }
        if batch == 0 || height == 0 || width == 0 {
            return Err(BurnCoreError::IncompatibleShape(format!(
                "пустой входной тензор {dims:?}"
            )));
        }

        let x = self.stem.forward(input); // [B, stem_channels, H/4, W/4]
        let x = self
            .stages
            .iter()
            .try_fold(x, |x, stage| stage.forward(x))?;
        let x = self.avgpool.forward(x); // [B, classifier_in, 1, 1]
        let x: Tensor<B, 2> = x.flatten(1, 3); // [B, classifier_in]
        Ok(self.fc.forward(x))
    }

    /// План, по которому построена сеть.
    pub fn plan(&self) -> &NetworkPlan {
        &self.plan
    }

    /// Конфигурация, из которой построена сеть.
    pub fn config(&self) -> &ResNeXtConfig {
        &self.config
    }

    /// Стадии сети.
    pub fn stages(&self) -> &[Stage<B>] {
        &self.stages
    }

    /// Сводная информация о сети.
    pub fn info(&self) -> ModelInfo {
        let config = self.config();
        ModelInfo {
            block: config.block,
            activation: config.activation,
            depths: config.depths,
            cardinality: config.cardinality,
            stage_channels: self.plan.stage_out_channels(),
            stage_widths: self.plan.stage_widths(),
            classifier_in: self.plan.classifier_in,
            num_classes: self.plan.num_classes,
            num_params: self.num_params(),
        }
    }
}
