// core_burn/src/architectures/resnext/bottleneck.rs

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![deny(unsafe_code, clippy::unwrap_used, clippy::expect_used)]

//! Bottleneck-блок ResNeXt (тип C): 1×1 сжатие → 3×3 групповая свертка → 1×1 расширение
//! с аддитивным skip-соединением.

use burn::{
    config::Config,
    module::{Ignored, Module},
    nn::{conv::Conv2d, BatchNorm},
    tensor::{backend::Backend, Tensor},
};
use tracing::trace;

use super::{activation::ActivationKind, layers, plan::BlockPlan};
use crate::error::{BlockLocation, BurnCoreError};

/// Конфигурация для `Bottleneck`.
#[derive(Config, Debug)]
pub struct BottleneckConfig {
    /// Каналы на входе блока.
    pub inplanes: usize,
    /// Базовая ширина (выход блока до расширения).
    pub planes: usize,
    /// Каналов на одну группу в bottleneck.
    pub width: usize,
    /// Количество групп свертки.
    pub cardinality: usize,
    /// Stride групповой свертки; единственное место, где меняется разрешение.
    #[config(default = 1)]
    pub stride: usize,
    /// Добавить проекцию (1×1 свертка + нормализация) на skip-путь.
    #[config(default = false)]
    pub downsample: bool,
    /// Множитель расширения выходных каналов.
    #[config(default = 4)]
    pub expansion: usize,
    /// Функция активации.
    #[config(default = "ActivationKind::Elu")]
    pub activation: ActivationKind,
}

impl BottleneckConfig {
    /// Конфигурация из плана блока.
    pub fn from_plan(plan: &BlockPlan, activation: ActivationKind) -> Self {
        Self::new(plan.inplanes, plan.planes, plan.width, plan.cardinality)
            .with_stride(plan.stride)
            .with_downsample(plan.downsample)
            .with_expansion(plan.expansion)
            .with_activation(activation)
    }

    /// План блока, соответствующий конфигурации.
    pub const fn plan(&self) -> BlockPlan {
        BlockPlan {
            inplanes: self.inplanes,
            planes: self.planes,
            width: self.width,
            cardinality: self.cardinality,
            stride: self.stride,
            expansion: self.expansion,
            downsample: self.downsample,
        }
    }

    /// Создает отдельный блок.
    ///
    /// # Errors
    /// См. [`BottleneckConfig::init_at`].
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<Bottleneck<B>, BurnCoreError> {
        self.init_at(BlockLocation::standalone(), device)
    }

    /// Создает блок, находящийся в позиции `location` сети.
    ///
    /// # Errors
    /// `SkipPathMismatch`, если без downsample skip-путь не совпадет с основным
    /// (каналы `inplanes != planes * expansion` или `stride != 1`);
    /// `InvalidConfig` для нулевых параметров.
    pub fn init_at<B: Backend>(
        &self,
        location: BlockLocation,
        device: &B::Device,
    ) -> Result<Bottleneck<B>, BurnCoreError> {
        let plan = self.plan();
        plan.validate(location)?; // Несовпадение skip-пути обнаруживается до создания весов.
        let specs = plan.specs();

        let downsample = specs.downsample.map(|(conv, bn)| Downsample {
            conv: layers::conv2d(&conv, device),
            bn: layers::batch_norm(&bn, device),
        });

        Ok(Bottleneck {
            conv1: layers::conv2d(&specs.conv1, device),
            bn1: layers::batch_norm(&specs.bn1, device),
            conv2: layers::conv2d(&specs.conv2, device),
            bn2: layers::batch_norm(&specs.bn2, device),
            conv3: layers::conv2d(&specs.conv3, device),
            bn3: layers::batch_norm(&specs.bn3, device),
            downsample,
            activation: Ignored(self.activation),
            in_channels: plan.inplanes,
            out_channels: plan.out_channels(),
            stride: plan.stride,
        })
    }
}

/// Проекция skip-пути: 1×1 свертка со stride блока и нормализация.
#[derive(Module, Debug)]
pub struct Downsample<B: Backend> {
    conv: Conv2d<B>,
    bn: BatchNorm<B, 2>,
}

impl<B: Backend> Downsample<B> {
    /// Приводит вход блока к форме выхода основного пути.
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.bn.forward(self.conv.forward(x))
    }
}

/// Один residual bottleneck-блок.
#[derive(Module, Debug)]
pub struct Bottleneck<B: Backend> {
    /// 1×1 сжатие до `width * cardinality`.
    conv1: Conv2d<B>,
    bn1: BatchNorm<B, 2>,
    /// 3×3 групповая свертка (groups = cardinality).
    conv2: Conv2d<B>,
    bn2: BatchNorm<B, 2>,
    /// 1×1 расширение до `planes * expansion`.
    conv3: Conv2d<B>,
    bn3: BatchNorm<B, 2>,
    downsample: Option<Downsample<B>>,
    activation: Ignored<ActivationKind>,
    in_channels: usize,
    out_channels: usize,
    stride: usize,
}

impl<B: Backend> Bottleneck<B> {
    /// Прямой проход, строго в порядке:
    /// `conv1 → bn1 → act → conv2 → bn2 → act → conv3 → bn3`, затем skip-путь
    /// (downsample или тождество), сложение и финальная активация.
    ///
    /// # Аргументы
    /// * `input`: тензор формы `[batch, in_channels, height, width]`.
    ///
    /// # Возвращает
    /// Тензор `[batch, planes * expansion, height / stride, width / stride]`.
    ///
    /// # Errors
    /// `IncompatibleShape`, если вход имеет неверное число каналов или
    /// skip-путь и основной путь разошлись по форме.
    pub fn forward(&self, input: Tensor<B, 4>) -> Result<Tensor<B, 4>, BurnCoreError> {
        let [_, channels, _, _] = input.dims();
        if channels != self.in_channels {
            return Err(BurnCoreError::IncompatibleShape(format!(
                "блок ожидает {} входных каналов, получено {channels}",
                self.in_channels
            )));
        }
        let residual = input.clone(); // Вход skip-пути.

        // Основной путь: сжатие, групповая свертка (со stride блока), расширение.
        let out = self.activation.forward(self.bn1.forward(self.conv1.forward(input)));
        let out = self.activation.forward(self.bn2.forward(self.conv2.forward(out)));
        // После bn3 активации нет: она применяется после сложения.
        let out = self.bn3.forward(self.conv3.forward(out));

        let residual = match &self.downsample {
            Some(downsample) => downsample.forward(residual),
            None => residual,
        };

        let (main_dims, skip_dims) = (out.dims(), residual.dims());
        if main_dims != skip_dims {
            return Err(BurnCoreError::IncompatibleShape(format!(
                "основной путь {main_dims:?} не совпадает со skip-путем {skip_dims:?}"
            )));
        }
        trace!(?main_dims, "bottleneck forward");

        Ok(self.activation.forward(out.add(residual)))
    }

    /// Выходные каналы блока.
    pub const fn out_channels(&self) -> usize {
        self.out_channels
    }

    /// Stride блока.
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// Есть ли проекция на skip-пути.
    pub const fn has_downsample(&self) -> bool {
        self.downsample.is_some()
    }
}
