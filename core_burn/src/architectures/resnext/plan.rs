// core_burn/src/architectures/resnext/plan.rs

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![deny(unsafe_code, clippy::unwrap_used, clippy::expect_used)]

//! Арифметика построения ResNeXt без тензоров.
//!
//! План сети вычисляется целиком из [`ResNeXtConfig`](super::ResNeXtConfig):
//! ширины каналов, количество групп, stride и наличие downsample для каждого блока.
//! Модули Burn создаются по готовому плану, поэтому всю структуру сети можно
//! проверить без инициализации весов.
//!
//! Бегущее состояние построения (`inplanes` и ширина bottleneck) передается явно
//! через [`StageAccumulator`]: каждая стадия получает аккумулятор и возвращает новый.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BlockLocation, BurnCoreError};

/// Тип слоя, который создается во фреймворке.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// Двумерная свертка (возможно групповая).
    Conv2d,
    /// Батч-нормализация по каналам.
    BatchNorm2d,
    /// Max-пулинг.
    MaxPool2d,
    /// Глобальный average-пулинг до 1×1.
    GlobalAvgPool2d,
    /// Полносвязный слой классификатора.
    Linear,
}

/// Сигнатура формы одного слоя: каналы, геометрия ядра, stride, padding, группы, bias.
///
/// Для слоев без ядра (`BatchNorm2d`, `Linear`, `GlobalAvgPool2d`) `kernel`, `stride`
/// и `groups` равны 1, `padding` равен 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LayerSpec {
    /// Тип слоя.
    pub kind: LayerKind,
    /// Входные каналы (признаки для `Linear`).
    pub in_channels: usize,
    /// Выходные каналы.
    pub out_channels: usize,
    /// Размер квадратного ядра.
    pub kernel: usize,
    /// Stride по обеим осям.
    pub stride: usize,
    /// Padding по обеим осям.
    pub padding: usize,
    /// Количество групп свертки.
    pub groups: usize,
    /// Есть ли обучаемое смещение.
    pub bias: bool,
}

impl LayerSpec {
    /// Свертка без смещения.
    pub const fn conv(
        in_channels: usize,
        out_channels: usize,
        kernel: usize,
        stride: usize,
        padding: usize,
        groups: usize,
    ) -> Self {
        Self {
            kind: LayerKind::Conv2d,
            in_channels,
            out_channels,
            kernel,
            stride,
            padding,
            groups,
            bias: false,
        }
    }

    /// Батч-нормализация на `channels` каналах.
    pub const fn batch_norm(channels: usize) -> Self {
        Self::shape_preserving(LayerKind::BatchNorm2d, channels)
    }

    /// Max-пулинг; каналы не меняются.
    pub const fn max_pool(channels: usize, kernel: usize, stride: usize, padding: usize) -> Self {
        Self {
            kind: LayerKind::MaxPool2d,
            in_channels: channels,
            out_channels: channels,
            kernel,
            stride,
            padding,
            groups: 1,
            bias: false,
        }
    }

    /// Глобальный average-пулинг.
    pub const fn global_avg_pool(channels: usize) -> Self {
        Self::shape_preserving(LayerKind::GlobalAvgPool2d, channels)
    }

    /// Линейный слой со смещением.
    pub const fn linear(in_features: usize, out_features: usize) -> Self {
        Self {
            kind: LayerKind::Linear,
            in_channels: in_features,
            out_channels: out_features,
            kernel: 1,
            stride: 1,
            padding: 0,
            groups: 1,
            bias: true,
        }
    }

    const fn shape_preserving(kind: LayerKind, channels: usize) -> Self {
        Self {
            kind,
            in_channels: channels,
            out_channels: channels,
            kernel: 1,
            stride: 1,
            padding: 0,
            groups: 1,
            bias: false,
        }
    }
}

impl fmt::Display for LayerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LayerKind::Conv2d => write!(
                f,
                "Conv2d({} -> {}, kernel={}x{}, stride={}, padding={}, groups={}, bias={})",
                self.in_channels,
                self.out_channels,
                self.kernel,
                self.kernel,
                self.stride,
                self.padding,
                self.groups,
                self.bias
            ),
            LayerKind::BatchNorm2d => write!(f, "BatchNorm2d({})", self.out_channels),
            LayerKind::MaxPool2d => write!(
                f,
                "MaxPool2d(kernel={}x{}, stride={}, padding={})",
                self.kernel, self.kernel, self.stride, self.padding
            ),
            LayerKind::GlobalAvgPool2d => write!(f, "AdaptiveAvgPool2d(1x1, channels={})", self.out_channels),
            LayerKind::Linear => write!(
                f,
                "Linear({} -> {}, bias={})",
                self.in_channels, self.out_channels, self.bias
            ),
        }
    }
}

/// Вид residual-блока.
///
/// Пока поддерживается только bottleneck (тип C из статьи ResNeXt), но выбор блока
/// остается параметром конфигурации, а не иерархией типов.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    /// 1×1 сжатие → 3×3 групповая свертка → 1×1 расширение.
    #[default]
    Bottleneck,
}

impl BlockKind {
    /// Множитель, переводящий базовую ширину стадии в выходные каналы блока.
    pub const fn expansion(self) -> usize {
        match self {
            Self::Bottleneck => 4,
        }
    }
}

/// Правило пересчета ширины bottleneck после каждой стадии.
///
/// Исходная формула ResNeXt-построителя это [`WidthRule::Recomputed`]. Значение по
/// умолчанию [`WidthRule::Doubling`] намеренно от нее отступает: исходная формула при
/// cardinality 32 обнуляет ширину к четвертой стадии, а удвоение дает стандартные
/// ширины 8, 16, 32, 64. Выбор `Recomputed` не исправляет формулу молча: построение
/// завершается ошибкой `ZeroBottleneckWidth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WidthRule {
    /// Ширина удваивается после каждой стадии (шаблон ResNeXt: 8, 16, 32, 64 при cardinality 32).
    ///
    /// Намеренное отступление от исходной формулы; используется по умолчанию.
    #[default]
    Doubling,
    /// Исходная формула: `width = cardinality * expansion / plane_width` после стадии.
    ///
    /// Не согласуется с начальной формулой `stem_channels * expansion / cardinality`:
    /// при cardinality 32 дает 8, 2, 1, 0, и четвертая стадия не строится.
    Recomputed,
}

impl WidthRule {
    /// Ширина для следующей стадии после стадии с базовой шириной `plane_width`.
    pub const fn next_width(
        self,
        width: usize,
        cardinality: usize,
        expansion: usize,
        plane_width: usize,
    ) -> usize {
        match self {
            Self::Doubling => width * 2,
            Self::Recomputed => cardinality * expansion / plane_width,
        }
    }
}

/// Параметры одного bottleneck-блока в плане сети.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BlockPlan {
    /// Каналы на входе блока.
    pub inplanes: usize,
    /// Базовая ширина стадии (до расширения).
    pub planes: usize,
    /// Каналов на одну группу в bottleneck.
    pub width: usize,
    /// Количество групп свертки.
    pub cardinality: usize,
    /// Stride групповой свертки (и downsample).
    pub stride: usize,
    /// Множитель расширения.
    pub expansion: usize,
    /// Есть ли проекция на skip-пути.
    pub downsample: bool,
}

/// Слои одного блока в порядке прямого прохода.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayerSpecs {
    /// 1×1 сжатие до `width * cardinality`.
    pub conv1: LayerSpec,
    /// Нормализация после `conv1`.
    pub bn1: LayerSpec,
    /// 3×3 групповая свертка.
    pub conv2: LayerSpec,
    /// Нормализация после `conv2`.
    pub bn2: LayerSpec,
    /// 1×1 расширение до `planes * expansion`.
    pub conv3: LayerSpec,
    /// Нормализация после `conv3`.
    pub bn3: LayerSpec,
    /// Проекция skip-пути: 1×1 свертка и нормализация.
    pub downsample: Option<(LayerSpec, LayerSpec)>,
}

impl BlockPlan {
    /// Каналы внутри bottleneck: `width * cardinality`.
    pub const fn bottleneck_channels(&self) -> usize {
        self.width * self.cardinality
    }

    /// Каналы на выходе блока: `planes * expansion`.
    pub const fn out_channels(&self) -> usize {
        self.planes * self.expansion
    }

    /// Проверяет, что блок можно построить и skip-путь совпадет с основным.
    ///
    /// # Errors
    /// `InvalidConfig` для нулевых параметров, `SkipPathMismatch`, если без downsample
    /// меняются каналы или разрешение.
    pub fn validate(&self, location: BlockLocation) -> Result<(), BurnCoreError> {
        let fields = [
            ("inplanes", self.inplanes),
            ("planes", self.planes),
            ("width", self.width),
            ("cardinality", self.cardinality),
            ("stride", self.stride),
            ("expansion", self.expansion),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| *value == 0) {
            return Err(BurnCoreError::InvalidConfig(format!(
                "{location}: параметр {name} должен быть положительным"
            )));
        }

        let main_channels = self.out_channels();
        if !self.downsample && (self.inplanes != main_channels || self.stride != 1) {
            return Err(BurnCoreError::SkipPathMismatch {
                location,
                skip_channels: self.inplanes,
                main_channels,
                stride: self.stride,
            });
        }
        Ok(())
    }

    /// Слои блока.
    pub const fn specs(&self) -> BlockLayerSpecs {
        let d = self.bottleneck_channels();
        let out = self.out_channels();
        let downsample = if self.downsample {
            Some((
                LayerSpec::conv(self.inplanes, out, 1, self.stride, 0, 1),
                LayerSpec::batch_norm(out),
            ))
        } else {
            None
        };
        BlockLayerSpecs {
            conv1: LayerSpec::conv(self.inplanes, d, 1, 1, 0, 1),
            bn1: LayerSpec::batch_norm(d),
            conv2: LayerSpec::conv(d, d, 3, self.stride, 1, self.cardinality),
            bn2: LayerSpec::batch_norm(d),
            conv3: LayerSpec::conv(d, out, 1, 1, 0, 1),
            bn3: LayerSpec::batch_norm(out),
            downsample,
        }
    }

    /// Слои блока плоским списком (downsample в конце).
    pub fn layer_specs(&self) -> Vec<LayerSpec> {
        let specs = self.specs();
        let mut layers = vec![specs.conv1, specs.bn1, specs.conv2, specs.bn2, specs.conv3, specs.bn3];
        if let Some((conv, bn)) = specs.downsample {
            layers.push(conv);
            layers.push(bn);
        }
        layers
    }
}

/// План одной стадии.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagePlan {
    /// Номер стадии (1..=4).
    pub index: usize,
    /// Базовая ширина каналов стадии.
    pub plane_width: usize,
    /// Stride первого блока.
    pub stride: usize,
    /// Ширина bottleneck, использованная во всех блоках стадии.
    pub width: usize,
    /// Блоки в порядке прохода.
    pub blocks: Vec<BlockPlan>,
}

impl StagePlan {
    /// Выходные каналы стадии.
    pub fn out_channels(&self) -> usize {
        self.blocks.last().map_or(0, BlockPlan::out_channels)
    }

    /// Есть ли в стадии проекция skip-пути.
    pub fn has_downsample(&self) -> bool {
        self.blocks.iter().any(|block| block.downsample)
    }
}

/// Бегущее состояние построения стадий.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageAccumulator {
    /// Каналы на входе следующей стадии.
    pub inplanes: usize,
    /// Ширина bottleneck для следующей стадии.
    pub width: usize,
}

impl StageAccumulator {
    /// Начальное состояние после stem: `width = stem_channels * expansion / cardinality`.
    pub const fn initial(stem_channels: usize, expansion: usize, cardinality: usize) -> Self {
        Self {
            inplanes: stem_channels,
            width: stem_channels * expansion / cardinality,
        }
    }
}

/// Постоянные параметры построения стадий.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageBuilder {
    /// Вид блока.
    pub block: BlockKind,
    /// Количество групп свертки.
    pub cardinality: usize,
    /// Правило ширины между стадиями.
    pub width_rule: WidthRule,
}

impl StageBuilder {
    /// Строит план стадии `index` и возвращает новое состояние аккумулятора.
    ///
    /// Downsample нужен, если `stride != 1` или `acc.inplanes != plane_width * expansion`.
    /// Первый блок получает stride стадии и downsample, остальные блоки идут
    /// со stride 1 и тождественным skip-путем.
    ///
    /// # Errors
    /// `ZeroBottleneckWidth`, если ширина стадии равна нулю; `InvalidConfig` для
    /// нулевой глубины, ширины или stride.
    pub fn build_stage(
        &self,
        acc: StageAccumulator,
        index: usize,
        plane_width: usize,
        depth: usize,
        stride: usize,
    ) -> Result<(StagePlan, StageAccumulator), BurnCoreError> {
        if depth == 0 || plane_width == 0 || stride == 0 {
            return Err(BurnCoreError::InvalidConfig(format!(
                "stage{index}: depth={depth}, plane_width={plane_width}, stride={stride} должны быть положительными"
            )));
        }
        if acc.width == 0 {
            return Err(BurnCoreError::ZeroBottleneckWidth {
                stage: index,
                plane_width,
                cardinality: self.cardinality,
            });
        }

        let expansion = self.block.expansion(); // 4 для bottleneck
        let out_channels = plane_width * expansion; // Выход каждого блока стадии.
        // Проекция нужна, если меняется разрешение или число каналов на входе стадии.
        let downsample = stride != 1 || acc.inplanes != out_channels;

        let blocks: Vec<BlockPlan> = (0..depth)
            .map(|i| {
                let first = i == 0;
                // Только первый блок меняет форму; остальные получают вход уже нужной ширины.
                BlockPlan {
                    inplanes: if first { acc.inplanes } else { out_channels },
                    planes: plane_width,
                    width: acc.width,
                    cardinality: self.cardinality,
                    stride: if first { stride } else { 1 },
                    expansion,
                    downsample: first && downsample,
                }
            })
            .collect();

        debug!(
            stage = index,
            width = acc.width,
            plane_width,
            depth,
            stride,
            downsample,
            "Построен план стадии"
        );

        // Состояние для следующей стадии: ее вход и ширина bottleneck.
        let next = StageAccumulator {
            inplanes: out_channels,
            width: self
                .width_rule
                .next_width(acc.width, self.cardinality, expansion, plane_width),
        };
        let plan = StagePlan {
            index,
            plane_width,
            stride,
            width: acc.width,
            blocks,
        };
        Ok((plan, next))
    }
}

/// Полный план сети: stem, четыре стадии, классификатор.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkPlan {
    /// Каналы входного изображения.
    pub in_channels: usize,
    /// Каналы после stem.
    pub stem_channels: usize,
    /// Стадии в порядке прохода.
    pub stages: Vec<StagePlan>,
    /// Ширина входа классификатора.
    pub classifier_in: usize,
    /// Количество классов.
    pub num_classes: usize,
}

impl NetworkPlan {
    /// Слои stem: свертка 7×7/2, нормализация, max-пулинг 3×3/2.
    pub const fn stem_specs(&self) -> [LayerSpec; 3] {
        [
            LayerSpec::conv(self.in_channels, self.stem_channels, 7, 2, 3, 1),
            LayerSpec::batch_norm(self.stem_channels),
            LayerSpec::max_pool(self.stem_channels, 3, 2, 1),
        ]
    }

    /// Слои головы: глобальный пулинг и линейный классификатор.
    pub const fn head_specs(&self) -> [LayerSpec; 2] {
        [
            LayerSpec::global_avg_pool(self.classifier_in),
            LayerSpec::linear(self.classifier_in, self.num_classes),
        ]
    }

    /// Все слои сети в порядке объявления.
    pub fn layer_specs(&self) -> Vec<LayerSpec> {
        let mut layers = self.stem_specs().to_vec();
        layers.extend(
            self.stages
                .iter()
                .flat_map(|stage| stage.blocks.iter().flat_map(BlockPlan::layer_specs)),
        );
        layers.extend(self.head_specs());
        layers
    }

    /// Выходные каналы каждой стадии.
    pub fn stage_out_channels(&self) -> Vec<usize> {
        self.stages.iter().map(StagePlan::out_channels).collect()
    }

    /// Ширина bottleneck каждой стадии.
    pub fn stage_widths(&self) -> Vec<usize> {
        self.stages.iter().map(|stage| stage.width).collect()
    }

    /// Общее количество блоков.
    pub fn num_blocks(&self) -> usize {
        self.stages.iter().map(|stage| stage.blocks.len()).sum()
    }
}
