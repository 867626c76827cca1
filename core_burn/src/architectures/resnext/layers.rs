// core_burn/src/architectures/resnext/layers.rs

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![deny(unsafe_code, clippy::unwrap_used, clippy::expect_used)]

//! Создание модулей Burn по [`LayerSpec`].

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        BatchNorm, BatchNormConfig, Linear, LinearConfig, PaddingConfig2d,
    },
    tensor::backend::Backend,
};

use super::plan::LayerSpec;

pub(crate) fn conv2d<B: Backend>(spec: &LayerSpec, device: &B::Device) -> Conv2d<B> {
    Conv2dConfig::new([spec.in_channels, spec.out_channels], [spec.kernel, spec.kernel])
        .with_stride([spec.stride, spec.stride])
        .with_padding(PaddingConfig2d::Explicit(spec.padding, spec.padding))
        .with_groups(spec.groups) // > 1 только для 3×3 свертки bottleneck
        .with_bias(spec.bias)
        .init(device)
}

// Параметры нормализации (epsilon, momentum) остаются значениями Burn по умолчанию.
pub(crate) fn batch_norm<B: Backend>(spec: &LayerSpec, device: &B::Device) -> BatchNorm<B, 2> {
    BatchNormConfig::new(spec.out_channels).init(device)
}

pub(crate) fn max_pool(spec: &LayerSpec) -> MaxPool2d {
    MaxPool2dConfig::new([spec.kernel, spec.kernel])
        .with_strides([spec.stride, spec.stride])
        .with_padding(PaddingConfig2d::Explicit(spec.padding, spec.padding))
        .init()
}

pub(crate) fn linear<B: Backend>(spec: &LayerSpec, device: &B::Device) -> Linear<B> {
    LinearConfig::new(spec.in_channels, spec.out_channels)
        .with_bias(spec.bias)
        .init(device)
}
