// core_burn/src/architectures/resnext/activation.rs

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![deny(unsafe_code, clippy::unwrap_used, clippy::expect_used)]

//! Функции активации, выбираемые конфигурацией сети.

use std::{fmt, str::FromStr};

use burn::tensor::{activation, backend::Backend, Tensor};
use serde::{Deserialize, Serialize};

use crate::error::BurnCoreError;

/// Наклон отрицательной части для `LeakyRelu`.
const LEAKY_RELU_SLOPE: f64 = 0.01;
/// Параметр `alpha` для ELU.
const ELU_ALPHA: f64 = 1.0;

/// Функция активации, общая для всех слоев сети.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ActivationKind {
    /// `x` при `x > 0`, иначе `alpha * (exp(x) - 1)`.
    #[default]
    Elu,
    /// `max(0, x)`.
    Relu,
    /// `max(0.01 * x, x)`.
    LeakyRelu,
    /// Gaussian Error Linear Unit.
    Gelu,
    /// `x * sigmoid(x)`.
    Silu,
}

impl ActivationKind {
    /// Применяет активацию к тензору любой размерности.
    pub fn forward<B: Backend, const D: usize>(&self, x: Tensor<B, D>) -> Tensor<B, D> {
        match self {
            Self::Elu => elu(x, ELU_ALPHA), // Своя реализация, см. `elu` ниже.
            Self::Relu => activation::relu(x),
            Self::LeakyRelu => activation::leaky_relu(x, LEAKY_RELU_SLOPE),
            Self::Gelu => activation::gelu(x),
            Self::Silu => activation::silu(x),
        }
    }

    /// Имя в формате конфигурации.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Elu => "elu",
            Self::Relu => "relu",
            Self::LeakyRelu => "leaky-relu",
            Self::Gelu => "gelu",
            Self::Silu => "silu",
        }
    }
}

impl fmt::Display for ActivationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivationKind {
    type Err = BurnCoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "elu" => Ok(Self::Elu),
            "relu" => Ok(Self::Relu),
            "leaky-relu" | "leakyrelu" => Ok(Self::LeakyRelu),
            "gelu" => Ok(Self::Gelu),
            "silu" | "swish" => Ok(Self::Silu),
            other => Err(BurnCoreError::InvalidConfig(format!(
                "неизвестная функция активации: '{other}'"
            ))),
        }
    }
}

/// ELU через маску: в Burn нет готовой функции.
fn elu<B: Backend, const D: usize>(x: Tensor<B, D>, alpha: f64) -> Tensor<B, D> {
    let negative_mask = x.clone().lower_elem(0.0);
    // exp считается только от неположительной части: exp(x) при x > ~88 дает inf в f32,
    // и в обратном проходе 0 * inf превращается в NaN даже для отброшенных маской элементов.
    let negative = x.clone().clamp_max(0.0).exp().sub_scalar(1.0).mul_scalar(alpha);
    x.mask_where(negative_mask, negative)
}
