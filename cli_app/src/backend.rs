//! Бэкенд Burn, выбранный фичами сборки.

#[cfg(not(any(
    feature = "ndarray_backend_cli",
    feature = "tch_backend_cli",
    feature = "wgpu_backend_cli"
)))]
compile_error!(
    "Нужно включить одну из фич: ndarray_backend_cli, tch_backend_cli или wgpu_backend_cli"
);

/// Бэкенд, на котором CLI строит и прогоняет модели.
#[cfg(feature = "ndarray_backend_cli")]
pub type SelectedBackend = burn::backend::NdArray<f32>;

/// Бэкенд, на котором CLI строит и прогоняет модели.
#[cfg(all(feature = "tch_backend_cli", not(feature = "ndarray_backend_cli")))]
pub type SelectedBackend = burn::backend::LibTorch<f32>;

/// Бэкенд, на котором CLI строит и прогоняет модели.
#[cfg(all(
    feature = "wgpu_backend_cli",
    not(any(feature = "ndarray_backend_cli", feature = "tch_backend_cli"))
))]
pub type SelectedBackend = burn::backend::Wgpu;

/// Имя выбранного бэкенда для логов.
pub const fn backend_name() -> &'static str {
    if cfg!(feature = "ndarray_backend_cli") {
        "ndarray"
    } else if cfg!(feature = "tch_backend_cli") {
        "tch"
    } else {
        "wgpu"
    }
}

/// Устройство бэкенда по умолчанию.
pub fn default_device() -> <SelectedBackend as burn::tensor::backend::Backend>::Device {
    Default::default()
}
