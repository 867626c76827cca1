#![warn(
    missing_docs, // Предупреждать, если публичные элементы не документированы.
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used, // Предупреждать об использовании .unwrap()
    clippy::expect_used  // Предупреждать об использовании .expect()
)]
#![deny(
    unsafe_code,        // Запретить использование unsafe блоков.
    unused_mut,         // Запретить неиспользуемые изменяемые переменные.
    unused_imports,     // Запретить неиспользуемые импорты.
    unused_attributes   // Запретить неиспользуемые атрибуты.
)]

//! `utils_crate` предоставляет общую обработку ошибок, инициализацию логирования
//! и конфигурацию приложения для проекта resnext-hub.
//!
//! Крейт модульный: остальные части воркспейса выборочно включают нужную
//! функциональность через систему фич (features).
//!
//! # Основные модули:
//!
//! - [`error`]: Определяет общий тип ошибки `UtilsError` для всего крейта.
//! - [`config`]: (активируется фичей `app_config_serde`) Предоставляет `AppConfig` для
//!   загрузки конфигурации приложения из TOML-файлов.
//! - [`path`]: (активируется фичей `path_utils_feature`) Утилиты для работы
//!   с путями файловой системы (директории моделей, чекпоинты).
//! - [`logger`]: (активируется фичей `logger_utils_feature`) Инициализация
//!   системы логирования на базе `tracing`.
//!
//! ```toml
//! # В Cargo.toml вашего крейта
//! # utils_crate = { path = "../utils_crate", features = ["logger_utils_feature"] }
//! ```

// --- Модуль для общих ошибок ---
pub mod error;
pub use error::UtilsError; // Реэкспорт для удобства использования.

// --- Утилитарные модули (управляются фичами) ---

/// Модуль с утилитами для работы с путями файловой системы.
///
/// Активируется фичей `path_utils_feature`.
#[cfg(feature = "path_utils_feature")]
pub mod path;
#[cfg(feature = "path_utils_feature")]
pub use path::{ensure_dir_exists, find_file_in_dir};

/// Модуль с утилитами для инициализации логирования.
///
/// Активируется фичей `logger_utils_feature`.
#[cfg(feature = "logger_utils_feature")]
pub mod logger;
#[cfg(feature = "logger_utils_feature")]
pub use logger::{init_tracing_logger, parse_level};

/// Модуль для загрузки и управления конфигурацией приложения.
///
/// Активируется фичей `app_config_serde`.
#[cfg(feature = "app_config_serde")]
pub mod config;
#[cfg(feature = "app_config_serde")]
pub use config::AppConfig;
