// model_loader/src/lib.rs

#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![deny(unsafe_code)]

//! Загрузка и сохранение чекпоинтов ResNeXt.
//!
//! Чекпоинт это директория с двумя файлами:
//!
//! - `config.json`: гиперпараметры сети (сериализованный [`core_burn::ResNeXtConfig`]);
//! - `model.mpk`: веса в формате `NamedMpkFileRecorder` с полной точностью.
//!
//! Конфигурация проходит две проверки: "сырой" JSON ([`RawResNeXtConfig`]) и
//! собранный [`core_burn::ResNeXtConfig`], для которого строится план сети.

pub mod error;
pub mod loader;
pub mod types;
pub mod validation;

pub use error::ModelLoaderError;
pub use loader::{ModelLoader, CONFIG_FILE_NAME, WEIGHTS_FILE_NAME};
pub use types::{CheckpointFiles, ModelType, RawResNeXtConfig};
pub use validation::ModelConfigValidator;
