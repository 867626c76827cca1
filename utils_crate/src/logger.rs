//! Модуль для инициализации глобального логгера на основе `tracing`.
//!
//! Функциональность этого модуля активируется фичей `logger_utils_feature`.

use std::{fs, io, path::Path, str::FromStr};

use tracing::Level;
use tracing_subscriber::{
    filter::Directive, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
    Registry,
};

use crate::error::UtilsError;

/// Базовый фильтр: `RUST_LOG`, если задан, иначе `info`.
fn base_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Собирает директиву вида `app_name=level`.
fn app_directive(app_name: &str, level: Level) -> Result<Directive, UtilsError> {
    // Дефисы в имени крейта для EnvFilter заменяются на подчеркивания.
    let sanitized_app_name = app_name.replace('-', "_");
    format!("{sanitized_app_name}={level}")
        .parse()
        .map_err(|e| UtilsError::Logger(format!("неверная директива для '{app_name}': {e}")))
}

/// Разбирает уровень логирования из строки конфигурации (`"info"`, `"DEBUG"` и т.д.).
///
/// # Errors
/// `UtilsError::Config`, если строка не является известным уровнем.
pub fn parse_level(level: &str) -> Result<Level, UtilsError> {
    Level::from_str(level.trim())
        .map_err(|_| UtilsError::Config(format!("неизвестный уровень логирования: '{level}'")))
}

/// Инициализирует глобальный подписчик `tracing`.
///
/// Настраивает вывод в консоль (stderr) и, опционально, в файл с ежедневной ротацией.
/// Фильтрует по `RUST_LOG` и явным уровням для `app_name`.
///
/// # Аргументы
/// * `app_name` - Имя приложения (для фильтров и имени файла лога).
/// * `console_level` - Уровень для консоли.
/// * `file_level` - Уровень для файла.
/// * `log_dir` - Опциональная директория для файлов логов.
///
/// # Errors
/// Возвращает `UtilsError::Logger` при неверной директиве фильтра или если
/// глобальный подписчик уже установлен. Проблемы с созданием директории логов
/// не считаются ошибкой: логирование продолжается только в консоль.
pub fn init_tracing_logger(
    app_name: &str,
    console_level: Level,
    file_level: Level,
    log_dir: Option<&Path>,
) -> Result<(), UtilsError> {
    let console_filter = base_env_filter().add_directive(app_directive(app_name, console_level)?);

    let console_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(true)
        .pretty()
        .with_filter(console_filter);

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync + 'static>> = Vec::new();
    layers.push(console_layer.boxed());

    let mut file_logging_dir = None;
    if let Some(dir) = log_dir {
        match fs::create_dir_all(dir) {
            Ok(()) => {
                let file_appender = tracing_appender::rolling::daily(dir, format!("{app_name}.log"));
                let file_filter = base_env_filter().add_directive(app_directive(app_name, file_level)?);
                let file_layer = fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_filter(file_filter);
                layers.push(file_layer.boxed());
                file_logging_dir = Some(dir);
            }
            Err(e) => {
                // tracing еще не инициализирован.
                eprintln!(
                    "[ПРЕДУПРЕЖДЕНИЕ] Не удалось создать директорию логов {dir:?}: {e}. Логирование в файл отключено."
                );
            }
        }
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| UtilsError::Logger(format!("не удалось инициализировать логгер: {e}")))?;

    match file_logging_dir {
        Some(dir) => tracing::info!(
            "Логгер инициализирован. Уровень консоли: {}. Логирование в файл: {:?} (уровень {}).",
            console_level,
            dir,
            file_level
        ),
        None => tracing::info!(
            "Логгер инициализирован. Только вывод в консоль (уровень {}).",
            console_level
        ),
    }
    Ok(())
}
