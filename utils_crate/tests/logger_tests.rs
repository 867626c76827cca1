#![cfg(feature = "logger_utils_feature")]

use std::fs;
use std::path::Path;

use serial_test::serial;
use tempfile::tempdir;
use tracing::Level;
use utils_crate::error::UtilsError;
use utils_crate::logger::{init_tracing_logger, parse_level};

fn log_files_contain(log_dir: &Path, prefix: &str, expected: &str) -> bool {
    fs::read_dir(log_dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|p| {
                    p.file_name()
                        .is_some_and(|n| n.to_string_lossy().starts_with(prefix))
                })
                .any(|p| fs::read_to_string(p).is_ok_and(|content| content.contains(expected)))
        })
        .unwrap_or(false)
}

#[test]
fn test_parse_level() {
    assert_eq!(parse_level("debug").unwrap(), Level::DEBUG);
    assert_eq!(parse_level(" WARN ").unwrap(), Level::WARN);
    assert!(matches!(parse_level("loud"), Err(UtilsError::Config(_))));
}

// Глобальный подписчик устанавливается один раз на процесс, поэтому оба сценария
// проверяются последовательно в одном тесте.
#[test]
#[serial]
fn test_logger_writes_to_file_and_rejects_second_init() {
    let temp_dir = tempdir().unwrap();
    let app_name = "logger_tests";
    let message = "stage 2 built with width 16";

    init_tracing_logger(app_name, Level::INFO, Level::DEBUG, Some(temp_dir.path())).unwrap();
    tracing::info!("{}", message);

    assert!(log_files_contain(temp_dir.path(), app_name, message));

    let second = init_tracing_logger(app_name, Level::INFO, Level::INFO, None);
    assert!(matches!(second, Err(UtilsError::Logger(_))));
}
