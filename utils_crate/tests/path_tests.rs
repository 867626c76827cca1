use std::fs::File;

use tempfile::tempdir;
use utils_crate::error::UtilsError;
use utils_crate::path::{ensure_dir_exists, find_file_in_dir};

#[test]
fn test_ensure_dir_exists_creates_nested_checkpoint_dir() -> Result<(), Box<dyn std::error::Error>> {
    let base_dir = tempdir()?;
    let new_dir = base_dir.path().join("checkpoints").join("resnext_32x8d");
    assert!(!new_dir.exists());
    ensure_dir_exists(&new_dir)?;
    assert!(new_dir.is_dir());
    // Повторный вызов для существующей директории не является ошибкой.
    ensure_dir_exists(&new_dir)?;
    Ok(())
}

#[test]
fn test_ensure_dir_exists_rejects_file() {
    let base_dir = tempdir().unwrap();
    let file_path = base_dir.path().join("model.mpk");
    File::create(&file_path).unwrap();

    match ensure_dir_exists(&file_path) {
        Err(UtilsError::InvalidParameter(msg)) => {
            assert!(msg.contains("exists but is not a directory"));
        }
        other => panic!("Expected InvalidParameter, got {other:?}"),
    }
}

#[test]
fn test_find_file_in_dir_found_and_missing() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let config_path = dir.path().join("config.json");
    File::create(&config_path)?;

    assert_eq!(find_file_in_dir(dir.path(), "config.json")?, Some(config_path));
    assert_eq!(find_file_in_dir(dir.path(), "model.mpk")?, None);
    Ok(())
}

#[test]
fn test_find_file_in_dir_requires_directory() {
    let base_dir = tempdir().unwrap();
    let not_a_dir = base_dir.path().join("config.json");
    File::create(&not_a_dir).unwrap();

    match find_file_in_dir(&not_a_dir, "config.json") {
        Err(UtilsError::InvalidParameter(msg)) => {
            assert!(msg.contains("Provided path is not a directory"));
        }
        other => panic!("Expected InvalidParameter, got {other:?}"),
    }
}
