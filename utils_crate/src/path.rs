use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::error::UtilsError;

/// Гарантирует, что директория существует, создавая ее при необходимости.
///
/// Используется перед записью чекпоинта модели (`config.json` + веса).
///
/// # Errors
/// Возвращает `UtilsError::Io`, если директория не может быть создана.
/// Возвращает `UtilsError::InvalidParameter`, если по указанному пути существует файл.
pub fn ensure_dir_exists(dir_path: &Path) -> Result<(), UtilsError> {
    if !dir_path.exists() {
        info!("Создание директории: {:?}", dir_path);
        fs::create_dir_all(dir_path)
            .map_err(|e| UtilsError::io_with_path(e, dir_path.to_string_lossy().into_owned()))?;
        debug!("Директория создана: {:?}", dir_path);
    } else if !dir_path.is_dir() {
        let err_msg = format!("Path {dir_path:?} exists but is not a directory.");
        error!("{}", err_msg);
        return Err(UtilsError::InvalidParameter(err_msg));
    } else {
        debug!("Директория уже существует: {:?}", dir_path);
    }
    Ok(())
}

/// Ищет файл с указанным именем в директории (нерекурсивно).
///
/// # Returns
/// `Ok(Some(PathBuf))`, если файл найден, `Ok(None)`, если не найден.
///
/// # Errors
/// Возвращает `UtilsError::Io`, если есть проблема с чтением директории.
/// Возвращает `UtilsError::InvalidParameter`, если `dir` не является директорией.
pub fn find_file_in_dir(dir: &Path, file_name: &str) -> Result<Option<PathBuf>, UtilsError> {
    if !dir.is_dir() {
        return Err(UtilsError::InvalidParameter(format!(
            "Provided path is not a directory: {dir:?}"
        )));
    }
    debug!("Поиск файла '{}' в директории: {:?}", file_name, dir);
    for entry in
        fs::read_dir(dir).map_err(|e| UtilsError::io_with_path(e, dir.to_string_lossy().into_owned()))?
    {
        let entry = entry.map_err(|e| UtilsError::io_with_path(e, dir.to_string_lossy().into_owned()))?;
        let path = entry.path();
        if path.is_file() && path.file_name().is_some_and(|name| name == file_name) {
            debug!("Найден файл: {:?}", path);
            return Ok(Some(path));
        }
    }
    debug!("Файл '{}' не найден в директории: {:?}", file_name, dir);
    Ok(None)
}
