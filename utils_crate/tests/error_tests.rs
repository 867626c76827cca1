use std::io;

use utils_crate::error::UtilsError;

#[test]
fn test_io_error_with_and_without_path() {
    let err = UtilsError::io_with_path(
        io::Error::new(io::ErrorKind::NotFound, "file not found"),
        "model_dir/config.json",
    );
    match err {
        UtilsError::Io { source, path: Some(p) } => {
            assert_eq!(source.kind(), io::ErrorKind::NotFound);
            assert_eq!(p, "model_dir/config.json");
        }
        other => panic!("Expected Io with path, got {other:?}"),
    }

    let err: UtilsError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
    assert!(matches!(err, UtilsError::Io { path: None, .. }));
    assert!(err.to_string().contains("denied"));
}

#[test]
fn test_error_display_messages() {
    assert_eq!(
        UtilsError::Config("bad level".to_string()).to_string(),
        "Ошибка конфигурации: bad level"
    );
    assert_eq!(
        UtilsError::InvalidParameter("empty path".to_string()).to_string(),
        "Неверный параметр: empty path"
    );
    assert_eq!(
        UtilsError::Logger("already set".to_string()).to_string(),
        "Ошибка инициализации логгера: already set"
    );
}
