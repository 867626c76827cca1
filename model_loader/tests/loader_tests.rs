use std::path::Path;

use burn::tensor::{Distribution, Tensor};
use burn_ndarray::{NdArray, NdArrayDevice};
use core_burn::{ActivationKind, BurnCoreError, ResNeXtConfig, WidthRule};
use model_loader::{ModelLoader, ModelLoaderError, CONFIG_FILE_NAME, WEIGHTS_FILE_NAME};
use tempfile::tempdir;

type TestBackend = NdArray<f32>;

fn small_config() -> ResNeXtConfig {
    ResNeXtConfig::new([1, 1, 1, 1], 6)
        .with_cardinality(4)
        .with_stem_channels(8)
        .with_stage_planes([8, 16, 32, 64])
}

async fn write_config(dir: &Path, json: &str) {
    tokio::fs::write(dir.join(CONFIG_FILE_NAME), json).await.unwrap();
}

#[test]
fn test_parse_minimal_config_uses_defaults() {
    let config = ModelLoader::parse_config(r#"{"depths": [3, 4, 6, 3], "num_classes": 1000}"#)
        .unwrap();

    assert_eq!(config.depths, [3, 4, 6, 3]);
    assert_eq!(config.num_classes, 1000);
    assert_eq!(config.cardinality, 32);
    assert_eq!(config.activation, ActivationKind::Elu);
    assert_eq!(config.stage_planes, [64, 128, 256, 512]);
    assert_eq!(config.width_rule, WidthRule::Doubling);
}

#[test]
fn test_parse_accepts_overrides_and_extra_fields() {
    let json = r#"{
        "model_type": "ResNeXt",
        "depths": [1, 1, 1, 1],
        "num_classes": 2,
        "cardinality": 8,
        "activation": "leaky_relu",
        "block": "bottleneck",
        "stem_channels": 16,
        "trained_epochs": 90
    }"#;
    let config = ModelLoader::parse_config(json).unwrap();

    assert_eq!(config.cardinality, 8);
    assert_eq!(config.activation, ActivationKind::LeakyRelu);
    assert_eq!(config.stem_channels, 16);
}

#[test]
fn test_raw_validation_reports_every_problem() {
    let json = r#"{"depths": [2, 0, 2], "cardinality": 0, "activation": "tanh"}"#;
    let err = ModelLoader::parse_config(json).unwrap_err();

    let message = match err {
        ModelLoaderError::InvalidConfig { message } => message,
        other => panic!("ожидалась InvalidConfig, получено {other:?}"),
    };
    assert!(message.contains("'num_classes'"), "{message}");
    assert!(message.contains("depths должно содержать 4"), "{message}");
    assert!(message.contains("depths не может содержать нулей"), "{message}");
    assert!(message.contains("cardinality не может быть равен нулю"), "{message}");
    assert!(message.contains("tanh"), "{message}");
    assert_eq!(message.matches("; ").count(), 4, "{message}");
}

#[test]
fn test_unknown_model_type_is_rejected() {
    let json = r#"{"model_type": "vit", "depths": [1, 1, 1, 1], "num_classes": 2}"#;
    let err = ModelLoader::parse_config(json).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("'vit'"), "{message}");
    assert!(message.contains("ожидается 'resnext'"), "{message}");
}

#[test]
fn test_collapsing_width_rule_fails_when_planning() {
    let json = r#"{"depths": [2, 3, 2, 3], "num_classes": 10, "width_rule": "recomputed"}"#;
    let err = ModelLoader::parse_config(json).unwrap_err();
    assert!(matches!(
        err,
        ModelLoaderError::Core(BurnCoreError::ZeroBottleneckWidth { stage: 4, .. })
    ));
}

#[test]
fn test_malformed_json_is_a_parsing_error() {
    let err = ModelLoader::parse_config("{ depths: ").unwrap_err();
    assert!(matches!(err, ModelLoaderError::ConfigParsing { .. }));
}

#[tokio::test]
async fn test_load_config_reports_missing_file() {
    let dir = tempdir().unwrap();
    let err = ModelLoader::load_config(dir.path()).await.unwrap_err();
    assert!(matches!(err, ModelLoaderError::Io { .. }));
}

#[tokio::test]
async fn test_save_then_load_reproduces_logits() {
    let device = NdArrayDevice::default();
    let dir = tempdir().unwrap();
    let checkpoint = dir.path().join("checkpoint");

    let model = small_config().init::<TestBackend>(&device).unwrap();
    let files = ModelLoader::save_model(&model, &checkpoint).await.unwrap();
    assert!(files.config_path.ends_with(CONFIG_FILE_NAME));
    assert!(files.weights_path.ends_with(WEIGHTS_FILE_NAME));
    assert!(files.weights_path.is_file());

    let loaded = ModelLoader::load_model::<TestBackend>(&checkpoint, &device)
        .await
        .unwrap();
    assert_eq!(loaded.info(), model.info());

    let input = Tensor::<TestBackend, 4>::random([2, 3, 32, 32], Distribution::Default, &device);
    let expected: Vec<f32> = model.forward(input.clone()).unwrap().into_data().to_vec().unwrap();
    let actual: Vec<f32> = loaded.forward(input).unwrap().into_data().to_vec().unwrap();
    assert_eq!(expected.len(), actual.len());
    for (e, a) in expected.iter().zip(&actual) {
        assert!((e - a).abs() < 1e-5, "{e} != {a}");
    }
}

#[tokio::test]
async fn test_load_without_weights_falls_back_to_fresh_model() {
    let device = NdArrayDevice::default();
    let dir = tempdir().unwrap();
    write_config(
        dir.path(),
        r#"{"depths": [1, 1, 1, 1], "num_classes": 3, "cardinality": 4,
            "stem_channels": 8, "stage_planes": [8, 16, 32, 64]}"#,
    )
    .await;

    let model = ModelLoader::load_model::<TestBackend>(dir.path(), &device)
        .await
        .unwrap();
    assert_eq!(model.info().num_classes, 3);
    assert_eq!(model.info().classifier_in, 256);
}

#[tokio::test]
async fn test_save_into_file_path_fails() {
    let device = NdArrayDevice::default();
    let dir = tempdir().unwrap();
    let occupied = dir.path().join("occupied");
    std::fs::write(&occupied, "not a directory").unwrap();

    let model = small_config().init::<TestBackend>(&device).unwrap();
    let err = ModelLoader::save_model(&model, &occupied).await.unwrap_err();
    assert!(matches!(err, ModelLoaderError::Utils(_)));
}
