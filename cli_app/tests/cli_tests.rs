use clap::Parser;
use cli_app::{
    cli::{model_dir_or_default, Cli, Command, ModelArgs, WidthRuleArg},
    commands,
};
use core_burn::{ActivationKind, WidthRule};
use tempfile::tempdir;
use utils_crate::{config::ModelConfigSub, AppConfig};

/// Флаги узкой сети, которая быстро строится на CPU.
const SMALL_NET: [&str; 8] = [
    "--depths=1,1,1,1",
    "--num-classes=5",
    "--cardinality=4",
    "--stem-channels=8",
    "--stage-planes=8,16,32,64",
    "--activation=relu",
    "--verbose",
    "--config=missing.toml",
];

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("resnext-cli").chain(args.iter().copied())).unwrap()
}

fn small_model_args(command: &str) -> ModelArgs {
    let mut args = vec![command];
    args.extend(SMALL_NET);
    match parse(&args).command {
        Command::Summary { model, .. } | Command::Init { model, .. } => model,
        Command::Forward { model, .. } => model,
        Command::Inspect { .. } => unreachable!(),
    }
}

#[test]
fn test_defaults_come_from_app_config() {
    let cli = parse(&["summary"]);
    let Command::Summary { model, json } = cli.command else {
        panic!("ожидалась команда summary");
    };
    assert!(!json);

    let config = model.resolve(&ModelConfigSub::default()).unwrap();
    assert_eq!(config.depths, [2, 3, 2, 3]);
    assert_eq!(config.num_classes, 10);
    assert_eq!(config.cardinality, 32);
    assert_eq!(config.activation, ActivationKind::Elu);
}

#[test]
fn test_flags_override_app_config() {
    let cli = parse(&["summary", "--depths", "3,4,6,3", "--cardinality", "8", "--width-rule", "recomputed"]);
    let Command::Summary { model, .. } = cli.command else {
        panic!("ожидалась команда summary");
    };
    assert_eq!(model.width_rule, Some(WidthRuleArg::Recomputed));

    let config = model.resolve(&ModelConfigSub::default()).unwrap();
    assert_eq!(config.depths, [3, 4, 6, 3]);
    assert_eq!(config.cardinality, 8);
    assert_eq!(config.width_rule, WidthRule::Recomputed);
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = parse(&["inspect", "some/dir", "-vv", "-c", "app.toml"]);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.config, std::path::PathBuf::from("app.toml"));
}

#[test]
fn test_wrong_depth_count_is_rejected() {
    let model = ModelArgs {
        depths: Some(vec![1, 2, 3]),
        ..ModelArgs::default()
    };
    let err = model.resolve(&ModelConfigSub::default()).unwrap_err();
    assert!(err.to_string().contains("--depths"));
}

#[test]
fn test_unknown_activation_is_rejected() {
    let model = ModelArgs {
        activation: Some("softplus".to_string()),
        ..ModelArgs::default()
    };
    assert!(model.resolve(&ModelConfigSub::default()).is_err());
}

#[test]
fn test_model_dir_falls_back_to_config() {
    let app_config = AppConfig::default();
    assert_eq!(
        model_dir_or_default(None, &app_config),
        std::path::PathBuf::from("./.model_cache")
    );
}

#[test]
fn test_summary_lists_every_layer_and_channel_progression() {
    let config = small_model_args("summary")
        .resolve(&ModelConfigSub::default())
        .unwrap();
    let summary = commands::run_summary(&config, false).unwrap();

    assert!(summary.contains("Каналы: 8 -> 32 -> 64 -> 128 -> 256"), "{summary}");
    assert!(summary.contains("Блоков: 4"), "{summary}");
    assert!(summary.contains("groups=4"), "{summary}");
    assert!(summary.contains("Linear(256 -> 5, bias=true)"), "{summary}");
    // Каждая стадия меняет каналы, поэтому у всех четырех блоков есть проекция.
    assert_eq!(summary.matches("skip=downsample").count(), 4, "{summary}");
}

#[test]
fn test_summary_json_contains_plan_and_info() {
    let config = small_model_args("summary")
        .resolve(&ModelConfigSub::default())
        .unwrap();
    let json = commands::run_summary(&config, true).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["plan"]["classifier_in"], 256);
    assert_eq!(value["info"]["activation"], "relu");
}

#[tokio::test]
async fn test_forward_reports_logit_shape() {
    let config = small_model_args("forward")
        .resolve(&ModelConfigSub::default())
        .unwrap();
    let dims = commands::run_forward(&config, None, [2, 3, 32, 32]).await.unwrap();
    assert_eq!(dims, [2, 5]);
}

#[tokio::test]
async fn test_init_then_inspect_and_forward_from_checkpoint() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("resnext");
    let config = small_model_args("init")
        .resolve(&ModelConfigSub::default())
        .unwrap();

    let saved = commands::run_init(&config, &out).await.unwrap();
    assert!(saved.contains("config.json"), "{saved}");

    let inspected = commands::run_inspect(&out).await.unwrap();
    assert!(inspected.contains("Каналы: 8 -> 32 -> 64 -> 128 -> 256"), "{inspected}");
    assert!(inspected.contains("activation=relu"), "{inspected}");

    // Конфигурация из флагов игнорируется: сеть берется из чекпоинта.
    let other = ModelArgs::default().resolve(&ModelConfigSub::default()).unwrap();
    let dims = commands::run_forward(&other, Some(&out), [1, 3, 32, 32]).await.unwrap();
    assert_eq!(dims, [1, 5]);
}

#[test]
fn test_plan_only_summary_omits_parameter_count() {
    let config = small_model_args("summary")
        .resolve(&ModelConfigSub::default())
        .unwrap();
    let plan = config.plan().unwrap();
    let summary = commands::ModelSummary { plan: &plan, info: None }.to_string();

    assert!(summary.starts_with("Stem:\n  Conv2d(3 -> 8, kernel=7x7"), "{summary}");
    assert!(summary.contains("Stage 4 (stride=2, width=64, out=256):"), "{summary}");
    assert!(!summary.contains("Параметров"), "{summary}");
    assert_eq!(summary, commands::render_summary(&plan, None));
}
