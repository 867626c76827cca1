// cli_app/src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use cli_app::{
    backend::backend_name,
    cli::{model_dir_or_default, Cli, Command},
    commands,
};
use tracing::{info, Level};
use utils_crate::{init_tracing_logger, parse_level, AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let app_config = AppConfig::load_from_toml(&cli.config)
        .with_context(|| format!("не удалось прочитать {}", cli.config.display()))?;

    let console_level = match cli.verbose {
        0 => parse_level(&app_config.logging_config.level)?,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let log_dir = app_config.logging_config.log_dir.as_deref().map(std::path::Path::new);
    init_tracing_logger("resnext-cli", console_level, Level::DEBUG, log_dir)?;
    info!(backend = backend_name(), "resnext-cli запущен");

    let defaults = &app_config.model_config;
    match cli.command {
        Command::Summary { model, json } => {
            let config = model.resolve(defaults)?;
            println!("{}", commands::run_summary(&config, json)?);
        }
        Command::Forward {
            model,
            input,
            model_dir,
        } => {
            let config = model.resolve(defaults)?;
            let shape = input.shape(&app_config, config.in_channels);
            let dims = commands::run_forward(&config, model_dir.as_deref(), shape).await?;
            println!("Логиты: {dims:?}");
        }
        Command::Init { model, out } => {
            let config = model.resolve(defaults)?;
            let out = model_dir_or_default(out.as_deref(), &app_config);
            println!("{}", commands::run_init(&config, &out).await?);
        }
        Command::Inspect { model_dir } => {
            let dir = model_dir_or_default(model_dir.as_deref(), &app_config);
            println!("{}", commands::run_inspect(&dir).await?);
        }
    }
    Ok(())
}
