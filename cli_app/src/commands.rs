//! Исполнение подкоманд.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use burn::tensor::{Distribution, Tensor};
use core_burn::{ModelInfo, NetworkPlan, ResNeXt, ResNeXtConfig};
use model_loader::ModelLoader;
use tracing::{debug, info};

use crate::backend::{default_device, SelectedBackend};

/// Текстовая сводка плана: все слои по порядку и прогрессия каналов.
pub struct ModelSummary<'a> {
    /// План сети.
    pub plan: &'a NetworkPlan,
    /// Сводка построенной модели; без нее не печатается число параметров.
    pub info: Option<&'a ModelInfo>,
}

impl fmt::Display for ModelSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plan = self.plan;

        // Stem: свертка, нормализация, пулинг.
        writeln!(f, "Stem:")?;
        for spec in plan.stem_specs() {
            writeln!(f, "  {spec}")?;
        }

        for stage in &plan.stages {
            writeln!(
                f,
                "Stage {} (stride={}, width={}, out={}):",
                stage.index,
                stage.stride,
                stage.width,
                stage.out_channels()
            )?;
            for (i, block) in stage.blocks.iter().enumerate() {
                let skip = if block.downsample { "downsample" } else { "identity" };
                writeln!(
                    f,
                    "  Block {} ({} -> {}, skip={skip}):",
                    i + 1,
                    block.inplanes,
                    block.out_channels()
                )?;
                for spec in block.layer_specs() {
                    writeln!(f, "    {spec}")?;
                }
            }
        }

        writeln!(f, "Head:")?;
        for spec in plan.head_specs() {
            writeln!(f, "  {spec}")?;
        }

        // Прогрессия начинается с выхода stem.
        let progression = std::iter::once(plan.stem_channels)
            .chain(plan.stage_out_channels())
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" -> ");
        writeln!(f, "Каналы: {progression}")?;
        writeln!(f, "Блоков: {}", plan.num_blocks())?;
        if let Some(info) = self.info {
            writeln!(
                f,
                "Параметров: {} (cardinality={}, activation={})",
                info.num_params, info.cardinality, info.activation
            )?;
        }
        Ok(())
    }
}

/// Сводка плана в виде строки.
pub fn render_summary(plan: &NetworkPlan, info: Option<&ModelInfo>) -> String {
    ModelSummary { plan, info }.to_string()
}

/// `summary`: строит сеть и возвращает ее сводку.
///
/// # Errors
/// Ошибка построения сети.
pub fn run_summary(config: &ResNeXtConfig, json: bool) -> Result<String> {
    let model: ResNeXt<SelectedBackend> = config
        .init(&default_device())
        .context("не удалось построить сеть")?;
    if json {
        let value = serde_json::json!({
            "plan": model.plan(),
            "info": model.info(),
        });
        return serde_json::to_string_pretty(&value).context("не удалось сериализовать план");
    }
    Ok(render_summary(model.plan(), Some(&model.info())))
}

/// `forward`: прогоняет случайный батч формы `shape` и возвращает форму логитов.
///
/// Модель загружается из `model_dir`, если он задан, иначе строится по `config`.
///
/// # Errors
/// Ошибка загрузки или построения модели, несовместимая форма входа.
pub async fn run_forward(
    config: &ResNeXtConfig,
    model_dir: Option<&Path>,
    shape: [usize; 4],
) -> Result<[usize; 2]> {
    let device = default_device();
    let model: ResNeXt<SelectedBackend> = match model_dir {
        Some(dir) => ModelLoader::load_model(dir, &device)
            .await
            .with_context(|| format!("не удалось загрузить модель из {}", dir.display()))?,
        None => config.init(&device).context("не удалось построить сеть")?,
    };

    // Число каналов всегда берется из сети.
    let shape = [shape[0], model.plan().in_channels, shape[2], shape[3]];
    debug!(?shape, "Случайный вход");
    let input = Tensor::<SelectedBackend, 4>::random(shape, Distribution::Default, &device);
    let logits = model.forward(input).context("прямой проход завершился ошибкой")?;
    let dims = logits.dims();
    info!(?dims, "Прямой проход выполнен");
    Ok(dims)
}

/// `init`: сохраняет свежеинициализированную сеть в `out`.
///
/// # Errors
/// Ошибка построения сети или записи чекпоинта.
pub async fn run_init(config: &ResNeXtConfig, out: &Path) -> Result<String> {
    let model: ResNeXt<SelectedBackend> = config
        .init(&default_device())
        .context("не удалось построить сеть")?;
    let files = ModelLoader::save_model(&model, out)
        .await
        .with_context(|| format!("не удалось сохранить модель в {}", out.display()))?;
    Ok(format!(
        "Сохранено: {} и {} ({} параметров)",
        files.config_path.display(),
        files.weights_path.display(),
        model.info().num_params
    ))
}

/// `inspect`: загружает чекпоинт и возвращает сводку.
///
/// # Errors
/// Ошибка загрузки чекпоинта.
pub async fn run_inspect(model_dir: &Path) -> Result<String> {
    let model: ResNeXt<SelectedBackend> = ModelLoader::load_model(model_dir, &default_device())
        .await
        .with_context(|| format!("не удалось загрузить модель из {}", model_dir.display()))?;
    Ok(render_summary(model.plan(), Some(&model.info())))
}
