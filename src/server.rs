//! Process startup: load the model once, build the shared state, serve.

use anyhow::{Context, bail};
use std::sync::Arc;

use crate::config::{ModelVariant, ServiceConfig};
use crate::constants::LABELS_FILE;
use crate::logging;
use crate::pipeline::frames::FfmpegTranscoder;
use crate::pipeline::inference::{Model, TractModel};
use crate::pipeline::labels::Labels;
use crate::pipeline::{GeneralClassifier, NsfwClassifier, Pipeline};
use crate::routes::build_routes;
use crate::state::{AppState, Classifier};

/// Load the model (and labels) for `config`. Any failure here is fatal.
pub fn load_state(config: &ServiceConfig) -> anyhow::Result<AppState> {
    let model = TractModel::load(&config.model_spec())?;
    let output_len = model.output_len();
    let model: Arc<dyn Model> = Arc::new(model);
    let pipeline = Pipeline::new(model, config.variant.input());

    let classifier = match config.variant {
        ModelVariant::General => {
            let labels = Labels::load(&config.model_dir.join(LABELS_FILE))?;
            if let Some(n) = output_len {
                if n != labels.len() {
                    bail!(
                        "{} has {} labels but the model produces {} values",
                        LABELS_FILE,
                        labels.len(),
                        n
                    );
                }
            }
            log::info!("[startup] Loaded {} labels", labels.len());
            Classifier::General(Arc::new(GeneralClassifier::new(pipeline, labels)))
        }
        ModelVariant::Nsfw => Classifier::Nsfw(Arc::new(NsfwClassifier::new(pipeline))),
    };

    std::fs::create_dir_all(&config.work_dir)
        .with_context(|| format!("creating work dir {:?}", config.work_dir))?;

    Ok(AppState {
        classifier,
        transcoder: Arc::new(FfmpegTranscoder::new(
            config.ffmpeg_bin.clone(),
            config.ffmpeg_threads,
        )),
        work_dir: config.work_dir.clone(),
    })
}

pub async fn run(variant: ModelVariant) -> anyhow::Result<()> {
    logging::init().context("installing logger")?;

    let config = ServiceConfig::from_env(variant);
    log::info!(
        "[startup] Serving {} model from {:?}",
        variant.name(),
        config.model_dir
    );

    let state = load_state(&config).inspect_err(|e| log::error!("[startup] {:#}", e))?;
    let app = build_routes(Arc::new(state), config.max_upload_bytes);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    log::info!("[startup] Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
