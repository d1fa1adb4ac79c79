//! Wiring shared by the binary and the integration tests: build the engine
//! and aggregator from config, run the offline subcommands, start services.

use crate::adapters::http::{HttpFrameEstimator, HttpSegmenter};
use crate::app::output::{render, write_output, OutputFormat};
use crate::config::toml_config::ServiceConfig;
use crate::core::aggregate::{fuse_reports, Aggregator};
use crate::core::engine::FrameEstimationEngine;
use crate::domain::model::{AggregateReport, FrameReport, SegmentationPayload};
use crate::domain::ports::{FrameEstimator, Segmenter};
use crate::server::{self, grams::GramsState, model::ModelState};
use crate::utils::error::{GramsError, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

pub fn build_engine(config: &ServiceConfig) -> Result<FrameEstimationEngine> {
    let densities = config.density_table()?;
    Ok(FrameEstimationEngine::new(
        Arc::new(config.estimator.clone()),
        Arc::new(densities),
    ))
}

/// Remote modeling service unless `local` is set or no estimation URL is
/// configured, in which case frames are estimated in-process.
pub fn build_aggregator(config: &ServiceConfig, local: bool) -> Result<Aggregator> {
    let timeout = config.upstream.timeout();

    // 分割服務一律走 HTTP
    let segmenter: Arc<dyn Segmenter> = Arc::new(HttpSegmenter::new(
        config.upstream.segmentation_url.clone(),
        timeout,
    )?);

    let estimator: Arc<dyn FrameEstimator> = match config.upstream.remote_estimation_url() {
        Some(url) if !local => {
            tracing::info!("Using remote modeling service at {}", url);
            Arc::new(HttpFrameEstimator::new(url, timeout)?)
        }
        _ => {
            tracing::info!("Estimating frames in-process");
            Arc::new(build_engine(config)?)
        }
    };

    Ok(Aggregator::new(
        segmenter,
        estimator,
        config.aggregate.max_images,
    ))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        GramsError::invalid_input(format!("{} is not valid JSON: {}", path.display(), e))
    })
}

pub fn estimate_file(config: &ServiceConfig, input: &Path) -> Result<FrameReport> {
    let payload: SegmentationPayload = read_json(input)?;
    build_engine(config)?.estimate_payload(&payload)
}

pub fn fuse_files<P: AsRef<Path>>(inputs: &[P]) -> Result<AggregateReport> {
    if inputs.is_empty() {
        return Err(GramsError::invalid_input("at least one report is required"));
    }
    // 讀取各張影像的報表
    let reports = inputs
        .iter()
        .map(|path| {
            let mut report = read_json::<FrameReport>(path.as_ref())?;
            report.drop_invalid_items();
            Ok(report)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(fuse_reports(&reports))
}

pub fn run_estimate(
    config: &ServiceConfig,
    input: &Path,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let report = estimate_file(config, input)?;
    tracing::info!(
        "Estimated {} item(s) from {}",
        report.results.len(),
        input.display()
    );
    write_output(&render(&report, format)?, output)
}

pub fn run_fuse<P: AsRef<Path>>(
    inputs: &[P],
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let report = fuse_files(inputs)?;
    tracing::info!(
        "Fused {} report(s) into {} item(s)",
        inputs.len(),
        report.results.len()
    );
    write_output(&render(&report, format)?, output)
}

pub async fn serve_model(config: &ServiceConfig) -> Result<()> {
    let state = ModelState {
        engine: Arc::new(build_engine(config)?),
    };
    let addr = server::socket_addr(&config.server.host, config.server.model_port)?;
    server::serve(server::model::router(state), addr).await
}

pub async fn serve_grams(config: &ServiceConfig, local: bool) -> Result<()> {
    let state = GramsState {
        aggregator: Arc::new(build_aggregator(config, local)?),
    };
    let addr = server::socket_addr(&config.server.host, config.server.grams_port)?;
    let app = server::grams::router(state, config.upload_limit_bytes());
    server::serve(app, addr).await
}
