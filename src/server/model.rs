//! Single-frame modeling service: segmentation in, per-item estimates out.

use crate::core::engine::FrameEstimationEngine;
use crate::domain::model::{FrameReport, SegmentationPayload};
use crate::server::health;
use crate::utils::error::GramsError;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use std::sync::Arc;

#[derive(Clone)]
pub struct ModelState {
    pub engine: Arc<FrameEstimationEngine>,
}

async fn create_model(
    State(state): State<ModelState>,
    Json(payload): Json<SegmentationPayload>,
) -> Result<Json<FrameReport>, GramsError> {
    tracing::debug!(
        "Modeling {}x{} frame with {} segment(s)",
        payload.width,
        payload.height,
        payload.segments.len()
    );
    let report = state.engine.estimate_payload(&payload)?;
    Ok(Json(report))
}

pub fn router(state: ModelState) -> Router {
    Router::new()
        .route("/model", post(create_model))
        .with_state(state)
        .merge(health::router())
}
