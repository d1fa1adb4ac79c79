//! Multi-image grams service: 1..N photos in, one fused report out.

use crate::core::aggregate::Aggregator;
use crate::domain::model::{AggregateReport, ImageUpload};
use crate::server::health;
use crate::utils::error::GramsError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use std::sync::Arc;

const IMAGES_FIELD: &str = "images";

#[derive(Clone)]
pub struct GramsState {
    pub aggregator: Arc<Aggregator>,
}

async fn calculate(
    State(state): State<GramsState>,
    mut multipart: Multipart,
) -> Result<Json<AggregateReport>, GramsError> {
    let mut images = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| GramsError::invalid_input(format!("malformed multipart body: {}", e)))?
    {
        if field.name() != Some(IMAGES_FIELD) {
            tracing::debug!("Ignoring multipart field {:?}", field.name());
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("image-{}", images.len() + 1));
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| GramsError::invalid_input(format!("failed to read {}: {}", filename, e)))?;

        images.push(ImageUpload {
            filename,
            content_type,
            data: data.to_vec(),
        });
    }

    tracing::info!("Received {} image(s)", images.len());
    let report = state.aggregator.aggregate(images).await?;
    Ok(Json(report))
}

pub fn router(state: GramsState, upload_limit_bytes: usize) -> Router {
    Router::new()
        .route("/calculate", post(calculate))
        .layer(DefaultBodyLimit::max(upload_limit_bytes))
        .with_state(state)
        .merge(health::router())
}
