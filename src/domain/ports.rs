use crate::domain::model::{FrameReport, ImageUpload, SegmentationPayload};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Turns one raw image into labeled polygons.
#[async_trait]
pub trait Segmenter: Send + Sync {
    async fn segment(&self, image: &ImageUpload) -> Result<SegmentationPayload>;
}

/// Turns one frame's segmentation into per-item estimates.
#[async_trait]
pub trait FrameEstimator: Send + Sync {
    async fn estimate(&self, payload: &SegmentationPayload) -> Result<FrameReport>;
}
