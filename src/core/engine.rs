use crate::config::estimator::EstimatorConfig;
use crate::core::calibration::calibrate;
use crate::core::density::DensityTable;
use crate::core::estimator::{Estimation, VolumetricEstimator};
use crate::domain::model::{Frame, FrameReport, SegmentationPayload};
use crate::domain::ports::FrameEstimator;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Runs calibration and volumetric estimation over a whole frame.
#[derive(Debug, Clone)]
pub struct FrameEstimationEngine {
    estimator: VolumetricEstimator,
}

impl FrameEstimationEngine {
    pub fn new(config: Arc<EstimatorConfig>, densities: Arc<DensityTable>) -> Self {
        Self {
            estimator: VolumetricEstimator::new(config, densities),
        }
    }

    pub fn estimate_frame(&self, frame: &Frame) -> FrameReport {
        let config = self.estimator.config();
        // 每張影像只校準一次
        let calibration = calibrate(frame, config);
        let dims = frame.dims();

        let mut results = Vec::new();
        for (index, segment) in frame.food_items().enumerate() {
            match self.estimator.estimate(segment, dims, &calibration) {
                Estimation::Measured(item) => {
                    tracing::debug!(
                        "Segment {} '{}': {:.2} cm³, {:.2} g",
                        index,
                        item.food,
                        item.volume_cm3,
                        item.weight_g
                    );
                    results.push(item);
                }
                Estimation::Skipped(reason) => {
                    tracing::warn!("Skipping segment {} '{}': {}", index, segment.label, reason);
                }
            }
        }

        tracing::info!(
            "Estimated {} item(s) from {} segment(s) ({:?} calibration)",
            results.len(),
            frame.segments.len(),
            calibration.source
        );
        FrameReport { results }
    }

    /// Ingests the segmentation wire shape and estimates it.
    pub fn estimate_payload(&self, payload: &SegmentationPayload) -> Result<FrameReport> {
        let frame = Frame::from_payload(payload, &self.estimator.config().reference_label)?;
        Ok(self.estimate_frame(&frame))
    }
}

#[async_trait]
impl FrameEstimator for FrameEstimationEngine {
    async fn estimate(&self, payload: &SegmentationPayload) -> Result<FrameReport> {
        self.estimate_payload(payload)
    }
}
