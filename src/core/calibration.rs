use crate::config::estimator::{DiameterMethod, EstimatorConfig};
use crate::domain::geometry::Polygon;
use crate::domain::model::{CalibrationResult, CalibrationSource, Frame, Segment};
use crate::utils::error::{GramsError, Result};
use std::f64::consts::PI;

impl DiameterMethod {
    pub fn pixel_diameter(&self, polygon: &Polygon) -> f64 {
        match self {
            DiameterMethod::BoundingExtent => {
                let bbox = polygon.bounding_box();
                bbox.width().max(bbox.height()) as f64
            }
            DiameterMethod::AreaEquivalent => 2.0 * (polygon.area() / PI).sqrt(),
        }
    }
}

/// Derives the pixel-to-centimeter scale for one frame.
///
/// Uses the first reference segment only. Never fails: a missing or unusable
/// reference yields a width-based fallback scale.
pub fn calibrate(frame: &Frame, config: &EstimatorConfig) -> CalibrationResult {
    let Some(reference) = frame.reference() else {
        tracing::info!(
            "No '{}' found in frame, using fallback scale",
            config.reference_label
        );
        return fallback(frame, config);
    };

    match reference_scale(reference, config) {
        Ok(pixels_per_cm) => {
            tracing::debug!("Calibrated from reference: {:.4} px/cm", pixels_per_cm);
            CalibrationResult {
                pixels_per_cm,
                source: CalibrationSource::Reference,
            }
        }
        Err(e) => {
            tracing::info!("Reference unusable ({}), using fallback scale", e);
            fallback(frame, config)
        }
    }
}

fn reference_scale(reference: &Segment, config: &EstimatorConfig) -> Result<f64> {
    let polygon = Polygon::new(&reference.outline)?;
    let pixels_per_cm =
        config.diameter_method.pixel_diameter(&polygon) / config.reference_diameter_cm;

    if !pixels_per_cm.is_finite() || pixels_per_cm <= 0.0 {
        return Err(GramsError::InvalidPolygon {
            reason: format!("reference yields scale {}", pixels_per_cm),
        });
    }
    Ok(pixels_per_cm)
}

fn fallback(frame: &Frame, config: &EstimatorConfig) -> CalibrationResult {
    CalibrationResult {
        pixels_per_cm: frame.width as f64 * config.fallback_scale_ratio
            / config.reference_diameter_cm,
        source: CalibrationSource::Fallback,
    }
}
