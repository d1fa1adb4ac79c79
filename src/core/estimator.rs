use crate::config::estimator::EstimatorConfig;
use crate::core::density::DensityTable;
use crate::core::volume::extruded_volume;
use crate::domain::geometry::Polygon;
use crate::domain::model::{
    round2, CalibrationResult, FrameDims, ItemEstimate, Segment, SegmentRole,
};
use crate::utils::error::GramsError;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    ReferenceObject,
    InvalidPolygon(String),
    NonFinite(&'static str),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ReferenceObject => write!(f, "segment is the calibration reference"),
            SkipReason::InvalidPolygon(reason) => write!(f, "invalid polygon: {}", reason),
            SkipReason::NonFinite(quantity) => write!(f, "non-finite {}", quantity),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Estimation {
    Measured(ItemEstimate),
    Skipped(SkipReason),
}

/// Converts one food segment into volume, weight and calories.
#[derive(Debug, Clone)]
pub struct VolumetricEstimator {
    config: Arc<EstimatorConfig>,
    densities: Arc<DensityTable>,
}

impl VolumetricEstimator {
    pub fn new(config: Arc<EstimatorConfig>, densities: Arc<DensityTable>) -> Self {
        Self { config, densities }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Never fails: anything that cannot be measured comes back as
    /// [`Estimation::Skipped`].
    pub fn estimate(
        &self,
        segment: &Segment,
        dims: FrameDims,
        calibration: &CalibrationResult,
    ) -> Estimation {
        if segment.role == SegmentRole::ReferenceObject {
            return Estimation::Skipped(SkipReason::ReferenceObject);
        }

        let polygon = match Polygon::new(&segment.outline) {
            Ok(polygon) => polygon,
            Err(e) => {
                let reason = match e {
                    GramsError::InvalidPolygon { reason } => reason,
                    other => other.to_string(),
                };
                return Estimation::Skipped(SkipReason::InvalidPolygon(reason));
            }
        };

        let density = self.densities.density_for(&segment.label);
        // No depth signal in a 2D mask: every item gets the same height.
        let height_cm = self.config.food_height_cm;

        let volume_cm3 = extruded_volume(
            &polygon,
            dims,
            calibration.pixels_per_cm,
            height_cm,
            self.config.volume_method,
        );
        if !volume_cm3.is_finite() || volume_cm3 < 0.0 {
            return Estimation::Skipped(SkipReason::NonFinite("volume"));
        }

        let weight_g = volume_cm3 * density;
        let calories = (weight_g * self.config.calorie_factor).floor();
        if !weight_g.is_finite() || !calories.is_finite() || calories > u64::MAX as f64 {
            return Estimation::Skipped(SkipReason::NonFinite("weight"));
        }

        Estimation::Measured(ItemEstimate {
            food: segment.label.clone(),
            weight_g: round2(weight_g),
            volume_cm3: round2(volume_cm3),
            calories: calories as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::estimator::VolumeMethod;
    use crate::domain::model::{CalibrationSource, Point2D};
    use std::collections::HashMap;

    const DIMS: FrameDims = FrameDims {
        width: 1000,
        height: 800,
    };

    fn estimator(config: EstimatorConfig) -> VolumetricEstimator {
        let densities: HashMap<String, f64> =
            [("rice".to_string(), 1.1), ("default".to_string(), 1.0)]
                .into_iter()
                .collect();
        VolumetricEstimator::new(
            Arc::new(config),
            Arc::new(DensityTable::new(densities).unwrap()),
        )
    }

    fn food(label: &str, coords: &[(u32, u32)]) -> Segment {
        Segment {
            label: label.to_string(),
            role: SegmentRole::FoodItem,
            outline: coords.iter().map(|&(x, y)| Point2D::new(x, y)).collect(),
            confidence: 0.8,
        }
    }

    fn reference_scale(pixels_per_cm: f64) -> CalibrationResult {
        CalibrationResult {
            pixels_per_cm,
            source: CalibrationSource::Reference,
        }
    }

    fn measured(estimation: Estimation) -> ItemEstimate {
        match estimation {
            Estimation::Measured(item) => item,
            Estimation::Skipped(reason) => panic!("unexpected skip: {}", reason),
        }
    }

    #[test]
    fn test_rice_triangle_on_500px_plate() {
        let rice = food("rice", &[(100, 100), (300, 100), (200, 300)]);
        let item = measured(estimator(EstimatorConfig::default()).estimate(
            &rice,
            DIMS,
            &reference_scale(500.0 / 24.0),
        ));

        // 20000 px² / (500/24)² = 46.08 cm², * 3 cm = 138.24 cm³, * 1.1 g/cm³
        assert_eq!(item.food, "rice");
        assert!((item.volume_cm3 - 138.24).abs() < 1e-9);
        assert!((item.weight_g - 152.06).abs() < 1e-9);
        assert_eq!(item.calories, 228);
    }

    #[test]
    fn test_unknown_label_uses_default_density() {
        let soup = food("borscht", &[(0, 0), (100, 0), (100, 100), (0, 100)]);
        let item = measured(estimator(EstimatorConfig::default()).estimate(
            &soup,
            DIMS,
            &reference_scale(10.0),
        ));
        assert!((item.volume_cm3 - 300.0).abs() < 1e-9);
        assert!((item.weight_g - 300.0).abs() < 1e-9);
        assert_eq!(item.calories, 450);
    }

    #[test]
    fn test_mesh_and_prism_agree() {
        let rice = food("rice", &[(100, 100), (300, 100), (200, 300)]);
        let prism = estimator(EstimatorConfig::default());
        let mesh = estimator(EstimatorConfig {
            volume_method: VolumeMethod::Mesh,
            ..EstimatorConfig::default()
        });
        let calibration = reference_scale(500.0 / 24.0);

        assert_eq!(
            measured(prism.estimate(&rice, DIMS, &calibration)),
            measured(mesh.estimate(&rice, DIMS, &calibration))
        );
    }

    #[test]
    fn test_fewer_than_three_vertices_is_skipped() {
        let sliver = food("rice", &[(0, 0), (10, 10)]);
        let result = estimator(EstimatorConfig::default()).estimate(
            &sliver,
            DIMS,
            &reference_scale(10.0),
        );
        assert!(matches!(
            result,
            Estimation::Skipped(SkipReason::InvalidPolygon(_))
        ));
    }

    #[test]
    fn test_reference_segment_is_skipped() {
        let mut plate = food("plate", &[(0, 0), (100, 0), (100, 100)]);
        plate.role = SegmentRole::ReferenceObject;
        let result =
            estimator(EstimatorConfig::default()).estimate(&plate, DIMS, &reference_scale(10.0));
        assert_eq!(result, Estimation::Skipped(SkipReason::ReferenceObject));
    }

    #[test]
    fn test_non_finite_scale_is_skipped() {
        let rice = food("rice", &[(0, 0), (100, 0), (100, 100)]);
        let result =
            estimator(EstimatorConfig::default()).estimate(&rice, DIMS, &reference_scale(1e-200));
        assert!(matches!(result, Estimation::Skipped(SkipReason::NonFinite(_))));
    }

    #[test]
    fn test_real_volume_unchanged_when_image_resolution_doubles() {
        let small = food("rice", &[(10, 10), (110, 10), (110, 110), (10, 110)]);
        let large = food("rice", &[(20, 20), (220, 20), (220, 220), (20, 220)]);
        let est = estimator(EstimatorConfig::default());

        let a = measured(est.estimate(&small, DIMS, &reference_scale(10.0)));
        let b = measured(est.estimate(&large, DIMS, &reference_scale(20.0)));
        assert_eq!(a, b);
    }
}
