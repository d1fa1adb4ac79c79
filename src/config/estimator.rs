use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_finite, validate_range, Validate,
};
use serde::{Deserialize, Serialize};

/// How the reference polygon's diameter is measured in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiameterMethod {
    /// Longer side of the bounding box. A round plate seen at an angle keeps
    /// its true diameter along the major axis.
    #[default]
    BoundingExtent,
    /// Diameter of the circle with the same area as the polygon.
    AreaEquivalent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeMethod {
    /// Closed-form `area * height`.
    #[default]
    Prism,
    /// Divergence-theorem integration over a triangulated extrusion.
    Mesh,
}

/// Heuristic constants of the volumetric pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    pub reference_label: String,
    pub reference_diameter_cm: f64,
    pub fallback_scale_ratio: f64,
    pub food_height_cm: f64,
    pub calorie_factor: f64,
    pub diameter_method: DiameterMethod,
    pub volume_method: VolumeMethod,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            reference_label: "plate".to_string(),
            reference_diameter_cm: 24.0,
            fallback_scale_ratio: 0.7,
            food_height_cm: 3.0,
            calorie_factor: 1.5,
            diameter_method: DiameterMethod::default(),
            volume_method: VolumeMethod::default(),
        }
    }
}

impl Validate for EstimatorConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("estimator.reference_label", &self.reference_label)?;
        validate_positive_finite(
            "estimator.reference_diameter_cm",
            self.reference_diameter_cm,
        )?;
        validate_positive_finite("estimator.fallback_scale_ratio", self.fallback_scale_ratio)?;
        validate_range(
            "estimator.fallback_scale_ratio",
            self.fallback_scale_ratio,
            0.0,
            1.0,
        )?;
        validate_positive_finite("estimator.food_height_cm", self.food_height_cm)?;
        validate_positive_finite("estimator.calorie_factor", self.calorie_factor)?;
        Ok(())
    }
}
