use crate::utils::error::{GramsError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};

/// Pixel coordinate inside a frame. Origin is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point2D {
    pub x: u32,
    pub y: u32,
}

impl Point2D {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentRole {
    ReferenceObject,
    FoodItem,
}

/// One labeled region of a frame, with its role resolved at ingestion.
///
/// The outline is kept as received (after clamping); it only becomes a
/// [`Polygon`](crate::domain::geometry::Polygon) once it passes validation in
/// the calibration or estimation step.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub label: String,
    pub role: SegmentRole,
    pub outline: Vec<Point2D>,
    pub confidence: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDims {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub segments: Vec<Segment>,
}

impl Frame {
    /// Builds a frame from the segmentation wire shape.
    ///
    /// Coordinates are truncated to integers and clamped into the frame;
    /// segments labeled `reference_label` become reference objects.
    pub fn from_payload(payload: &SegmentationPayload, reference_label: &str) -> Result<Self> {
        if payload.width == 0 || payload.height == 0 {
            return Err(GramsError::invalid_input(format!(
                "frame dimensions must be positive, got {}x{}",
                payload.width, payload.height
            )));
        }

        let segments = payload
            .segments
            .iter()
            .map(|item| {
                let role = if item.class_name == reference_label {
                    SegmentRole::ReferenceObject
                } else {
                    SegmentRole::FoodItem
                };
                let outline = item
                    .polygon
                    .iter()
                    .map(|[x, y]| {
                        Point2D::new(
                            to_pixel(*x, payload.width),
                            to_pixel(*y, payload.height),
                        )
                    })
                    .collect();

                Segment {
                    label: item.class_name.clone(),
                    role,
                    outline,
                    confidence: item.confidence.clamp(0.0, 1.0) as f32,
                }
            })
            .collect();

        Ok(Self {
            width: payload.width,
            height: payload.height,
            segments,
        })
    }

    pub fn dims(&self) -> FrameDims {
        FrameDims {
            width: self.width,
            height: self.height,
        }
    }

    /// First segment marked as the calibration reference, if any.
    pub fn reference(&self) -> Option<&Segment> {
        self.segments
            .iter()
            .find(|s| s.role == SegmentRole::ReferenceObject)
    }

    pub fn food_items(&self) -> impl Iterator<Item = &Segment> {
        self.segments
            .iter()
            .filter(|s| s.role == SegmentRole::FoodItem)
    }
}

fn to_pixel(value: f64, max: u32) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    value.trunc().clamp(0.0, max as f64) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationSource {
    Reference,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationResult {
    pub pixels_per_cm: f64,
    pub source: CalibrationSource,
}

// Wire shapes shared by the modeling and grams services.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationItem {
    pub class_name: String,
    pub polygon: Vec<[f64; 2]>,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn default_confidence() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationPayload {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub segments: Vec<SegmentationItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemEstimate {
    #[serde(default = "unknown_food")]
    pub food: String,
    #[serde(rename = "weight", default)]
    pub weight_g: f64,
    #[serde(default)]
    pub volume_cm3: f64,
    #[serde(default, deserialize_with = "calories_from_number")]
    pub calories: u64,
}

fn unknown_food() -> String {
    "unknown".to_string()
}

/// Accepts any JSON number; fractions are truncated and negatives floor at 0.
fn calories_from_number<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(value.trunc().max(0.0) as u64)
}

impl Validate for ItemEstimate {
    fn validate(&self) -> Result<()> {
        for (field, value) in [("weight", self.weight_g), ("volume_cm3", self.volume_cm3)] {
            if !value.is_finite() || value < 0.0 {
                return Err(GramsError::invalid_input(format!(
                    "{} for '{}' must be a non-negative number, got {}",
                    field, self.food, value
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    #[serde(default)]
    pub results: Vec<ItemEstimate>,
}

impl FrameReport {
    /// Drops items with negative or non-finite measurements, logging each one.
    /// Returns how many were dropped.
    pub fn drop_invalid_items(&mut self) -> usize {
        let before = self.results.len();
        self.results.retain(|item| match item.validate() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Skipping reported item: {}", e);
                false
            }
        });
        before - self.results.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateEntry {
    pub food: String,
    #[serde(rename = "weight")]
    pub weight_g: f64,
    pub volume_cm3: f64,
    pub calories: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub results: Vec<AggregateEntry>,
}

impl AggregateReport {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, food: &str) -> Option<&AggregateEntry> {
        self.results.iter().find(|e| e.food == food)
    }
}

/// Raw image submitted to the grams service.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Rounds to two decimal places, the precision used in every report.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> SegmentationPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_from_payload_resolves_roles_once() {
        let p = payload(json!({
            "width": 1000,
            "height": 800,
            "segments": [
                {"class_name": "plate", "polygon": [[0, 0], [500, 0], [500, 500]], "confidence": 0.9},
                {"class_name": "rice", "polygon": [[1, 1], [2, 2], [3, 1]]}
            ]
        }));

        let frame = Frame::from_payload(&p, "plate").unwrap();

        assert_eq!(frame.segments[0].role, SegmentRole::ReferenceObject);
        assert_eq!(frame.segments[1].role, SegmentRole::FoodItem);
        assert_eq!(frame.reference().unwrap().label, "plate");
        assert_eq!(frame.food_items().count(), 1);
        // missing confidence defaults to 1.0
        assert_eq!(frame.segments[1].confidence, 1.0);
    }

    #[test]
    fn test_confidence_is_clamped_into_unit_range() {
        let p = payload(json!({
            "width": 100,
            "height": 100,
            "segments": [
                {"class_name": "rice", "polygon": [[0, 0], [50, 0], [50, 50]], "confidence": 1.7},
                {"class_name": "bread", "polygon": [[0, 0], [20, 0], [20, 20]], "confidence": -0.2},
                {"class_name": "soup", "polygon": [[0, 0], [30, 0], [30, 30]], "confidence": 0.42}
            ]
        }));

        let frame = Frame::from_payload(&p, "plate").unwrap();
        assert_eq!(frame.segments[0].confidence, 1.0);
        assert_eq!(frame.segments[1].confidence, 0.0);
        assert!((frame.segments[2].confidence - 0.42).abs() < 1e-6);
    }

    #[test]
    fn test_item_calories_accept_any_json_number() {
        let report: FrameReport = serde_json::from_value(json!({"results": [
            {"food": "apple", "weight": 100.0, "volume_cm3": 125.0, "calories": 150.0},
            {"food": "pear", "weight": 50.0, "volume_cm3": 60.0, "calories": 74.9},
            {"food": "fig", "weight": 5.0, "volume_cm3": 6.0, "calories": -3}
        ]}))
        .unwrap();

        let calories: Vec<u64> = report.results.iter().map(|r| r.calories).collect();
        assert_eq!(calories, vec![150, 74, 0]);
    }

    #[test]
    fn test_drop_invalid_items_keeps_valid_ones() {
        let mut report: FrameReport = serde_json::from_value(json!({"results": [
            {"food": "apple", "weight": -100.0, "volume_cm3": -5.0, "calories": 0},
            {"food": "rice", "weight": 152.06, "volume_cm3": 138.24, "calories": 228},
            {"food": "bread", "weight": 12.0, "volume_cm3": -1.0, "calories": 18},
            {"food": "water", "weight": 0.0, "volume_cm3": 0.0, "calories": 0}
        ]}))
        .unwrap();

        assert_eq!(report.drop_invalid_items(), 2);
        let foods: Vec<&str> = report.results.iter().map(|r| r.food.as_str()).collect();
        assert_eq!(foods, vec!["rice", "water"]);
    }

    #[test]
    fn test_reference_label_is_case_sensitive() {
        let p = payload(json!({
            "width": 100,
            "height": 100,
            "segments": [{"class_name": "Plate", "polygon": [[0, 0], [50, 0], [50, 50]]}]
        }));

        let frame = Frame::from_payload(&p, "plate").unwrap();
        assert!(frame.reference().is_none());
    }

    #[test]
    fn test_from_payload_truncates_and_clamps_coordinates() {
        let p = payload(json!({
            "width": 100,
            "height": 50,
            "segments": [{"class_name": "rice", "polygon": [[-5.0, 10.7], [120.0, 60.0], [30.9, 20.2]]}]
        }));

        let frame = Frame::from_payload(&p, "plate").unwrap();
        assert_eq!(
            frame.segments[0].outline,
            vec![Point2D::new(0, 10), Point2D::new(100, 50), Point2D::new(30, 20)]
        );
    }

    #[test]
    fn test_from_payload_rejects_zero_dimensions() {
        let p = payload(json!({"width": 0, "height": 50, "segments": []}));
        let err = Frame::from_payload(&p, "plate").unwrap_err();
        assert!(matches!(err, GramsError::InvalidInput { .. }));
    }

    #[test]
    fn test_item_estimate_wire_names() {
        let item = ItemEstimate {
            food: "rice".to_string(),
            weight_g: 152.06,
            volume_cm3: 138.24,
            calories: 228,
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(
            value,
            json!({"food": "rice", "weight": 152.06, "volume_cm3": 138.24, "calories": 228})
        );
    }

    #[test]
    fn test_upstream_item_tolerates_missing_fields() {
        let report: FrameReport =
            serde_json::from_value(json!({"results": [{"weight": 12.5}]})).unwrap();
        assert_eq!(report.results[0].food, "unknown");
        assert_eq!(report.results[0].weight_g, 12.5);
        assert_eq!(report.results[0].calories, 0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(152.064), 152.06);
        assert_eq!(round2(110.0), 110.0);
        assert_eq!(round2(0.125), 0.13);
    }
}
