use crate::domain::model::Point2D;
use crate::utils::error::{GramsError, Result};

/// Axis-aligned bounding box in pixel coordinates (inclusive extents).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl BoundingBox {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y
    }
}

/// Closed ring of at least three vertices with non-zero area.
///
/// Consecutive duplicates (including a closing vertex equal to the first)
/// are removed on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Point2D>,
}

impl Polygon {
    pub fn new(points: &[Point2D]) -> Result<Self> {
        let mut vertices: Vec<Point2D> = Vec::with_capacity(points.len());
        for point in points {
            if vertices.last() != Some(point) {
                vertices.push(*point);
            }
        }
        while vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }

        if vertices.len() < 3 {
            return Err(GramsError::InvalidPolygon {
                reason: format!(
                    "need at least 3 distinct vertices, got {}",
                    vertices.len()
                ),
            });
        }

        let polygon = Self { vertices };
        if polygon.signed_area() == 0.0 {
            return Err(GramsError::InvalidPolygon {
                reason: "polygon has zero area".to_string(),
            });
        }
        Ok(polygon)
    }

    pub fn vertices(&self) -> &[Point2D] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Shoelace sum in pixel² units. Positive when the ring is counter-clockwise
    /// in a y-up frame (clockwise on screen).
    pub fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        let mut twice_area = 0.0;
        for i in 0..n {
            let p = self.vertices[i];
            let q = self.vertices[(i + 1) % n];
            twice_area += p.x as f64 * q.y as f64 - q.x as f64 * p.y as f64;
        }
        twice_area / 2.0
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let first = self.vertices[0];
        self.vertices.iter().skip(1).fold(
            BoundingBox {
                min_x: first.x,
                min_y: first.y,
                max_x: first.x,
                max_y: first.y,
            },
            |bbox, p| BoundingBox {
                min_x: bbox.min_x.min(p.x),
                min_y: bbox.min_y.min(p.y),
                max_x: bbox.max_x.max(p.x),
                max_y: bbox.max_y.max(p.y),
            },
        )
    }
}
