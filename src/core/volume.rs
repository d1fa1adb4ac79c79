use crate::config::estimator::VolumeMethod;
use crate::domain::geometry::Polygon;
use crate::domain::model::FrameDims;

/// Volume in cm³ of `polygon` (pixel space) extruded upward by `height_cm`.
pub fn extruded_volume(
    polygon: &Polygon,
    dims: FrameDims,
    pixels_per_cm: f64,
    height_cm: f64,
    method: VolumeMethod,
) -> f64 {
    match method {
        VolumeMethod::Prism => {
            let area_cm2 = polygon.area() / (pixels_per_cm * pixels_per_cm);
            area_cm2 * height_cm
        }
        VolumeMethod::Mesh => TriangleMesh::extrude(polygon, dims, pixels_per_cm, height_cm).volume(),
    }
}

/// Closed triangle surface in centimeters, z pointing up from the plate.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleMesh {
    pub vertices: Vec<[f64; 3]>,
    pub triangles: Vec<[usize; 3]>,
}

impl TriangleMesh {
    /// Builds a right prism over `polygon`: bottom cap at z = 0, top cap at
    /// z = `height_cm`, two triangles per side wall.
    ///
    /// Image rows grow downward, so y is flipped against the frame height
    /// before scaling. Caps are fan-triangulated from the first vertex; with
    /// signed tetrahedra this stays exact for concave rings.
    pub fn extrude(polygon: &Polygon, dims: FrameDims, pixels_per_cm: f64, height_cm: f64) -> Self {
        let mut footprint: Vec<[f64; 2]> = polygon
            .vertices()
            .iter()
            .map(|p| {
                [
                    p.x as f64 / pixels_per_cm,
                    (dims.height as f64 - p.y as f64) / pixels_per_cm,
                ]
            })
            .collect();

        if ring_signed_area(&footprint) < 0.0 {
            footprint.reverse();
        }

        let n = footprint.len();
        let mut vertices = Vec::with_capacity(2 * n);
        vertices.extend(footprint.iter().map(|&[x, y]| [x, y, 0.0]));
        vertices.extend(footprint.iter().map(|&[x, y]| [x, y, height_cm]));

        let mut triangles = Vec::with_capacity(4 * n - 4);
        for i in 1..n - 1 {
            triangles.push([0, i + 1, i]);
            triangles.push([n, n + i, n + i + 1]);
        }
        for i in 0..n {
            let j = (i + 1) % n;
            triangles.push([i, j, n + j]);
            triangles.push([i, n + j, n + i]);
        }

        Self {
            vertices,
            triangles,
        }
    }

    /// Enclosed volume by the divergence theorem (sum of signed tetrahedra
    /// against the origin). Requires consistent outward winding.
    pub fn volume(&self) -> f64 {
        let sum: f64 = self
            .triangles
            .iter()
            .map(|&[a, b, c]| {
                let (v0, v1, v2) = (self.vertices[a], self.vertices[b], self.vertices[c]);
                v0[0] * (v1[1] * v2[2] - v1[2] * v2[1]) - v0[1] * (v1[0] * v2[2] - v1[2] * v2[0])
                    + v0[2] * (v1[0] * v2[1] - v1[1] * v2[0])
            })
            .sum();
        sum / 6.0
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

fn ring_signed_area(ring: &[[f64; 2]]) -> f64 {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let [x0, y0] = ring[i];
            let [x1, y1] = ring[(i + 1) % n];
            x0 * y1 - x1 * y0
        })
        .sum::<f64>()
        / 2.0
}
