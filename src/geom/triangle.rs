use serde::{Deserialize, Serialize};

use crate::geom::ray::Segment;
use crate::{BuildingId, Point, Vector};

/// Relative area tolerance below which a triangle is degenerate.
///
/// Compared against `|e1 x e2| / max(|e1|², |e2|²)`, so it does not depend on
/// the size of the triangle or the magnitude of the projected coordinates.
const DEGENERATE_TOL: f64 = 1e-10;

/// Building surface facet used for occlusion tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Triangle {
    pub vertices: [Point; 3],
    /// Unit normal (counter-clockwise winding). `None` for degenerate facets.
    pub normal: Option<Vector>,
    /// Building this facet belongs to.
    pub building_id: BuildingId,
}

impl Triangle {
    /// Creates a triangle and precomputes its normal.
    ///
    /// Zero-area (collinear or repeated) vertices do not fail; the triangle is
    /// kept with `normal = None` and never reports an intersection.
    pub fn new(p0: Point, p1: Point, p2: Point, building_id: impl Into<BuildingId>) -> Self {
        let normal = if is_degenerate(p0, p1, p2) {
            None
        } else {
            Vector::normal(p0, p1, p2)
        };
        Self {
            vertices: [p0, p1, p2],
            normal,
            building_id: building_id.into(),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.normal.is_none()
    }

    /// Area of the triangle [m²].
    pub fn area(&self) -> f64 {
        let [p0, p1, p2] = self.vertices;
        0.5 * (p1 - p0).cross(p2 - p0).length()
    }

    /// Distance along `segment` at which it crosses this triangle, if any.
    pub fn intersect(&self, segment: &Segment, end_tol: f64) -> Option<f64> {
        if self.is_degenerate() {
            return None;
        }
        let [p0, p1, p2] = self.vertices;
        segment.intersect_triangle(p0, p1, p2, end_tol)
    }
}

fn is_degenerate(p0: Point, p1: Point, p2: Point) -> bool {
    let e1 = p1 - p0;
    let e2 = p2 - p0;
    let scale = e1.dot(e1).max(e2.dot(e2));
    if scale <= 0.0 || !scale.is_finite() {
        return true;
    }
    e1.cross(e2).length() <= DEGENERATE_TOL * scale
}
