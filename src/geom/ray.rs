//! Ray and segment casting against triangles.

use crate::{Point, Vector};

/// Determinant magnitude below which a ray is treated as parallel to a triangle.
const PARALLEL_EPS: f64 = 1e-12;

/// Möller–Trumbore ray/triangle intersection.
///
/// Returns the ray parameter `t` of the hit (distance along `dir` in units of
/// `dir`'s length), or `None` if the ray misses or runs parallel to the triangle.
/// Barycentric coordinates are accepted within `[-bary_tol, 1 + bary_tol]`, so
/// hits on shared edges are not lost between neighbouring triangles.
pub fn moller_trumbore(
    origin: Point,
    dir: Vector,
    p0: Point,
    p1: Point,
    p2: Point,
    bary_tol: f64,
) -> Option<f64> {
    let edge1 = p1 - p0;
    let edge2 = p2 - p0;
    let h = dir.cross(edge2);
    let a = edge1.dot(h);
    if a.abs() < PARALLEL_EPS * edge1.length() * edge2.length() * dir.length() {
        return None;
    }
    let f = 1.0 / a;
    let s = origin - p0;
    let u = f * s.dot(h);
    if u < -bary_tol || u > 1.0 + bary_tol {
        return None;
    }
    let q = s.cross(edge1);
    let v = f * dir.dot(q);
    if v < -bary_tol || u + v > 1.0 + bary_tol {
        return None;
    }
    Some(f * edge2.dot(q))
}

/// A finite straight path between two points.
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
    /// Unit direction from start to end.
    dir: Vector,
    length: f64,
}

impl Segment {
    /// Creates a segment. Returns `None` if both points coincide.
    pub fn new(start: Point, end: Point) -> Option<Self> {
        let v = end - start;
        let dir = v.normalize()?;
        Some(Self {
            start,
            end,
            dir,
            length: v.length(),
        })
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn direction(&self) -> Vector {
        self.dir
    }

    /// Point at distance `t` from the start.
    pub fn point_at(&self, t: f64) -> Point {
        self.start + self.dir * t
    }

    /// Distance from the start at which the segment crosses the triangle.
    ///
    /// Crossings closer than `end_tol` to either end are ignored, so that a
    /// point lying on a surface does not count that surface as an obstruction.
    pub fn intersect_triangle(&self, p0: Point, p1: Point, p2: Point, end_tol: f64) -> Option<f64> {
        let t = moller_trumbore(self.start, self.dir, p0, p1, p2, 0.0)?;
        if t > end_tol && t < self.length - end_tol {
            Some(t)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy_triangle(z: f64) -> (Point, Point, Point) {
        (
            Point::new(0.0, 0.0, z),
            Point::new(2.0, 0.0, z),
            Point::new(0.0, 2.0, z),
        )
    }

    #[test]
    fn test_moller_trumbore_hit() {
        let (p0, p1, p2) = xy_triangle(0.0);
        let t = moller_trumbore(
            Point::new(0.5, 0.5, -5.0),
            Vector::new(0.0, 0.0, 1.0),
            p0,
            p1,
            p2,
            0.0,
        );
        assert!((t.unwrap() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_moller_trumbore_miss_and_parallel() {
        let (p0, p1, p2) = xy_triangle(0.0);
        let miss = moller_trumbore(
            Point::new(1.5, 1.5, -5.0),
            Vector::new(0.0, 0.0, 1.0),
            p0,
            p1,
            p2,
            0.0,
        );
        assert!(miss.is_none());
        let parallel = moller_trumbore(
            Point::new(0.5, 0.5, 1.0),
            Vector::new(1.0, 0.0, 0.0),
            p0,
            p1,
            p2,
            0.0,
        );
        assert!(parallel.is_none());
    }

    #[test]
    fn test_segment_crossing() {
        let (p0, p1, p2) = xy_triangle(0.0);
        let seg = Segment::new(Point::new(0.5, 0.5, -1.0), Point::new(0.5, 0.5, 3.0)).unwrap();
        let t = seg.intersect_triangle(p0, p1, p2, 1e-6).unwrap();
        assert!((t - 1.0).abs() < 1e-12);
        assert!(seg.point_at(t).is_close(&Point::new(0.5, 0.5, 0.0)));
    }

    #[test]
    fn test_segment_stops_short() {
        let (p0, p1, p2) = xy_triangle(5.0);
        let seg = Segment::new(Point::new(0.5, 0.5, 0.0), Point::new(0.5, 0.5, 3.0)).unwrap();
        assert!(seg.intersect_triangle(p0, p1, p2, 1e-6).is_none());
        // Behind the start
        let seg = Segment::new(Point::new(0.5, 0.5, 6.0), Point::new(0.5, 0.5, 9.0)).unwrap();
        assert!(seg.intersect_triangle(p0, p1, p2, 1e-6).is_none());
    }

    #[test]
    fn test_segment_end_on_surface_is_grazing() {
        let (p0, p1, p2) = xy_triangle(0.0);
        let seg = Segment::new(Point::new(0.5, 0.5, 10.0), Point::new(0.5, 0.5, 0.0)).unwrap();
        assert!(seg.intersect_triangle(p0, p1, p2, 1e-3).is_none());
        let seg = Segment::new(Point::new(0.5, 0.5, 0.0), Point::new(0.5, 0.5, 10.0)).unwrap();
        assert!(seg.intersect_triangle(p0, p1, p2, 1e-3).is_none());
    }

    #[test]
    fn test_degenerate_segment() {
        let p = Point::new(1.0, 2.0, 3.0);
        assert!(Segment::new(p, p).is_none());
    }
}
