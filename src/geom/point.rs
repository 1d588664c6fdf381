use crate::Vector;
use crate::geom::EPS;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Position in a planar projected coordinate system.
///
/// `x` is the easting, `y` the northing and `z` the height, all in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns true if both points are very close to each other.
    pub fn is_close(&self, other: &Self) -> bool {
        (self.x - other.x).abs() < EPS
            && (self.y - other.y).abs() < EPS
            && (self.z - other.z).abs() < EPS
    }

    /// Euclidean distance in 3D.
    pub fn distance(&self, other: &Self) -> f64 {
        (*other - *self).length()
    }

    /// Distance measured in the horizontal (easting/northing) plane only.
    pub fn horizontal_distance(&self, other: &Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Returns a copy shifted vertically by `dz` metres.
    pub fn raised(&self, dz: f64) -> Self {
        Self::new(self.x, self.y, self.z + dz)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add<Vector> for Point {
    type Output = Point;
    fn add(self, other: Vector) -> Self {
        Self {
            x: self.x + other.dx,
            y: self.y + other.dy,
            z: self.z + other.dz,
        }
    }
}

/// `end - beg` gives the vector pointing from `beg` to `end`.
impl Sub for Point {
    type Output = Vector;
    fn sub(self, other: Self) -> Vector {
        Vector::from_points(other, self)
    }
}
