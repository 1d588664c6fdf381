//! Bearing and elevation conventions.
//!
//! - Azimuth: degrees from north, clockwise (0=N, 90=E, 180=S, 270=W).
//! - Elevation: degrees above the horizontal plane (negative = below).
//! - Tilt: elevation of an antenna's boresight (negative = downtilt).

use crate::Point;

/// Horizontal distance below which the bearing is undefined [m].
pub const MIN_HORIZONTAL_DISTANCE: f64 = 1e-3;

/// Wraps an angle into `[0, 360)`.
pub fn wrap_360(angle_deg: f64) -> f64 {
    let a = angle_deg.rem_euclid(360.0);
    // rem_euclid may round up to exactly 360 for tiny negative inputs
    if a >= 360.0 { 0.0 } else { a }
}

/// Wraps an angle into `[-180, 180)`.
pub fn wrap_180(angle_deg: f64) -> f64 {
    wrap_360(angle_deg + 180.0) - 180.0
}

/// Bearing of the horizontal offset `(dx, dy)`, in `[0, 360)`.
///
/// `dx` points east, `dy` points north.
pub fn azimuth(dx: f64, dy: f64) -> f64 {
    wrap_360(dx.atan2(dy).to_degrees())
}

/// Elevation angle of a target at horizontal distance `horizontal` and height difference `dz`.
///
/// Targets (almost) straight above or below return +90 or -90.
/// A coincident target returns 0.
pub fn elevation(horizontal: f64, dz: f64) -> f64 {
    if horizontal < MIN_HORIZONTAL_DISTANCE {
        if dz > 0.0 {
            90.0
        } else if dz < 0.0 {
            -90.0
        } else {
            0.0
        }
    } else {
        dz.atan2(horizontal).to_degrees()
    }
}

/// Direction of `target` as seen from `origin`, relative to an antenna's orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativeDirection {
    /// Point bearing minus boresight azimuth, in `[-180, 180)`.
    pub azimuth_deg: f64,
    /// Point elevation minus tilt.
    pub elevation_deg: f64,
}

/// Bearing and elevation of `target` seen from `origin`, in absolute terms.
pub fn bearing_and_elevation(origin: Point, target: Point) -> (f64, f64) {
    let dx = target.x - origin.x;
    let dy = target.y - origin.y;
    let dz = target.z - origin.z;
    (azimuth(dx, dy), elevation(origin.horizontal_distance(&target), dz))
}

/// Relative direction of `target` for an antenna at `origin` with the given boresight and tilt.
pub fn relative_direction(
    origin: Point,
    target: Point,
    boresight_azimuth_deg: f64,
    tilt_deg: f64,
) -> RelativeDirection {
    let (bearing, elev) = bearing_and_elevation(origin, target);
    RelativeDirection {
        azimuth_deg: wrap_180(bearing - boresight_azimuth_deg),
        elevation_deg: elev - tilt_deg,
    }
}
