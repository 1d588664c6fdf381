//! Error types for exposure setup.

use thiserror::Error;

use crate::TransmitterId;

/// Invalid input detected while setting up an exposure run.
///
/// All of these abort the run before any point is processed. Per-point
/// numerical edge cases are never reported through this type.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExposureError {
    /// Radiated power must be a finite, strictly positive number of watts.
    #[error("transmitter {id}: radiated power must be > 0 W, got {erp_watts}")]
    InvalidPower { id: TransmitterId, erp_watts: f64 },

    /// Tilt range with `min > max`.
    #[error("transmitter {id}: invalid tilt range [{min}, {max}]")]
    InvalidTiltRange { id: TransmitterId, min: f64, max: f64 },

    /// Tilt range too wide for the configured step.
    #[error("transmitter {id}: tilt range of {span_deg}° at step {step_deg}° exceeds {max} candidates")]
    TiltGridTooFine {
        id: TransmitterId,
        span_deg: f64,
        step_deg: f64,
        max: usize,
    },

    /// Position, azimuth or tilt is NaN or infinite.
    #[error("transmitter {id}: non-finite {field}")]
    NonFiniteTransmitter { id: TransmitterId, field: &'static str },

    /// A pattern curve needs at least two samples to interpolate.
    #[error("pattern curve needs at least 2 samples, got {count}")]
    TooFewSamples { count: usize },

    /// Two samples share the same angle.
    #[error("pattern curve has duplicate angle {angle_deg}°")]
    DuplicateAngle { angle_deg: f64 },

    /// Vertical samples must lie within [-90, 90].
    #[error("pattern sample angle {angle_deg}° outside [{min}, {max}]")]
    AngleOutOfRange { angle_deg: f64, min: f64, max: f64 },

    /// Angle or attenuation is NaN or infinite.
    #[error("pattern curve contains a non-finite sample")]
    NonFiniteSample,

    /// Sector pattern beamwidth must be in (0, 360], caps must be >= 0.
    #[error("invalid sector pattern: {message}")]
    InvalidSectorPattern { message: String },

    /// Configuration value outside its admissible range.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl ExposureError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub fn invalid_sector(message: impl Into<String>) -> Self {
        Self::InvalidSectorPattern {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExposureError>;
