use serde::{Deserialize, Serialize};

use crate::error::{ExposureError, Result};
use crate::sim::pattern::sector::SectorPattern;

/// Regulatory installation limit for mobile networks [V/m].
pub const DEFAULT_THRESHOLD_VM: f64 = 5.0;

/// `K` in `E = sqrt(K * ERP) / d` for an ideal half-wave dipole reference.
pub const FIELD_CONSTANT_DIPOLE: f64 = 30.0;

/// `K` used in Swiss ordinance site data sheets.
pub const FIELD_CONSTANT_SWISS_PRACTICE: f64 = 49.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExposureConfig {
    /// Distances below this floor are clamped to it [m].
    pub min_distance_m: f64,
    /// Free-space field constant `K`.
    pub field_constant: f64,
    /// A point exceeds when its total field is at or above this value [V/m].
    pub threshold_vm: f64,

    // Line of sight
    /// If `true`, buildings between transmitter and point attenuate the field.
    pub check_line_of_sight: bool,
    /// Attenuation per obstructing building [dB].
    pub occlusion_penalty_db: f64,
    /// Added to the transmitter height for the line-of-sight test only [m].
    pub mast_height_offset_m: f64,
    /// Surface crossings this close to either end of a path are ignored [m].
    pub endpoint_tolerance_m: f64,

    // Tilt search
    /// Grid step over a transmitter's tilt range [deg].
    pub tilt_step_deg: f64,

    /// Pattern for transmitters without measured pattern data.
    pub fallback_pattern: SectorPattern,

    // Execution
    /// Cell size of the occlusion voxel grid [m]. `None` tests every triangle.
    pub voxel_size_m: Option<f64>,
    /// Process sample points on the rayon thread pool.
    pub parallel: bool,
}

impl ExposureConfig {
    pub fn new() -> Self {
        Self {
            min_distance_m: 0.1,
            field_constant: FIELD_CONSTANT_DIPOLE,
            threshold_vm: DEFAULT_THRESHOLD_VM,
            check_line_of_sight: false,
            occlusion_penalty_db: 12.0,
            mast_height_offset_m: 0.0,
            endpoint_tolerance_m: 1e-3,
            tilt_step_deg: 1.0,
            fallback_pattern: SectorPattern::default(),
            voxel_size_m: Some(10.0),
            parallel: true,
        }
    }

    /// Checks every value before a run starts.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("min_distance_m", self.min_distance_m),
            ("field_constant", self.field_constant),
            ("threshold_vm", self.threshold_vm),
            ("tilt_step_deg", self.tilt_step_deg),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ExposureError::invalid_config(format!(
                    "{name} must be > 0, got {value}"
                )));
            }
        }
        let non_negative = [
            ("occlusion_penalty_db", self.occlusion_penalty_db),
            ("endpoint_tolerance_m", self.endpoint_tolerance_m),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ExposureError::invalid_config(format!(
                    "{name} must be >= 0, got {value}"
                )));
            }
        }
        if !self.mast_height_offset_m.is_finite() {
            return Err(ExposureError::invalid_config(
                "mast_height_offset_m must be finite",
            ));
        }
        if let Some(step) = self.voxel_size_m
            && !(step > 0.0 && step.is_finite())
        {
            return Err(ExposureError::invalid_config(format!(
                "voxel_size_m must be > 0, got {step}"
            )));
        }
        self.fallback_pattern.validate()
    }
}

impl Default for ExposureConfig {
    fn default() -> Self {
        Self::new()
    }
}
