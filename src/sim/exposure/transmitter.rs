use serde::{Deserialize, Serialize};

use crate::error::{ExposureError, Result};
use crate::sim::pattern::PatternModel;
use crate::sim::pattern::registry::PatternKey;
use crate::{BuildingId, Point, TransmitterId};

/// Vertical orientation of a transmitter's boresight [deg, negative = downward].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TiltSetting {
    Fixed(f64),
    /// Adjustable or adaptive antenna; evaluated at its worst case.
    Range { min_deg: f64, max_deg: f64 },
}

impl TiltSetting {
    /// Tilt used when no search is performed: the fixed value, or the middle of the range.
    pub fn nominal_deg(&self) -> f64 {
        match *self {
            Self::Fixed(t) => t,
            Self::Range { min_deg, max_deg } => 0.5 * (min_deg + max_deg),
        }
    }

    pub fn is_range(&self) -> bool {
        matches!(self, Self::Range { .. })
    }
}

/// One antenna sector of a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transmitter {
    pub id: TransmitterId,
    pub position: Point,
    /// Boresight azimuth [deg, 0 = north, clockwise].
    pub azimuth_deg: f64,
    pub tilt: TiltSetting,
    /// Effective radiated power [W].
    pub erp_watts: f64,
    /// Frequency band label as written in the site data, e.g. `"3600"`.
    pub frequency_band: String,
    /// Measured pattern to use, if one was resolved by the loader.
    pub pattern: Option<PatternKey>,
    /// Building the antenna is mounted on, excluded from its occlusion tests.
    pub host_building: Option<BuildingId>,
}

impl Transmitter {
    pub fn new(
        id: u32,
        position: Point,
        azimuth_deg: f64,
        tilt: TiltSetting,
        erp_watts: f64,
        frequency_band: &str,
    ) -> Self {
        Self {
            id: TransmitterId(id),
            position,
            azimuth_deg,
            tilt,
            erp_watts,
            frequency_band: frequency_band.to_string(),
            pattern: None,
            host_building: None,
        }
    }

    pub fn with_pattern(mut self, key: PatternKey) -> Self {
        self.pattern = Some(key);
        self
    }

    pub fn mounted_on(mut self, building: impl Into<BuildingId>) -> Self {
        self.host_building = Some(building.into());
        self
    }

    /// Rejects transmitter data that would make every point's result meaningless.
    pub fn validate(&self) -> Result<()> {
        let id = self.id;
        if !self.position.is_finite() {
            return Err(ExposureError::NonFiniteTransmitter {
                id,
                field: "position",
            });
        }
        if !self.azimuth_deg.is_finite() {
            return Err(ExposureError::NonFiniteTransmitter {
                id,
                field: "azimuth",
            });
        }
        if !(self.erp_watts > 0.0 && self.erp_watts.is_finite()) {
            return Err(ExposureError::InvalidPower {
                id,
                erp_watts: self.erp_watts,
            });
        }
        match self.tilt {
            TiltSetting::Fixed(t) if !t.is_finite() => {
                Err(ExposureError::NonFiniteTransmitter { id, field: "tilt" })
            }
            TiltSetting::Range { min_deg, max_deg }
                if !min_deg.is_finite() || !max_deg.is_finite() =>
            {
                Err(ExposureError::NonFiniteTransmitter { id, field: "tilt" })
            }
            TiltSetting::Range { min_deg, max_deg } if min_deg > max_deg => {
                Err(ExposureError::InvalidTiltRange {
                    id,
                    min: min_deg,
                    max: max_deg,
                })
            }
            _ => Ok(()),
        }
    }
}

/// Where a transmitter's pattern came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternSource {
    Measured,
    /// No measured pattern; the configured sector pattern stands in.
    Fallback,
}

/// Transmitter with its pattern looked up, ready for evaluation.
#[derive(Debug, Clone)]
pub struct ResolvedTransmitter {
    pub transmitter: Transmitter,
    pub pattern: PatternModel,
    pub source: PatternSource,
}

impl ResolvedTransmitter {
    pub fn new(transmitter: Transmitter, pattern: PatternModel, source: PatternSource) -> Self {
        Self {
            transmitter,
            pattern,
            source,
        }
    }
}
