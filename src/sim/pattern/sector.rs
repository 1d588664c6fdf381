//! Closed-form sector antenna model.
//!
//! Each plane follows the parabolic roll-off of 3GPP TR 36.814 / ITU-R F.1336:
//!
//! `A(φ) = min(12 · (φ / φ3dB)², Am)`
//!
//! with `φ3dB` the 3 dB beamwidth and `Am` the attenuation cap.

use serde::{Deserialize, Serialize};

use super::{AntennaPattern, PatternAttenuation};
use crate::error::{ExposureError, Result};
use crate::geom::angles::wrap_180;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectorPattern {
    /// Horizontal 3 dB beamwidth [deg].
    pub h_beamwidth_deg: f64,
    /// Vertical 3 dB beamwidth [deg].
    pub v_beamwidth_deg: f64,
    /// Horizontal attenuation cap [dB].
    pub h_max_attenuation_db: f64,
    /// Vertical attenuation cap [dB].
    pub v_max_attenuation_db: f64,
}

impl SectorPattern {
    /// Three-sector LTE antenna, 65° / 7°.
    pub const LTE_65_7: Self = Self::with_caps(65.0, 7.0);
    /// 5G NR narrow beam, 33° / 5°.
    pub const NR_33_5: Self = Self::with_caps(33.0, 5.0);
    pub const SECTOR_90_7: Self = Self::with_caps(90.0, 7.0);
    pub const SECTOR_33_7: Self = Self::with_caps(33.0, 7.0);
    /// Flat horizontally, 7° vertical beam.
    pub const OMNI: Self = Self {
        h_beamwidth_deg: 360.0,
        v_beamwidth_deg: 7.0,
        h_max_attenuation_db: 0.0,
        v_max_attenuation_db: 30.0,
    };
    /// 0 dB in every direction.
    pub const ISOTROPIC: Self = Self {
        h_beamwidth_deg: 360.0,
        v_beamwidth_deg: 180.0,
        h_max_attenuation_db: 0.0,
        v_max_attenuation_db: 0.0,
    };

    /// Sector with the standard caps (25 dB horizontal, 30 dB vertical).
    pub const fn with_caps(h_beamwidth_deg: f64, v_beamwidth_deg: f64) -> Self {
        Self {
            h_beamwidth_deg,
            v_beamwidth_deg,
            h_max_attenuation_db: 25.0,
            v_max_attenuation_db: 30.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, bw) in [
            ("horizontal beamwidth", self.h_beamwidth_deg),
            ("vertical beamwidth", self.v_beamwidth_deg),
        ] {
            if !(bw > 0.0 && bw <= 360.0) {
                return Err(ExposureError::invalid_sector(format!(
                    "{name} must be in (0, 360] deg, got {bw}"
                )));
            }
        }
        for (name, cap) in [
            ("horizontal cap", self.h_max_attenuation_db),
            ("vertical cap", self.v_max_attenuation_db),
        ] {
            if !(cap >= 0.0 && cap.is_finite()) {
                return Err(ExposureError::invalid_sector(format!(
                    "{name} must be a finite value >= 0 dB, got {cap}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for SectorPattern {
    fn default() -> Self {
        Self::LTE_65_7
    }
}

fn rolloff(angle_deg: f64, beamwidth_deg: f64, cap_db: f64) -> f64 {
    (12.0 * (angle_deg / beamwidth_deg).powi(2)).min(cap_db)
}

impl AntennaPattern for SectorPattern {
    fn attenuation(&self, relative_azimuth_deg: f64, relative_elevation_deg: f64) -> PatternAttenuation {
        PatternAttenuation {
            horizontal_db: rolloff(
                wrap_180(relative_azimuth_deg),
                self.h_beamwidth_deg,
                self.h_max_attenuation_db,
            ),
            vertical_db: rolloff(
                relative_elevation_deg.clamp(-90.0, 90.0),
                self.v_beamwidth_deg,
                self.v_max_attenuation_db,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_beamwidth_is_3_db() {
        let p = SectorPattern::LTE_65_7;
        let a = p.attenuation(32.5, 3.5);
        assert!((a.horizontal_db - 3.0).abs() < 1e-12);
        assert!((a.vertical_db - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_boresight_and_caps() {
        let p = SectorPattern::LTE_65_7;
        assert_eq!(p.attenuation(0.0, 0.0), PatternAttenuation::default());
        let back = p.attenuation(180.0, -90.0);
        assert_eq!(back.horizontal_db, 25.0);
        assert_eq!(back.vertical_db, 30.0);
    }

    #[test]
    fn test_periodic_azimuth() {
        let p = SectorPattern::NR_33_5;
        assert_eq!(p.attenuation(350.0, 0.0), p.attenuation(-10.0, 0.0));
        assert_eq!(p.attenuation(180.0, 2.0), p.attenuation(-180.0, 2.0));
    }

    #[test]
    fn test_isotropic_and_omni() {
        let iso = SectorPattern::ISOTROPIC;
        assert_eq!(iso.attenuation(123.0, -47.0).total_db(), 0.0);
        let omni = SectorPattern::OMNI;
        let a = omni.attenuation(-135.0, 0.0);
        assert_eq!(a.horizontal_db, 0.0);
        assert!(omni.attenuation(0.0, -20.0).vertical_db > 0.0);
    }

    #[test]
    fn test_validate() {
        assert!(SectorPattern::default().validate().is_ok());
        assert!(SectorPattern::ISOTROPIC.validate().is_ok());
        let mut p = SectorPattern::default();
        p.h_beamwidth_deg = 0.0;
        assert!(p.validate().is_err());
        let mut p = SectorPattern::default();
        p.v_max_attenuation_db = -1.0;
        assert!(p.validate().is_err());
        let mut p = SectorPattern::default();
        p.v_beamwidth_deg = f64::NAN;
        assert!(p.validate().is_err());
    }
}
