//! Sampled attenuation curves.

use serde::{Deserialize, Serialize};

use crate::error::{ExposureError, Result};
use crate::geom::angles::wrap_180;

/// Angles closer than this are the same sample [deg].
const ANGLE_EPS: f64 = 1e-9;

/// Whether the curve wraps around (horizontal) or is clamped at its ends (vertical).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveKind {
    /// Azimuth offset, periodic over 360°.
    Horizontal,
    /// Elevation offset in [-90, 90], clamped.
    Vertical,
}

/// How the sample values are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleForm {
    /// Positive dB below the main lobe.
    Attenuation,
    /// Gain in dB (dBi, dBd or relative), higher is stronger.
    Gain,
}

/// One plane of a measured radiation pattern.
///
/// Samples are sorted by angle and normalized so the strongest (boresight)
/// sample is 0 dB; every other value is >= 0 dB.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttenuationCurve {
    kind: CurveKind,
    angles_deg: Vec<f64>,
    attenuation_db: Vec<f64>,
}

impl AttenuationCurve {
    /// Builds a curve from `(angle_deg, value_db)` samples.
    ///
    /// Horizontal angles are folded into `[-180, 180)`. A closing sample that
    /// lands exactly one turn from another (e.g. both -180° and 180°) is merged
    /// when both carry the same value. Vertical angles must lie in `[-90, 90]`.
    pub fn new(kind: CurveKind, samples: &[(f64, f64)], form: SampleForm) -> Result<Self> {
        if samples.len() < 2 {
            return Err(ExposureError::TooFewSamples {
                count: samples.len(),
            });
        }
        if samples
            .iter()
            .any(|(a, v)| !a.is_finite() || !v.is_finite())
        {
            return Err(ExposureError::NonFiniteSample);
        }

        // (folded angle, value, input angle)
        let mut folded: Vec<(f64, f64, f64)> = Vec::with_capacity(samples.len());
        for &(angle, value) in samples {
            let a = match kind {
                CurveKind::Horizontal => wrap_180(angle),
                CurveKind::Vertical => {
                    if !(-90.0..=90.0).contains(&angle) {
                        return Err(ExposureError::AngleOutOfRange {
                            angle_deg: angle,
                            min: -90.0,
                            max: 90.0,
                        });
                    }
                    angle
                }
            };
            folded.push((a, value, angle));
        }
        folded.sort_by(|x, y| x.0.total_cmp(&y.0));

        let mut deduped: Vec<(f64, f64, f64)> = Vec::with_capacity(folded.len());
        for sample in folded {
            if let Some(last) = deduped.last()
                && (sample.0 - last.0).abs() < ANGLE_EPS
            {
                let closing = kind == CurveKind::Horizontal
                    && (sample.2 - last.2).abs() > ANGLE_EPS
                    && (sample.1 - last.1).abs() < ANGLE_EPS;
                if closing {
                    continue;
                }
                return Err(ExposureError::DuplicateAngle {
                    angle_deg: sample.2,
                });
            }
            deduped.push(sample);
        }
        if deduped.len() < 2 {
            return Err(ExposureError::TooFewSamples {
                count: deduped.len(),
            });
        }

        let angles_deg: Vec<f64> = deduped.iter().map(|s| s.0).collect();
        let raw: Vec<f64> = deduped.iter().map(|s| s.1).collect();
        let attenuation_db = match form {
            SampleForm::Attenuation => {
                let reference = raw.iter().copied().fold(f64::INFINITY, f64::min);
                raw.iter().map(|v| v - reference).collect()
            }
            SampleForm::Gain => {
                let reference = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                raw.iter().map(|v| reference - v).collect()
            }
        };

        Ok(Self {
            kind,
            angles_deg,
            attenuation_db,
        })
    }

    pub fn horizontal(samples: &[(f64, f64)]) -> Result<Self> {
        Self::new(CurveKind::Horizontal, samples, SampleForm::Attenuation)
    }

    pub fn vertical(samples: &[(f64, f64)]) -> Result<Self> {
        Self::new(CurveKind::Vertical, samples, SampleForm::Attenuation)
    }

    pub fn kind(&self) -> CurveKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.angles_deg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles_deg.is_empty()
    }

    /// Normalized samples as `(angle_deg, attenuation_db)`.
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.angles_deg
            .iter()
            .copied()
            .zip(self.attenuation_db.iter().copied())
    }

    /// Angle of the strongest sample. The first one wins if several share 0 dB.
    pub fn boresight_deg(&self) -> f64 {
        self.samples()
            .find(|(_, a)| *a == 0.0)
            .map(|(angle, _)| angle)
            .unwrap_or(self.angles_deg[0])
    }

    /// Attenuation at `angle_deg`, linearly interpolated between samples.
    pub fn attenuation(&self, angle_deg: f64) -> f64 {
        match self.kind {
            CurveKind::Horizontal => self.periodic(wrap_180(angle_deg)),
            CurveKind::Vertical => self.clamped(angle_deg.clamp(-90.0, 90.0)),
        }
    }

    fn periodic(&self, q: f64) -> f64 {
        let a = &self.angles_deg;
        let v = &self.attenuation_db;
        let n = a.len();
        let (first, last) = (a[0], a[n - 1]);
        if q < first {
            // Between the last sample one turn back and the first sample
            lerp(last - 360.0, v[n - 1], first, v[0], q)
        } else if q > last {
            lerp(last, v[n - 1], first + 360.0, v[0], q)
        } else {
            self.inner(q)
        }
    }

    fn clamped(&self, q: f64) -> f64 {
        let n = self.angles_deg.len();
        if q <= self.angles_deg[0] {
            self.attenuation_db[0]
        } else if q >= self.angles_deg[n - 1] {
            self.attenuation_db[n - 1]
        } else {
            self.inner(q)
        }
    }

    /// Interpolation for `q` within `[first, last]`.
    fn inner(&self, q: f64) -> f64 {
        let a = &self.angles_deg;
        let v = &self.attenuation_db;
        // Index of the first sample strictly greater than q
        let hi = a.partition_point(|&x| x <= q).clamp(1, a.len() - 1);
        let lo = hi - 1;
        lerp(a[lo], v[lo], a[hi], v[hi], q)
    }
}

fn lerp(x0: f64, y0: f64, x1: f64, y1: f64, x: f64) -> f64 {
    let span = x1 - x0;
    if span.abs() < ANGLE_EPS {
        return y0;
    }
    y0 + (y1 - y0) * (x - x0) / span
}
