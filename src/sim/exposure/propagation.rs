//! Free-space field of one transmitter at one point, reduced by the antenna
//! pattern and, optionally, by buildings on the direct path.

use std::sync::Arc;

use super::config::ExposureConfig;
use super::result::{Contribution, ContributionNote, SamplePoint};
use super::transmitter::{PatternSource, ResolvedTransmitter};
use crate::BuildingId;
use crate::geom::angles::relative_direction;
use crate::sim::occlusion::{OcclusionGeometry, OcclusionTester};
use crate::sim::pattern::AntennaPattern;

/// Impedance of free space used for power density conversion [Ω].
pub const FREE_SPACE_IMPEDANCE_OHM: f64 = 377.0;

/// `E = sqrt(K * ERP) / d` [V/m].
pub fn free_space_field(field_constant: f64, erp_watts: f64, distance_m: f64) -> f64 {
    (field_constant * erp_watts).sqrt() / distance_m
}

/// Reduces a field amplitude by `attenuation_db`.
pub fn apply_attenuation(field_vm: f64, attenuation_db: f64) -> f64 {
    field_vm * 10_f64.powf(-attenuation_db / 20.0)
}

pub fn power_density_from_field(field_vm: f64) -> f64 {
    field_vm * field_vm / FREE_SPACE_IMPEDANCE_OHM
}

pub fn field_from_power_density(power_density_wm2: f64) -> f64 {
    (power_density_wm2 * FREE_SPACE_IMPEDANCE_OHM).sqrt()
}

/// Tilt-independent part of a transmitter-to-point evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct PropagationPath {
    pub distance_m: f64,
    pub distance_clamped: bool,
    pub free_space_field_vm: f64,
    pub occlusion_db: f64,
    pub blocking_buildings: Vec<BuildingId>,
}

#[derive(Debug, Clone)]
pub struct PropagationEngine {
    min_distance_m: f64,
    field_constant: f64,
    mast_height_offset_m: f64,
    occlusion: Option<OcclusionTester>,
}

impl PropagationEngine {
    /// Line-of-sight testing against `geometry` is enabled by `config.check_line_of_sight`.
    pub fn new(config: &ExposureConfig, geometry: Arc<OcclusionGeometry>) -> Self {
        let occlusion = config.check_line_of_sight.then(|| {
            OcclusionTester::new(
                geometry,
                config.occlusion_penalty_db,
                config.endpoint_tolerance_m,
            )
        });
        Self {
            min_distance_m: config.min_distance_m,
            field_constant: config.field_constant,
            mast_height_offset_m: config.mast_height_offset_m,
            occlusion,
        }
    }

    pub fn checks_line_of_sight(&self) -> bool {
        self.occlusion.is_some()
    }

    /// Field of `tx` at `point`.
    ///
    /// Uses `tilt_override` when given, otherwise the transmitter's nominal tilt.
    pub fn field(
        &self,
        tx: &ResolvedTransmitter,
        point: &SamplePoint,
        tilt_override: Option<f64>,
    ) -> Contribution {
        let tilt = tilt_override.unwrap_or_else(|| tx.transmitter.tilt.nominal_deg());
        let path = self.path(tx, point);
        self.evaluate(tx, point, &path, tilt)
    }

    /// Distance, free-space field and obstructions, which do not depend on tilt.
    pub fn path(&self, tx: &ResolvedTransmitter, point: &SamplePoint) -> PropagationPath {
        let origin = tx.transmitter.position;
        let raw = origin.distance(&point.position);
        let distance_clamped = raw < self.min_distance_m;
        let distance_m = raw.max(self.min_distance_m);
        let free_space_field_vm =
            free_space_field(self.field_constant, tx.transmitter.erp_watts, distance_m);

        let (occlusion_db, blocking_buildings) = match &self.occlusion {
            Some(tester) => {
                let mut excluded = vec![&point.building_id];
                if let Some(host) = &tx.transmitter.host_building {
                    excluded.push(host);
                }
                let from = origin.raised(self.mast_height_offset_m);
                let blocking = tester.obstructions(from, point.position, &excluded);
                (tester.penalty_db(blocking.len()), blocking)
            }
            None => (0.0, Vec::new()),
        };

        PropagationPath {
            distance_m,
            distance_clamped,
            free_space_field_vm,
            occlusion_db,
            blocking_buildings,
        }
    }

    /// Applies pattern and occlusion attenuation to `path` at the given tilt.
    pub fn evaluate(
        &self,
        tx: &ResolvedTransmitter,
        point: &SamplePoint,
        path: &PropagationPath,
        tilt_deg: f64,
    ) -> Contribution {
        let t = &tx.transmitter;
        let dir = relative_direction(t.position, point.position, t.azimuth_deg, tilt_deg);
        let atten = tx.pattern.attenuation(dir.azimuth_deg, dir.elevation_deg);

        let field = apply_attenuation(path.free_space_field_vm, atten.total_db());
        let field_vm = apply_attenuation(field, path.occlusion_db);

        let mut notes = Vec::new();
        if path.distance_clamped {
            notes.push(ContributionNote::DistanceClamped);
        }
        if tx.source == PatternSource::Fallback {
            notes.push(ContributionNote::FallbackPattern);
        }

        Contribution {
            transmitter_id: t.id,
            field_vm,
            distance_m: path.distance_m,
            horizontal_attenuation_db: atten.horizontal_db,
            vertical_attenuation_db: atten.vertical_db,
            occlusion_db: path.occlusion_db,
            blocking_buildings: path.blocking_buildings.clone(),
            tilt_deg,
            relative_azimuth_deg: dir.azimuth_deg,
            relative_elevation_deg: dir.elevation_deg,
            notes,
        }
    }
}
