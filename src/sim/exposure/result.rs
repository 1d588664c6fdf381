use serde::{Deserialize, Serialize};

use super::propagation::power_density_from_field;
use crate::{BuildingId, Point, TransmitterId, Vector};

/// Evaluation location on a building facade or roof.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub position: Point,
    pub building_id: BuildingId,
    /// Outward surface normal, carried through for reporting.
    pub normal: Option<Vector>,
}

impl SamplePoint {
    pub fn new(position: Point, building_id: impl Into<BuildingId>) -> Self {
        Self {
            position,
            building_id: building_id.into(),
            normal: None,
        }
    }

    pub fn with_normal(mut self, normal: Vector) -> Self {
        self.normal = Some(normal);
        self
    }
}

/// Default applied while computing a contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContributionNote {
    /// The distance was below the floor and was raised to it.
    DistanceClamped,
    /// The transmitter has no measured pattern and used the fallback sector pattern.
    FallbackPattern,
}

/// Field of one transmitter at one sample point, with every intermediate value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub transmitter_id: TransmitterId,
    /// Final field strength [V/m].
    pub field_vm: f64,
    /// Distance after applying the floor [m].
    pub distance_m: f64,
    pub horizontal_attenuation_db: f64,
    pub vertical_attenuation_db: f64,
    /// Line-of-sight penalty, 0 when not checked [dB].
    pub occlusion_db: f64,
    /// Buildings crossing the path, sorted by id.
    pub blocking_buildings: Vec<BuildingId>,
    /// Tilt the field was evaluated at [deg].
    pub tilt_deg: f64,
    pub relative_azimuth_deg: f64,
    pub relative_elevation_deg: f64,
    pub notes: Vec<ContributionNote>,
}

impl Contribution {
    pub fn total_attenuation_db(&self) -> f64 {
        self.horizontal_attenuation_db + self.vertical_attenuation_db + self.occlusion_db
    }

    pub fn has_note(&self, note: ContributionNote) -> bool {
        self.notes.contains(&note)
    }
}

/// Combined exposure at one sample point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointResult {
    pub point: SamplePoint,
    /// RSS of all contributions [V/m].
    pub total_field_vm: f64,
    /// One entry per transmitter, in transmitter order.
    pub contributions: Vec<Contribution>,
    pub exceeds_threshold: bool,
    /// Transmitter with the largest single contribution.
    pub dominant_transmitter: Option<TransmitterId>,
}

impl PointResult {
    /// Equivalent plane-wave power density [W/m²].
    pub fn power_density_wm2(&self) -> f64 {
        power_density_from_field(self.total_field_vm)
    }

    pub fn building_id(&self) -> &BuildingId {
        &self.point.building_id
    }

    pub fn contribution(&self, id: TransmitterId) -> Option<&Contribution> {
        self.contributions.iter().find(|c| c.transmitter_id == id)
    }
}
