pub mod error;
pub mod geom;
mod id;
pub mod sim;

// Prelude
pub use error::{ExposureError, Result};
pub use geom::point::Point;
pub use geom::triangle::Triangle;
pub use geom::vector::Vector;
pub use id::{BuildingId, TransmitterId};
pub use sim::exposure::{
    BuildingSummary, Contribution, ExposureConfig, ExposureResult, ExposureSimulation,
    PointResult, SamplePoint, TiltSetting, Transmitter,
};
pub use sim::occlusion::OcclusionGeometry;
pub use sim::pattern::registry::{PatternKey, PatternRegistry};
pub use sim::pattern::{PatternModel, RadiationPattern};
