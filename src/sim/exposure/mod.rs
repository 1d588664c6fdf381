//! Exposure assessment: field of every transmitter at every sample point,
//! combined per point and summarized per building.

pub mod building;
pub mod config;
pub mod propagation;
pub mod result;
pub mod simulation;
pub mod summation;
pub mod tilt;
pub mod transmitter;

pub use building::{BuildingAggregator, BuildingSummary};
pub use config::ExposureConfig;
pub use propagation::PropagationEngine;
pub use result::{Contribution, ContributionNote, PointResult, SamplePoint};
pub use simulation::{ExposureResult, ExposureSimulation};
pub use summation::SummationAggregator;
pub use tilt::TiltSearch;
pub use transmitter::{PatternSource, ResolvedTransmitter, TiltSetting, Transmitter};
