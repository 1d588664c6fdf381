use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::building::{BuildingAggregator, BuildingSummary};
use super::config::ExposureConfig;
use super::propagation::PropagationEngine;
use super::result::{PointResult, SamplePoint};
use super::summation::SummationAggregator;
use super::tilt::TiltSearch;
use super::transmitter::{PatternSource, ResolvedTransmitter, Transmitter};
use crate::BuildingId;
use crate::geom::triangle::Triangle;
use crate::sim::occlusion::OcclusionGeometry;
use crate::sim::pattern::PatternModel;
use crate::sim::pattern::registry::PatternRegistry;

/// Exposure assessment of a set of transmitters over sample points.
///
/// Everything is resolved and validated in [`ExposureSimulation::new`]; the
/// simulation is read-only afterwards and can be shared between threads.
pub struct ExposureSimulation {
    config: ExposureConfig,
    transmitters: Vec<ResolvedTransmitter>,
    engine: PropagationEngine,
    tilt_search: TiltSearch,
    summation: SummationAggregator,
    num_triangles: usize,
}

impl ExposureSimulation {
    pub fn new(
        transmitters: Vec<Transmitter>,
        patterns: &PatternRegistry,
        geometry: Arc<OcclusionGeometry>,
        config: ExposureConfig,
    ) -> Result<Self> {
        config.validate().context("invalid exposure configuration")?;

        let tilt_search = TiltSearch::new(config.tilt_step_deg);
        let mut seen = BTreeSet::new();
        let mut resolved = Vec::with_capacity(transmitters.len());
        for tx in transmitters {
            tx.validate()
                .and_then(|()| tilt_search.validate(&tx))
                .with_context(|| format!("invalid transmitter {}", tx.id))?;
            anyhow::ensure!(seen.insert(tx.id), "duplicate transmitter id {}", tx.id);

            let measured = tx.pattern.as_ref().and_then(|key| patterns.get(key));
            let resolved_tx = match measured {
                Some(pattern) => ResolvedTransmitter::new(
                    tx,
                    PatternModel::Measured(pattern),
                    PatternSource::Measured,
                ),
                None => {
                    warn!(
                        transmitter = %tx.id,
                        pattern = ?tx.pattern.as_ref().map(|k| k.to_string()),
                        band = %tx.frequency_band,
                        "no measured pattern, using fallback sector pattern"
                    );
                    ResolvedTransmitter::new(
                        tx,
                        PatternModel::Sector(config.fallback_pattern),
                        PatternSource::Fallback,
                    )
                }
            };
            resolved.push(resolved_tx);
        }

        Ok(Self {
            engine: PropagationEngine::new(&config, geometry.clone()),
            tilt_search,
            summation: SummationAggregator::new(config.threshold_vm),
            num_triangles: geometry.len(),
            transmitters: resolved,
            config,
        })
    }

    /// Same as [`ExposureSimulation::new`], indexing `triangles` with `config.voxel_size_m`.
    pub fn with_triangles(
        transmitters: Vec<Transmitter>,
        patterns: &PatternRegistry,
        triangles: Vec<Triangle>,
        config: ExposureConfig,
    ) -> Result<Self> {
        let geometry = OcclusionGeometry::new(triangles, config.voxel_size_m)
            .context("invalid occlusion geometry")?;
        Self::new(transmitters, patterns, Arc::new(geometry), config)
    }

    pub fn config(&self) -> &ExposureConfig {
        &self.config
    }

    pub fn transmitters(&self) -> &[ResolvedTransmitter] {
        &self.transmitters
    }

    /// Point result with one contribution per transmitter, each at its worst-case tilt.
    pub fn evaluate_point(&self, point: &SamplePoint) -> PointResult {
        let contributions = self
            .transmitters
            .iter()
            .map(|tx| self.tilt_search.search(&self.engine, tx, point))
            .collect();
        self.summation.total(point.clone(), contributions)
    }

    /// Evaluates every point and summarizes per building.
    pub fn run(&self, points: &[SamplePoint]) -> ExposureResult {
        info!(
            points = points.len(),
            transmitters = self.transmitters.len(),
            triangles = self.num_triangles,
            line_of_sight = self.engine.checks_line_of_sight(),
            "starting exposure run"
        );

        let (results, aggregator) = if self.config.parallel {
            let results: Vec<PointResult> =
                points.par_iter().map(|p| self.evaluate_point(p)).collect();
            let aggregator = results
                .par_iter()
                .fold(BuildingAggregator::new, |mut agg, r| {
                    agg.absorb(r);
                    agg
                })
                .reduce(BuildingAggregator::new, BuildingAggregator::merge);
            (results, aggregator)
        } else {
            let results: Vec<PointResult> =
                points.iter().map(|p| self.evaluate_point(p)).collect();
            let mut aggregator = BuildingAggregator::new();
            for r in &results {
                aggregator.absorb(r);
            }
            (results, aggregator)
        };

        let result = ExposureResult {
            points: results,
            buildings: aggregator.finalize(),
        };
        info!(
            points = result.points.len(),
            exceedances = result.exceeding_points().count(),
            buildings = result.buildings.len(),
            "exposure run finished"
        );
        result
    }
}

/// Output of [`ExposureSimulation::run`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureResult {
    /// One result per sample point, in input order.
    pub points: Vec<PointResult>,
    /// One summary per building, ordered by id.
    pub buildings: Vec<BuildingSummary>,
}

impl ExposureResult {
    pub fn exceeding_points(&self) -> impl Iterator<Item = &PointResult> {
        self.points.iter().filter(|p| p.exceeds_threshold)
    }

    /// Point with the highest total field.
    pub fn max_field(&self) -> Option<&PointResult> {
        self.points
            .iter()
            .reduce(|a, b| if b.total_field_vm > a.total_field_vm { b } else { a })
    }

    pub fn building(&self, id: &BuildingId) -> Option<&BuildingSummary> {
        self.buildings
            .binary_search_by(|s| s.building_id.cmp(id))
            .ok()
            .map(|i| &self.buildings[i])
    }
}
