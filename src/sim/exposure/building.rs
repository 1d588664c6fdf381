//! Per-building exposure statistics.
//!
//! Field sums are kept as integer nano-V/m so that merging partial summaries
//! gives the same bits regardless of how the points were split or ordered.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::result::PointResult;
use crate::BuildingId;

const NANO_PER_UNIT: f64 = 1e9;

fn to_nano(field_vm: f64) -> u64 {
    // `as` saturates and maps NaN to 0
    (field_vm * NANO_PER_UNIT).round() as u64
}

fn from_nano(sum: u64) -> f64 {
    sum as f64 / NANO_PER_UNIT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingSummary {
    pub building_id: BuildingId,
    pub point_count: usize,
    pub exceedance_count: usize,
    /// Largest total field over all points, exceeding or not [V/m].
    ///
    /// The exceedance maximum is [`BuildingSummary::max_exceeding_field_vm`].
    pub max_field_all_vm: f64,
    /// Largest total field over exceeding points, 0 if none [V/m].
    max_exceeding_vm: f64,
    sum_field_nvm: u64,
    sum_exceeding_nvm: u64,
}

impl BuildingSummary {
    pub fn new(building_id: BuildingId) -> Self {
        Self {
            building_id,
            point_count: 0,
            exceedance_count: 0,
            max_field_all_vm: 0.0,
            max_exceeding_vm: 0.0,
            sum_field_nvm: 0,
            sum_exceeding_nvm: 0,
        }
    }

    pub fn absorb(&mut self, result: &PointResult) {
        debug_assert_eq!(&self.building_id, result.building_id());
        let e = result.total_field_vm;
        self.point_count += 1;
        self.max_field_all_vm = self.max_field_all_vm.max(e);
        self.sum_field_nvm = self.sum_field_nvm.saturating_add(to_nano(e));
        if result.exceeds_threshold {
            self.exceedance_count += 1;
            self.max_exceeding_vm = self.max_exceeding_vm.max(e);
            self.sum_exceeding_nvm = self.sum_exceeding_nvm.saturating_add(to_nano(e));
        }
    }

    /// Combines two partial summaries of the same building.
    pub fn merge(&mut self, other: &Self) {
        debug_assert_eq!(self.building_id, other.building_id);
        self.point_count += other.point_count;
        self.exceedance_count += other.exceedance_count;
        self.max_field_all_vm = self.max_field_all_vm.max(other.max_field_all_vm);
        self.max_exceeding_vm = self.max_exceeding_vm.max(other.max_exceeding_vm);
        self.sum_field_nvm = self.sum_field_nvm.saturating_add(other.sum_field_nvm);
        self.sum_exceeding_nvm = self
            .sum_exceeding_nvm
            .saturating_add(other.sum_exceeding_nvm);
    }

    pub fn has_exceedance(&self) -> bool {
        self.exceedance_count > 0
    }

    /// Largest total field over the exceeding points.
    pub fn max_exceeding_field_vm(&self) -> Option<f64> {
        self.has_exceedance().then_some(self.max_exceeding_vm)
    }

    /// Mean total field over the exceeding points.
    pub fn average_exceeding_field_vm(&self) -> Option<f64> {
        self.has_exceedance()
            .then(|| from_nano(self.sum_exceeding_nvm) / self.exceedance_count as f64)
    }

    /// Mean total field over all points.
    pub fn mean_field_vm(&self) -> Option<f64> {
        (self.point_count > 0).then(|| from_nano(self.sum_field_nvm) / self.point_count as f64)
    }
}

/// Collects point results into one summary per building.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildingAggregator {
    summaries: BTreeMap<BuildingId, BuildingSummary>,
}

impl BuildingAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absorb(&mut self, result: &PointResult) {
        let id = result.building_id();
        match self.summaries.get_mut(id) {
            Some(summary) => summary.absorb(result),
            None => {
                let mut summary = BuildingSummary::new(id.clone());
                summary.absorb(result);
                self.summaries.insert(id.clone(), summary);
            }
        }
    }

    /// Merges a partial aggregator built from a disjoint set of points.
    pub fn merge(mut self, other: Self) -> Self {
        for (id, summary) in other.summaries {
            match self.summaries.get_mut(&id) {
                Some(own) => own.merge(&summary),
                None => {
                    self.summaries.insert(id, summary);
                }
            }
        }
        self
    }

    pub fn summary(&self, id: &BuildingId) -> Option<&BuildingSummary> {
        self.summaries.get(id)
    }

    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    /// Summaries ordered by building id.
    pub fn finalize(self) -> Vec<BuildingSummary> {
        self.summaries.into_values().collect()
    }
}
