use super::result::{Contribution, PointResult, SamplePoint};
use crate::TransmitterId;

/// Incoherent sum `sqrt(sum(E_i^2))` of field amplitudes [V/m].
pub fn rss(fields: impl IntoIterator<Item = f64>) -> f64 {
    fields.into_iter().map(|e| e * e).sum::<f64>().sqrt()
}

/// Combines the contributions at one point and applies the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummationAggregator {
    threshold_vm: f64,
}

impl SummationAggregator {
    pub fn new(threshold_vm: f64) -> Self {
        Self { threshold_vm }
    }

    pub fn threshold_vm(&self) -> f64 {
        self.threshold_vm
    }

    /// A field at the threshold counts as exceeding.
    pub fn exceeds(&self, total_field_vm: f64) -> bool {
        total_field_vm >= self.threshold_vm
    }

    pub fn total(&self, point: SamplePoint, contributions: Vec<Contribution>) -> PointResult {
        let total_field_vm = rss(contributions.iter().map(|c| c.field_vm));
        PointResult {
            point,
            total_field_vm,
            exceeds_threshold: self.exceeds(total_field_vm),
            dominant_transmitter: dominant(&contributions),
            contributions,
        }
    }
}

/// Transmitter with the largest contribution; the first one on ties.
fn dominant(contributions: &[Contribution]) -> Option<TransmitterId> {
    let mut best: Option<&Contribution> = None;
    for c in contributions {
        if best.is_none_or(|b| c.field_vm > b.field_vm) {
            best = Some(c);
        }
    }
    best.map(|c| c.transmitter_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;

    fn contribution(id: u32, field_vm: f64) -> Contribution {
        Contribution {
            transmitter_id: TransmitterId(id),
            field_vm,
            distance_m: 10.0,
            horizontal_attenuation_db: 0.0,
            vertical_attenuation_db: 0.0,
            occlusion_db: 0.0,
            blocking_buildings: Vec::new(),
            tilt_deg: 0.0,
            relative_azimuth_deg: 0.0,
            relative_elevation_deg: 0.0,
            notes: Vec::new(),
        }
    }

    fn point() -> SamplePoint {
        SamplePoint::new(Point::new(0., 0., 0.), "b")
    }

    #[test]
    fn test_three_four_five() {
        let agg = SummationAggregator::new(5.0);
        let r = agg.total(point(), vec![contribution(1, 3.0), contribution(2, 4.0)]);
        assert_eq!(r.total_field_vm, 5.0);
        assert!(r.exceeds_threshold);
        assert_eq!(r.dominant_transmitter, Some(TransmitterId(2)));
        assert_eq!(r.contributions.len(), 2);
    }

    #[test]
    fn test_threshold_boundary() {
        let agg = SummationAggregator::new(2.5);
        assert!(agg.total(point(), vec![contribution(1, 2.5)]).exceeds_threshold);
        assert!(!agg.total(point(), vec![contribution(1, 2.4999999)]).exceeds_threshold);
    }

    #[test]
    fn test_rss_law() {
        let fields = [0.3, 1.7, 0.02, 2.2, 0.9];
        let cs: Vec<_> = fields
            .iter()
            .enumerate()
            .map(|(i, &e)| contribution(i as u32, e))
            .collect();
        let r = SummationAggregator::new(5.0).total(point(), cs);
        let expected = fields.iter().map(|e| e * e).sum::<f64>().sqrt();
        assert!((r.total_field_vm - expected).abs() < 1e-12);
        assert_eq!(r.dominant_transmitter, Some(TransmitterId(3)));
    }

    #[test]
    fn test_no_contributions() {
        let r = SummationAggregator::new(5.0).total(point(), Vec::new());
        assert_eq!(r.total_field_vm, 0.0);
        assert!(!r.exceeds_threshold);
        assert_eq!(r.dominant_transmitter, None);
    }

    #[test]
    fn test_dominant_tie_keeps_first() {
        let r = SummationAggregator::new(5.0).total(
            point(),
            vec![contribution(9, 1.0), contribution(2, 1.0), contribution(5, 0.5)],
        );
        assert_eq!(r.dominant_transmitter, Some(TransmitterId(9)));
    }
}
