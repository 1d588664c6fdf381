//! Line-of-sight occlusion against building geometry.
//!
//! The physical model counts buildings, not facets: a path crossing two walls
//! and a roof of the same building is one obstruction.

pub mod voxel_grid;

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::error::{ExposureError, Result};
use crate::geom::bboxes::{are_bboxes_overlapping, bounding_box};
use crate::geom::ray::Segment;
use crate::geom::triangle::Triangle;
use crate::{BuildingId, Point};

use self::voxel_grid::VoxelGrid;

/// Read-only triangle soup of all buildings around a site.
///
/// Never mutated after construction; shared between worker threads.
#[derive(Debug, Clone)]
pub struct OcclusionGeometry {
    triangles: Vec<Triangle>,
    grid: Option<VoxelGrid>,
    num_degenerate: usize,
}

impl OcclusionGeometry {
    /// Builds the geometry. With `voxel_size = None` every query tests every triangle.
    pub fn new(triangles: Vec<Triangle>, voxel_size: Option<f64>) -> Result<Self> {
        if let Some(step) = voxel_size
            && !(step > 0.0 && step.is_finite())
        {
            return Err(ExposureError::invalid_config(format!(
                "voxel size must be > 0 m, got {step}"
            )));
        }
        let num_degenerate = triangles.iter().filter(|t| t.is_degenerate()).count();
        if num_degenerate > 0 {
            debug!(
                num_degenerate,
                total = triangles.len(),
                "skipping degenerate triangles"
            );
        }
        let grid = voxel_size.map(|step| VoxelGrid::new(&triangles, step));
        if let Some(g) = &grid {
            debug!(cells = g.num_cells(), step = g.step(), "built occlusion voxel grid");
        }
        Ok(Self {
            triangles,
            grid,
            num_degenerate,
        })
    }

    /// Geometry without any building.
    pub fn empty() -> Self {
        Self {
            triangles: Vec::new(),
            grid: None,
            num_degenerate: 0,
        }
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn num_degenerate(&self) -> usize {
        self.num_degenerate
    }

    /// Buildings whose surfaces the segment `from -> to` crosses, sorted by id.
    ///
    /// Triangles of buildings in `excluded` are ignored. Crossings within
    /// `end_tol` metres of either end are grazing contacts and do not count.
    pub fn blocking_buildings(
        &self,
        from: Point,
        to: Point,
        excluded: &[&BuildingId],
        end_tol: f64,
    ) -> Vec<BuildingId> {
        let Some(segment) = Segment::new(from, to) else {
            return Vec::new();
        };
        if segment.length() <= 2.0 * end_tol {
            return Vec::new();
        }

        let candidates: Vec<usize> = match &self.grid {
            Some(grid) => grid.find_along_segment(from, to),
            None => {
                let smin = Point::new(from.x.min(to.x), from.y.min(to.y), from.z.min(to.z));
                let smax = Point::new(from.x.max(to.x), from.y.max(to.y), from.z.max(to.z));
                self.triangles
                    .iter()
                    .enumerate()
                    .filter(|(_, tri)| {
                        bounding_box(&tri.vertices).is_some_and(|(tmin, tmax)| {
                            are_bboxes_overlapping(smin, smax, tmin, tmax)
                        })
                    })
                    .map(|(i, _)| i)
                    .collect()
            }
        };

        let mut blocking: BTreeSet<&BuildingId> = BTreeSet::new();
        for idx in candidates {
            let tri = &self.triangles[idx];
            if tri.is_degenerate()
                || excluded.contains(&&tri.building_id)
                || blocking.contains(&tri.building_id)
            {
                continue;
            }
            if tri.intersect(&segment, end_tol).is_some() {
                blocking.insert(&tri.building_id);
            }
        }

        blocking.into_iter().cloned().collect()
    }
}

/// Counts obstructions on a transmitter-to-point path and converts them into a penalty.
#[derive(Debug, Clone)]
pub struct OcclusionTester {
    geometry: Arc<OcclusionGeometry>,
    penalty_per_building_db: f64,
    end_tol: f64,
}

impl OcclusionTester {
    pub fn new(geometry: Arc<OcclusionGeometry>, penalty_per_building_db: f64, end_tol: f64) -> Self {
        Self {
            geometry,
            penalty_per_building_db,
            end_tol,
        }
    }

    pub fn geometry(&self) -> &OcclusionGeometry {
        &self.geometry
    }

    /// Ids of the buildings obstructing `from -> to`, skipping `excluded`.
    ///
    /// Callers pass the sample point's own building (a facade point must not
    /// shadow itself) and, if any, the building the transmitter sits on.
    pub fn obstructions(&self, from: Point, to: Point, excluded: &[&BuildingId]) -> Vec<BuildingId> {
        self.geometry
            .blocking_buildings(from, to, excluded, self.end_tol)
    }

    /// Number of distinct buildings obstructing `from -> to`.
    pub fn count_obstructions(&self, from: Point, to: Point, excluded: &[&BuildingId]) -> usize {
        self.obstructions(from, to, excluded).len()
    }

    /// Attenuation for `count` obstructing buildings [dB].
    pub fn penalty_db(&self, count: usize) -> f64 {
        self.penalty_per_building_db * count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Closed box building (walls and roof) as 10 triangles.
    fn block(building: &str, xmin: f64, ymin: f64, size: f64, height: f64) -> Vec<Triangle> {
        let (x0, y0, x1, y1) = (xmin, ymin, xmin + size, ymin + size);
        let c = |x: f64, y: f64, z: f64| Point::new(x, y, z);
        let quads = [
            [c(x0, y0, 0.), c(x1, y0, 0.), c(x1, y0, height), c(x0, y0, height)],
            [c(x1, y0, 0.), c(x1, y1, 0.), c(x1, y1, height), c(x1, y0, height)],
            [c(x1, y1, 0.), c(x0, y1, 0.), c(x0, y1, height), c(x1, y1, height)],
            [c(x0, y1, 0.), c(x0, y0, 0.), c(x0, y0, height), c(x0, y1, height)],
            [c(x0, y0, height), c(x1, y0, height), c(x1, y1, height), c(x0, y1, height)],
        ];
        quads
            .iter()
            .flat_map(|q| {
                [
                    Triangle::new(q[0], q[1], q[2], building),
                    Triangle::new(q[0], q[2], q[3], building),
                ]
            })
            .collect()
    }

    fn street(voxel: Option<f64>) -> OcclusionGeometry {
        let mut tris = block("a", 10.0, -5.0, 10.0, 20.0);
        tris.extend(block("b", 30.0, -5.0, 10.0, 20.0));
        tris.extend(block("target", 50.0, -5.0, 10.0, 20.0));
        OcclusionGeometry::new(tris, voxel).unwrap()
    }

    #[test]
    fn test_one_building_counts_once() {
        for voxel in [None, Some(3.0), Some(25.0)] {
            let geo = street(voxel);
            // Crosses both the west and east walls of "a"
            let ids = geo.blocking_buildings(
                Point::new(0.0, 0.0, 5.0),
                Point::new(25.0, 0.0, 5.0),
                &[],
                1e-3,
            );
            assert_eq!(ids, vec![BuildingId::from("a")], "voxel {voxel:?}");
        }
    }

    #[test]
    fn test_two_buildings_in_path() {
        for voxel in [None, Some(4.0)] {
            let tester = OcclusionTester::new(Arc::new(street(voxel)), 12.0, 1e-3);
            let target = BuildingId::from("target");
            let to = Point::new(50.0, 0.0, 5.0); // on the west facade of "target"
            let n = tester.count_obstructions(Point::new(0.0, 0.0, 5.0), to, &[&target]);
            assert_eq!(n, 2);
            assert_eq!(tester.penalty_db(n), 24.0);
        }
    }

    #[test]
    fn test_own_building_does_not_self_occlude() {
        let geo = street(Some(5.0));
        let target = BuildingId::from("target");
        // Point on the far (east) facade: the path crosses the target itself
        let from = Point::new(0.0, 0.0, 30.0);
        let to = Point::new(60.0, 0.0, 5.0);
        let with_self = geo.blocking_buildings(from, to, &[], 1e-3);
        assert!(with_self.contains(&target));
        let without = geo.blocking_buildings(from, to, &[&target], 1e-3);
        assert!(!without.contains(&target));
    }

    #[test]
    fn test_path_over_roofs_is_clear() {
        let geo = street(Some(5.0));
        let ids = geo.blocking_buildings(
            Point::new(0.0, 0.0, 40.0),
            Point::new(45.0, 0.0, 35.0),
            &[],
            1e-3,
        );
        assert!(ids.is_empty());
    }

    #[test]
    fn test_degenerate_triangles_are_skipped() {
        let mut tris = block("a", 10.0, -5.0, 10.0, 20.0);
        let p = Point::new(15.0, 0.0, 5.0);
        tris.push(Triangle::new(p, p, Point::new(15.0, 1.0, 5.0), "ghost"));
        let geo = OcclusionGeometry::new(tris, Some(5.0)).unwrap();
        assert_eq!(geo.num_degenerate(), 1);
        let ids = geo.blocking_buildings(Point::new(0., 0., 5.), Point::new(30., 0., 5.), &[], 1e-3);
        assert_eq!(ids, vec![BuildingId::from("a")]);
    }

    #[test]
    fn test_endpoint_on_foreign_wall_is_grazing() {
        let geo = street(None);
        // Ends exactly on the west wall of "a"
        let ids = geo.blocking_buildings(Point::new(0., 0., 5.), Point::new(10., 0., 5.), &[], 1e-3);
        assert!(ids.is_empty());
    }

    #[test]
    fn test_invalid_voxel_size() {
        assert!(OcclusionGeometry::new(Vec::new(), Some(0.0)).is_err());
        assert!(OcclusionGeometry::new(Vec::new(), Some(f64::NAN)).is_err());
        assert!(OcclusionGeometry::new(Vec::new(), None).unwrap().is_empty());
        assert!(OcclusionGeometry::empty().is_empty());
    }
}
