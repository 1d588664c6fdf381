use std::collections::HashMap;

use crate::Point;
use crate::geom::bboxes::bounding_box;
use crate::geom::triangle::Triangle;

/// Uniform grid of cubic cells, each holding the triangles whose bounding box touches it.
///
/// Cell indices are taken relative to `origin` so that large projected
/// coordinates stay well inside `i32`.
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    grid: HashMap<(i32, i32, i32), Vec<usize>>,
    step: f64,
    origin: Point,
    /// Bounding box of all indexed triangles.
    extent: Option<(Point, Point)>,
}

impl VoxelGrid {
    /// Indexes `triangles` by position. Degenerate triangles are left out.
    pub fn new(triangles: &[Triangle], step: f64) -> Self {
        let mut grid: HashMap<(i32, i32, i32), Vec<usize>> = HashMap::new();

        let all_pts: Vec<Point> = triangles
            .iter()
            .filter(|t| !t.is_degenerate())
            .flat_map(|t| t.vertices)
            .collect();
        let extent = bounding_box(&all_pts);
        let origin = match extent {
            Some((pmin, _)) => pmin,
            None => Point::new(0.0, 0.0, 0.0),
        };
        let mut me = Self {
            grid: HashMap::new(),
            step,
            origin,
            extent,
        };

        for (idx, tri) in triangles.iter().enumerate() {
            if tri.is_degenerate() {
                continue;
            }
            let Some((pmin, pmax)) = bounding_box(&tri.vertices) else {
                continue;
            };
            let (i0, j0, k0) = me.cell_of(pmin);
            let (i1, j1, k1) = me.cell_of(pmax);
            for i in i0..=i1 {
                for j in j0..=j1 {
                    for k in k0..=k1 {
                        grid.entry((i, j, k)).or_default().push(idx);
                    }
                }
            }
        }

        me.grid = grid;
        me
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Number of non-empty cells.
    pub fn num_cells(&self) -> usize {
        self.grid.len()
    }

    /// Cell holding `p`. Coordinates beyond the `i32` range are clamped to its
    /// outermost cells, which hold no triangles unless the geometry itself is
    /// that far from its origin.
    fn cell_of(&self, p: Point) -> (i32, i32, i32) {
        (
            cell_index(p.x - self.origin.x, self.step),
            cell_index(p.y - self.origin.y, self.step),
            cell_index(p.z - self.origin.z, self.step),
        )
    }

    /// Returns the indices of triangles in every cell the segment `start -> end` passes.
    ///
    /// Walks the cells with a 3D-DDA. The result is sorted and free of duplicates.
    pub fn find_along_segment(&self, start: Point, end: Point) -> Vec<usize> {
        let mut result: Vec<usize> = Vec::new();
        // Only the part inside the indexed volume can meet a triangle
        let Some((start, end)) = self.clip(start, end) else {
            return result;
        };
        let first = self.cell_of(start);
        let last = self.cell_of(end);

        let d = [end.x - start.x, end.y - start.y, end.z - start.z];
        let p = [
            start.x - self.origin.x,
            start.y - self.origin.y,
            start.z - self.origin.z,
        ];
        let mut cell = [first.0, first.1, first.2];
        let target = [last.0, last.1, last.2];

        let mut step_dir = [0i32; 3];
        let mut t_max = [f64::INFINITY; 3];
        let mut t_delta = [f64::INFINITY; 3];
        for axis in 0..3 {
            if d[axis] > 0.0 {
                step_dir[axis] = 1;
                let boundary = (cell[axis] + 1) as f64 * self.step;
                t_max[axis] = (boundary - p[axis]) / d[axis];
                t_delta[axis] = self.step / d[axis];
            } else if d[axis] < 0.0 {
                step_dir[axis] = -1;
                let boundary = cell[axis] as f64 * self.step;
                t_max[axis] = (boundary - p[axis]) / d[axis];
                t_delta[axis] = -self.step / d[axis];
            }
        }

        // Upper bound on the number of cells visited
        let max_visits: i64 = (0..3)
            .map(|a| (target[a] as i64 - cell[a] as i64).abs())
            .sum::<i64>()
            + 1;

        let mut visits = 0;
        loop {
            if let Some(indices) = self.grid.get(&(cell[0], cell[1], cell[2])) {
                result.extend(indices);
            }
            visits += 1;
            if cell == target || visits > max_visits {
                break;
            }
            let axis = (0..3)
                .min_by(|&a, &b| t_max[a].total_cmp(&t_max[b]))
                .unwrap_or(0);
            if t_max[axis] > 1.0 {
                break;
            }
            cell[axis] += step_dir[axis];
            t_max[axis] += t_delta[axis];
        }

        // Rounding can end the walk one cell short
        if cell != target
            && let Some(indices) = self.grid.get(&last)
        {
            result.extend(indices);
        }

        result.sort_unstable();
        result.dedup();
        result
    }
}

impl VoxelGrid {
    /// Part of `start -> end` inside the triangle extent, slightly padded.
    fn clip(&self, start: Point, end: Point) -> Option<(Point, Point)> {
        let (lo, hi) = self.extent?;
        let pad = self.step * 1e-6;
        let p = [start.x, start.y, start.z];
        let d = [end.x - start.x, end.y - start.y, end.z - start.z];
        let lo = [lo.x - pad, lo.y - pad, lo.z - pad];
        let hi = [hi.x + pad, hi.y + pad, hi.z + pad];

        let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
        for axis in 0..3 {
            if d[axis] == 0.0 {
                if p[axis] < lo[axis] || p[axis] > hi[axis] {
                    return None;
                }
                continue;
            }
            let ta = (lo[axis] - p[axis]) / d[axis];
            let tb = (hi[axis] - p[axis]) / d[axis];
            t0 = t0.max(ta.min(tb));
            t1 = t1.min(ta.max(tb));
        }
        if t0 > t1 {
            return None;
        }
        let at = |t: f64| Point::new(p[0] + d[0] * t, p[1] + d[1] * t, p[2] + d[2] * t);
        Some((at(t0), at(t1)))
    }
}

fn cell_index(offset: f64, step: f64) -> i32 {
    (offset / step)
        .floor()
        .clamp(i32::MIN as f64, i32::MAX as f64) as i32
}
