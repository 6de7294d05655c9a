// Nearest-point projection of (x, y) samples onto the reference track

use log::debug;

use super::geometry::TrackPolyline;
use crate::config::ProjectorKind;

/// Cap on grid cells, the cell size grows until the grid fits.
const MAX_GRID_CELLS: usize = 1 << 20;

/// Maps a position to the lap-relative arc length of the closest track point.
///
/// Implementations must agree exactly with a linear scan: the closest point by
/// squared distance wins, ties go to the lowest index (lowest `s`).
pub trait TrackProjector: Send + Sync {
    fn track(&self) -> &TrackPolyline;

    fn nearest_index(&self, x: f64, y: f64) -> usize;

    /// Lap-relative arc length in `[0, length]`.
    fn project(&self, x: f64, y: f64) -> f64 {
        self.track().points()[self.nearest_index(x, y)].s
    }
}

pub fn build_projector<'a>(
    track: &'a TrackPolyline,
    kind: ProjectorKind,
) -> Box<dyn TrackProjector + 'a> {
    match kind {
        ProjectorKind::Linear => Box::new(LinearProjector::new(track)),
        ProjectorKind::Grid { cell_size } => Box::new(GridProjector::new(track, cell_size)),
    }
}

#[inline]
fn distance_squared(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    (ax - bx) * (ax - bx) + (ay - by) * (ay - by)
}

/// Scans every track point. O(n) per query, fine for a few thousand points.
pub struct LinearProjector<'a> {
    track: &'a TrackPolyline,
}

impl<'a> LinearProjector<'a> {
    pub fn new(track: &'a TrackPolyline) -> Self {
        Self { track }
    }
}

impl TrackProjector for LinearProjector<'_> {
    fn track(&self) -> &TrackPolyline {
        self.track
    }

    fn nearest_index(&self, x: f64, y: f64) -> usize {
        let mut best_idx = 0;
        let mut best_d2 = f64::INFINITY;
        for (idx, point) in self.track.points().iter().enumerate() {
            let d2 = distance_squared(x, y, point.x, point.y);
            if d2 < best_d2 {
                best_d2 = d2;
                best_idx = idx;
            }
        }
        best_idx
    }
}

/// Buckets track points into a uniform grid and searches rings of cells
/// outwards from the query until no unvisited cell can hold a closer point.
pub struct GridProjector<'a> {
    track: &'a TrackPolyline,
    cell_size: f64,
    min_x: f64,
    min_y: f64,
    cols: i64,
    rows: i64,
    /// Point indexes per cell, row-major, ascending within a cell
    cells: Vec<Vec<usize>>,
}

impl<'a> GridProjector<'a> {
    pub fn new(track: &'a TrackPolyline, cell_size: f64) -> Self {
        let points = track.points();
        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in points {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }

        let (width, height) = (max_x - min_x, max_y - min_y);
        let mut cell_size = cell_size;
        // Counted in f64 so tiny cell sizes cannot overflow
        while Self::cell_count(width, height, cell_size) > MAX_GRID_CELLS as f64 {
            cell_size *= 2.0;
        }
        let (cols, rows) = Self::dimensions(width, height, cell_size);

        let mut grid = Self {
            track,
            cell_size,
            min_x,
            min_y,
            cols,
            rows,
            cells: vec![Vec::new(); (cols * rows) as usize],
        };
        for (idx, p) in points.iter().enumerate() {
            let (col, row) = grid.cell_of(p.x, p.y);
            let cell = grid.cell_offset(col, row);
            grid.cells[cell].push(idx);
        }

        debug!(
            "Grid projector: {}x{} cells of {}m for {} points",
            cols,
            rows,
            cell_size,
            points.len()
        );
        grid
    }

    fn cell_count(width: f64, height: f64, cell_size: f64) -> f64 {
        ((width / cell_size).floor() + 1.0) * ((height / cell_size).floor() + 1.0)
    }

    fn dimensions(width: f64, height: f64, cell_size: f64) -> (i64, i64) {
        (
            (width / cell_size).floor() as i64 + 1,
            (height / cell_size).floor() as i64 + 1,
        )
    }

    fn cell_of(&self, x: f64, y: f64) -> (i64, i64) {
        (
            ((x - self.min_x) / self.cell_size).floor() as i64,
            ((y - self.min_y) / self.cell_size).floor() as i64,
        )
    }

    fn cell_offset(&self, col: i64, row: i64) -> usize {
        (row.clamp(0, self.rows - 1) * self.cols + col.clamp(0, self.cols - 1)) as usize
    }

    fn visit_cell(&self, col: i64, row: i64, x: f64, y: f64, best: &mut Option<(f64, usize)>) {
        if col < 0 || row < 0 || col >= self.cols || row >= self.rows {
            return;
        }
        let points = self.track.points();
        for &idx in &self.cells[self.cell_offset(col, row)] {
            let d2 = distance_squared(x, y, points[idx].x, points[idx].y);
            let closer = match best {
                Some((best_d2, best_idx)) => d2 < *best_d2 || (d2 == *best_d2 && idx < *best_idx),
                None => true,
            };
            if closer {
                *best = Some((d2, idx));
            }
        }
    }

    fn visit_ring(
        &self,
        col: i64,
        row: i64,
        ring: i64,
        x: f64,
        y: f64,
        best: &mut Option<(f64, usize)>,
    ) {
        if ring == 0 {
            self.visit_cell(col, row, x, y, best);
            return;
        }
        for dc in -ring..=ring {
            self.visit_cell(col + dc, row - ring, x, y, best);
            self.visit_cell(col + dc, row + ring, x, y, best);
        }
        for dr in (-ring + 1)..ring {
            self.visit_cell(col - ring, row + dr, x, y, best);
            self.visit_cell(col + ring, row + dr, x, y, best);
        }
    }
}

/// Distance from `value` to the closed range `[0, max]`, in cells.
fn outside_by(value: i64, max: i64) -> i64 {
    if value < 0 {
        -value
    } else if value > max {
        value - max
    } else {
        0
    }
}

impl TrackProjector for GridProjector<'_> {
    fn track(&self) -> &TrackPolyline {
        self.track
    }

    fn nearest_index(&self, x: f64, y: f64) -> usize {
        let (col, row) = self.cell_of(x, y);
        let first_ring = outside_by(col, self.cols - 1).max(outside_by(row, self.rows - 1));
        let last_ring = [col, self.cols - 1 - col, row, self.rows - 1 - row]
            .iter()
            .map(|d| d.abs())
            .max()
            .unwrap_or(0);

        let mut best: Option<(f64, usize)> = None;
        for ring in first_ring..=last_ring {
            self.visit_ring(col, row, ring, x, y, &mut best);
            // Cells beyond this ring are at least (ring - 1) cells away once
            // cell rounding is accounted for.
            if let Some((best_d2, _)) = best {
                let clearance = (ring - 1).max(0) as f64 * self.cell_size;
                if best_d2 < clearance * clearance {
                    break;
                }
            }
        }
        best.map(|(_, idx)| idx).unwrap_or(0)
    }
}
