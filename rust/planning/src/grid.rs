// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement grid construction
//!
//! Discretizes a room's floor polygon into a uniform cell grid and computes
//! per-cell validity data: point-in-polygon membership, wall distance,
//! corner proximity, occupancy by existing furniture and a ray-marched
//! clearance radius. The grid is rebuilt for every optimization call and
//! never persisted.

use crate::optimizer::OptimizationConfig;
use rayon::prelude::*;
use roomplan_geometry::polygon::bounding_box;
use roomplan_geometry::RoomBounds;
use roomplan_core::Point2D;

/// Step size of the clearance ray march, in meters
const RAY_MARCH_STEP: f64 = 0.1;

/// Corner proximity is flagged within this many resolutions of a vertex
const CORNER_RESOLUTION_FACTOR: f64 = 2.0;

/// Minimum occupancy padding around existing furniture, in meters
pub const MIN_OCCUPANCY_PADDING: f64 = 0.3;

/// The eight compass/diagonal ray directions (unit vectors)
const RAY_DIRECTIONS: [(f64, f64); 8] = [
    (1.0, 0.0),
    (std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2),
    (0.0, 1.0),
    (-std::f64::consts::FRAC_1_SQRT_2, std::f64::consts::FRAC_1_SQRT_2),
    (-1.0, 0.0),
    (-std::f64::consts::FRAC_1_SQRT_2, -std::f64::consts::FRAC_1_SQRT_2),
    (0.0, -1.0),
    (std::f64::consts::FRAC_1_SQRT_2, -std::f64::consts::FRAC_1_SQRT_2),
];

/// Axis-aligned footprint of an existing object, padded by the occupancy
/// margin
#[derive(Debug, Clone, Copy)]
pub struct Footprint {
    pub center: Point2D,
    pub half_width: f64,
    pub half_depth: f64,
}

impl Footprint {
    pub fn new(center: Point2D, width: f64, depth: f64, padding: f64) -> Self {
        Self {
            center,
            half_width: width / 2.0 + padding,
            half_depth: depth / 2.0 + padding,
        }
    }

    pub fn contains(&self, point: &Point2D) -> bool {
        (point.x - self.center.x).abs() <= self.half_width
            && (point.z - self.center.z).abs() <= self.half_depth
    }
}

/// One cell of the placement grid
#[derive(Debug, Clone)]
pub struct GridCell {
    pub grid_x: usize,
    pub grid_z: usize,
    /// World position of the cell center on the floor plane
    pub position: Point2D,
    /// Inside the polygon, clear of walls/corners/occupancy per the config
    pub is_valid: bool,
    pub is_occupied: bool,
    pub distance_to_wall: f64,
    pub is_corner: bool,
    /// Free radius found by the 8-direction ray march
    pub clearance_radius: f64,
}

/// Uniform grid over the polygon's axis-aligned bounding box
#[derive(Debug)]
pub struct PlacementGrid {
    pub cells: Vec<GridCell>,
    pub columns: usize,
    pub rows: usize,
    pub resolution: f64,
}

impl PlacementGrid {
    /// Build the grid for one optimization pass.
    ///
    /// Cell classification is pure per cell, so the parallel fill produces
    /// the same cells in the same order as a sequential scan.
    pub fn build(
        bounds: &RoomBounds,
        config: &OptimizationConfig,
        existing: &[Footprint],
    ) -> Self {
        let (min, max) = bounding_box(&bounds.polygon);
        let resolution = config.grid_resolution;
        let columns = (((max.x - min.x) / resolution).floor() as usize).max(1) + 1;
        let rows = (((max.z - min.z) / resolution).floor() as usize).max(1) + 1;

        let clearance_cap = config.conflict_radius() + 1.0;
        let corner_radius = CORNER_RESOLUTION_FACTOR * resolution;

        let cells: Vec<GridCell> = (0..columns * rows)
            .into_par_iter()
            .map(|idx| {
                let grid_x = idx % columns;
                let grid_z = idx / columns;
                let position = Point2D::new(
                    min.x + grid_x as f64 * resolution,
                    min.z + grid_z as f64 * resolution,
                );

                let inside = bounds.contains(&position);
                let distance_to_wall = if inside {
                    bounds.distance_to_nearest_wall(&position)
                } else {
                    0.0
                };
                let is_corner = bounds
                    .corners
                    .iter()
                    .any(|c| c.distance_to(&position) <= corner_radius);
                let is_occupied = existing.iter().any(|f| f.contains(&position));

                let clearance_radius = if inside && !is_occupied {
                    ray_march_clearance(bounds, existing, &position, clearance_cap)
                } else {
                    0.0
                };

                let is_valid = inside
                    && !is_occupied
                    && clearance_radius >= config.min_clearance
                    && distance_to_wall >= config.wall_offset
                    && (!is_corner || config.corner_usage);

                GridCell {
                    grid_x,
                    grid_z,
                    position,
                    is_valid,
                    is_occupied,
                    distance_to_wall,
                    is_corner,
                    clearance_radius,
                }
            })
            .collect();

        Self {
            cells,
            columns,
            rows,
            resolution,
        }
    }

    /// Cells that passed the validity filter
    pub fn valid_cells(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter().filter(|c| c.is_valid)
    }
}

/// March outward in the eight fixed directions until hitting the polygon
/// boundary or an occupied footprint; the clearance radius is the minimum
/// stopping distance across all directions, capped at `cap`.
fn ray_march_clearance(
    bounds: &RoomBounds,
    existing: &[Footprint],
    origin: &Point2D,
    cap: f64,
) -> f64 {
    let mut min_distance = cap;

    for (dx, dz) in RAY_DIRECTIONS {
        let mut travelled = 0.0;
        while travelled < min_distance {
            travelled += RAY_MARCH_STEP;
            let probe = Point2D::new(origin.x + dx * travelled, origin.z + dz * travelled);
            if !bounds.contains(&probe) || existing.iter().any(|f| f.contains(&probe)) {
                min_distance = min_distance.min(travelled - RAY_MARCH_STEP);
                break;
            }
        }
    }

    min_distance.max(0.0)
}
