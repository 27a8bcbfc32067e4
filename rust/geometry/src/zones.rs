// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement zones and accessibility pathways
//!
//! Classifies the room interior into quality-graded placement regions and
//! measures the clear corridors between doors and the room center. Both
//! feed the accessibility and fire-egress validators downstream.

use crate::error::Result;
use crate::room::{analyze_room_geometry, RoomBounds};
use roomplan_core::{FurnitureCatalog, MeshSnapshot, Opening, Point2D, SceneObject};
use serde::{Deserialize, Serialize};

/// Sampling step for zone classification, in meters
const ZONE_SAMPLE_STEP: f64 = 0.5;

/// March step when probing lateral corridor clearance
const CORRIDOR_MARCH_STEP: f64 = 0.1;

/// Corridors wider than this are reported at the cap
const CORRIDOR_MAX_WIDTH: f64 = 3.0;

/// Obstacle clearance below which a sample is unusable
const RESTRICTED_CLEARANCE: f64 = 0.3;

/// Quality grade of a placement region
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ZoneQuality {
    Optimal,
    Good,
    Acceptable,
    Poor,
    Restricted,
}

/// A connected floor region of uniform placement quality
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementZone {
    pub quality: ZoneQuality,
    pub center: Point2D,
    /// Region area in square meters
    pub area: f64,
}

impl PlacementZone {
    /// Radius of the circle with the same area, used as an equivalent
    /// turning radius for maneuvering checks
    pub fn turning_radius(&self) -> f64 {
        (self.area / std::f64::consts::PI).sqrt()
    }
}

/// A straight-line corridor with its measured clear width
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessPathway {
    pub from: Point2D,
    pub to: Point2D,
    /// Clear width in meters, capped at 3.0
    pub width: f64,
    pub length: f64,
}

/// A furniture footprint reduced to a disc for corridor/zone clearance tests
#[derive(Debug, Clone, Copy)]
pub struct Obstacle {
    pub center: Point2D,
    pub half_extent: f64,
}

impl Obstacle {
    /// Clearance from a floor point to this obstacle's footprint edge
    pub fn clearance_to(&self, point: &Point2D) -> f64 {
        (self.center.distance_to(point) - self.half_extent).max(0.0)
    }
}

/// Reduce furniture objects to floor-plane obstacles. Objects tagged as
/// rooms (carrying a floor polygon) are skipped.
pub fn obstacles_from_objects(
    objects: &[SceneObject],
    catalog: &FurnitureCatalog,
) -> Vec<Obstacle> {
    objects
        .iter()
        .filter(|o| {
            o.extensions
                .as_ref()
                .map_or(true, |ext| ext.floor_polygon.is_none())
        })
        .map(|o| Obstacle {
            center: o.position.floor_point(),
            half_extent: catalog.dimensions_for(o).max_footprint() / 2.0,
        })
        .collect()
}

/// Full room analysis: derived geometry plus zone and pathway classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomAnalysisResult {
    pub bounds: RoomBounds,
    pub placement_zones: Vec<PlacementZone>,
    pub pathways: Vec<AccessPathway>,
}

/// Analyzer wrapping the pure geometry pass with zone/pathway derivation
pub struct RoomAnalyzer {
    catalog: FurnitureCatalog,
}

impl RoomAnalyzer {
    pub fn new() -> Self {
        Self {
            catalog: FurnitureCatalog::new(),
        }
    }

    /// Analyze a room snapshot against the currently placed objects
    pub fn analyze(
        &self,
        snapshot: &MeshSnapshot,
        objects: &[SceneObject],
    ) -> Result<RoomAnalysisResult> {
        let bounds = analyze_room_geometry(&snapshot.floor_polygon)?;
        let obstacles = obstacles_from_objects(objects, &self.catalog);
        let doors: Vec<Opening> = snapshot.doors().cloned().collect();

        let placement_zones = classify_zones(&bounds, &obstacles);
        let pathways = compute_access_pathways(&bounds, &doors, &obstacles);

        Ok(RoomAnalysisResult {
            bounds,
            placement_zones,
            pathways,
        })
    }
}

impl Default for RoomAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Grade one sample point from its obstacle and wall clearance
fn grade_sample(obstacle_clearance: f64, wall_distance: f64) -> ZoneQuality {
    if obstacle_clearance < RESTRICTED_CLEARANCE {
        ZoneQuality::Restricted
    } else if obstacle_clearance >= 1.2 && wall_distance >= 0.5 {
        ZoneQuality::Optimal
    } else if obstacle_clearance >= 0.9 {
        ZoneQuality::Good
    } else if obstacle_clearance >= 0.6 {
        ZoneQuality::Acceptable
    } else {
        ZoneQuality::Poor
    }
}

/// Sample the interior on a coarse grid and cluster contiguous samples of
/// equal quality into zones
pub fn classify_zones(bounds: &RoomBounds, obstacles: &[Obstacle]) -> Vec<PlacementZone> {
    let (min, max) = crate::polygon::bounding_box(&bounds.polygon);
    let cols = ((max.x - min.x) / ZONE_SAMPLE_STEP).ceil() as usize + 1;
    let rows = ((max.z - min.z) / ZONE_SAMPLE_STEP).ceil() as usize + 1;

    // Quality per sample; None for samples outside the polygon
    let mut grades: Vec<Option<ZoneQuality>> = vec![None; cols * rows];
    for row in 0..rows {
        for col in 0..cols {
            let point = Point2D::new(
                min.x + col as f64 * ZONE_SAMPLE_STEP,
                min.z + row as f64 * ZONE_SAMPLE_STEP,
            );
            if !bounds.contains(&point) {
                continue;
            }
            let obstacle_clearance = obstacles
                .iter()
                .map(|o| o.clearance_to(&point))
                .fold(f64::INFINITY, f64::min);
            let wall_distance = bounds.distance_to_nearest_wall(&point);
            grades[row * cols + col] = Some(grade_sample(obstacle_clearance, wall_distance));
        }
    }

    // Flood-fill 4-connected clusters of equal quality
    let cell_area = ZONE_SAMPLE_STEP * ZONE_SAMPLE_STEP;
    let mut visited = vec![false; cols * rows];
    let mut zones = Vec::new();

    for start in 0..cols * rows {
        let quality = match grades[start] {
            Some(q) if !visited[start] => q,
            _ => continue,
        };

        let mut stack = vec![start];
        let mut count = 0usize;
        let mut sum_x = 0.0;
        let mut sum_z = 0.0;

        while let Some(idx) = stack.pop() {
            if visited[idx] || grades[idx] != Some(quality) {
                continue;
            }
            visited[idx] = true;
            let col = idx % cols;
            let row = idx / cols;
            count += 1;
            sum_x += min.x + col as f64 * ZONE_SAMPLE_STEP;
            sum_z += min.z + row as f64 * ZONE_SAMPLE_STEP;

            if col > 0 {
                stack.push(idx - 1);
            }
            if col + 1 < cols {
                stack.push(idx + 1);
            }
            if row > 0 {
                stack.push(idx - cols);
            }
            if row + 1 < rows {
                stack.push(idx + cols);
            }
        }

        zones.push(PlacementZone {
            quality,
            center: Point2D::new(sum_x / count as f64, sum_z / count as f64),
            area: count as f64 * cell_area,
        });
    }

    zones
}

/// Measure the clear corridors from each door to the room center and
/// between door pairs
pub fn compute_access_pathways(
    bounds: &RoomBounds,
    doors: &[Opening],
    obstacles: &[Obstacle],
) -> Vec<AccessPathway> {
    let mut pathways = Vec::new();

    for door in doors {
        if let Some(p) = corridor(bounds, &door.position, &bounds.center, obstacles) {
            pathways.push(p);
        }
    }

    for (i, a) in doors.iter().enumerate() {
        for b in doors.iter().skip(i + 1) {
            if let Some(p) = corridor(bounds, &a.position, &b.position, obstacles) {
                pathways.push(p);
            }
        }
    }

    pathways
}

/// Clear width of the straight corridor from `from` to `to`.
///
/// The width is the sum of the left and right lateral clearances: walls are
/// probed by marching perpendicular rays at three stations along the
/// corridor, and each obstacle whose projection falls inside the span
/// constrains its own side.
fn corridor(
    bounds: &RoomBounds,
    from: &Point2D,
    to: &Point2D,
    obstacles: &[Obstacle],
) -> Option<AccessPathway> {
    let length = from.distance_to(to);
    if length < 1e-6 {
        return None;
    }

    let dir_x = (to.x - from.x) / length;
    let dir_z = (to.z - from.z) / length;
    // Perpendicular-left of the corridor direction
    let perp_x = -dir_z;
    let perp_z = dir_x;

    let half_cap = CORRIDOR_MAX_WIDTH / 2.0;
    let mut left = half_cap;
    let mut right = half_cap;

    for t in [0.25, 0.5, 0.75] {
        let station = Point2D::new(from.x + dir_x * length * t, from.z + dir_z * length * t);
        left = left.min(march_to_boundary(bounds, &station, perp_x, perp_z, half_cap));
        right = right.min(march_to_boundary(bounds, &station, -perp_x, -perp_z, half_cap));
    }

    for obstacle in obstacles {
        let rel_x = obstacle.center.x - from.x;
        let rel_z = obstacle.center.z - from.z;
        let along = rel_x * dir_x + rel_z * dir_z;
        if along < 0.0 || along > length {
            continue;
        }
        let lateral = rel_x * perp_x + rel_z * perp_z;
        let clearance = (lateral.abs() - obstacle.half_extent).max(0.0);
        if lateral >= 0.0 {
            left = left.min(clearance);
        } else {
            right = right.min(clearance);
        }
    }

    Some(AccessPathway {
        from: *from,
        to: *to,
        width: (left + right).min(CORRIDOR_MAX_WIDTH),
        length,
    })
}

/// Distance from `start` along `(dx, dz)` until leaving the polygon,
/// capped at `max_distance`
fn march_to_boundary(
    bounds: &RoomBounds,
    start: &Point2D,
    dx: f64,
    dz: f64,
    max_distance: f64,
) -> f64 {
    let mut travelled = 0.0;
    while travelled < max_distance {
        travelled += CORRIDOR_MARCH_STEP;
        let probe = Point2D::new(start.x + dx * travelled, start.z + dz * travelled);
        if !bounds.contains(&probe) {
            return travelled - CORRIDOR_MARCH_STEP;
        }
    }
    max_distance
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use roomplan_core::{BoundingBox, Vec3};

    fn square_snapshot(side: f64) -> MeshSnapshot {
        MeshSnapshot {
            position: Vec3::default(),
            rotation: Vec3::default(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            bounding_box: BoundingBox::new(Vec3::default(), Vec3::new(side, 3.0, side)),
            floor_polygon: vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(side, 0.0),
                Point2D::new(side, side),
                Point2D::new(0.0, side),
            ],
            openings: Vec::new(),
        }
    }

    #[test]
    fn empty_room_has_an_optimal_core() {
        let analyzer = RoomAnalyzer::new();
        let result = analyzer.analyze(&square_snapshot(6.0), &[]).unwrap();
        assert!(result
            .placement_zones
            .iter()
            .any(|z| z.quality == ZoneQuality::Optimal && z.area > 4.0));
    }

    #[test]
    fn obstacles_restrict_their_surroundings() {
        let analyzer = RoomAnalyzer::new();
        let snapshot = square_snapshot(6.0);
        let sofa = SceneObject::new("sofa-1", "sofa", Vec3::new(3.0, 0.0, 3.0));
        let result = analyzer.analyze(&snapshot, &[sofa]).unwrap();
        assert!(result
            .placement_zones
            .iter()
            .any(|z| z.quality == ZoneQuality::Restricted));
    }

    #[test]
    fn door_corridor_in_empty_room_is_wide() {
        let mut snapshot = square_snapshot(6.0);
        snapshot
            .openings
            .push(Opening::door(Point2D::new(3.0, 0.0), 0.9));
        let analyzer = RoomAnalyzer::new();
        let result = analyzer.analyze(&snapshot, &[]).unwrap();
        assert_eq!(result.pathways.len(), 1);
        assert!(result.pathways[0].width > 2.0);
    }

    #[test]
    fn obstacle_beside_corridor_narrows_it() {
        let mut snapshot = square_snapshot(6.0);
        snapshot
            .openings
            .push(Opening::door(Point2D::new(3.0, 0.0), 0.9));
        // Wardrobe close beside the door-to-center corridor
        let wardrobe = SceneObject::new("w-1", "wardrobe", Vec3::new(3.7, 0.0, 1.5));
        let analyzer = RoomAnalyzer::new();
        let open = analyzer.analyze(&snapshot, &[]).unwrap().pathways[0].width;
        let blocked = analyzer.analyze(&snapshot, &[wardrobe]).unwrap().pathways[0].width;
        assert!(blocked < open);
    }

    #[test]
    fn turning_radius_matches_area() {
        let zone = PlacementZone {
            quality: ZoneQuality::Good,
            center: Point2D::new(0.0, 0.0),
            area: std::f64::consts::PI,
        };
        assert_relative_eq!(zone.turning_radius(), 1.0, epsilon = 1e-9);
    }
}
