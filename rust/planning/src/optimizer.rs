// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Space optimizer
//!
//! Computes how many instances of a furniture type fit a room and where to
//! put them: builds the placement grid, filters valid cells, orders them by
//! the selected strategy and greedily accepts non-conflicting placements.
//! Deterministic for identical inputs and object ordering.

use crate::error::{Error, Result};
use crate::grid::{Footprint, GridCell, PlacementGrid, MIN_OCCUPANCY_PADDING};
use roomplan_core::{FurnitureCatalog, Point2D, SceneObject, Vec3};
use roomplan_geometry::RoomBounds;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};

/// Layouts accepted closer than this to existing furniture draw a warning
const EXISTING_PROXIMITY_WARNING: f64 = 1.0;

/// Required access zones smaller than this radius draw an accessibility
/// warning
const ACCESS_ZONE_MIN_RADIUS: f64 = 0.9;

/// Efficiency above this reads as an overly dense arrangement
const DENSITY_WARNING_THRESHOLD: f64 = 0.8;

/// Per-type optimization configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OptimizationConfig {
    pub min_clearance: f64,
    pub access_clearance: f64,
    pub wall_offset: f64,
    pub corner_usage: bool,
    pub grouping: bool,
    /// Grid spacing in meters; finer grids trade compute for fidelity
    pub grid_resolution: f64,
}

impl OptimizationConfig {
    /// Generic fallback for types without registered defaults
    pub const fn generic() -> Self {
        Self {
            min_clearance: 0.5,
            access_clearance: 0.8,
            wall_offset: 0.2,
            corner_usage: false,
            grouping: false,
            grid_resolution: 0.2,
        }
    }

    /// Registered per-type defaults, if any
    pub fn for_type(object_type: &str) -> Option<Self> {
        let cfg = match object_type.to_ascii_lowercase().as_str() {
            "chair" => Self {
                min_clearance: 0.2,
                access_clearance: 0.6,
                wall_offset: 0.1,
                corner_usage: true,
                grouping: true,
                grid_resolution: 0.2,
            },
            "desk" => Self {
                min_clearance: 0.5,
                access_clearance: 1.2,
                wall_offset: 0.05,
                corner_usage: true,
                grouping: false,
                grid_resolution: 0.2,
            },
            "table" => Self {
                min_clearance: 0.6,
                access_clearance: 0.9,
                wall_offset: 0.4,
                corner_usage: false,
                grouping: false,
                grid_resolution: 0.3,
            },
            "sofa" => Self {
                min_clearance: 0.4,
                access_clearance: 0.8,
                wall_offset: 0.05,
                corner_usage: true,
                grouping: false,
                grid_resolution: 0.3,
            },
            "armchair" => Self {
                min_clearance: 0.3,
                access_clearance: 0.7,
                wall_offset: 0.1,
                corner_usage: true,
                grouping: false,
                grid_resolution: 0.2,
            },
            "bed" => Self {
                min_clearance: 0.5,
                access_clearance: 0.75,
                wall_offset: 0.05,
                corner_usage: true,
                grouping: false,
                grid_resolution: 0.3,
            },
            "bookcase" => Self {
                min_clearance: 0.1,
                access_clearance: 0.75,
                wall_offset: 0.0,
                corner_usage: true,
                grouping: true,
                grid_resolution: 0.2,
            },
            "wardrobe" => Self {
                min_clearance: 0.1,
                access_clearance: 0.9,
                wall_offset: 0.0,
                corner_usage: true,
                grouping: false,
                grid_resolution: 0.3,
            },
            "nightstand" => Self {
                min_clearance: 0.05,
                access_clearance: 0.4,
                wall_offset: 0.0,
                corner_usage: true,
                grouping: true,
                grid_resolution: 0.2,
            },
            "tv" => Self {
                min_clearance: 0.1,
                access_clearance: 0.5,
                wall_offset: 0.0,
                corner_usage: false,
                grouping: false,
                grid_resolution: 0.2,
            },
            _ => return None,
        };
        Some(cfg)
    }

    /// Conflict radius used for occupancy padding
    pub fn conflict_radius(&self) -> f64 {
        self.min_clearance.max(self.access_clearance)
    }

    fn validate(&self) -> Result<()> {
        if self.min_clearance < 0.0 || self.access_clearance < 0.0 {
            return Err(Error::InvalidConfig(
                "clearances must be non-negative".to_string(),
            ));
        }
        if self.grid_resolution <= 0.0 {
            return Err(Error::InvalidConfig(
                "grid resolution must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial override of [`OptimizationConfig`] fields
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OptimizationOverrides {
    pub min_clearance: Option<f64>,
    pub access_clearance: Option<f64>,
    pub wall_offset: Option<f64>,
    pub corner_usage: Option<bool>,
    pub grouping: Option<bool>,
    pub grid_resolution: Option<f64>,
}

impl OptimizationOverrides {
    fn apply(&self, mut config: OptimizationConfig) -> OptimizationConfig {
        if let Some(v) = self.min_clearance {
            config.min_clearance = v;
        }
        if let Some(v) = self.access_clearance {
            config.access_clearance = v;
        }
        if let Some(v) = self.wall_offset {
            config.wall_offset = v;
        }
        if let Some(v) = self.corner_usage {
            config.corner_usage = v;
        }
        if let Some(v) = self.grouping {
            config.grouping = v;
        }
        if let Some(v) = self.grid_resolution {
            config.grid_resolution = v;
        }
        config
    }
}

/// Candidate ordering strategy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PlacementStrategy {
    /// Pack as many as possible: corners and walls first
    Maximize,
    /// Prefer the most breathing room per placement
    Comfort,
    /// Prefer placements away from the room center
    Ergonomic,
    /// Balanced spread around the median center distance
    Aesthetic,
}

impl PlacementStrategy {
    pub const ALL: [PlacementStrategy; 4] = [
        PlacementStrategy::Maximize,
        PlacementStrategy::Comfort,
        PlacementStrategy::Ergonomic,
        PlacementStrategy::Aesthetic,
    ];
}

/// Kind of access zone around a placement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccessZoneKind {
    Front,
    Back,
    Side,
    Corner,
}

/// Clear space reserved around a placement for using the object
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AccessZone {
    pub center: Point2D,
    pub radius: f64,
    pub kind: AccessZoneKind,
    pub required: bool,
}

/// One accepted placement decision. Immutable once accepted; later
/// candidates must keep their distance from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementLayout {
    pub id: String,
    pub position: Vec3,
    /// Yaw in radians; zero faces +z
    pub rotation: f64,
    pub clearance_radius: f64,
    pub access_zones: SmallVec<[AccessZone; 4]>,
    pub group_id: Option<String>,
}

/// Result of one optimization pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub max_objects: usize,
    pub layouts: Vec<PlacementLayout>,
    /// Fraction of usable area covered by placement clearance discs, in [0, 1]
    pub efficiency: f64,
    pub warnings: Vec<String>,
    pub alternative_layouts: Option<Vec<AlternativeLayout>>,
}

/// One alternative-strategy comparison run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlternativeLayout {
    pub strategy: PlacementStrategy,
    pub max_objects: usize,
    pub efficiency: f64,
    pub layouts: Vec<PlacementLayout>,
}

/// The placement engine. Stateless; construct once and reuse.
pub struct SpaceOptimizer {
    catalog: FurnitureCatalog,
}

impl SpaceOptimizer {
    pub fn new() -> Self {
        Self {
            catalog: FurnitureCatalog::new(),
        }
    }

    /// Compute placements for `object_type` in the given room.
    ///
    /// Existing objects block grid cells and draw proximity warnings but are
    /// never moved.
    pub fn optimize_space(
        &self,
        room: &RoomBounds,
        object_type: &str,
        strategy: PlacementStrategy,
        overrides: Option<&OptimizationOverrides>,
        existing: &[SceneObject],
    ) -> Result<OptimizationResult> {
        let base = OptimizationConfig::for_type(object_type).unwrap_or_else(|| {
            warn!(object_type, "no optimization defaults registered, using generic fallback");
            OptimizationConfig::generic()
        });
        let config = overrides.map_or(base, |o| o.apply(base));
        config.validate()?;

        let footprints = self.footprints(existing, &config);
        let grid = PlacementGrid::build(room, &config, &footprints);
        debug!(
            columns = grid.columns,
            rows = grid.rows,
            valid = grid.valid_cells().count(),
            "placement grid built"
        );

        let layouts = select_layouts(&grid, room, &config, strategy, object_type);
        let efficiency = coverage_efficiency(&layouts, room.usable_area);
        let warnings = collect_warnings(&layouts, efficiency, existing);

        let alternative_layouts = Some(
            PlacementStrategy::ALL
                .iter()
                .filter(|s| **s != strategy)
                .map(|s| {
                    let alt = select_layouts(&grid, room, &config, *s, object_type);
                    let alt_efficiency = coverage_efficiency(&alt, room.usable_area);
                    AlternativeLayout {
                        strategy: *s,
                        max_objects: alt.len(),
                        efficiency: alt_efficiency,
                        layouts: alt,
                    }
                })
                .collect(),
        );

        Ok(OptimizationResult {
            max_objects: layouts.len(),
            layouts,
            efficiency,
            warnings,
            alternative_layouts,
        })
    }

    /// Padded axis-aligned footprints of the existing furniture; room
    /// objects (carrying a floor polygon) are not obstacles
    fn footprints(&self, existing: &[SceneObject], config: &OptimizationConfig) -> Vec<Footprint> {
        let padding = config.min_clearance.max(MIN_OCCUPANCY_PADDING);
        existing
            .iter()
            .filter(|o| {
                o.extensions
                    .as_ref()
                    .map_or(true, |ext| ext.floor_polygon.is_none())
            })
            .map(|o| {
                let dims = self.catalog.dimensions_for(o);
                Footprint::new(o.position.floor_point(), dims.width, dims.depth, padding)
            })
            .collect()
    }
}

impl Default for SpaceOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Order valid cells by strategy and greedily accept non-conflicting ones
fn select_layouts(
    grid: &PlacementGrid,
    room: &RoomBounds,
    config: &OptimizationConfig,
    strategy: PlacementStrategy,
    object_type: &str,
) -> Vec<PlacementLayout> {
    let mut candidates: Vec<&GridCell> = grid.valid_cells().collect();
    sort_candidates(&mut candidates, room, strategy);

    let directional = config.access_clearance > config.min_clearance;
    let group_id = config
        .grouping
        .then(|| format!("{}-group", object_type.to_ascii_lowercase()));

    let mut layouts: Vec<PlacementLayout> = Vec::new();
    for cell in candidates {
        let conflict = layouts.iter().any(|accepted| {
            let distance = accepted.position.floor_point().distance_to(&cell.position);
            distance < accepted.clearance_radius + cell.clearance_radius
        });
        if conflict {
            continue;
        }

        let rotation = if directional {
            face_toward(&cell.position, &room.center)
        } else {
            0.0
        };

        layouts.push(PlacementLayout {
            id: format!("{}-{}", object_type.to_ascii_lowercase(), layouts.len() + 1),
            position: Vec3::new(cell.position.x, 0.0, cell.position.z),
            rotation,
            clearance_radius: cell.clearance_radius,
            access_zones: access_zones(&cell.position, rotation, config),
            group_id: group_id.clone(),
        });
    }

    layouts
}

/// Strategy-specific candidate ordering. All comparisons end on the grid
/// index so the order is total and deterministic.
fn sort_candidates(candidates: &mut [&GridCell], room: &RoomBounds, strategy: PlacementStrategy) {
    let index = |c: &GridCell| (c.grid_z, c.grid_x);
    match strategy {
        PlacementStrategy::Maximize => {
            candidates.sort_by(|a, b| {
                b.is_corner
                    .cmp(&a.is_corner)
                    .then(a.distance_to_wall.total_cmp(&b.distance_to_wall))
                    .then(index(a).cmp(&index(b)))
            });
        }
        PlacementStrategy::Comfort => {
            candidates.sort_by(|a, b| {
                b.clearance_radius
                    .total_cmp(&a.clearance_radius)
                    .then(index(a).cmp(&index(b)))
            });
        }
        PlacementStrategy::Ergonomic => {
            candidates.sort_by(|a, b| {
                let da = a.position.distance_to(&room.center);
                let db = b.position.distance_to(&room.center);
                db.total_cmp(&da).then(index(a).cmp(&index(b)))
            });
        }
        PlacementStrategy::Aesthetic => {
            let mut distances: Vec<f64> = candidates
                .iter()
                .map(|c| c.position.distance_to(&room.center))
                .collect();
            distances.sort_by(f64::total_cmp);
            let median = if distances.is_empty() {
                0.0
            } else {
                distances[distances.len() / 2]
            };
            candidates.sort_by(|a, b| {
                let da = (a.position.distance_to(&room.center) - median).abs();
                let db = (b.position.distance_to(&room.center) - median).abs();
                da.total_cmp(&db).then(index(a).cmp(&index(b)))
            });
        }
    }
}

/// Yaw that points an object's forward vector (+z at zero yaw) at `target`
fn face_toward(position: &Point2D, target: &Point2D) -> f64 {
    (target.x - position.x).atan2(target.z - position.z)
}

/// Front and side access zones for one placement
fn access_zones(
    position: &Point2D,
    rotation: f64,
    config: &OptimizationConfig,
) -> SmallVec<[AccessZone; 4]> {
    let mut zones = SmallVec::new();
    let forward = (rotation.sin(), rotation.cos());
    let left = (forward.1, -forward.0);

    if config.access_clearance > 0.0 {
        let half = config.access_clearance / 2.0;
        zones.push(AccessZone {
            center: Point2D::new(position.x + forward.0 * half, position.z + forward.1 * half),
            radius: half,
            kind: AccessZoneKind::Front,
            required: true,
        });
    }
    if config.min_clearance > 0.0 {
        let half = config.min_clearance / 2.0;
        for side in [(left.0, left.1), (-left.0, -left.1)] {
            zones.push(AccessZone {
                center: Point2D::new(position.x + side.0 * half, position.z + side.1 * half),
                radius: half,
                kind: AccessZoneKind::Side,
                required: false,
            });
        }
    }
    zones
}

/// Coverage efficiency: clearance-disc area over usable floor area
fn coverage_efficiency(layouts: &[PlacementLayout], usable_area: f64) -> f64 {
    if layouts.is_empty() {
        return 0.0;
    }
    if usable_area <= 0.0 {
        return 1.0;
    }
    let covered: f64 = layouts
        .iter()
        .map(|l| std::f64::consts::PI * l.clearance_radius * l.clearance_radius)
        .sum();
    (covered / usable_area).min(1.0)
}

fn collect_warnings(
    layouts: &[PlacementLayout],
    efficiency: f64,
    existing: &[SceneObject],
) -> Vec<String> {
    let mut warnings = Vec::new();

    if layouts.is_empty() {
        let mut message =
            "no valid placements found: room too small or constraints too strict".to_string();
        if !existing.is_empty() {
            message.push_str("; existing furniture further restricts placement");
        }
        warnings.push(message);
        return warnings;
    }

    if efficiency > DENSITY_WARNING_THRESHOLD {
        warnings.push(format!(
            "layout uses {:.0}% of usable area; the arrangement may feel dense",
            efficiency * 100.0
        ));
    }

    if layouts.iter().any(|l| {
        l.access_zones
            .iter()
            .any(|z| z.required && z.radius < ACCESS_ZONE_MIN_RADIUS)
    }) {
        warnings.push(format!(
            "some required access zones are narrower than {:.2} m; approach may be restricted",
            ACCESS_ZONE_MIN_RADIUS
        ));
    }

    let crowded = layouts.iter().any(|l| {
        existing
            .iter()
            .any(|o| l.position.floor_distance_to(&o.position) < EXISTING_PROXIMITY_WARNING)
    });
    if crowded {
        warnings.push(format!(
            "some placements sit within {:.1} m of existing furniture",
            EXISTING_PROXIMITY_WARNING
        ));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomplan_geometry::analyze_room_geometry;

    fn square_room(side: f64) -> RoomBounds {
        analyze_room_geometry(&[
            Point2D::new(0.0, 0.0),
            Point2D::new(side, 0.0),
            Point2D::new(side, side),
            Point2D::new(0.0, side),
        ])
        .unwrap()
    }

    #[test]
    fn unknown_type_uses_generic_fallback() {
        let optimizer = SpaceOptimizer::new();
        let room = square_room(5.0);
        let result = optimizer
            .optimize_space(
                &room,
                "hologram projector",
                PlacementStrategy::Maximize,
                None,
                &[],
            )
            .unwrap();
        // Generic config still yields placements in a 5x5 room
        assert!(result.max_objects > 0);
    }

    #[test]
    fn overrides_apply_over_defaults() {
        let base = OptimizationConfig::for_type("chair").unwrap();
        let overrides = OptimizationOverrides {
            min_clearance: Some(0.4),
            grid_resolution: Some(0.25),
            ..Default::default()
        };
        let cfg = overrides.apply(base);
        assert_eq!(cfg.min_clearance, 0.4);
        assert_eq!(cfg.grid_resolution, 0.25);
        assert_eq!(cfg.access_clearance, base.access_clearance);
    }

    #[test]
    fn negative_clearance_is_rejected() {
        let optimizer = SpaceOptimizer::new();
        let room = square_room(5.0);
        let overrides = OptimizationOverrides {
            min_clearance: Some(-1.0),
            ..Default::default()
        };
        assert!(optimizer
            .optimize_space(
                &room,
                "chair",
                PlacementStrategy::Maximize,
                Some(&overrides),
                &[],
            )
            .is_err());
    }

    #[test]
    fn accepted_layouts_never_overlap() {
        let optimizer = SpaceOptimizer::new();
        let room = square_room(5.0);
        for strategy in PlacementStrategy::ALL {
            let result = optimizer
                .optimize_space(&room, "chair", strategy, None, &[])
                .unwrap();
            for (i, a) in result.layouts.iter().enumerate() {
                for b in result.layouts.iter().skip(i + 1) {
                    let distance = a.position.floor_distance_to(&b.position);
                    assert!(
                        distance + 1e-9 >= a.clearance_radius + b.clearance_radius,
                        "layouts {} and {} overlap at distance {distance}",
                        a.id,
                        b.id
                    );
                }
            }
        }
    }

    #[test]
    fn efficiency_stays_in_unit_range() {
        let optimizer = SpaceOptimizer::new();
        for side in [2.0, 3.0, 5.0, 8.0] {
            let room = square_room(side);
            let result = optimizer
                .optimize_space(&room, "chair", PlacementStrategy::Comfort, None, &[])
                .unwrap();
            assert!(result.efficiency >= 0.0 && result.efficiency <= 1.0);
        }
    }

    #[test]
    fn tiny_room_reports_no_placements() {
        let optimizer = SpaceOptimizer::new();
        let room = square_room(0.6);
        let result = optimizer
            .optimize_space(&room, "table", PlacementStrategy::Maximize, None, &[])
            .unwrap();
        assert_eq!(result.max_objects, 0);
        assert!(result.warnings.iter().any(|w| w.contains("no valid placements")));
    }

    #[test]
    fn directional_furniture_faces_the_center() {
        let optimizer = SpaceOptimizer::new();
        let room = square_room(6.0);
        let result = optimizer
            .optimize_space(&room, "desk", PlacementStrategy::Maximize, None, &[])
            .unwrap();
        for layout in &result.layouts {
            let expected = face_toward(&layout.position.floor_point(), &room.center);
            assert!((layout.rotation - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn alternative_layouts_cover_other_strategies() {
        let optimizer = SpaceOptimizer::new();
        let room = square_room(5.0);
        let result = optimizer
            .optimize_space(&room, "chair", PlacementStrategy::Maximize, None, &[])
            .unwrap();
        let alternatives = result.alternative_layouts.unwrap();
        assert_eq!(alternatives.len(), 3);
        assert!(alternatives
            .iter()
            .all(|a| a.strategy != PlacementStrategy::Maximize));
    }

    #[test]
    fn existing_furniture_keeps_its_padded_footprint_clear() {
        let optimizer = SpaceOptimizer::new();
        let room = square_room(5.0);
        let existing = vec![SceneObject::new(
            "table-1",
            "table",
            Vec3::new(2.5, 0.0, 2.5),
        )];
        let result = optimizer
            .optimize_space(&room, "chair", PlacementStrategy::Maximize, None, &existing)
            .unwrap();
        assert!(result.max_objects > 0);
        // Table is 1.4 x 0.8, padded by max(min_clearance, 0.3) on each side
        for layout in &result.layouts {
            let dx = (layout.position.x - 2.5).abs();
            let dz = (layout.position.z - 2.5).abs();
            assert!(
                dx > 1.0 || dz > 0.7,
                "{} landed inside the occupied footprint",
                layout.id
            );
        }
    }
}
