// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fire-safety validation
//!
//! IBC-referenced egress checks over a room snapshot: egress presence and
//! width, exit capacity against estimated occupant load, corner travel
//! distance and exit separation. Violations are data, not errors.

use crate::constraint::{
    ConstraintKind, Measurement, PlacementConstraint, Regulation, Severity,
};
use crate::error::Result;
use roomplan_core::{FurnitureCatalog, MeshSnapshot, Opening, SceneObject};
use roomplan_geometry::zones::{compute_access_pathways, obstacles_from_objects};
use roomplan_geometry::{analyze_room_geometry, RoomBounds};
use serde::{Deserialize, Serialize};

/// Office occupancy factor, square meters per person
const OCCUPANCY_FACTOR: f64 = 9.3;

/// Minimum clear width of the primary egress, meters
const MIN_PRIMARY_EGRESS_WIDTH: f64 = 1.12;

/// Minimum clear width of a secondary egress, meters
const MIN_SECONDARY_EGRESS_WIDTH: f64 = 0.81;

/// Exit capacity conversion: meters of door width per occupant
const EGRESS_WIDTH_PER_OCCUPANT: f64 = 0.0076;

/// Maximum travel distance from any corner to an exit, meters
const MAX_TRAVEL_DISTANCE: f64 = 76.0;

/// Minimum separation between two exits, meters
const MIN_EXIT_SEPARATION: f64 = 15.0;

/// Occupant load above which a second egress is expected
const SECONDARY_EGRESS_OCCUPANT_THRESHOLD: u32 = 49;

/// Egress metrics derived during validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EgressAnalysis {
    /// Narrowest effective door width, meters; zero when no doors exist
    pub primary_egress_width: f64,
    /// Second-narrowest effective door width, when a second door exists
    pub secondary_egress_width: Option<f64>,
    /// Longest corner-to-nearest-door distance, meters
    pub max_travel_distance: f64,
    /// Total occupants the doors can evacuate
    pub exit_capacity: f64,
    pub occupant_load: u32,
}

/// Result of one fire-safety validation pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FireSafetyValidationResult {
    pub compliant: bool,
    /// Compliance score in [0, 100]
    pub score: f64,
    pub violations: Vec<PlacementConstraint>,
    pub egress_analysis: EgressAnalysis,
    pub recommendations: Vec<String>,
}

/// Fire-safety validator. Stateless; construct once and reuse.
pub struct FireSafetyValidator {
    catalog: FurnitureCatalog,
}

impl FireSafetyValidator {
    pub fn new() -> Self {
        Self {
            catalog: FurnitureCatalog::new(),
        }
    }

    /// Validate a room's egress situation against its placed furniture
    pub fn validate_fire_safety(
        &self,
        room: &MeshSnapshot,
        objects: &[SceneObject],
        room_id: &str,
    ) -> Result<FireSafetyValidationResult> {
        let bounds = analyze_room_geometry(&room.floor_polygon)?;
        let occupant_load = (bounds.area / OCCUPANCY_FACTOR).ceil() as u32;
        let doors: Vec<Opening> = room.doors().cloned().collect();

        let mut violations = Vec::new();
        let mut recommendations = Vec::new();

        if doors.is_empty() {
            violations.push(
                PlacementConstraint::new(
                    format!("fire-{room_id}-no-egress"),
                    ConstraintKind::Safety,
                    Severity::Error,
                    "room has no egress doors",
                )
                .regulated(Regulation::ibc("IBC 1006.2")),
            );

            let egress_analysis = EgressAnalysis {
                primary_egress_width: 0.0,
                secondary_egress_width: None,
                max_travel_distance: 0.0,
                exit_capacity: 0.0,
                occupant_load,
            };
            return Ok(finish(violations, recommendations, egress_analysis));
        }

        let widths = effective_widths(&bounds, &doors, objects, &self.catalog);
        let primary_egress_width = widths.iter().copied().fold(f64::INFINITY, f64::min);
        let secondary_egress_width = second_narrowest(&widths);

        if primary_egress_width < MIN_PRIMARY_EGRESS_WIDTH {
            violations.push(
                PlacementConstraint::new(
                    format!("fire-{room_id}-egress-width"),
                    ConstraintKind::Safety,
                    Severity::Error,
                    format!(
                        "primary egress width {:.2} m is below the {:.2} m minimum",
                        primary_egress_width, MIN_PRIMARY_EGRESS_WIDTH
                    ),
                )
                .measured(Measurement::meters(
                    primary_egress_width,
                    MIN_PRIMARY_EGRESS_WIDTH,
                ))
                .regulated(Regulation::ibc("IBC 1005.1")),
            );
        }

        if occupant_load > SECONDARY_EGRESS_OCCUPANT_THRESHOLD {
            match secondary_egress_width {
                None => recommendations.push(format!(
                    "occupant load {occupant_load} exceeds {SECONDARY_EGRESS_OCCUPANT_THRESHOLD}; \
                     provide a second egress door"
                )),
                Some(width) if width < MIN_SECONDARY_EGRESS_WIDTH => violations.push(
                    PlacementConstraint::new(
                        format!("fire-{room_id}-secondary-egress"),
                        ConstraintKind::Safety,
                        Severity::Warning,
                        format!(
                            "secondary egress width {:.2} m is below the {:.2} m minimum",
                            width, MIN_SECONDARY_EGRESS_WIDTH
                        ),
                    )
                    .measured(Measurement::meters(width, MIN_SECONDARY_EGRESS_WIDTH))
                    .regulated(Regulation::ibc("IBC 1006.2")),
                ),
                Some(_) => {}
            }
        }

        let exit_capacity: f64 = doors
            .iter()
            .map(|d| d.width / EGRESS_WIDTH_PER_OCCUPANT)
            .sum();
        if exit_capacity < occupant_load as f64 {
            violations.push(
                PlacementConstraint::new(
                    format!("fire-{room_id}-exit-capacity"),
                    ConstraintKind::Safety,
                    Severity::Error,
                    format!(
                        "exit capacity {:.0} persons is below the occupant load {}",
                        exit_capacity, occupant_load
                    ),
                )
                .regulated(Regulation::ibc("IBC 1005.1")),
            );
        }

        let mut max_travel_distance = 0.0f64;
        for (i, corner) in bounds.corners.iter().enumerate() {
            let travel = doors
                .iter()
                .map(|d| corner.distance_to(&d.position))
                .fold(f64::INFINITY, f64::min);
            max_travel_distance = max_travel_distance.max(travel);
            if travel > MAX_TRAVEL_DISTANCE {
                violations.push(
                    PlacementConstraint::new(
                        format!("fire-{room_id}-travel-{i}"),
                        ConstraintKind::Safety,
                        Severity::Error,
                        format!(
                            "travel distance {:.1} m from corner {} exceeds the {:.0} m limit",
                            travel, i, MAX_TRAVEL_DISTANCE
                        ),
                    )
                    .measured(Measurement::meters(travel, MAX_TRAVEL_DISTANCE))
                    .regulated(Regulation::ibc("IBC 1017.2")),
                );
            }
        }

        if doors.len() >= 2 {
            for (i, a) in doors.iter().enumerate() {
                for (j, b) in doors.iter().enumerate().skip(i + 1) {
                    let separation = a.position.distance_to(&b.position);
                    if separation < MIN_EXIT_SEPARATION {
                        violations.push(
                            PlacementConstraint::new(
                                format!("fire-{room_id}-separation-{i}-{j}"),
                                ConstraintKind::Safety,
                                Severity::Warning,
                                format!(
                                    "exits {i} and {j} are {:.1} m apart, below the {:.0} m separation",
                                    separation, MIN_EXIT_SEPARATION
                                ),
                            )
                            .measured(Measurement::meters(separation, MIN_EXIT_SEPARATION))
                            .regulated(Regulation::ibc("IBC 1007.1.1")),
                        );
                    }
                }
            }
        }

        if !doors.iter().any(|d| d.is_fire_exit) {
            recommendations.push("mark at least one door as a designated fire exit".to_string());
        }

        let egress_analysis = EgressAnalysis {
            primary_egress_width,
            secondary_egress_width,
            max_travel_distance,
            exit_capacity,
            occupant_load,
        };
        Ok(finish(violations, recommendations, egress_analysis))
    }
}

impl Default for FireSafetyValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Effective width per door: the door leaf capped by its approach corridor
fn effective_widths(
    bounds: &RoomBounds,
    doors: &[Opening],
    objects: &[SceneObject],
    catalog: &FurnitureCatalog,
) -> Vec<f64> {
    let obstacles = obstacles_from_objects(objects, catalog);
    let pathways = compute_access_pathways(bounds, doors, &obstacles);

    doors
        .iter()
        .map(|door| {
            let corridor = door.associated_pathway_width.or_else(|| {
                pathways
                    .iter()
                    .find(|p| {
                        p.from.distance_to(&door.position) < 1e-9
                            && p.to.distance_to(&bounds.center) < 1e-9
                    })
                    .map(|p| p.width)
            });
            corridor.map_or(door.width, |w| door.width.min(w))
        })
        .collect()
}

/// Second-smallest width, when at least two doors exist
fn second_narrowest(widths: &[f64]) -> Option<f64> {
    if widths.len() < 2 {
        return None;
    }
    let mut sorted = widths.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(sorted[1])
}

/// Score and package the result
fn finish(
    violations: Vec<PlacementConstraint>,
    recommendations: Vec<String>,
    egress_analysis: EgressAnalysis,
) -> FireSafetyValidationResult {
    let critical = violations
        .iter()
        .filter(|v| v.severity == Severity::Error)
        .count();
    let warnings = violations
        .iter()
        .filter(|v| v.severity == Severity::Warning)
        .count();
    let score = (100.0 - 30.0 * critical as f64 - 15.0 * warnings as f64).max(0.0);

    FireSafetyValidationResult {
        compliant: critical == 0,
        score,
        violations,
        egress_analysis,
        recommendations,
    }
}
