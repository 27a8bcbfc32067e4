// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement constraint validation
//!
//! Validates a full room arrangement against wall/object clearance, ADA
//! accessibility, fire egress and ergonomic rules, producing a scored report
//! of typed constraint records.

use crate::constraint::{
    ConstraintKind, Measurement, PlacementConstraint, Regulation, RequiredAction, Severity,
};
use crate::error::Result;
use crate::fire_safety::{FireSafetyValidationResult, FireSafetyValidator};
use roomplan_core::{FurnitureCatalog, FurnitureCategory, MeshSnapshot, Point2D, SceneObject};
use roomplan_geometry::zones::{obstacles_from_objects, Obstacle, ZoneQuality};
use roomplan_geometry::{RoomAnalyzer, RoomBounds};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// ADA minimum clear pathway width, meters
const ADA_PATHWAY_WIDTH: f64 = 0.91;

/// Below this pathway width the violation is an error rather than a warning
const ADA_PATHWAY_ERROR_WIDTH: f64 = 0.81;

/// Minimum equivalent turning radius for maneuvering space, meters
const MIN_TURNING_RADIUS: f64 = 0.76;

/// Minimum front reach clearance for work surfaces and appliances, meters
const MIN_REACH_CLEARANCE: f64 = 0.76;

/// Wall clearance required of wall-mounted types, meters
const WALL_MOUNT_CLEARANCE: f64 = 0.05;

/// Desk-to-chair distances beyond this draw an ergonomic suggestion
const DESK_CHAIR_PAIR_DISTANCE: f64 = 1.5;

/// Seating farther than this from the nearest window draws a suggestion
const SEATING_WINDOW_DISTANCE: f64 = 3.0;

/// Accessibility digest of a validation pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessibilityReport {
    pub ada_compliant: bool,
    /// Narrowest measured pathway, when the room has any doors
    pub narrowest_pathway: Option<f64>,
    pub turning_space_ok: bool,
}

/// Safety digest wrapping the fire validation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyReport {
    pub egress_compliant: bool,
    pub fire: FireSafetyValidationResult,
}

/// Ergonomics digest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErgonomicsReport {
    /// Workflow efficiency in [0, 100], fed back into the overall score
    pub workflow_efficiency: f64,
}

/// Scored validation report for one room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementValidationResult {
    /// No error-severity violations present
    pub is_valid: bool,
    /// Overall score in [0, 100]
    pub score: f64,
    pub violations: Vec<PlacementConstraint>,
    pub warnings: Vec<PlacementConstraint>,
    pub suggestions: Vec<PlacementConstraint>,
    pub accessibility: AccessibilityReport,
    pub safety: SafetyReport,
    pub ergonomics: ErgonomicsReport,
}

/// The constraint validator. Stateless; construct once and reuse.
pub struct PlacementValidator {
    catalog: FurnitureCatalog,
    analyzer: RoomAnalyzer,
    fire: FireSafetyValidator,
}

impl PlacementValidator {
    pub fn new() -> Self {
        Self {
            catalog: FurnitureCatalog::new(),
            analyzer: RoomAnalyzer::new(),
            fire: FireSafetyValidator::new(),
        }
    }

    /// Validate the placements of a room.
    ///
    /// `focus` narrows the per-object and pairwise checks to the named
    /// objects; room-level checks (pathways, egress) always run in full.
    pub fn validate_placement(
        &self,
        room: &MeshSnapshot,
        objects: &[SceneObject],
        room_id: &str,
        focus: Option<&[String]>,
    ) -> Result<PlacementValidationResult> {
        let analysis = self.analyzer.analyze(room, objects)?;
        let bounds = &analysis.bounds;
        let furniture: Vec<&SceneObject> = objects
            .iter()
            .filter(|o| {
                o.extensions
                    .as_ref()
                    .map_or(true, |ext| ext.floor_polygon.is_none())
            })
            .collect();
        let in_focus = |o: &SceneObject| focus.map_or(true, |ids| ids.iter().any(|id| *id == o.id));

        let mut violations = Vec::new();
        let mut warnings = Vec::new();
        let mut suggestions = Vec::new();

        // Wall clearance per object
        for object in furniture.iter().filter(|o| in_focus(o)) {
            if let Some(v) = self.check_wall_clearance(bounds, object) {
                violations.push(v);
            }
        }

        // Pairwise object clearance
        for (i, a) in furniture.iter().enumerate() {
            for b in furniture.iter().skip(i + 1) {
                if !in_focus(a) && !in_focus(b) {
                    continue;
                }
                if let Some(v) = self.check_object_clearance(a, b) {
                    violations.push(v);
                }
            }
        }

        // ADA pathway width
        let mut narrowest_pathway: Option<f64> = None;
        for pathway in &analysis.pathways {
            narrowest_pathway =
                Some(narrowest_pathway.map_or(pathway.width, |w: f64| w.min(pathway.width)));
            if pathway.width < ADA_PATHWAY_WIDTH {
                let severity = if pathway.width < ADA_PATHWAY_ERROR_WIDTH {
                    Severity::Error
                } else {
                    Severity::Warning
                };
                violations.push(
                    PlacementConstraint::new(
                        format!("ada-{room_id}-pathway-{}", violations.len()),
                        ConstraintKind::Accessibility,
                        severity,
                        format!(
                            "accessibility pathway is {:.2} m wide, below the {:.2} m ADA minimum",
                            pathway.width, ADA_PATHWAY_WIDTH
                        ),
                    )
                    .at(roomplan_core::Vec3::from(pathway.from))
                    .action(RequiredAction::Move)
                    .measured(Measurement::meters(pathway.width, ADA_PATHWAY_WIDTH))
                    .regulated(Regulation::ada("ADA 403.5.1")),
                );
            }
        }

        // Maneuvering space over usable placement zones
        let mut turning_space_ok = true;
        for zone in analysis
            .placement_zones
            .iter()
            .filter(|z| matches!(z.quality, ZoneQuality::Optimal | ZoneQuality::Good))
        {
            let radius = zone.turning_radius();
            if radius < MIN_TURNING_RADIUS {
                turning_space_ok = false;
                warnings.push(
                    PlacementConstraint::new(
                        format!("ada-{room_id}-turning-{}", warnings.len()),
                        ConstraintKind::Accessibility,
                        Severity::Warning,
                        format!(
                            "placement zone turning radius {:.2} m is below the {:.2} m minimum",
                            radius, MIN_TURNING_RADIUS
                        ),
                    )
                    .at(roomplan_core::Vec3::from(zone.center))
                    .measured(Measurement::meters(radius, MIN_TURNING_RADIUS))
                    .regulated(Regulation::ada("ADA 304.3")),
                );
            }
        }

        // Front reach for work surfaces and appliances
        let obstacles = obstacles_from_objects(objects, &self.catalog);
        for object in furniture.iter().filter(|o| in_focus(o)) {
            let spec = self.catalog.spec(&object.object_type);
            if !matches!(
                spec.category,
                FurnitureCategory::WorkSurface | FurnitureCategory::Appliance
            ) {
                continue;
            }
            let reach = front_reach(bounds, object, &obstacles, &self.catalog);
            if reach < MIN_REACH_CLEARANCE {
                warnings.push(
                    PlacementConstraint::new(
                        format!("reach-{}", object.id),
                        ConstraintKind::Ergonomic,
                        Severity::Warning,
                        format!(
                            "{} has {:.2} m of front reach, below the {:.2} m minimum",
                            object.id, reach, MIN_REACH_CLEARANCE
                        ),
                    )
                    .with_objects([object.id.clone()])
                    .at(object.position)
                    .action(RequiredAction::Move)
                    .measured(Measurement::meters(reach, MIN_REACH_CLEARANCE)),
                );
            }
        }

        // Fire egress, merged into the violation list
        let fire = self
            .fire
            .validate_fire_safety(room, objects, room_id)?;
        violations.extend(fire.violations.iter().cloned());

        // Ergonomic suggestions and workflow efficiency
        let workflow_efficiency =
            self.ergonomic_suggestions(room, &furniture, &mut suggestions);

        let error_count = violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
            .count();
        let warning_violations = violations
            .iter()
            .filter(|v| v.severity == Severity::Warning)
            .count();

        let ada_compliant = !violations
            .iter()
            .any(|v| v.kind == ConstraintKind::Accessibility && v.severity == Severity::Error);

        let mut score = 100.0
            - 25.0 * error_count as f64
            - 10.0 * warning_violations as f64
            - 5.0 * warnings.len() as f64;
        if !ada_compliant {
            score -= 20.0;
        }
        if !fire.compliant {
            score -= 15.0;
        }
        score += 0.1 * workflow_efficiency;
        let score = score.clamp(0.0, 100.0);

        debug!(
            room_id,
            score,
            violations = violations.len(),
            "placement validation finished"
        );

        Ok(PlacementValidationResult {
            is_valid: error_count == 0,
            score,
            accessibility: AccessibilityReport {
                ada_compliant,
                narrowest_pathway,
                turning_space_ok,
            },
            safety: SafetyReport {
                egress_compliant: fire.compliant,
                fire,
            },
            ergonomics: ErgonomicsReport {
                workflow_efficiency,
            },
            violations,
            warnings,
            suggestions,
        })
    }

    /// Wall clearance for one object: wall-mounted types only need their
    /// mounting gap, everything else needs its back clearance
    fn check_wall_clearance(
        &self,
        bounds: &RoomBounds,
        object: &SceneObject,
    ) -> Option<PlacementConstraint> {
        let spec = self.catalog.spec(&object.object_type);
        let dims = self.catalog.dimensions_for(object);
        let required = if spec.wall_mount {
            WALL_MOUNT_CLEARANCE
        } else {
            spec.back_clearance.max(0.3)
        };

        let wall_distance =
            (bounds.distance_to_nearest_wall(&object.position.floor_point()) - dims.depth / 2.0)
                .max(0.0);
        if wall_distance >= required {
            return None;
        }

        let severity = if wall_distance < required * 0.7 {
            Severity::Error
        } else {
            Severity::Warning
        };
        Some(
            PlacementConstraint::new(
                format!("wall-{}", object.id),
                ConstraintKind::Clearance,
                severity,
                format!(
                    "{} sits {:.2} m from the nearest wall, below the {:.2} m clearance",
                    object.id, wall_distance, required
                ),
            )
            .with_objects([object.id.clone()])
            .at(object.position)
            .action(RequiredAction::Move)
            .measured(Measurement::meters(wall_distance, required)),
        )
    }

    /// Pairwise clearance between two objects. Severity scales with how far
    /// under the requirement the pair sits: below 50% is an error, below
    /// 80% a warning, anything else informational.
    pub fn check_object_clearance(
        &self,
        a: &SceneObject,
        b: &SceneObject,
    ) -> Option<PlacementConstraint> {
        let spec_a = self.catalog.spec(&a.object_type);
        let spec_b = self.catalog.spec(&b.object_type);
        let required = spec_a.access_clearance.max(spec_b.access_clearance);
        let actual = a.position.floor_distance_to(&b.position);
        if actual >= required {
            return None;
        }

        let ratio = actual / required;
        let severity = if ratio < 0.5 {
            Severity::Error
        } else if ratio < 0.8 {
            Severity::Warning
        } else {
            Severity::Info
        };

        Some(
            PlacementConstraint::new(
                format!("clr-{}-{}", a.id, b.id),
                ConstraintKind::Clearance,
                severity,
                format!(
                    "{} and {} are {:.2} m apart, below the {:.2} m access clearance",
                    a.id, b.id, actual, required
                ),
            )
            .with_objects([a.id.clone(), b.id.clone()])
            .at(a.position)
            .action(RequiredAction::Move)
            .measured(Measurement::meters(actual, required)),
        )
    }

    /// Desk-chair pairing and seating-daylight suggestions; returns the
    /// workflow efficiency metric
    fn ergonomic_suggestions(
        &self,
        room: &MeshSnapshot,
        furniture: &[&SceneObject],
        suggestions: &mut Vec<PlacementConstraint>,
    ) -> f64 {
        let mut efficiency = 100.0f64;

        let desks: Vec<&&SceneObject> = furniture
            .iter()
            .filter(|o| o.object_type.eq_ignore_ascii_case("desk"))
            .collect();
        let chairs: Vec<&&SceneObject> = furniture
            .iter()
            .filter(|o| o.object_type.eq_ignore_ascii_case("chair"))
            .collect();

        for desk in &desks {
            let nearest = chairs
                .iter()
                .map(|c| desk.position.floor_distance_to(&c.position))
                .fold(f64::INFINITY, f64::min);
            if nearest.is_finite() && nearest > DESK_CHAIR_PAIR_DISTANCE {
                efficiency -= 15.0;
                suggestions.push(
                    PlacementConstraint::new(
                        format!("ergo-pair-{}", desk.id),
                        ConstraintKind::Ergonomic,
                        Severity::Suggestion,
                        format!(
                            "nearest chair is {:.1} m from {}; move one within {:.1} m",
                            nearest, desk.id, DESK_CHAIR_PAIR_DISTANCE
                        ),
                    )
                    .with_objects([desk.id.clone()])
                    .action(RequiredAction::Move),
                );
            }
        }

        let windows: Vec<Point2D> = room.windows().map(|w| w.position).collect();
        if !windows.is_empty() {
            for seat in furniture.iter().filter(|o| {
                self.catalog.spec(&o.object_type).category == FurnitureCategory::Seating
            }) {
                let daylight = windows
                    .iter()
                    .map(|w| seat.position.floor_point().distance_to(w))
                    .fold(f64::INFINITY, f64::min);
                if daylight > SEATING_WINDOW_DISTANCE {
                    efficiency -= 10.0;
                    suggestions.push(
                        PlacementConstraint::new(
                            format!("ergo-light-{}", seat.id),
                            ConstraintKind::Ergonomic,
                            Severity::Suggestion,
                            format!(
                                "{} is {:.1} m from the nearest window; seating benefits from daylight",
                                seat.id, daylight
                            ),
                        )
                        .with_objects([seat.id.clone()])
                        .action(RequiredAction::Move),
                    );
                }
            }
        }

        efficiency.clamp(0.0, 100.0)
    }
}

impl Default for PlacementValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Free distance in front of an object until a wall or another footprint,
/// measured from the object's front face
fn front_reach(
    bounds: &RoomBounds,
    object: &SceneObject,
    obstacles: &[Obstacle],
    catalog: &FurnitureCatalog,
) -> f64 {
    const STEP: f64 = 0.1;
    const CAP: f64 = 2.0;

    let dims = catalog.dimensions_for(object);
    let yaw = object.yaw();
    let forward = (yaw.sin(), yaw.cos());
    let origin = object.position.floor_point();
    let start = dims.depth / 2.0;

    let mut travelled = start;
    while travelled < start + CAP {
        travelled += STEP;
        let probe = Point2D::new(
            origin.x + forward.0 * travelled,
            origin.z + forward.1 * travelled,
        );
        let blocked = !bounds.contains(&probe)
            || obstacles.iter().any(|o| {
                o.center.distance_to(&origin) > 1e-9 && o.clearance_to(&probe) <= 0.0
            });
        if blocked {
            return travelled - STEP - start;
        }
    }
    CAP
}
