// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Layout reorganization advisor
//!
//! Turns a validation report into discrete move/rotate/remove/add
//! suggestions, bundles them into ranked plans and estimates the improvement
//! of each. The advisor never mutates scene state itself; applying a plan is
//! a pure sequence of [`SceneMutator`] callbacks.

use crate::association::{AssociationEngine, AssociationPriority};
use crate::constraint::{ConstraintKind, Severity};
use crate::error::Result;
use crate::validator::{PlacementValidationResult, PlacementValidator};
use roomplan_core::{
    FurnitureCatalog, FurnitureCategory, MeshSnapshot, Point2D, SceneMutator, SceneObject, Vec3,
};
use roomplan_geometry::segment::closest_point_on_segment;
use roomplan_geometry::{analyze_room_geometry, RoomBounds};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Suggestions below this improvement score never surface as quick fixes
const QUICK_FIX_MIN_IMPROVEMENT: f64 = 20.0;

/// Comprehensive plans cap their suggestion count here
const COMPREHENSIVE_PLAN_CAP: usize = 10;

/// Complete plans cap their suggestion count here
const COMPLETE_PLAN_CAP: usize = 15;

/// Half of the required clear corridor width kept around egress paths
const EGRESS_CORRIDOR_HALF_WIDTH: f64 = 0.455;

/// Footprint density above which the advisor proposes removing something
const OVERCROWDING_DENSITY: f64 = 0.5;

/// What a reorganization pass should optimize for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReorganizationGoal {
    Accessibility,
    Safety,
    Efficiency,
    Aesthetic,
    Associations,
}

impl ReorganizationGoal {
    pub const ALL: [ReorganizationGoal; 5] = [
        ReorganizationGoal::Accessibility,
        ReorganizationGoal::Safety,
        ReorganizationGoal::Efficiency,
        ReorganizationGoal::Aesthetic,
        ReorganizationGoal::Associations,
    ];
}

/// Urgency of one suggestion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum SuggestionPriority {
    Critical,
    High,
    Medium,
    Low,
}

/// The concrete edit a suggestion proposes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SuggestionAction {
    Move {
        target: Vec3,
        rotation: Option<f64>,
    },
    Rotate {
        position: Vec3,
        rotation: f64,
    },
    Remove,
    Add {
        object_type: String,
        position: Vec3,
        rotation: Option<f64>,
    },
    Group {
        members: Vec<String>,
    },
}

/// One atomic proposed edit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorganizationSuggestion {
    pub id: String,
    /// Object the edit applies to; `None` for additions
    pub object_id: Option<String>,
    pub action: SuggestionAction,
    pub description: String,
    /// Estimated improvement in [0, 100]
    pub improvement_score: f64,
    pub priority: SuggestionPriority,
    /// Whether the edit resolves a recorded violation
    pub resolves_violation: bool,
}

/// Plan difficulty estimate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PlanDifficulty {
    Easy,
    Medium,
    Hard,
}

/// A named, ordered bundle of suggestions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorganizationPlan {
    pub name: String,
    pub suggestions: Vec<ReorganizationSuggestion>,
    /// Compound improvement estimate in [0, 100]
    pub overall_improvement: f64,
    pub violations_resolved: usize,
    pub estimated_minutes: u32,
    pub difficulty: PlanDifficulty,
}

/// Full reorganization analysis for one room
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorganizationAnalysis {
    pub current_score: f64,
    pub potential_score: f64,
    /// Error-severity violation count
    pub major_issues: usize,
    /// Warning-severity violation count
    pub minor_issues: usize,
    /// Plans ranked by overall improvement, descending
    pub reorganization_plans: Vec<ReorganizationPlan>,
    /// Top high-priority, non-removal suggestions
    pub quick_fixes: Vec<ReorganizationSuggestion>,
}

/// The reorganization advisor. Stateless; construct once and reuse.
pub struct ReorganizationAdvisor {
    catalog: FurnitureCatalog,
    validator: PlacementValidator,
    associations: AssociationEngine,
}

impl ReorganizationAdvisor {
    pub fn new() -> Self {
        Self {
            catalog: FurnitureCatalog::new(),
            validator: PlacementValidator::new(),
            associations: AssociationEngine::new(),
        }
    }

    /// Validate the current layout and propose ranked improvement plans
    pub fn analyze_and_suggest(
        &self,
        room: &MeshSnapshot,
        objects: &[SceneObject],
        room_id: &str,
        goals: &[ReorganizationGoal],
    ) -> Result<ReorganizationAnalysis> {
        let validation = self
            .validator
            .validate_placement(room, objects, room_id, None)?;
        let bounds = analyze_room_geometry(&room.floor_polygon)?;
        let furniture: Vec<&SceneObject> = objects
            .iter()
            .filter(|o| {
                o.extensions
                    .as_ref()
                    .map_or(true, |ext| ext.floor_polygon.is_none())
            })
            .collect();

        let mut suggestions = Vec::new();
        for goal in goals {
            match goal {
                ReorganizationGoal::Accessibility => {
                    self.suggest_from_violations(
                        &validation,
                        &bounds,
                        &furniture,
                        *goal,
                        &mut suggestions,
                    );
                    // Pathway records carry no object ids; clearing the door
                    // corridors is what actually widens them
                    self.suggest_egress_clearing(room, &bounds, &furniture, &mut suggestions);
                }
                ReorganizationGoal::Efficiency => {
                    self.suggest_from_violations(
                        &validation,
                        &bounds,
                        &furniture,
                        *goal,
                        &mut suggestions,
                    );
                    self.suggest_wall_alignment(&bounds, &furniture, &mut suggestions);
                    self.suggest_removal(&bounds, &furniture, &mut suggestions);
                }
                ReorganizationGoal::Safety => {
                    self.suggest_egress_clearing(room, &bounds, &furniture, &mut suggestions);
                }
                ReorganizationGoal::Aesthetic => {
                    self.suggest_rotations(&bounds, &furniture, &mut suggestions);
                }
                ReorganizationGoal::Associations => {
                    self.suggest_companions(&bounds, &furniture, &mut suggestions);
                }
            }
        }

        dedup_by_id(&mut suggestions);
        suggestions.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then(b.improvement_score.total_cmp(&a.improvement_score))
                .then(a.id.cmp(&b.id))
        });

        let major_issues = count_severity(&validation, Severity::Error);
        let minor_issues = count_severity(&validation, Severity::Warning);

        let mut reorganization_plans = build_plans(&suggestions);
        reorganization_plans
            .sort_by(|a, b| b.overall_improvement.total_cmp(&a.overall_improvement));

        let potential_score = reorganization_plans
            .first()
            .map(|best| {
                validation.score + (100.0 - validation.score) * best.overall_improvement / 100.0
            })
            .unwrap_or(validation.score)
            .min(100.0);

        let quick_fixes = suggestions
            .iter()
            .filter(|s| {
                matches!(
                    s.priority,
                    SuggestionPriority::Critical | SuggestionPriority::High
                ) && s.improvement_score >= QUICK_FIX_MIN_IMPROVEMENT
                    && !matches!(s.action, SuggestionAction::Remove)
            })
            .take(5)
            .cloned()
            .collect();

        debug!(
            room_id,
            suggestions = suggestions.len(),
            plans = reorganization_plans.len(),
            "reorganization analysis finished"
        );

        Ok(ReorganizationAnalysis {
            current_score: validation.score,
            potential_score,
            major_issues,
            minor_issues,
            reorganization_plans,
            quick_fixes,
        })
    }

    /// Apply a plan by replaying its suggestions against the scene-mutation
    /// interface. Grouping suggestions carry no scene callback and are
    /// skipped.
    pub fn apply_plan(&self, plan: &ReorganizationPlan, mutator: &mut dyn SceneMutator) {
        for suggestion in &plan.suggestions {
            match (&suggestion.action, &suggestion.object_id) {
                (SuggestionAction::Move { target, rotation }, Some(id)) => {
                    mutator.update_position(id, *target, *rotation);
                }
                (SuggestionAction::Rotate { position, rotation }, Some(id)) => {
                    mutator.update_position(id, *position, Some(*rotation));
                }
                (SuggestionAction::Remove, Some(id)) => {
                    mutator.remove(id);
                }
                (
                    SuggestionAction::Add {
                        object_type,
                        position,
                        rotation,
                    },
                    _,
                ) => {
                    mutator.add(object_type, *position, *rotation);
                }
                _ => {}
            }
        }
    }

    /// Turn clearance and accessibility violation records into move
    /// suggestions
    fn suggest_from_violations(
        &self,
        validation: &PlacementValidationResult,
        bounds: &RoomBounds,
        furniture: &[&SceneObject],
        goal: ReorganizationGoal,
        out: &mut Vec<ReorganizationSuggestion>,
    ) {
        let wanted_kind = match goal {
            ReorganizationGoal::Accessibility => ConstraintKind::Accessibility,
            _ => ConstraintKind::Clearance,
        };

        for violation in validation
            .violations
            .iter()
            .filter(|v| v.kind == wanted_kind)
        {
            let Some(subject_id) = violation.affected_objects.first() else {
                continue;
            };
            let Some(subject) = furniture.iter().find(|o| o.id == *subject_id) else {
                continue;
            };

            let deficit = violation
                .measurement
                .as_ref()
                .map(|m| (m.required - m.actual).max(0.1))
                .unwrap_or(0.5);

            let away = violation
                .affected_objects
                .get(1)
                .and_then(|other_id| furniture.iter().find(|o| o.id == *other_id))
                .map(|other| direction_between(&other.position, &subject.position))
                .unwrap_or_else(|| direction_between(&Vec3::from(bounds.center), &subject.position));

            let target = Vec3::new(
                subject.position.x + away.0 * (deficit + 0.1),
                subject.position.y,
                subject.position.z + away.1 * (deficit + 0.1),
            );
            if !bounds.contains(&target.floor_point()) {
                continue;
            }

            let (priority, improvement) = match violation.severity {
                Severity::Error => (SuggestionPriority::Critical, 40.0),
                Severity::Warning => (SuggestionPriority::High, 25.0),
                _ => (SuggestionPriority::Medium, 10.0),
            };

            out.push(ReorganizationSuggestion {
                id: format!("fix-{}", violation.id),
                object_id: Some(subject.id.clone()),
                action: SuggestionAction::Move {
                    target,
                    rotation: None,
                },
                description: format!(
                    "move {} {:.2} m to resolve: {}",
                    subject.id,
                    deficit + 0.1,
                    violation.description
                ),
                improvement_score: improvement,
                priority,
                resolves_violation: true,
            });
        }
    }

    /// Align storage and wall-mounted furniture with the nearest wall
    fn suggest_wall_alignment(
        &self,
        bounds: &RoomBounds,
        furniture: &[&SceneObject],
        out: &mut Vec<ReorganizationSuggestion>,
    ) {
        for object in furniture {
            let spec = self.catalog.spec(&object.object_type);
            let aligns = spec.wall_mount
                || matches!(
                    spec.category,
                    FurnitureCategory::Storage | FurnitureCategory::Sleeping
                );
            if !aligns {
                continue;
            }

            let dims = self.catalog.dimensions_for(object);
            let point = object.position.floor_point();
            let Some((wall, distance)) = bounds.nearest_wall(&point) else {
                continue;
            };
            let standoff = dims.depth / 2.0 + 0.05;
            if distance <= standoff + 0.2 {
                continue;
            }

            let foot = closest_point_on_segment(
                &point,
                &wall.start.floor_point(),
                &wall.end.floor_point(),
            );
            let target = Vec3::new(
                foot.x + wall.normal.x * standoff,
                object.position.y,
                foot.z + wall.normal.z * standoff,
            );
            if !bounds.contains(&target.floor_point()) {
                continue;
            }
            // Face away from the wall
            let rotation = wall.normal.x.atan2(wall.normal.z);

            out.push(ReorganizationSuggestion {
                id: format!("wall-align-{}", object.id),
                object_id: Some(object.id.clone()),
                action: SuggestionAction::Move {
                    target,
                    rotation: Some(rotation),
                },
                description: format!(
                    "move {} against the nearest wall to free floor space",
                    object.id
                ),
                improvement_score: 15.0,
                priority: SuggestionPriority::Medium,
                resolves_violation: false,
            });
        }
    }

    /// Propose removing decor when the floor is overcrowded
    fn suggest_removal(
        &self,
        bounds: &RoomBounds,
        furniture: &[&SceneObject],
        out: &mut Vec<ReorganizationSuggestion>,
    ) {
        if bounds.usable_area <= 0.0 {
            return;
        }
        let footprint_area: f64 = furniture
            .iter()
            .map(|o| {
                let d = self.catalog.dimensions_for(o);
                d.width * d.depth
            })
            .sum();
        if footprint_area / bounds.usable_area <= OVERCROWDING_DENSITY {
            return;
        }

        let candidate = furniture
            .iter()
            .find(|o| self.catalog.spec(&o.object_type).category == FurnitureCategory::Decor)
            .or_else(|| furniture.last());
        if let Some(object) = candidate {
            out.push(ReorganizationSuggestion {
                id: format!("remove-{}", object.id),
                object_id: Some(object.id.clone()),
                action: SuggestionAction::Remove,
                description: format!(
                    "remove {} to relieve an overcrowded floor",
                    object.id
                ),
                improvement_score: 20.0,
                priority: SuggestionPriority::Medium,
                resolves_violation: false,
            });
        }
    }

    /// Move furniture that blocks a door corridor sideways out of it
    fn suggest_egress_clearing(
        &self,
        room: &MeshSnapshot,
        bounds: &RoomBounds,
        furniture: &[&SceneObject],
        out: &mut Vec<ReorganizationSuggestion>,
    ) {
        for door in room.doors() {
            let to = bounds.center;
            let length = door.position.distance_to(&to);
            if length < 1e-6 {
                continue;
            }
            let dir = (
                (to.x - door.position.x) / length,
                (to.z - door.position.z) / length,
            );
            let perp = (-dir.1, dir.0);

            for object in furniture {
                let half_extent = self.catalog.dimensions_for(object).max_footprint() / 2.0;
                let rel = (
                    object.position.x - door.position.x,
                    object.position.z - door.position.z,
                );
                let along = rel.0 * dir.0 + rel.1 * dir.1;
                if along < 0.0 || along > length {
                    continue;
                }
                let lateral = rel.0 * perp.0 + rel.1 * perp.1;
                let intrusion = EGRESS_CORRIDOR_HALF_WIDTH + half_extent - lateral.abs();
                if intrusion <= 0.0 {
                    continue;
                }

                let side = if lateral >= 0.0 { 1.0 } else { -1.0 };
                let target = Vec3::new(
                    object.position.x + perp.0 * side * (intrusion + 0.1),
                    object.position.y,
                    object.position.z + perp.1 * side * (intrusion + 0.1),
                );
                if !bounds.contains(&target.floor_point()) {
                    continue;
                }

                out.push(ReorganizationSuggestion {
                    id: format!("egress-{}", object.id),
                    object_id: Some(object.id.clone()),
                    action: SuggestionAction::Move {
                        target,
                        rotation: None,
                    },
                    description: format!(
                        "move {} out of the egress corridor toward the door",
                        object.id
                    ),
                    improvement_score: 45.0,
                    priority: SuggestionPriority::Critical,
                    resolves_violation: true,
                });
            }
        }
    }

    /// Turn seating that faces away from the room center back toward it
    fn suggest_rotations(
        &self,
        bounds: &RoomBounds,
        furniture: &[&SceneObject],
        out: &mut Vec<ReorganizationSuggestion>,
    ) {
        for object in furniture {
            if self.catalog.spec(&object.object_type).category != FurnitureCategory::Seating {
                continue;
            }
            let toward = direction_between(&object.position, &Vec3::from(bounds.center));
            let desired = toward.0.atan2(toward.1);
            let deviation = angle_difference(object.yaw(), desired);
            if deviation <= std::f64::consts::FRAC_PI_2 {
                continue;
            }

            out.push(ReorganizationSuggestion {
                id: format!("rotate-{}", object.id),
                object_id: Some(object.id.clone()),
                action: SuggestionAction::Rotate {
                    position: object.position,
                    rotation: desired,
                },
                description: format!("rotate {} to face the room", object.id),
                improvement_score: 8.0,
                priority: SuggestionPriority::Low,
                resolves_violation: false,
            });
        }
    }

    /// Add missing required/preferred companions from the association table
    fn suggest_companions(
        &self,
        bounds: &RoomBounds,
        furniture: &[&SceneObject],
        out: &mut Vec<ReorganizationSuggestion>,
    ) {
        for object in furniture {
            let Some(association) = self.associations.association(&object.object_type) else {
                continue;
            };
            for rule in &association.rules {
                if rule.priority == AssociationPriority::Optional {
                    continue;
                }
                let satisfied = furniture.iter().any(|o| {
                    o.object_type.eq_ignore_ascii_case(&rule.associated_type)
                        && o.position.floor_distance_to(&object.position)
                            <= rule.distance * 1.5
                });
                if satisfied {
                    continue;
                }

                let group = self.associations.associated_placements(
                    &object.object_type,
                    object.position,
                    object.yaw(),
                    Some(bounds),
                );
                let Some(placement) = group
                    .associated_objects
                    .iter()
                    .find(|p| p.object_type == rule.associated_type)
                else {
                    continue;
                };

                let (priority, improvement) = match rule.priority {
                    AssociationPriority::Required => (SuggestionPriority::High, 22.0),
                    _ => (SuggestionPriority::Medium, 12.0),
                };
                out.push(ReorganizationSuggestion {
                    id: format!("companion-{}-{}", object.id, rule.associated_type),
                    object_id: None,
                    action: SuggestionAction::Add {
                        object_type: rule.associated_type.clone(),
                        position: placement.position,
                        rotation: Some(placement.rotation),
                    },
                    description: format!(
                        "add a {} near {} to complete the arrangement",
                        rule.associated_type, object.id
                    ),
                    improvement_score: improvement,
                    priority,
                    resolves_violation: false,
                });
            }
        }
    }
}

impl Default for ReorganizationAdvisor {
    fn default() -> Self {
        Self::new()
    }
}

/// Unit floor-plane direction from `a` to `b`; +z when the points coincide
fn direction_between(a: &Vec3, b: &Vec3) -> (f64, f64) {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    let length = (dx * dx + dz * dz).sqrt();
    if length < 1e-9 {
        (0.0, 1.0)
    } else {
        (dx / length, dz / length)
    }
}

/// Absolute angular difference in [0, pi]
fn angle_difference(a: f64, b: f64) -> f64 {
    let diff = (a - b).rem_euclid(std::f64::consts::TAU);
    diff.min(std::f64::consts::TAU - diff)
}

fn count_severity(validation: &PlacementValidationResult, severity: Severity) -> usize {
    validation
        .violations
        .iter()
        .filter(|v| v.severity == severity)
        .count()
}

/// Keep the first suggestion per id; later goals may rediscover the same fix
fn dedup_by_id(suggestions: &mut Vec<ReorganizationSuggestion>) {
    let mut seen = rustc_hash::FxHashSet::default();
    suggestions.retain(|s| seen.insert(s.id.clone()));
}

/// Bucket ranked suggestions into the three standard plans
fn build_plans(suggestions: &[ReorganizationSuggestion]) -> Vec<ReorganizationPlan> {
    let critical: Vec<ReorganizationSuggestion> = suggestions
        .iter()
        .filter(|s| s.priority == SuggestionPriority::Critical)
        .cloned()
        .collect();
    let comprehensive: Vec<ReorganizationSuggestion> = suggestions
        .iter()
        .filter(|s| {
            matches!(
                s.priority,
                SuggestionPriority::Critical | SuggestionPriority::High
            )
        })
        .take(COMPREHENSIVE_PLAN_CAP)
        .cloned()
        .collect();
    let complete: Vec<ReorganizationSuggestion> =
        suggestions.iter().take(COMPLETE_PLAN_CAP).cloned().collect();

    [
        ("critical-only", critical, 5u32),
        ("comprehensive", comprehensive, 8u32),
        ("complete", complete, 10u32),
    ]
    .into_iter()
    .filter(|(_, bundle, _)| !bundle.is_empty())
    .map(|(name, bundle, minutes_each)| {
        let overall_improvement = compound_improvement(&bundle);
        let violations_resolved = bundle.iter().filter(|s| s.resolves_violation).count();
        let estimated_minutes = minutes_each * bundle.len() as u32;
        let difficulty = plan_difficulty(&bundle);
        ReorganizationPlan {
            name: name.to_string(),
            suggestions: bundle,
            overall_improvement,
            violations_resolved,
            estimated_minutes,
            difficulty,
        }
    })
    .collect()
}

/// Compound the per-suggestion improvements so the total stays below 100
fn compound_improvement(suggestions: &[ReorganizationSuggestion]) -> f64 {
    let remainder: f64 = suggestions
        .iter()
        .map(|s| 1.0 - (s.improvement_score / 100.0).clamp(0.0, 1.0))
        .product();
    (1.0 - remainder) * 100.0
}

fn plan_difficulty(suggestions: &[ReorganizationSuggestion]) -> PlanDifficulty {
    let has_removal = suggestions
        .iter()
        .any(|s| matches!(s.action, SuggestionAction::Remove));
    if has_removal || suggestions.len() > 8 {
        PlanDifficulty::Hard
    } else if suggestions.len() <= 3 {
        PlanDifficulty::Easy
    } else {
        PlanDifficulty::Medium
    }
}
