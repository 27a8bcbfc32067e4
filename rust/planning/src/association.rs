// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Furniture association engine
//!
//! Static rules mapping a primary furniture type to its companion types and
//! their relative placement. Expanding a placement request through the
//! engine turns "add a table" into a grouped table-and-chairs arrangement.

use roomplan_core::Vec3;
use roomplan_geometry::RoomBounds;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// How companions sit relative to the primary object
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Positioning {
    /// Distributed evenly on a circle, each facing inward
    Around,
    /// In front of the primary, turned to face it
    Facing,
    /// Beside the primary, alternating left and right, same orientation
    Adjacent,
    /// Behind the primary, same orientation
    Opposite,
}

/// How strongly a companion is wanted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum AssociationPriority {
    Required,
    Preferred,
    Optional,
}

/// One companion rule of an association
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociationRule {
    pub associated_type: String,
    pub quantity: usize,
    pub positioning: Positioning,
    /// Center-to-center distance from the primary, in meters
    pub distance: f64,
    pub priority: AssociationPriority,
}

impl AssociationRule {
    fn new(
        associated_type: &str,
        quantity: usize,
        positioning: Positioning,
        distance: f64,
        priority: AssociationPriority,
    ) -> Self {
        Self {
            associated_type: associated_type.to_string(),
            quantity,
            positioning,
            distance,
            priority,
        }
    }
}

/// All companion rules for one primary type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FurnitureAssociation {
    pub primary_type: String,
    pub rules: Vec<AssociationRule>,
}

/// One computed companion placement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociatedPlacement {
    pub object_type: String,
    pub position: Vec3,
    /// Yaw in radians; zero faces +z
    pub rotation: f64,
    pub priority: AssociationPriority,
}

/// A primary placement expanded with its companions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupedPlacement {
    pub primary_position: Vec3,
    pub primary_rotation: f64,
    pub associated_objects: Vec<AssociatedPlacement>,
}

/// Read-only association rule table
pub struct AssociationEngine {
    table: FxHashMap<&'static str, FurnitureAssociation>,
}

impl AssociationEngine {
    pub fn new() -> Self {
        use AssociationPriority::*;
        use Positioning::*;

        let mut table = FxHashMap::default();
        let entries: [(&'static str, Vec<AssociationRule>); 5] = [
            (
                "desk",
                vec![
                    AssociationRule::new("chair", 1, Facing, 0.6, Required),
                    AssociationRule::new("bookcase", 1, Opposite, 1.0, Optional),
                ],
            ),
            (
                "table",
                vec![AssociationRule::new("chair", 4, Around, 0.65, Required)],
            ),
            (
                "sofa",
                vec![
                    AssociationRule::new("coffee table", 1, Facing, 0.8, Preferred),
                    AssociationRule::new("side table", 2, Adjacent, 1.2, Optional),
                ],
            ),
            (
                "bed",
                vec![AssociationRule::new("nightstand", 2, Adjacent, 1.1, Preferred)],
            ),
            (
                "tv",
                vec![AssociationRule::new("sofa", 1, Facing, 2.5, Preferred)],
            ),
        ];
        for (primary, rules) in entries {
            table.insert(
                primary,
                FurnitureAssociation {
                    primary_type: primary.to_string(),
                    rules,
                },
            );
        }
        Self { table }
    }

    /// Companion rules for a primary type, if any are registered
    pub fn association(&self, primary_type: &str) -> Option<&FurnitureAssociation> {
        self.table
            .get(primary_type.to_ascii_lowercase().as_str())
    }

    /// Expand a primary placement into a grouped placement with companion
    /// positions and rotations. Companions falling outside `room` are
    /// dropped.
    pub fn associated_placements(
        &self,
        primary_type: &str,
        primary_position: Vec3,
        primary_rotation: f64,
        room: Option<&RoomBounds>,
    ) -> GroupedPlacement {
        let mut associated_objects = Vec::new();

        if let Some(association) = self.association(primary_type) {
            for rule in &association.rules {
                place_rule(rule, &primary_position, primary_rotation, &mut associated_objects);
            }
        }

        if let Some(bounds) = room {
            associated_objects.retain(|p| bounds.contains(&p.position.floor_point()));
        }

        GroupedPlacement {
            primary_position,
            primary_rotation,
            associated_objects,
        }
    }
}

impl Default for AssociationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the companion positions for one rule
fn place_rule(
    rule: &AssociationRule,
    primary: &Vec3,
    rotation: f64,
    out: &mut Vec<AssociatedPlacement>,
) {
    let forward = (rotation.sin(), rotation.cos());
    let left = (forward.1, -forward.0);

    match rule.positioning {
        Positioning::Facing => {
            out.push(AssociatedPlacement {
                object_type: rule.associated_type.clone(),
                position: Vec3::new(
                    primary.x + forward.0 * rule.distance,
                    primary.y,
                    primary.z + forward.1 * rule.distance,
                ),
                rotation: rotation + std::f64::consts::PI,
                priority: rule.priority,
            });
        }
        Positioning::Around => {
            for k in 0..rule.quantity {
                let angle =
                    rotation + k as f64 * std::f64::consts::TAU / rule.quantity as f64;
                out.push(AssociatedPlacement {
                    object_type: rule.associated_type.clone(),
                    position: Vec3::new(
                        primary.x + angle.sin() * rule.distance,
                        primary.y,
                        primary.z + angle.cos() * rule.distance,
                    ),
                    rotation: angle + std::f64::consts::PI,
                    priority: rule.priority,
                });
            }
        }
        Positioning::Adjacent => {
            for k in 0..rule.quantity {
                let side = if k % 2 == 0 { 1.0 } else { -1.0 };
                let magnitude = rule.distance * (1 + k / 2) as f64;
                out.push(AssociatedPlacement {
                    object_type: rule.associated_type.clone(),
                    position: Vec3::new(
                        primary.x + left.0 * side * magnitude,
                        primary.y,
                        primary.z + left.1 * side * magnitude,
                    ),
                    rotation,
                    priority: rule.priority,
                });
            }
        }
        Positioning::Opposite => {
            out.push(AssociatedPlacement {
                object_type: rule.associated_type.clone(),
                position: Vec3::new(
                    primary.x - forward.0 * rule.distance,
                    primary.y,
                    primary.z - forward.1 * rule.distance,
                ),
                rotation,
                priority: rule.priority,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use roomplan_core::Point2D;
    use roomplan_geometry::analyze_room_geometry;

    #[test]
    fn unknown_primary_has_no_association() {
        let engine = AssociationEngine::new();
        assert!(engine.association("lamp").is_none());
        let group =
            engine.associated_placements("lamp", Vec3::default(), 0.0, None);
        assert!(group.associated_objects.is_empty());
    }

    #[test]
    fn desk_gets_a_facing_chair() {
        let engine = AssociationEngine::new();
        // Desk at origin facing +z
        let group = engine.associated_placements("desk", Vec3::default(), 0.0, None);
        let chair = group
            .associated_objects
            .iter()
            .find(|p| p.object_type == "chair")
            .unwrap();
        assert_relative_eq!(chair.position.x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(chair.position.z, 0.6, epsilon = 1e-9);
        // Turned back toward the desk
        assert_relative_eq!(chair.rotation, std::f64::consts::PI, epsilon = 1e-9);
        assert_eq!(chair.priority, AssociationPriority::Required);
    }

    #[test]
    fn table_chairs_sit_on_a_circle() {
        let engine = AssociationEngine::new();
        let center = Vec3::new(3.0, 0.0, 3.0);
        let group = engine.associated_placements("table", center, 0.0, None);
        assert_eq!(group.associated_objects.len(), 4);
        for chair in &group.associated_objects {
            assert_relative_eq!(
                chair.position.floor_distance_to(&center),
                0.65,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn bed_nightstands_flank_both_sides() {
        let engine = AssociationEngine::new();
        let group = engine.associated_placements("bed", Vec3::default(), 0.0, None);
        assert_eq!(group.associated_objects.len(), 2);
        let xs: Vec<f64> = group
            .associated_objects
            .iter()
            .map(|p| p.position.x)
            .collect();
        // One left, one right, same orientation as the bed
        assert!(xs.iter().any(|x| *x > 0.0) && xs.iter().any(|x| *x < 0.0));
        assert!(group.associated_objects.iter().all(|p| p.rotation == 0.0));
    }

    #[test]
    fn desk_bookcase_sits_behind() {
        let engine = AssociationEngine::new();
        let group = engine.associated_placements("desk", Vec3::default(), 0.0, None);
        let bookcase = group
            .associated_objects
            .iter()
            .find(|p| p.object_type == "bookcase")
            .unwrap();
        assert_relative_eq!(bookcase.position.z, -1.0, epsilon = 1e-9);
        assert_relative_eq!(bookcase.rotation, 0.0);
    }

    #[test]
    fn companions_outside_the_room_are_dropped() {
        let engine = AssociationEngine::new();
        let bounds = analyze_room_geometry(&[
            Point2D::new(0.0, 0.0),
            Point2D::new(4.0, 0.0),
            Point2D::new(4.0, 4.0),
            Point2D::new(0.0, 4.0),
        ])
        .unwrap();
        // Desk against the wall facing out of the room: chair would land
        // outside and must be filtered
        let group = engine.associated_placements(
            "desk",
            Vec3::new(2.0, 0.0, 3.9),
            0.0,
            Some(&bounds),
        );
        assert!(group
            .associated_objects
            .iter()
            .all(|p| p.object_type != "chair"));
    }

    #[test]
    fn rotation_carries_into_companion_offsets() {
        let engine = AssociationEngine::new();
        // Desk rotated to face +x
        let group = engine.associated_placements(
            "desk",
            Vec3::default(),
            std::f64::consts::FRAC_PI_2,
            None,
        );
        let chair = group
            .associated_objects
            .iter()
            .find(|p| p.object_type == "chair")
            .unwrap();
        assert_relative_eq!(chair.position.x, 0.6, epsilon = 1e-9);
        assert_relative_eq!(chair.position.z, 0.0, epsilon = 1e-9);
    }
}
