// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fire-safety and validation scoring scenarios.

use approx::assert_relative_eq;
use roomplan_core::{BoundingBox, MeshSnapshot, Opening, Point2D, SceneObject, Vec3};
use roomplan_planning::{FireSafetyValidator, PlacementValidator, Severity};

fn snapshot(side: f64, openings: Vec<Opening>) -> MeshSnapshot {
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
        openings,
    }
}

#[test]
fn doorless_room_reports_missing_egress() {
    let validator = FireSafetyValidator::new();
    let result = validator
        .validate_fire_safety(&snapshot(6.0, vec![]), &[], "room-1")
        .unwrap();

    assert!(!result.compliant);
    let violation = result
        .violations
        .iter()
        .find(|v| v.description.contains("no egress doors"))
        .unwrap();
    assert_eq!(violation.severity, Severity::Error);
}

#[test]
fn narrow_single_door_measures_against_the_minimum() {
    let validator = FireSafetyValidator::new();
    let door = Opening::door(Point2D::new(3.0, 0.0), 0.5);
    let result = validator
        .validate_fire_safety(&snapshot(6.0, vec![door]), &[], "room-1")
        .unwrap();

    let violation = result
        .violations
        .iter()
        .find(|v| v.description.contains("primary egress"))
        .unwrap();
    let measurement = violation.measurement.as_ref().unwrap();
    assert_relative_eq!(measurement.actual, 0.5, epsilon = 0.01);
    assert_relative_eq!(measurement.required, 1.12, epsilon = 1e-9);
}

#[test]
fn fire_scores_stay_within_bounds() {
    let validator = FireSafetyValidator::new();
    let cases = [
        snapshot(4.0, vec![]),
        snapshot(30.0, vec![Opening::door(Point2D::new(0.0, 0.0), 0.2)]),
        snapshot(6.0, vec![Opening::door(Point2D::new(3.0, 0.0), 1.2)]),
    ];
    for (i, room) in cases.iter().enumerate() {
        let result = validator
            .validate_fire_safety(room, &[], &format!("room-{i}"))
            .unwrap();
        assert!(
            (0.0..=100.0).contains(&result.score),
            "case {i}: score {}",
            result.score
        );
    }
}

#[test]
fn validation_scores_stay_within_bounds() {
    let validator = PlacementValidator::new();

    // Pathological room: no doors, furniture crammed together
    let room = snapshot(5.0, vec![]);
    let objects: Vec<SceneObject> = (0..8)
        .map(|i| {
            SceneObject::new(
                format!("desk-{i}"),
                "desk",
                Vec3::new(1.0 + 0.35 * i as f64, 0.0, 2.5),
            )
        })
        .collect();
    let crowded = validator
        .validate_placement(&room, &objects, "room-1", None)
        .unwrap();
    assert!((0.0..=100.0).contains(&crowded.score));
    assert!(!crowded.is_valid);

    // Clean room on the other end
    let clean_room = snapshot(8.0, vec![Opening::door(Point2D::new(4.0, 0.0), 1.2)]);
    let clean = validator
        .validate_placement(&clean_room, &[], "room-2", None)
        .unwrap();
    assert!((0.0..=100.0).contains(&clean.score));
    assert!(clean.is_valid);
    assert!(clean.score > crowded.score);
}

#[test]
fn egress_failure_drags_the_overall_score() {
    let validator = PlacementValidator::new();
    let with_door = snapshot(6.0, vec![Opening::door(Point2D::new(3.0, 0.0), 1.2)]);
    let without_door = snapshot(6.0, vec![]);

    let good = validator
        .validate_placement(&with_door, &[], "room-1", None)
        .unwrap();
    let bad = validator
        .validate_placement(&without_door, &[], "room-1", None)
        .unwrap();

    assert!(good.safety.egress_compliant);
    assert!(!bad.safety.egress_compliant);
    assert!(bad.score < good.score);
}
