// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end orchestration over a furnished room.

use roomplan_core::{
    BoundingBox, MeshResolver, MeshSnapshot, Opening, Point2D, SceneObject, Vec3,
};
use roomplan_planning::{
    Orchestrator, PlacementStrategy, ReorganizationGoal, StepOutcome, WorkflowKind,
};

struct Host {
    rooms: Vec<(String, MeshSnapshot)>,
}

impl MeshResolver for Host {
    fn mesh_snapshot(&self, id: &str) -> Option<MeshSnapshot> {
        self.rooms
            .iter()
            .find(|(room_id, _)| room_id == id)
            .map(|(_, snapshot)| snapshot.clone())
    }
}

fn studio() -> Orchestrator<Host> {
    let snapshot = MeshSnapshot {
        position: Vec3::default(),
        rotation: Vec3::default(),
        scale: Vec3::new(1.0, 1.0, 1.0),
        bounding_box: BoundingBox::new(Vec3::default(), Vec3::new(7.0, 3.0, 7.0)),
        floor_polygon: vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(7.0, 0.0),
            Point2D::new(7.0, 7.0),
            Point2D::new(0.0, 7.0),
        ],
        openings: vec![
            Opening::door(Point2D::new(3.5, 0.0), 1.2),
            Opening::window(Point2D::new(0.0, 3.5), 1.6),
        ],
    };
    Orchestrator::new(Host {
        rooms: vec![("studio".to_string(), snapshot)],
    })
}

#[test]
fn full_pipeline_analyze_optimize_validate_reorganize() {
    let orchestrator = studio();
    let furniture = vec![
        SceneObject::new("desk-1", "desk", Vec3::new(2.0, 0.0, 5.5)),
        SceneObject::new("chair-1", "chair", Vec3::new(2.0, 0.0, 4.2)),
    ];

    let analysis = orchestrator
        .run_room_analysis("studio", &furniture)
        .unwrap();
    assert_eq!(analysis.kind, WorkflowKind::RoomAnalysis);
    assert!((analysis.output.bounds.area - 49.0).abs() < 1e-6);

    let optimization = orchestrator
        .run_space_optimization(
            "studio",
            "bookcase",
            PlacementStrategy::Maximize,
            None,
            &furniture,
        )
        .unwrap();
    assert!(optimization.output.max_objects > 0);

    let reorganization = orchestrator
        .run_reorganization("studio", &furniture, &ReorganizationGoal::ALL)
        .unwrap();
    assert!(reorganization.output.current_score > 0.0);
    assert!(reorganization.output.potential_score >= reorganization.output.current_score);

    let assistance = orchestrator.run_ai_assistance("studio", &furniture).unwrap();
    assert!(assistance
        .steps
        .iter()
        .all(|s| s.outcome == StepOutcome::Completed));
    assert!(assistance.output.analysis_summary.contains("49.0 m2"));
}

#[test]
fn layout_generation_groups_follow_the_primary() {
    let orchestrator = studio();
    let report = orchestrator
        .run_layout_generation("studio", "desk", PlacementStrategy::Comfort, &[])
        .unwrap();

    assert_eq!(report.output.groups.len(), report.output.optimization.layouts.len());
    for (layout, group) in report
        .output
        .optimization
        .layouts
        .iter()
        .zip(&report.output.groups)
    {
        assert_eq!(group.primary_position, layout.position);
        // Companions stay near their primary
        for companion in &group.associated_objects {
            assert!(companion.position.floor_distance_to(&layout.position) <= 2.0);
        }
    }
}
