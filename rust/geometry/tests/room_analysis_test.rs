// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end checks of the room analysis pipeline over simple floor plans.

use approx::assert_relative_eq;
use roomplan_core::{BoundingBox, MeshSnapshot, Opening, Point2D, SceneObject, Vec3};
use roomplan_geometry::{
    analyze_room_geometry, point_in_polygon, polygon_area, RoomAnalyzer, ZoneQuality,
};

fn square(side: f64) -> Vec<Point2D> {
    vec![
        Point2D::new(0.0, 0.0),
        Point2D::new(side, 0.0),
        Point2D::new(side, side),
        Point2D::new(0.0, side),
    ]
}

fn snapshot(polygon: Vec<Point2D>, openings: Vec<Opening>) -> MeshSnapshot {
    MeshSnapshot {
        position: Vec3::default(),
        rotation: Vec3::default(),
        scale: Vec3::new(1.0, 1.0, 1.0),
        bounding_box: BoundingBox::new(Vec3::default(), Vec3::new(6.0, 3.0, 6.0)),
        floor_polygon: polygon,
        openings,
    }
}

#[test]
fn point_classification_in_a_square_room() {
    let poly = square(4.0);
    assert!(point_in_polygon(&Point2D::new(2.0, 2.0), &poly));
    assert!(!point_in_polygon(&Point2D::new(5.0, 5.0), &poly));
}

#[test]
fn shoelace_area_matches_the_square() {
    assert_relative_eq!(polygon_area(&square(4.0)), 16.0, epsilon = 1e-6);
}

#[test]
fn repeated_analysis_is_bit_identical() {
    let poly = vec![
        Point2D::new(0.0, 0.0),
        Point2D::new(6.0, 0.0),
        Point2D::new(6.0, 3.0),
        Point2D::new(4.0, 3.0),
        Point2D::new(4.0, 6.0),
        Point2D::new(0.0, 6.0),
    ];
    let a = analyze_room_geometry(&poly).unwrap();
    let b = analyze_room_geometry(&poly).unwrap();
    assert_eq!(a.area.to_bits(), b.area.to_bits());
    assert_eq!(a.usable_area.to_bits(), b.usable_area.to_bits());
    assert_eq!(a.corners.len(), b.corners.len());
    for (ca, cb) in a.corners.iter().zip(&b.corners) {
        assert_eq!(ca.x.to_bits(), cb.x.to_bits());
        assert_eq!(ca.z.to_bits(), cb.z.to_bits());
    }
    for (wa, wb) in a.wall_segments.iter().zip(&b.wall_segments) {
        assert_eq!(wa.start.x.to_bits(), wb.start.x.to_bits());
        assert_eq!(wa.end.z.to_bits(), wb.end.z.to_bits());
        assert_eq!(wa.normal.x.to_bits(), wb.normal.x.to_bits());
        assert_eq!(wa.length.to_bits(), wb.length.to_bits());
    }
}

#[test]
fn furnished_room_keeps_a_usable_pathway() {
    let analyzer = RoomAnalyzer::new();
    let room = snapshot(
        square(6.0),
        vec![Opening::door(Point2D::new(3.0, 0.0), 0.9)],
    );
    // A sofa against the far wall leaves the door corridor open
    let sofa = SceneObject::new("sofa-1", "sofa", Vec3::new(3.0, 0.0, 5.4));
    let result = analyzer.analyze(&room, &[sofa]).unwrap();

    assert_eq!(result.pathways.len(), 1);
    assert!(result.pathways[0].width > 0.91);
    assert!(result
        .placement_zones
        .iter()
        .any(|z| z.quality == ZoneQuality::Optimal));
}

#[test]
fn degenerate_polygon_fails_analysis() {
    let analyzer = RoomAnalyzer::new();
    let room = snapshot(
        vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)],
        vec![],
    );
    assert!(analyzer.analyze(&room, &[]).is_err());
}
