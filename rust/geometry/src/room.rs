// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room geometry analysis
//!
//! Derives wall segments, areas and corner data from a floor polygon. The
//! analysis is a pure function of its input: calling it twice on the same
//! polygon yields identical results.

use crate::error::{Error, Result};
use crate::polygon::{
    bounding_box, centroid, ensure_ccw, perimeter, point_in_polygon, polygon_area,
};
use crate::segment::distance_to_segment;
use roomplan_core::{Point2D, Vec3};
use serde::{Deserialize, Serialize};

/// Buffer stripped along the perimeter when computing usable area, in meters
const WALL_BUFFER: f64 = 0.5;

/// Tolerance for classifying an edge as flush with the room's outer bounds
const EXTERIOR_EPSILON: f64 = 1e-6;

/// Wall classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WallKind {
    Exterior,
    Interior,
}

/// One wall segment between two consecutive polygon vertices.
///
/// `start` and `end` sit on the floor plane (y = 0); `normal` points toward
/// the room interior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WallSegment {
    pub start: Vec3,
    pub end: Vec3,
    pub normal: Vec3,
    pub length: f64,
    pub kind: WallKind,
}

impl WallSegment {
    /// Distance from a floor point to this segment
    pub fn distance_to(&self, point: &Point2D) -> f64 {
        distance_to_segment(point, &self.start.floor_point(), &self.end.floor_point())
    }

    /// Midpoint of the segment on the floor plane
    pub fn midpoint(&self) -> Point2D {
        Point2D::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.z + self.end.z) / 2.0,
        )
    }
}

/// Immutable snapshot of a room's derived geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomBounds {
    /// Floor polygon, normalized to counter-clockwise winding
    pub polygon: Vec<Point2D>,
    pub wall_segments: Vec<WallSegment>,
    /// Floor area via the shoelace formula
    pub area: f64,
    /// Area minus a perimeter buffer strip, floored at zero
    pub usable_area: f64,
    /// Polygon vertices
    pub corners: Vec<Point2D>,
    /// Vertex-average centroid
    pub center: Point2D,
}

impl RoomBounds {
    /// Whether a floor point lies inside the room polygon
    pub fn contains(&self, point: &Point2D) -> bool {
        point_in_polygon(point, &self.polygon)
    }

    /// Distance from a floor point to the nearest wall segment
    pub fn distance_to_nearest_wall(&self, point: &Point2D) -> f64 {
        self.wall_segments
            .iter()
            .map(|w| w.distance_to(point))
            .fold(f64::INFINITY, f64::min)
    }

    /// The wall segment closest to a floor point, with its distance
    pub fn nearest_wall(&self, point: &Point2D) -> Option<(&WallSegment, f64)> {
        self.wall_segments
            .iter()
            .map(|w| (w, w.distance_to(point)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

/// Analyze a floor polygon into a [`RoomBounds`] snapshot.
///
/// Fails with [`Error::DegeneratePolygon`] for fewer than 3 points. Winding
/// is normalized to counter-clockwise internally, so callers may supply
/// either orientation.
pub fn analyze_room_geometry(floor_polygon: &[Point2D]) -> Result<RoomBounds> {
    if floor_polygon.len() < 3 {
        return Err(Error::DegeneratePolygon(floor_polygon.len()));
    }

    let mut polygon = floor_polygon.to_vec();
    ensure_ccw(&mut polygon);

    let area = polygon_area(&polygon);
    if area < 1e-9 {
        return Err(Error::InvalidGeometry(
            "floor polygon has zero area".to_string(),
        ));
    }

    let room_perimeter = perimeter(&polygon);
    let usable_area = (area - room_perimeter * WALL_BUFFER).max(0.0);
    let center = centroid(&polygon);
    let wall_segments = build_wall_segments(&polygon);

    Ok(RoomBounds {
        corners: polygon.clone(),
        polygon,
        wall_segments,
        area,
        usable_area,
        center,
    })
}

/// Connect consecutive vertices (wrapping last back to first) into wall
/// segments with inward normals.
fn build_wall_segments(polygon: &[Point2D]) -> Vec<WallSegment> {
    let (min, max) = bounding_box(polygon);
    let n = polygon.len();
    let mut segments = Vec::with_capacity(n);

    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        let dx = b.x - a.x;
        let dz = b.z - a.z;
        let length = (dx * dx + dz * dz).sqrt();
        if length < 1e-9 {
            continue;
        }

        // Perpendicular-left of the direction; inward for CCW winding
        let normal = Vec3::new(-dz / length, 0.0, dx / length);
        let kind = classify_wall(&a, &b, &min, &max);

        segments.push(WallSegment {
            start: Vec3::new(a.x, 0.0, a.z),
            end: Vec3::new(b.x, 0.0, b.z),
            normal,
            length,
            kind,
        });
    }

    segments
}

/// Edges flush with the polygon's outer bounds are exterior walls; notch and
/// partition edges inside the bounds are interior.
fn classify_wall(a: &Point2D, b: &Point2D, min: &Point2D, max: &Point2D) -> WallKind {
    let flush = |v: f64, bound: f64| (v - bound).abs() < EXTERIOR_EPSILON;
    let on_outer = (flush(a.x, min.x) && flush(b.x, min.x))
        || (flush(a.x, max.x) && flush(b.x, max.x))
        || (flush(a.z, min.z) && flush(b.z, min.z))
        || (flush(a.z, max.z) && flush(b.z, max.z));
    if on_outer {
        WallKind::Exterior
    } else {
        WallKind::Interior
    }
}
