// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor-polygon primitives
//!
//! Pure functions over ordered vertex lists. Winding order is the insertion
//! order of the points; `signed_area` > 0 means counter-clockwise.

use roomplan_core::Point2D;

/// Signed shoelace area. Positive for counter-clockwise winding.
pub fn signed_area(points: &[Point2D]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].z;
        area -= points[j].x * points[i].z;
    }
    area / 2.0
}

/// Polygon area via the shoelace formula
pub fn polygon_area(points: &[Point2D]) -> f64 {
    signed_area(points).abs()
}

/// Total edge length, wrapping last vertex back to the first
pub fn perimeter(points: &[Point2D]) -> f64 {
    let n = points.len();
    if n < 2 {
        return 0.0;
    }

    let mut total = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        total += points[i].distance_to(&points[j]);
    }
    total
}

/// Vertex-average centroid of the polygon
pub fn centroid(points: &[Point2D]) -> Point2D {
    if points.is_empty() {
        return Point2D::new(0.0, 0.0);
    }
    let n = points.len() as f64;
    let x = points.iter().map(|p| p.x).sum::<f64>() / n;
    let z = points.iter().map(|p| p.z).sum::<f64>() / n;
    Point2D::new(x, z)
}

/// Point-in-polygon test using the even-odd (ray casting) rule.
///
/// Points exactly on an edge may be classified either way, but the result is
/// deterministic for identical inputs.
pub fn point_in_polygon(point: &Point2D, polygon: &[Point2D]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = &polygon[i];
        let pj = &polygon[j];
        if (pi.z > point.z) != (pj.z > point.z) {
            let x_cross = (pj.x - pi.x) * (point.z - pi.z) / (pj.z - pi.z) + pi.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Normalize a polygon to counter-clockwise winding, reversing in place
/// when the signed area is negative
pub fn ensure_ccw(points: &mut Vec<Point2D>) {
    if signed_area(points) < 0.0 {
        points.reverse();
    }
}

/// Axis-aligned bounds of the polygon: (min, max)
pub fn bounding_box(points: &[Point2D]) -> (Point2D, Point2D) {
    let mut min = Point2D::new(f64::INFINITY, f64::INFINITY);
    let mut max = Point2D::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min.x = min.x.min(p.x);
        min.z = min.z.min(p.z);
        max.x = max.x.max(p.x);
        max.z = max.z.max(p.z);
    }
    (min, max)
}
