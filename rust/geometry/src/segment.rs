// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point-to-segment distance helpers

use roomplan_core::Point2D;

/// Closest point on segment [a, b] to `point`, clamped to the endpoints
pub fn closest_point_on_segment(point: &Point2D, a: &Point2D, b: &Point2D) -> Point2D {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    let length_sq = dx * dx + dz * dz;

    if length_sq < 1e-12 {
        return *a;
    }

    let t = ((point.x - a.x) * dx + (point.z - a.z) * dz) / length_sq;
    let t = t.clamp(0.0, 1.0);
    Point2D::new(a.x + t * dx, a.z + t * dz)
}

/// Distance from `point` to the segment [a, b]
pub fn distance_to_segment(point: &Point2D, a: &Point2D, b: &Point2D) -> f64 {
    point.distance_to(&closest_point_on_segment(point, a, b))
}
