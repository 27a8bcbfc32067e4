// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # RoomPlan Geometry
//!
//! Floor-polygon utilities and room analysis: point-in-polygon tests,
//! segment distances, shoelace areas, wall-segment derivation and
//! placement-zone/pathway classification. Everything here is a pure
//! function over caller-supplied snapshots.

pub mod error;
pub mod polygon;
pub mod room;
pub mod segment;
pub mod zones;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use error::{Error, Result};
pub use polygon::{
    bounding_box, centroid, ensure_ccw, perimeter, point_in_polygon, polygon_area, signed_area,
};
pub use room::{analyze_room_geometry, RoomBounds, WallKind, WallSegment};
pub use segment::{closest_point_on_segment, distance_to_segment};
pub use zones::{
    AccessPathway, PlacementZone, RoomAnalysisResult, RoomAnalyzer, ZoneQuality,
};
