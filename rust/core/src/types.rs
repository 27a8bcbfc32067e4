// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types shared between the room analyzer, optimizer and validators

use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

/// A 2D floor-plane point in room-local meters (y-up world, so the floor
/// plane is spanned by x and z)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub z: f64,
}

impl Point2D {
    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.z)
    }

    pub fn from_nalgebra(p: &Point2<f64>) -> Self {
        Self { x: p.x, z: p.y }
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        (dx * dx + dz * dz).sqrt()
    }
}

/// A 3D vector/position (simplified for serialization)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_nalgebra(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }

    /// Projection onto the floor plane
    pub fn floor_point(&self) -> Point2D {
        Point2D::new(self.x, self.z)
    }

    /// Horizontal (floor-plane) distance, ignoring elevation
    pub fn floor_distance_to(&self, other: &Vec3) -> f64 {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        (dx * dx + dz * dz).sqrt()
    }
}

impl From<Point2D> for Vec3 {
    fn from(p: Point2D) -> Self {
        Self::new(p.x, 0.0, p.z)
    }
}

/// Object dimensions in meters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Largest horizontal extent, used for coarse conflict radii
    pub fn max_footprint(&self) -> f64 {
        self.width.max(self.depth)
    }
}

/// Axis-aligned bounding box of a mesh, in world meters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(
            self.max.x - self.min.x,
            self.max.y - self.min.y,
            self.max.z - self.min.z,
        )
    }

    pub fn center(&self) -> Vec3 {
        Vec3::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            (self.min.z + self.max.z) / 2.0,
        )
    }
}

/// Placement-grid metadata carried by rooms that were built from a grid
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridInfo {
    /// Grid spacing in meters
    pub resolution: f64,
    pub columns: u32,
    pub rows: u32,
}

/// Room-specific extension fields attached to scene objects.
///
/// The rendering host tags room meshes with their floor polygon and grid
/// metadata; furniture objects usually carry none of these.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RoomObjectExtensions {
    pub floor_polygon: Option<Vec<Point2D>>,
    pub grid_info: Option<GridInfo>,
    pub room_id: Option<String>,
}

/// A snapshot of one scene object, copied out of the rendering host.
///
/// Positions are world meters, rotation is radians around the vertical axis
/// (stored in `rotation.y`), scale is the per-axis mesh scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneObject {
    pub id: String,
    /// Key into the furniture catalog and clearance tables
    pub object_type: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    /// Measured bounding-box dimensions, overriding catalog defaults
    pub actual_dimensions: Option<Dimensions>,
    pub extensions: Option<RoomObjectExtensions>,
}

impl SceneObject {
    pub fn new(id: impl Into<String>, object_type: impl Into<String>, position: Vec3) -> Self {
        Self {
            id: id.into(),
            object_type: object_type.into(),
            position,
            rotation: Vec3::default(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            actual_dimensions: None,
            extensions: None,
        }
    }

    /// Yaw rotation in radians around the vertical axis
    pub fn yaw(&self) -> f64 {
        self.rotation.y
    }
}

/// Kind of wall opening
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OpeningKind {
    Door,
    Window,
}

/// A wall opening (door or window) read from room metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opening {
    pub kind: OpeningKind,
    /// Center of the opening on the floor plane
    pub position: Point2D,
    pub width: f64,
    pub height: f64,
    /// Marked as an emergency exit by the room author
    pub is_fire_exit: bool,
    /// Measured width of the pathway leading to this opening, if the host
    /// tracked one
    pub associated_pathway_width: Option<f64>,
}

impl Opening {
    pub fn door(position: Point2D, width: f64) -> Self {
        Self {
            kind: OpeningKind::Door,
            position,
            width,
            height: 2.1,
            is_fire_exit: false,
            associated_pathway_width: None,
        }
    }

    pub fn window(position: Point2D, width: f64) -> Self {
        Self {
            kind: OpeningKind::Window,
            position,
            width,
            height: 1.2,
            is_fire_exit: false,
            associated_pathway_width: None,
        }
    }
}

/// One cohesive snapshot of a room mesh: transform, bounds and the floor
/// metadata the planner needs. This is the only payload the core ever reads
/// from the rendering layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshSnapshot {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub bounding_box: BoundingBox,
    /// Ordered floor polygon in room-local meters
    pub floor_polygon: Vec<Point2D>,
    pub openings: Vec<Opening>,
}

impl MeshSnapshot {
    /// Doors only, in polygon order
    pub fn doors(&self) -> impl Iterator<Item = &Opening> {
        self.openings
            .iter()
            .filter(|o| o.kind == OpeningKind::Door)
    }

    /// Windows only
    pub fn windows(&self) -> impl Iterator<Item = &Opening> {
        self.openings
            .iter()
            .filter(|o| o.kind == OpeningKind::Window)
    }
}
