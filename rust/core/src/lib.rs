// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # RoomPlan Core
//!
//! Shared data model for the room-planning engine: scene-object snapshots,
//! mesh metadata consumed from the rendering host, and the static furniture
//! catalog. All types here are plain values; the planning crates compute over
//! immutable copies handed in by the caller.

pub mod catalog;
pub mod error;
pub mod scene;
pub mod types;

pub use catalog::{FurnitureCatalog, FurnitureCategory, FurnitureSpec};
pub use error::{Error, Result};
pub use scene::{MeshResolver, SceneMutator};
pub use types::{
    BoundingBox, Dimensions, GridInfo, MeshSnapshot, Opening, OpeningKind, Point2D,
    RoomObjectExtensions, SceneObject, Vec3,
};
