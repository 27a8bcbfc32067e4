// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Seams to the rendering/scene host
//!
//! The planner never touches the rendering engine's object model. It reads
//! room geometry through [`MeshResolver`] and pushes accepted reorganization
//! edits back through [`SceneMutator`].

use crate::types::{MeshSnapshot, Vec3};

/// Read-only access to room meshes by id
pub trait MeshResolver {
    fn mesh_snapshot(&self, id: &str) -> Option<MeshSnapshot>;
}

/// Scene-mutation callbacks invoked when a reorganization plan is applied.
///
/// Implementations live in the host application; the planner only sequences
/// calls and never retains state across them.
pub trait SceneMutator {
    fn update_position(&mut self, id: &str, position: Vec3, rotation: Option<f64>);
    fn remove(&mut self, id: &str);
    fn add(&mut self, object_type: &str, position: Vec3, rotation: Option<f64>) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoundingBox, Point2D};

    struct OneRoom(MeshSnapshot);

    impl MeshResolver for OneRoom {
        fn mesh_snapshot(&self, id: &str) -> Option<MeshSnapshot> {
            (id == "room-1").then(|| self.0.clone())
        }
    }

    #[test]
    fn resolver_returns_none_for_unknown_room() {
        let snapshot = MeshSnapshot {
            position: Vec3::default(),
            rotation: Vec3::default(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            bounding_box: BoundingBox::new(Vec3::default(), Vec3::new(4.0, 3.0, 4.0)),
            floor_polygon: vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(4.0, 0.0),
                Point2D::new(4.0, 4.0),
                Point2D::new(0.0, 4.0),
            ],
            openings: Vec::new(),
        };
        let resolver = OneRoom(snapshot);
        assert!(resolver.mesh_snapshot("room-1").is_some());
        assert!(resolver.mesh_snapshot("room-2").is_none());
    }
}
