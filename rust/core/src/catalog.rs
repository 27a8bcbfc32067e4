// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Static furniture catalog
//!
//! Read-only dimension and clearance defaults keyed by object-type string.
//! Measured bounding boxes always win over catalog defaults; unknown types
//! fall back to a generic entry so lookups never fail.

use crate::types::{Dimensions, SceneObject};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Functional category of a furniture type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FurnitureCategory {
    Seating,
    WorkSurface,
    Storage,
    Sleeping,
    Appliance,
    Decor,
}

/// Catalog entry: default dimensions plus per-side clearance requirements
#[derive(Debug, Clone, Copy)]
pub struct FurnitureSpec {
    pub dimensions: Dimensions,
    /// Clearance behind the object (wall side)
    pub back_clearance: f64,
    pub side_clearance: f64,
    /// Clearance in front, where a person stands or sits
    pub front_clearance: f64,
    /// Total approach clearance for using the object
    pub access_clearance: f64,
    /// Must sit flush against a wall
    pub wall_mount: bool,
    pub category: FurnitureCategory,
}

impl FurnitureSpec {
    const fn new(
        width: f64,
        height: f64,
        depth: f64,
        back: f64,
        side: f64,
        front: f64,
        access: f64,
        wall_mount: bool,
        category: FurnitureCategory,
    ) -> Self {
        Self {
            dimensions: Dimensions {
                width,
                height,
                depth,
            },
            back_clearance: back,
            side_clearance: side,
            front_clearance: front,
            access_clearance: access,
            wall_mount,
            category,
        }
    }
}

/// Generic fallback for unknown furniture types
const GENERIC_SPEC: FurnitureSpec = FurnitureSpec::new(
    0.8,
    0.8,
    0.8,
    0.3,
    0.3,
    0.6,
    0.8,
    false,
    FurnitureCategory::Decor,
);

/// Static lookup of furniture dimension/clearance defaults
pub struct FurnitureCatalog {
    entries: FxHashMap<&'static str, FurnitureSpec>,
}

impl FurnitureCatalog {
    pub fn new() -> Self {
        use FurnitureCategory::*;
        let mut entries = FxHashMap::default();
        let table: [(&'static str, FurnitureSpec); 13] = [
            ("desk", FurnitureSpec::new(1.2, 0.75, 0.6, 0.1, 0.3, 0.75, 1.2, false, WorkSurface)),
            ("chair", FurnitureSpec::new(0.45, 0.9, 0.45, 0.3, 0.2, 0.45, 0.6, false, Seating)),
            ("table", FurnitureSpec::new(1.4, 0.75, 0.8, 0.6, 0.6, 0.6, 0.9, false, WorkSurface)),
            ("sofa", FurnitureSpec::new(1.9, 0.85, 0.9, 0.05, 0.3, 0.75, 0.8, false, Seating)),
            ("armchair", FurnitureSpec::new(0.8, 0.95, 0.85, 0.1, 0.3, 0.6, 0.7, false, Seating)),
            ("bed", FurnitureSpec::new(1.6, 0.5, 2.0, 0.05, 0.6, 0.75, 0.75, false, Sleeping)),
            ("bookcase", FurnitureSpec::new(0.9, 1.8, 0.3, 0.0, 0.1, 0.9, 0.75, false, Storage)),
            ("wardrobe", FurnitureSpec::new(1.2, 2.0, 0.6, 0.0, 0.1, 0.9, 0.9, false, Storage)),
            ("tv", FurnitureSpec::new(1.2, 0.7, 0.1, 0.05, 0.2, 1.5, 0.5, true, Appliance)),
            ("nightstand", FurnitureSpec::new(0.45, 0.55, 0.4, 0.05, 0.1, 0.4, 0.4, false, Storage)),
            ("coffee table", FurnitureSpec::new(0.9, 0.45, 0.6, 0.3, 0.3, 0.3, 0.4, false, Decor)),
            ("side table", FurnitureSpec::new(0.45, 0.55, 0.45, 0.1, 0.1, 0.3, 0.3, false, Decor)),
            ("lamp", FurnitureSpec::new(0.35, 1.5, 0.35, 0.1, 0.1, 0.2, 0.3, false, Decor)),
        ];
        for (name, spec) in table {
            entries.insert(name, spec);
        }
        Self { entries }
    }

    /// Look up a type, case-insensitively. Unknown types report the generic
    /// entry; use [`FurnitureCatalog::get`] to distinguish.
    pub fn spec(&self, object_type: &str) -> FurnitureSpec {
        self.get(object_type).unwrap_or(GENERIC_SPEC)
    }

    /// Exact lookup without the generic fallback
    pub fn get(&self, object_type: &str) -> Option<FurnitureSpec> {
        let key = object_type.to_ascii_lowercase();
        self.entries.get(key.as_str()).copied()
    }

    /// Effective dimensions for an object: measured bounds when present,
    /// catalog defaults otherwise
    pub fn dimensions_for(&self, object: &SceneObject) -> Dimensions {
        object
            .actual_dimensions
            .unwrap_or_else(|| self.spec(&object.object_type).dimensions)
    }
}

impl Default for FurnitureCatalog {
    fn default() -> Self {
        Self::new()
    }
}
