// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Constraint records
//!
//! Violations, warnings and suggestions are first-class output data: value
//! records produced by the validators, never mutated after creation and
//! never raised as errors.

use roomplan_core::Vec3;
use serde::{Deserialize, Serialize};

/// What a constraint record is about
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConstraintKind {
    Clearance,
    Accessibility,
    Safety,
    Ergonomic,
    BuildingCode,
    Functional,
}

/// How serious a constraint record is
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Suggestion,
}

/// What the user should do about it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RequiredAction {
    Move,
    Remove,
    Resize,
    Rotate,
    Group,
    None,
}

/// Measured value against its requirement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    pub actual: f64,
    pub required: f64,
    pub unit: String,
}

impl Measurement {
    pub fn meters(actual: f64, required: f64) -> Self {
        Self {
            actual,
            required,
            unit: "m".to_string(),
        }
    }
}

/// Regulatory reference backing a constraint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Regulation {
    pub standard: String,
    pub reference: String,
}

impl Regulation {
    pub fn ada(reference: &str) -> Self {
        Self {
            standard: "ADA".to_string(),
            reference: reference.to_string(),
        }
    }

    pub fn ibc(reference: &str) -> Self {
        Self {
            standard: "IBC".to_string(),
            reference: reference.to_string(),
        }
    }
}

/// One violation/warning/suggestion record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementConstraint {
    pub id: String,
    pub kind: ConstraintKind,
    pub severity: Severity,
    pub description: String,
    pub affected_objects: Vec<String>,
    pub position: Option<Vec3>,
    pub required_action: RequiredAction,
    pub measurement: Option<Measurement>,
    pub regulation: Option<Regulation>,
}

impl PlacementConstraint {
    /// Minimal record builder; optional fields start empty
    pub fn new(
        id: impl Into<String>,
        kind: ConstraintKind,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            severity,
            description: description.into(),
            affected_objects: Vec::new(),
            position: None,
            required_action: RequiredAction::None,
            measurement: None,
            regulation: None,
        }
    }

    pub fn with_objects(mut self, objects: impl IntoIterator<Item = String>) -> Self {
        self.affected_objects = objects.into_iter().collect();
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = Some(position);
        self
    }

    pub fn action(mut self, action: RequiredAction) -> Self {
        self.required_action = action;
        self
    }

    pub fn measured(mut self, measurement: Measurement) -> Self {
        self.measurement = Some(measurement);
        self
    }

    pub fn regulated(mut self, regulation: Regulation) -> Self {
        self.regulation = Some(regulation);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_optional_fields() {
        let constraint = PlacementConstraint::new(
            "clr-1",
            ConstraintKind::Clearance,
            Severity::Warning,
            "desk too close to chair",
        )
        .with_objects(["desk-1".to_string(), "chair-1".to_string()])
        .action(RequiredAction::Move)
        .measured(Measurement::meters(0.4, 0.6));

        assert_eq!(constraint.affected_objects.len(), 2);
        assert_eq!(constraint.required_action, RequiredAction::Move);
        let m = constraint.measurement.unwrap();
        assert_eq!(m.unit, "m");
        assert!(m.actual < m.required);
    }

    #[test]
    fn severity_orders_errors_first() {
        assert!(Severity::Error < Severity::Warning);
        assert!(Severity::Warning < Severity::Info);
        assert!(Severity::Info < Severity::Suggestion);
    }

    #[test]
    fn records_round_trip_through_json() {
        let constraint = PlacementConstraint::new(
            "ada-1",
            ConstraintKind::Accessibility,
            Severity::Error,
            "pathway too narrow",
        )
        .measured(Measurement::meters(0.7, 0.91))
        .regulated(Regulation::ada("ADA 403.5.1"));

        let json = serde_json::to_string(&constraint).unwrap();
        let back: PlacementConstraint = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "ada-1");
        assert_eq!(back.severity, Severity::Error);
        assert_eq!(back.regulation.unwrap().standard, "ADA");
    }
}
