// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # RoomPlan Planning
//!
//! The furniture space-planning and constraint-validation engine: placement
//! optimization over a discretized grid, clearance policy with feedback
//! learning, companion-furniture association rules, accessibility and
//! fire-safety validation, and layout reorganization advice.
//!
//! All engines are explicit, constructible objects; the orchestrator in
//! [`workflow`] owns one instance of each and sequences them into named
//! end-to-end operations.

pub mod association;
pub mod clearance;
pub mod constraint;
pub mod error;
pub mod fire_safety;
pub mod grid;
pub mod optimizer;
pub mod reorganization;
pub mod validator;
pub mod workflow;

pub use association::{
    AssociatedPlacement, AssociationEngine, AssociationPriority, AssociationRule,
    FurnitureAssociation, GroupedPlacement, Positioning,
};
pub use clearance::{
    ClearanceAdjustmentResult, ClearanceContext, ClearancePolicy, ClearanceSettings,
    CrowdingPrediction, CrowdingRisk, FeedbackKind, FeedbackRecord, FeedbackRequest,
    FeedbackSeverity,
};
pub use constraint::{
    ConstraintKind, Measurement, PlacementConstraint, Regulation, RequiredAction, Severity,
};
pub use error::{Error, Result};
pub use fire_safety::{EgressAnalysis, FireSafetyValidationResult, FireSafetyValidator};
pub use grid::{Footprint, GridCell, PlacementGrid};
pub use optimizer::{
    AccessZone, AccessZoneKind, AlternativeLayout, OptimizationConfig, OptimizationOverrides,
    OptimizationResult, PlacementLayout, PlacementStrategy, SpaceOptimizer,
};
pub use reorganization::{
    PlanDifficulty, ReorganizationAdvisor, ReorganizationAnalysis, ReorganizationGoal,
    ReorganizationPlan, ReorganizationSuggestion, SuggestionAction, SuggestionPriority,
};
pub use validator::{
    AccessibilityReport, ErgonomicsReport, PlacementValidationResult, PlacementValidator,
    SafetyReport,
};
pub use workflow::{
    AssistanceDigest, GeneratedLayout, Orchestrator, StepOutcome, WorkflowKind, WorkflowReport,
    WorkflowStep,
};
