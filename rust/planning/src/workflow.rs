// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Workflow orchestration
//!
//! Sequences the planning engines into named end-to-end operations with
//! step-wise progress records. The orchestrator owns one explicit instance
//! of every engine, including the single stateful clearance policy, and
//! resolves rooms through the host's [`MeshResolver`] seam.

use crate::association::{AssociationEngine, GroupedPlacement};
use crate::clearance::{ClearanceAdjustmentResult, ClearancePolicy, FeedbackRequest};
use crate::error::Result;
use crate::optimizer::{
    OptimizationOverrides, OptimizationResult, PlacementStrategy, SpaceOptimizer,
};
use crate::reorganization::{ReorganizationAdvisor, ReorganizationAnalysis, ReorganizationGoal};
use crate::validator::PlacementValidator;
use roomplan_core::{MeshResolver, MeshSnapshot, SceneObject};
use roomplan_geometry::{RoomAnalysisResult, RoomAnalyzer};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Named end-to-end operations
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WorkflowKind {
    SpaceOptimization,
    LayoutGeneration,
    RoomAnalysis,
    Reorganization,
    AiAssistance,
}

/// Outcome of one workflow step
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    Skipped,
}

/// One progress record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub name: String,
    pub detail: String,
    pub outcome: StepOutcome,
}

/// Ordered step records plus the operation's typed payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowReport<T> {
    pub kind: WorkflowKind,
    pub steps: Vec<WorkflowStep>,
    pub output: T,
}

/// A primary optimization expanded with companion groups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedLayout {
    pub optimization: OptimizationResult,
    pub groups: Vec<GroupedPlacement>,
}

/// Digest handed to the external assistant layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistanceDigest {
    pub analysis_summary: String,
    pub validation_score: f64,
    pub top_suggestions: Vec<String>,
}

/// Step recorder shared by the operations
struct Progress {
    steps: Vec<WorkflowStep>,
}

impl Progress {
    fn new() -> Self {
        Self { steps: Vec::new() }
    }

    fn completed(&mut self, name: &str, detail: String) {
        info!(step = name, %detail, "workflow step completed");
        self.steps.push(WorkflowStep {
            name: name.to_string(),
            detail,
            outcome: StepOutcome::Completed,
        });
    }

    fn skipped(&mut self, name: &str, detail: String) {
        info!(step = name, %detail, "workflow step skipped");
        self.steps.push(WorkflowStep {
            name: name.to_string(),
            detail,
            outcome: StepOutcome::Skipped,
        });
    }
}

/// The workflow orchestrator. Owns explicit engine instances; the clearance
/// policy is the only mutable member, so operations touching it take
/// `&mut self`.
pub struct Orchestrator<R: MeshResolver> {
    resolver: R,
    analyzer: RoomAnalyzer,
    optimizer: SpaceOptimizer,
    associations: AssociationEngine,
    validator: PlacementValidator,
    advisor: ReorganizationAdvisor,
    clearance: ClearancePolicy,
}

impl<R: MeshResolver> Orchestrator<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            analyzer: RoomAnalyzer::new(),
            optimizer: SpaceOptimizer::new(),
            associations: AssociationEngine::new(),
            validator: PlacementValidator::new(),
            advisor: ReorganizationAdvisor::new(),
            clearance: ClearancePolicy::new(),
        }
    }

    /// The session's clearance policy, for feedback and prediction calls
    pub fn clearance_policy(&mut self) -> &mut ClearancePolicy {
        &mut self.clearance
    }

    /// Route one clearance feedback submission through the owned policy
    pub fn submit_clearance_feedback(
        &mut self,
        request: &FeedbackRequest,
        objects: &[SceneObject],
    ) -> Result<ClearanceAdjustmentResult> {
        self.clearance.process_feedback(request, objects)
    }

    fn room(&self, room_id: &str) -> Result<MeshSnapshot> {
        self.resolver
            .mesh_snapshot(room_id)
            .ok_or_else(|| roomplan_core::Error::RoomNotFound(room_id.to_string()).into())
    }

    /// Analyze a room's geometry, zones and pathways
    pub fn run_room_analysis(
        &self,
        room_id: &str,
        objects: &[SceneObject],
    ) -> Result<WorkflowReport<RoomAnalysisResult>> {
        let mut progress = Progress::new();
        let room = self.room(room_id)?;
        progress.completed("resolve-room", format!("room {room_id} resolved"));

        let analysis = self.analyzer.analyze(&room, objects)?;
        progress.completed(
            "analyze-geometry",
            format!(
                "{:.1} m2 floor, {} wall segments, {} zones",
                analysis.bounds.area,
                analysis.bounds.wall_segments.len(),
                analysis.placement_zones.len()
            ),
        );

        Ok(WorkflowReport {
            kind: WorkflowKind::RoomAnalysis,
            steps: progress.steps,
            output: analysis,
        })
    }

    /// Compute placements for one furniture type
    pub fn run_space_optimization(
        &self,
        room_id: &str,
        object_type: &str,
        strategy: PlacementStrategy,
        overrides: Option<&OptimizationOverrides>,
        objects: &[SceneObject],
    ) -> Result<WorkflowReport<OptimizationResult>> {
        let mut progress = Progress::new();
        let room = self.room(room_id)?;
        progress.completed("resolve-room", format!("room {room_id} resolved"));

        let bounds = roomplan_geometry::analyze_room_geometry(&room.floor_polygon)?;
        progress.completed(
            "analyze-geometry",
            format!("{:.1} m2 usable", bounds.usable_area),
        );

        let result =
            self.optimizer
                .optimize_space(&bounds, object_type, strategy, overrides, objects)?;
        progress.completed(
            "optimize",
            format!(
                "{} placements at {:.0}% efficiency",
                result.max_objects,
                result.efficiency * 100.0
            ),
        );

        Ok(WorkflowReport {
            kind: WorkflowKind::SpaceOptimization,
            steps: progress.steps,
            output: result,
        })
    }

    /// Optimize a primary type and expand every accepted placement with its
    /// companion furniture
    pub fn run_layout_generation(
        &self,
        room_id: &str,
        primary_type: &str,
        strategy: PlacementStrategy,
        objects: &[SceneObject],
    ) -> Result<WorkflowReport<GeneratedLayout>> {
        let mut progress = Progress::new();
        let room = self.room(room_id)?;
        progress.completed("resolve-room", format!("room {room_id} resolved"));

        let bounds = roomplan_geometry::analyze_room_geometry(&room.floor_polygon)?;
        let optimization =
            self.optimizer
                .optimize_space(&bounds, primary_type, strategy, None, objects)?;
        progress.completed(
            "optimize",
            format!("{} primary placements", optimization.max_objects),
        );

        let groups: Vec<GroupedPlacement> = optimization
            .layouts
            .iter()
            .map(|layout| {
                self.associations.associated_placements(
                    primary_type,
                    layout.position,
                    layout.rotation,
                    Some(&bounds),
                )
            })
            .collect();
        if groups.iter().all(|g| g.associated_objects.is_empty()) {
            progress.skipped(
                "expand-associations",
                format!("no companion rules for {primary_type}"),
            );
        } else {
            progress.completed(
                "expand-associations",
                format!(
                    "{} companion objects",
                    groups.iter().map(|g| g.associated_objects.len()).sum::<usize>()
                ),
            );
        }

        Ok(WorkflowReport {
            kind: WorkflowKind::LayoutGeneration,
            steps: progress.steps,
            output: GeneratedLayout {
                optimization,
                groups,
            },
        })
    }

    /// Validate the current layout and propose reorganization plans
    pub fn run_reorganization(
        &self,
        room_id: &str,
        objects: &[SceneObject],
        goals: &[ReorganizationGoal],
    ) -> Result<WorkflowReport<ReorganizationAnalysis>> {
        let mut progress = Progress::new();
        let room = self.room(room_id)?;
        progress.completed("resolve-room", format!("room {room_id} resolved"));

        let analysis = self
            .advisor
            .analyze_and_suggest(&room, objects, room_id, goals)?;
        progress.completed(
            "suggest",
            format!(
                "score {:.0} -> {:.0}, {} plans",
                analysis.current_score,
                analysis.potential_score,
                analysis.reorganization_plans.len()
            ),
        );

        Ok(WorkflowReport {
            kind: WorkflowKind::Reorganization,
            steps: progress.steps,
            output: analysis,
        })
    }

    /// Analysis + validation digest for the external assistant layer
    pub fn run_ai_assistance(
        &self,
        room_id: &str,
        objects: &[SceneObject],
    ) -> Result<WorkflowReport<AssistanceDigest>> {
        let mut progress = Progress::new();
        let room = self.room(room_id)?;
        progress.completed("resolve-room", format!("room {room_id} resolved"));

        let analysis = self.analyzer.analyze(&room, objects)?;
        progress.completed(
            "analyze-geometry",
            format!("{:.1} m2 floor", analysis.bounds.area),
        );

        let validation = self
            .validator
            .validate_placement(&room, objects, room_id, None)?;
        progress.completed("validate", format!("score {:.0}", validation.score));

        let reorganization = self
            .advisor
            .analyze_and_suggest(&room, objects, room_id, &ReorganizationGoal::ALL)?;
        progress.completed(
            "suggest",
            format!("{} quick fixes", reorganization.quick_fixes.len()),
        );

        let analysis_summary = format!(
            "{:.1} m2 room ({:.1} m2 usable), {} objects placed, validation score {:.0}/100",
            analysis.bounds.area,
            analysis.bounds.usable_area,
            objects.len(),
            validation.score
        );
        let top_suggestions = reorganization
            .quick_fixes
            .iter()
            .map(|s| s.description.clone())
            .collect();

        Ok(WorkflowReport {
            kind: WorkflowKind::AiAssistance,
            steps: progress.steps,
            output: AssistanceDigest {
                analysis_summary,
                validation_score: validation.score,
                top_suggestions,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roomplan_core::{BoundingBox, Opening, Point2D, Vec3};

    struct FixedRooms {
        snapshot: MeshSnapshot,
    }

    impl MeshResolver for FixedRooms {
        fn mesh_snapshot(&self, id: &str) -> Option<MeshSnapshot> {
            (id == "room-1").then(|| self.snapshot.clone())
        }
    }

    fn orchestrator() -> Orchestrator<FixedRooms> {
        let snapshot = MeshSnapshot {
            position: Vec3::default(),
            rotation: Vec3::default(),
            scale: Vec3::new(1.0, 1.0, 1.0),
            bounding_box: BoundingBox::new(Vec3::default(), Vec3::new(6.0, 3.0, 6.0)),
            floor_polygon: vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(6.0, 0.0),
                Point2D::new(6.0, 6.0),
                Point2D::new(0.0, 6.0),
            ],
            openings: vec![Opening::door(Point2D::new(3.0, 0.0), 1.2)],
        };
        Orchestrator::new(FixedRooms { snapshot })
    }

    #[test]
    fn unknown_room_fails_with_room_not_found() {
        let orchestrator = orchestrator();
        let err = orchestrator.run_room_analysis("room-2", &[]).unwrap_err();
        assert!(err.to_string().contains("no room found"));
    }

    #[test]
    fn room_analysis_reports_steps_in_order() {
        let orchestrator = orchestrator();
        let report = orchestrator.run_room_analysis("room-1", &[]).unwrap();
        assert_eq!(report.kind, WorkflowKind::RoomAnalysis);
        let names: Vec<&str> = report.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["resolve-room", "analyze-geometry"]);
        assert!((report.output.bounds.area - 36.0).abs() < 1e-6);
    }

    #[test]
    fn space_optimization_places_chairs() {
        let orchestrator = orchestrator();
        let report = orchestrator
            .run_space_optimization("room-1", "chair", PlacementStrategy::Maximize, None, &[])
            .unwrap();
        assert!(report.output.max_objects >= 4);
        assert!(report
            .steps
            .iter()
            .all(|s| s.outcome == StepOutcome::Completed));
    }

    #[test]
    fn layout_generation_expands_table_groups() {
        let orchestrator = orchestrator();
        let report = orchestrator
            .run_layout_generation("room-1", "table", PlacementStrategy::Comfort, &[])
            .unwrap();
        assert!(!report.output.groups.is_empty());
        assert!(report
            .output
            .groups
            .iter()
            .any(|g| !g.associated_objects.is_empty()));
    }

    #[test]
    fn ai_assistance_produces_a_digest() {
        let orchestrator = orchestrator();
        let desk = SceneObject::new("desk-1", "desk", Vec3::new(2.0, 0.0, 4.0));
        let report = orchestrator.run_ai_assistance("room-1", &[desk]).unwrap();
        assert!(report.output.analysis_summary.contains("36.0 m2"));
        assert!(report.output.validation_score >= 0.0);
        assert_eq!(report.steps.len(), 4);
    }

    #[test]
    fn feedback_routes_through_the_owned_policy() {
        let mut orchestrator = orchestrator();
        let desk = SceneObject::new("desk-1", "desk", Vec3::new(2.0, 0.0, 4.0));
        let request = FeedbackRequest {
            object_id: "desk-1".to_string(),
            feedback: crate::clearance::FeedbackKind::TooCrowded,
            severity: crate::clearance::FeedbackSeverity::Moderate,
            location: Vec3::default(),
            activity: None,
        };
        let result = orchestrator
            .submit_clearance_feedback(&request, std::slice::from_ref(&desk))
            .unwrap();
        assert!(result.new_multiplier > result.previous_multiplier);
    }
}
