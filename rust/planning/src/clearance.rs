// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dynamic clearance policy
//!
//! Per-type clearance settings with an adaptive multiplier learned from user
//! feedback. This is the only stateful component of the planning engine; its
//! lifetime is the process session and callers serialize access to it.

use roomplan_core::{SceneObject, Vec3};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Bounds for the learned adaptive multiplier
const ADAPTIVE_MIN: f64 = 0.5;
const ADAPTIVE_MAX: f64 = 2.0;

/// Bounds for the global spacing preference
const SPACING_PREFERENCE_MIN: f64 = 0.5;
const SPACING_PREFERENCE_MAX: f64 = 1.5;

/// Effective clearance never drops below this, in meters
const MIN_EFFECTIVE_CLEARANCE: f64 = 0.3;

/// Additional clearance fraction per person beyond the first
const OCCUPANCY_SCALING: f64 = 0.2;

/// Number of candidate directions when proposing alternative positions
const COMPASS_DIRECTIONS: usize = 8;

/// Per-type clearance configuration.
///
/// The four additive terms sum to the raw clearance; `adaptive_multiplier`
/// is the only field feedback mutates. `emergency_access` is consumed by the
/// safety validators, not the additive sum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClearanceSettings {
    pub base_clearance: f64,
    pub personal_space: f64,
    pub activity_clearance: f64,
    pub comfort_buffer: f64,
    pub emergency_access: f64,
    /// Learned scaling factor, clamped to [0.5, 2.0]
    pub adaptive_multiplier: f64,
}

impl ClearanceSettings {
    const fn new(base: f64, personal: f64, activity: f64, comfort: f64, emergency: f64) -> Self {
        Self {
            base_clearance: base,
            personal_space: personal,
            activity_clearance: activity,
            comfort_buffer: comfort,
            emergency_access: emergency,
            adaptive_multiplier: 1.0,
        }
    }

    /// Sum of the four additive clearance terms
    pub fn additive_sum(&self) -> f64 {
        self.base_clearance + self.personal_space + self.activity_clearance + self.comfort_buffer
    }
}

/// Hand-tuned defaults per furniture type; everything else gets the generic
/// baseline
fn default_settings(object_type: &str) -> ClearanceSettings {
    match object_type.to_ascii_lowercase().as_str() {
        "desk" => ClearanceSettings::new(0.6, 0.45, 0.75, 0.15, 0.9),
        "table" => ClearanceSettings::new(0.6, 0.45, 0.6, 0.2, 0.9),
        "sofa" => ClearanceSettings::new(0.45, 0.5, 0.45, 0.25, 0.9),
        "bed" => ClearanceSettings::new(0.6, 0.4, 0.75, 0.3, 0.9),
        "bookcase" => ClearanceSettings::new(0.3, 0.2, 0.9, 0.1, 0.75),
        "chair" => ClearanceSettings::new(0.45, 0.3, 0.45, 0.1, 0.75),
        "tv" => ClearanceSettings::new(0.3, 0.1, 1.5, 0.1, 0.6),
        _ => ClearanceSettings::new(0.45, 0.3, 0.45, 0.15, 0.75),
    }
}

/// Context applied when resolving an effective clearance
#[derive(Debug, Clone, Default)]
pub struct ClearanceContext {
    /// Activity the clearance is resolved for (e.g. "working", "dining")
    pub activity: Option<String>,
    /// People using the object at once; zero is treated as one
    pub user_count: u32,
}

/// User judgment about the spacing around an object
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FeedbackKind {
    TooCrowded,
    Uncomfortable,
    TooSparse,
    JustRight,
}

impl FeedbackKind {
    /// Signed weight applied to the adjustment magnitude
    fn direction_weight(self) -> f64 {
        match self {
            FeedbackKind::TooCrowded => 1.0,
            FeedbackKind::Uncomfortable => 0.8,
            FeedbackKind::TooSparse => -1.0,
            FeedbackKind::JustRight => 0.0,
        }
    }
}

/// How strongly the user felt about it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FeedbackSeverity {
    Mild,
    Moderate,
    Severe,
}

impl FeedbackSeverity {
    fn magnitude(self) -> f64 {
        match self {
            FeedbackSeverity::Mild => 0.1,
            FeedbackSeverity::Moderate => 0.2,
            FeedbackSeverity::Severe => 0.4,
        }
    }
}

/// One feedback submission about a placed object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub object_id: String,
    pub feedback: FeedbackKind,
    pub severity: FeedbackSeverity,
    /// Where the user was when reporting
    pub location: Vec3,
    pub activity: Option<String>,
}

/// Recorded feedback entry kept in per-object history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub feedback: FeedbackKind,
    pub severity: FeedbackSeverity,
    pub activity: Option<String>,
}

/// Outcome of applying one feedback submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearanceAdjustmentResult {
    pub object_type: String,
    pub previous_multiplier: f64,
    pub new_multiplier: f64,
    pub previous_clearance: f64,
    pub new_clearance: f64,
    /// Objects now closer than the new clearance and needing repositioning
    pub affected_objects: Vec<String>,
    /// Up to three conflict-free candidate positions for the object
    pub alternative_positions: Vec<Vec3>,
}

/// Crowding risk level for a hypothetical placement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CrowdingRisk {
    Low,
    Medium,
    High,
}

/// Prediction of crowding issues for a hypothetical new placement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrowdingPrediction {
    pub risk: CrowdingRisk,
    pub potential_issues: Vec<String>,
    pub suggested_adjustments: Vec<String>,
}

/// The clearance policy store. Explicitly constructed and owned by the
/// orchestrator; never a global.
pub struct ClearancePolicy {
    settings: FxHashMap<String, ClearanceSettings>,
    feedback_history: FxHashMap<String, Vec<FeedbackRecord>>,
    /// Global spacing preference multiplier, nudged by feedback
    spacing_preference: f64,
    /// Per-activity preference multipliers, clamped to [0.5, 2.0]
    activity_preferences: FxHashMap<String, f64>,
}

impl ClearancePolicy {
    pub fn new() -> Self {
        Self {
            settings: FxHashMap::default(),
            feedback_history: FxHashMap::default(),
            spacing_preference: 1.0,
            activity_preferences: FxHashMap::default(),
        }
    }

    /// Settings for a type, creating type-specific defaults on first access
    pub fn settings(&mut self, object_type: &str) -> &ClearanceSettings {
        self.settings
            .entry(object_type.to_ascii_lowercase())
            .or_insert_with(|| default_settings(object_type))
    }

    /// Current settings without mutating the store; defaults if the type was
    /// never touched
    pub fn settings_snapshot(&self, object_type: &str) -> ClearanceSettings {
        self.settings
            .get(&object_type.to_ascii_lowercase())
            .copied()
            .unwrap_or_else(|| default_settings(object_type))
    }

    /// Feedback history recorded for one object
    pub fn history(&self, object_id: &str) -> &[FeedbackRecord] {
        self.feedback_history
            .get(object_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Effective clearance for a type under the given context.
    ///
    /// Applies, in order: the adaptive multiplier, the learned per-activity
    /// multiplier, occupancy scaling (+20% per additional person) and the
    /// global spacing preference. Floored at 0.3 m.
    pub fn effective_clearance(
        &self,
        object_type: &str,
        context: Option<&ClearanceContext>,
    ) -> f64 {
        let settings = self.settings_snapshot(object_type);
        let mut clearance = settings.additive_sum() * settings.adaptive_multiplier;

        if let Some(ctx) = context {
            if let Some(activity) = &ctx.activity {
                clearance *= self
                    .activity_preferences
                    .get(activity.as_str())
                    .copied()
                    .unwrap_or(1.0);
            }
            let users = ctx.user_count.max(1);
            clearance *= 1.0 + OCCUPANCY_SCALING * (users - 1) as f64;
        }

        clearance *= self.spacing_preference;
        clearance.max(MIN_EFFECTIVE_CLEARANCE)
    }

    /// Apply one feedback submission: adjust the type's adaptive multiplier,
    /// record history, nudge global learning state and report impact on the
    /// surrounding objects.
    pub fn process_feedback(
        &mut self,
        request: &FeedbackRequest,
        scene_objects: &[SceneObject],
    ) -> crate::error::Result<ClearanceAdjustmentResult> {
        let object = scene_objects
            .iter()
            .find(|o| o.id == request.object_id)
            .ok_or_else(|| roomplan_core::Error::UnknownObject(request.object_id.clone()))?;
        let object_type = object.object_type.clone();

        let previous_clearance = self.effective_clearance(&object_type, None);
        let previous_multiplier = self.settings(&object_type).adaptive_multiplier;

        let delta = request.severity.magnitude() * request.feedback.direction_weight();
        let new_multiplier = (previous_multiplier + delta).clamp(ADAPTIVE_MIN, ADAPTIVE_MAX);

        let key = object_type.to_ascii_lowercase();
        if let Some(settings) = self.settings.get_mut(&key) {
            settings.adaptive_multiplier = new_multiplier;
        }

        self.feedback_history
            .entry(request.object_id.clone())
            .or_default()
            .push(FeedbackRecord {
                feedback: request.feedback,
                severity: request.severity,
                activity: request.activity.clone(),
            });

        self.learn_global(request);

        let new_clearance = self.effective_clearance(&object_type, None);
        debug!(
            object_type = %object_type,
            previous_multiplier,
            new_multiplier,
            "clearance feedback applied"
        );

        let affected_objects = self.affected_objects(
            object,
            scene_objects,
            previous_clearance,
            new_clearance,
        );
        let alternative_positions =
            self.alternative_positions(object, scene_objects, new_clearance);

        Ok(ClearanceAdjustmentResult {
            object_type,
            previous_multiplier,
            new_multiplier,
            previous_clearance,
            new_clearance,
            affected_objects,
            alternative_positions,
        })
    }

    /// Pairwise-check a hypothetical new object against every placed object
    pub fn predict_crowding(
        &self,
        scene_objects: &[SceneObject],
        new_type: &str,
        new_position: Vec3,
    ) -> CrowdingPrediction {
        let new_clearance = self.effective_clearance(new_type, None);
        let mut potential_issues = Vec::new();
        let mut suggested_adjustments = Vec::new();

        for other in scene_objects {
            let other_clearance = self.effective_clearance(&other.object_type, None);
            let required = (new_clearance + other_clearance) / 2.0;
            let distance = new_position.floor_distance_to(&other.position);
            if distance < required {
                potential_issues.push(format!(
                    "{} would sit {:.2} m from {} ({}), below the {:.2} m separation",
                    new_type, distance, other.id, other.object_type, required
                ));
                suggested_adjustments.push(format!(
                    "move at least {:.2} m away from {}",
                    required - distance,
                    other.id
                ));
            }
        }

        let risk = if potential_issues.len() > 3 {
            CrowdingRisk::High
        } else if potential_issues.len() > 1 {
            CrowdingRisk::Medium
        } else {
            CrowdingRisk::Low
        };

        CrowdingPrediction {
            risk,
            potential_issues,
            suggested_adjustments,
        }
    }

    /// Drop all learned state back to defaults
    pub fn reset(&mut self) {
        self.settings.clear();
        self.feedback_history.clear();
        self.activity_preferences.clear();
        self.spacing_preference = 1.0;
    }

    /// Nudge the global spacing preference and per-activity multiplier
    fn learn_global(&mut self, request: &FeedbackRequest) {
        let spacing_nudge = match request.feedback {
            FeedbackKind::TooCrowded => 0.05,
            FeedbackKind::TooSparse => -0.05,
            _ => 0.0,
        };
        self.spacing_preference = (self.spacing_preference + spacing_nudge)
            .clamp(SPACING_PREFERENCE_MIN, SPACING_PREFERENCE_MAX);

        if let Some(activity) = &request.activity {
            let nudge = match request.feedback {
                FeedbackKind::TooCrowded => 0.1,
                FeedbackKind::TooSparse => -0.1,
                _ => 0.0,
            };
            if nudge != 0.0 {
                let entry = self
                    .activity_preferences
                    .entry(activity.clone())
                    .or_insert(1.0);
                *entry = (*entry + nudge).clamp(ADAPTIVE_MIN, ADAPTIVE_MAX);
            }
        }
    }

    /// Objects within twice the larger clearance radius that now sit closer
    /// than the new clearance
    fn affected_objects(
        &self,
        subject: &SceneObject,
        scene_objects: &[SceneObject],
        old_clearance: f64,
        new_clearance: f64,
    ) -> Vec<String> {
        let search_radius = 2.0 * old_clearance.max(new_clearance);
        scene_objects
            .iter()
            .filter(|o| o.id != subject.id)
            .filter(|o| {
                let distance = subject.position.floor_distance_to(&o.position);
                distance <= search_radius && distance < new_clearance
            })
            .map(|o| o.id.clone())
            .collect()
    }

    /// Up to three compass-point candidates at the new clearance radius that
    /// keep their distance from every other object
    fn alternative_positions(
        &self,
        subject: &SceneObject,
        scene_objects: &[SceneObject],
        new_clearance: f64,
    ) -> Vec<Vec3> {
        let mut candidates = Vec::new();
        for i in 0..COMPASS_DIRECTIONS {
            if candidates.len() >= 3 {
                break;
            }
            let angle = i as f64 * std::f64::consts::TAU / COMPASS_DIRECTIONS as f64;
            let candidate = Vec3::new(
                subject.position.x + new_clearance * angle.cos(),
                subject.position.y,
                subject.position.z + new_clearance * angle.sin(),
            );
            let clear = scene_objects
                .iter()
                .filter(|o| o.id != subject.id)
                .all(|o| candidate.floor_distance_to(&o.position) >= new_clearance);
            if clear {
                candidates.push(candidate);
            }
        }
        candidates
    }
}

impl Default for ClearancePolicy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn severe_crowding(object_id: &str) -> FeedbackRequest {
        FeedbackRequest {
            object_id: object_id.to_string(),
            feedback: FeedbackKind::TooCrowded,
            severity: FeedbackSeverity::Severe,
            location: Vec3::default(),
            activity: None,
        }
    }

    #[test]
    fn settings_created_on_first_access() {
        let mut policy = ClearancePolicy::new();
        let desk = *policy.settings("desk");
        assert_relative_eq!(desk.adaptive_multiplier, 1.0);
        assert!(desk.additive_sum() > 0.0);
        // Unknown types get the generic baseline
        let generic = *policy.settings("hologram projector");
        assert_relative_eq!(generic.base_clearance, 0.45);
    }

    #[test]
    fn effective_clearance_has_floor() {
        let mut policy = ClearancePolicy::new();
        policy.settings("side table");
        assert!(policy.effective_clearance("side table", None) >= 0.3);
    }

    #[test]
    fn occupancy_scales_clearance() {
        let policy = ClearancePolicy::new();
        let alone = policy.effective_clearance(
            "table",
            Some(&ClearanceContext {
                activity: None,
                user_count: 1,
            }),
        );
        let four = policy.effective_clearance(
            "table",
            Some(&ClearanceContext {
                activity: None,
                user_count: 4,
            }),
        );
        assert_relative_eq!(four, alone * 1.6, epsilon = 1e-9);
    }

    #[test]
    fn repeated_severe_crowding_caps_multiplier() {
        let mut policy = ClearancePolicy::new();
        let desk = SceneObject::new("desk-1", "desk", Vec3::default());
        let objects = vec![desk];

        let mut last = 1.0;
        let mut results = Vec::new();
        for _ in 0..5 {
            let result = policy
                .process_feedback(&severe_crowding("desk-1"), &objects)
                .unwrap();
            assert!(result.new_multiplier >= last);
            last = result.new_multiplier;
            results.push(result);
        }
        assert_relative_eq!(last, 2.0, epsilon = 1e-9);
        // Clamp reached at or before the fifth submission
        assert!(results[2].new_multiplier >= 1.8);
        assert_eq!(policy.history("desk-1").len(), 5);
    }

    #[test]
    fn sparse_feedback_lowers_multiplier_to_floor() {
        let mut policy = ClearancePolicy::new();
        let objects = vec![SceneObject::new("sofa-1", "sofa", Vec3::default())];
        let request = FeedbackRequest {
            object_id: "sofa-1".to_string(),
            feedback: FeedbackKind::TooSparse,
            severity: FeedbackSeverity::Severe,
            location: Vec3::default(),
            activity: None,
        };
        for _ in 0..4 {
            policy.process_feedback(&request, &objects).unwrap();
        }
        assert_relative_eq!(
            policy.settings_snapshot("sofa").adaptive_multiplier,
            0.5,
            epsilon = 1e-9
        );
    }

    #[test]
    fn just_right_changes_nothing() {
        let mut policy = ClearancePolicy::new();
        let objects = vec![SceneObject::new("bed-1", "bed", Vec3::default())];
        let request = FeedbackRequest {
            object_id: "bed-1".to_string(),
            feedback: FeedbackKind::JustRight,
            severity: FeedbackSeverity::Severe,
            location: Vec3::default(),
            activity: None,
        };
        let result = policy.process_feedback(&request, &objects).unwrap();
        assert_relative_eq!(result.new_multiplier, result.previous_multiplier);
    }

    #[test]
    fn feedback_for_unknown_object_fails() {
        let mut policy = ClearancePolicy::new();
        assert!(policy
            .process_feedback(&severe_crowding("ghost"), &[])
            .is_err());
    }

    #[test]
    fn affected_neighbors_are_reported() {
        let mut policy = ClearancePolicy::new();
        let desk = SceneObject::new("desk-1", "desk", Vec3::default());
        let close_chair = SceneObject::new("chair-1", "chair", Vec3::new(0.8, 0.0, 0.0));
        let far_sofa = SceneObject::new("sofa-1", "sofa", Vec3::new(9.0, 0.0, 0.0));
        let objects = vec![desk, close_chair, far_sofa];

        let result = policy
            .process_feedback(&severe_crowding("desk-1"), &objects)
            .unwrap();
        assert!(result.affected_objects.contains(&"chair-1".to_string()));
        assert!(!result.affected_objects.contains(&"sofa-1".to_string()));
        assert!(result.alternative_positions.len() <= 3);
    }

    #[test]
    fn activity_preference_is_learned() {
        let mut policy = ClearancePolicy::new();
        let objects = vec![SceneObject::new("desk-1", "desk", Vec3::default())];
        let request = FeedbackRequest {
            object_id: "desk-1".to_string(),
            feedback: FeedbackKind::TooCrowded,
            severity: FeedbackSeverity::Mild,
            location: Vec3::default(),
            activity: Some("working".to_string()),
        };
        policy.process_feedback(&request, &objects).unwrap();

        let ctx = ClearanceContext {
            activity: Some("working".to_string()),
            user_count: 1,
        };
        let with_activity = policy.effective_clearance("chair", Some(&ctx));
        let without = policy.effective_clearance("chair", None);
        assert!(with_activity > without);
    }

    #[test]
    fn crowding_prediction_counts_issues() {
        let policy = ClearancePolicy::new();
        let objects: Vec<SceneObject> = (0..4)
            .map(|i| {
                SceneObject::new(
                    format!("chair-{i}"),
                    "chair",
                    Vec3::new(0.3 * i as f64, 0.0, 0.0),
                )
            })
            .collect();
        let prediction = policy.predict_crowding(&objects, "desk", Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(prediction.risk, CrowdingRisk::High);
        assert!(prediction.potential_issues.len() > 3);

        let lonely = policy.predict_crowding(&[], "desk", Vec3::default());
        assert_eq!(lonely.risk, CrowdingRisk::Low);
        assert!(lonely.potential_issues.is_empty());
    }

    #[test]
    fn reset_restores_defaults() {
        let mut policy = ClearancePolicy::new();
        let objects = vec![SceneObject::new("desk-1", "desk", Vec3::default())];
        policy
            .process_feedback(&severe_crowding("desk-1"), &objects)
            .unwrap();
        assert!(policy.settings_snapshot("desk").adaptive_multiplier > 1.0);
        policy.reset();
        assert_relative_eq!(policy.settings_snapshot("desk").adaptive_multiplier, 1.0);
        assert!(policy.history("desk-1").is_empty());
    }
}
