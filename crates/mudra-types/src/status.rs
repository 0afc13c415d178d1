// ─────────────────────────────────────────────────────────────────────
// Mudra — Runtime Gesture Status
// ─────────────────────────────────────────────────────────────────────
//! Per-frame, per-gesture status records consumed by presentation
//! layers and by the downstream gesture-result API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::joints::JointType;
use crate::point::Point3D;

/// Solver precision noise absorbed when reporting overall completion.
const NEAR_ONE_EPSILON: f64 = 1e-4;

/// Snapshot of one gesture matcher after a frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GestureStatus {
    pub name: String,

    /// The least-satisfied restriction of the current step — the main
    /// issue the user should fix to make progress.
    pub main_instruction: String,

    pub current_step: usize,
    pub num_steps: usize,

    /// Completion of the current step in [0, 1].
    pub step_percentage: f64,

    /// Displacement from the current target, per tracked joint.
    pub distance_vectors: BTreeMap<JointType, Point3D>,

    /// Times this gesture completed during the session.
    pub completed_count: u32,

    /// The gesture completed on this frame.
    pub succeeded: bool,

    /// This frame produced the first completion of the session.
    pub succeeded_first_frame: bool,

    /// Accumulated error crossed the break threshold on this frame and
    /// matching was reset to the first step.
    pub broke: bool,

    pub accumulated_error: f64,

    /// Mirror of [`GestureStatus::gesture_percentage`] for consumers
    /// that expect a confidence field.
    pub confidence: f64,
}

impl GestureStatus {
    /// Overall completion across all steps, 1.0 on the completing
    /// frame, rounded near 1.0 to absorb solver precision noise.
    pub fn gesture_percentage(&self) -> f64 {
        if self.succeeded {
            return 1.0;
        }
        if self.num_steps == 0 {
            return 0.0;
        }
        let raw = (self.current_step as f64 + self.step_percentage) / self.num_steps as f64;
        let clamped = raw.clamp(0.0, 1.0);
        if clamped >= 1.0 - NEAR_ONE_EPSILON {
            1.0
        } else {
            clamped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_mid_gesture() {
        let status = GestureStatus {
            current_step: 1,
            num_steps: 4,
            step_percentage: 0.5,
            ..Default::default()
        };
        assert!((status.gesture_percentage() - 0.375).abs() < 1e-12);
    }

    #[test]
    fn test_percentage_succeeded_is_one() {
        let status = GestureStatus {
            succeeded: true,
            current_step: 0,
            num_steps: 3,
            ..Default::default()
        };
        assert_eq!(status.gesture_percentage(), 1.0);
    }

    #[test]
    fn test_percentage_rounds_near_one() {
        let status = GestureStatus {
            current_step: 1,
            num_steps: 2,
            step_percentage: 1.0 - 1e-6,
            ..Default::default()
        };
        assert_eq!(status.gesture_percentage(), 1.0);
    }

    #[test]
    fn test_percentage_empty_gesture() {
        assert_eq!(GestureStatus::default().gesture_percentage(), 0.0);
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut status = GestureStatus {
            name: "wave".to_string(),
            current_step: 2,
            num_steps: 3,
            step_percentage: 0.25,
            ..Default::default()
        };
        status
            .distance_vectors
            .insert(JointType::WristRight, Point3D::new(0.1, -0.2, 0.0));
        let json = serde_json::to_string(&status).unwrap();
        let back: GestureStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "wave");
        assert_eq!(back.distance_vectors.len(), 1);
    }
}
