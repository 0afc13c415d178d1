// ─────────────────────────────────────────────────────────────────────
// Mudra — Sensor Frame Types
// ─────────────────────────────────────────────────────────────────────
//! Per-frame skeletal input as delivered by a sensor adapter: one
//! concrete position and a tracking-confidence tag per joint. The
//! adapter owns the sensor-specific coordinate change; frames arriving
//! here are already in body space (origin at the spine base, X right,
//! Y up, Z front).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::joints::JointType;
use crate::point::Point3D;

/// Sensor confidence for one joint in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tracking {
    Tracked,
    Inferred,
    NotTracked,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorJoint {
    pub position: Point3D,
    pub tracking: Tracking,
}

/// One skeletal frame: absolute joint positions in body space.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorFrame {
    pub joints: BTreeMap<JointType, SensorJoint>,
}

impl SensorFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fully tracked frame from plain positions.
    pub fn from_positions(positions: BTreeMap<JointType, Point3D>) -> Self {
        let joints = positions
            .into_iter()
            .map(|(joint, position)| {
                (
                    joint,
                    SensorJoint {
                        position,
                        tracking: Tracking::Tracked,
                    },
                )
            })
            .collect();
        Self { joints }
    }

    pub fn position(&self, joint: JointType) -> Option<Point3D> {
        self.joints.get(&joint).map(|j| j.position)
    }

    /// A frame is usable when every joint is present and none is
    /// completely untracked.
    pub fn is_usable(&self) -> bool {
        JointType::ALL.iter().all(|joint| {
            self.joints
                .get(joint)
                .is_some_and(|j| j.tracking != Tracking::NotTracked)
        })
    }
}

/// A fully concrete body: parent-relative unit directions plus limb
/// norms. Witnesses extracted from solver models and visualization
/// shadows are reported in this form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConcreteBody {
    pub directions: BTreeMap<JointType, Point3D>,
    pub norms: BTreeMap<JointType, f64>,
}

impl ConcreteBody {
    pub fn direction(&self, joint: JointType) -> Point3D {
        self.directions.get(&joint).copied().unwrap_or(Point3D::ZERO)
    }

    pub fn norm(&self, joint: JointType) -> f64 {
        self.norms.get(&joint).copied().unwrap_or(0.0)
    }

    /// Absolute position of a joint: the root contributes its own
    /// direction scaled by its norm, every other joint adds its scaled
    /// direction to its parent's position.
    pub fn position(&self, joint: JointType) -> Point3D {
        let mut position = self.direction(JointType::ROOT) * self.norm(JointType::ROOT);
        for link in joint.chain_to_root().into_iter().rev() {
            position = position + self.direction(link) * self.norm(link);
        }
        position
    }

    /// Concrete positions for every joint, e.g. for a rendering shadow.
    pub fn positions(&self) -> BTreeMap<JointType, Point3D> {
        JointType::ALL
            .iter()
            .map(|&joint| (joint, self.position(joint)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_frame() -> SensorFrame {
        let positions = JointType::ALL
            .iter()
            .enumerate()
            .map(|(i, &joint)| (joint, Point3D::new(i as f64 * 0.1, 0.0, 0.0)))
            .collect();
        SensorFrame::from_positions(positions)
    }

    #[test]
    fn test_full_frame_is_usable() {
        assert!(full_frame().is_usable());
    }

    #[test]
    fn test_missing_joint_is_unusable() {
        let mut frame = full_frame();
        frame.joints.remove(&JointType::Head);
        assert!(!frame.is_usable());
    }

    #[test]
    fn test_not_tracked_is_unusable() {
        let mut frame = full_frame();
        frame.joints.get_mut(&JointType::Head).unwrap().tracking = Tracking::NotTracked;
        assert!(!frame.is_usable());
    }

    #[test]
    fn test_serde_roundtrip() {
        let frame = full_frame();
        let json = serde_json::to_string(&frame).unwrap();
        let back: SensorFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(back.joints.len(), frame.joints.len());
    }

    #[test]
    fn test_concrete_body_position_accumulates_chain() {
        let mut body = ConcreteBody::default();
        // Root at origin, spine pointing up 0.3 + 0.3, both unit-up.
        body.directions
            .insert(JointType::SpineBase, Point3D::new(0.0, 0.0, 1.0));
        body.norms.insert(JointType::SpineBase, 0.0);
        body.directions
            .insert(JointType::SpineMid, Point3D::new(0.0, 1.0, 0.0));
        body.norms.insert(JointType::SpineMid, 0.3);
        body.directions
            .insert(JointType::SpineShoulder, Point3D::new(0.0, 1.0, 0.0));
        body.norms.insert(JointType::SpineShoulder, 0.3);

        let p = body.position(JointType::SpineShoulder);
        assert!((p.y - 0.6).abs() < 1e-12);
        assert!(p.x.abs() < 1e-12 && p.z.abs() < 1e-12);
    }
}
