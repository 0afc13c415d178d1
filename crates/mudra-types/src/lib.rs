// ─────────────────────────────────────────────────────────────────────
// Mudra — Gesture Kernel Types
// License: MIT
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions, joint topology, configuration, and error hierarchy
//! for the Mudra gesture kernel — no solver dependency lives here.

pub mod config;
pub mod error;
pub mod frame;
pub mod joints;
pub mod point;
pub mod status;

pub use config::MatcherConfig;
pub use error::{MudraError, MudraResult};
pub use frame::{ConcreteBody, SensorFrame, SensorJoint, Tracking};
pub use joints::{
    merge_joint_lists, Direction, JointSide, JointType, RelativeDirection, SidedJointName,
};
pub use point::{Axis, Point3D};
pub use status::GestureStatus;
