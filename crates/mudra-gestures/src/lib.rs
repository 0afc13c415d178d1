// ─────────────────────────────────────────────────────────────────────
// Mudra — Gesture Model
// License: MIT
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! The declarative layer of the kernel: restrictions ("the body must
//! satisfy X"), transforms ("the body moves like Y"), delayed
//! statements resolved at pose activation, and the pose → gesture →
//! app object graph the textual front end compiles into.

pub mod delayed;
pub mod gesture;
pub mod pose;
pub mod restriction;
pub mod transform;

pub use delayed::{CompositeDelayed, Resolved, RotateDelayed};
pub use gesture::{App, ExecutionStep, Gesture};
pub use pose::Pose;
pub use restriction::{BodyRestriction, CompositeRestriction};
pub use transform::{CompositeTransform, JointTransform};
