// ─────────────────────────────────────────────────────────────────────
// Mudra — Static Verification
// License: MIT
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Offline verification of a compiled gesture program: every check is
//! a satisfiability query over composed restriction/transform
//! expressions on a free symbolic body.
//!
//! - **Safety**: no pose can carry a safe body into an anatomically
//!   unsafe configuration. `Unknown` fails closed.
//! - **Validity**: every pose admits at least one safe body that it
//!   legitimately transforms into another safe body.
//! - **Ambiguity**: no two gestures can be confused — neither by
//!   reaching indistinguishable final states nor by one gesture's step
//!   sequence executing inside the other's.
//!
//! Checks report, they do not panic: results come back as structured
//! records suitable for batch CI-style runs, one gesture pair at a
//! time per solver context.

pub mod ambiguity;
pub mod report;
pub mod safety;
pub mod validity;

pub use ambiguity::{
    check_app_ambiguity, final_state_conflict, step_interval_conflict, AmbiguityReport,
    ConflictKind, ConflictOutcome, FinalStateConflict, StepConflict,
};
pub use report::{CheckReport, Violation};
pub use safety::{
    check_app_safety, check_pose_safety, default_safety_rules, first_unsafe_statement,
    safety_predicate, SafetyRule,
};
pub use validity::{check_app_validity, check_pose_validity, first_invalid_statement};
