// ─────────────────────────────────────────────────────────────────────
// Mudra — Matching Engine
// License: MIT
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Per-frame gesture matching: one matcher per gesture tracks progress
//! through the pose sequence, synthesizes target bodies through the
//! solver, and applies error hysteresis so a user who regresses too
//! long is sent back to the first step.
//!
//! # Matching Invariants
//!
//! 1. **Only regression accumulates error**: a frame that improves or
//!    holds step completion never adds to the accumulated error; the
//!    error zeroes on every step advance and on every break.
//!
//! 2. **There is always a target**: synthesis falls back to the
//!    deterministic transform output, and past that to the start body
//!    itself, so a matcher is never left without a target to measure
//!    against.
//!
//! 3. **Percentages are fresh after every transition**: advancing or
//!    breaking immediately resynthesizes the target and recomputes the
//!    step percentage, so the reported value always describes the
//!    current step.
//!
//! 4. **Solver use is sequenced**: synthesis shares the session's
//!    context and must never run concurrently with other solver use on
//!    that context. The engine runs matchers strictly in sequence.

pub mod matcher;
pub mod stats;
pub mod synthesis;

pub use matcher::{BodyMatcher, GestureMatcher};
pub use stats::{MatchStatistics, TimingEntry};
pub use synthesis::{nearest_target_body, Target};
