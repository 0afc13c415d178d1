// ─────────────────────────────────────────────────────────────────────
// Mudra — Symbolic Body Engine
// License: MIT
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Symbolic skeletal geometry over Z3 real expressions.
//!
//! A body is a mapping from joint to a parent-relative unit direction
//! plus a scalar limb norm; absolute positions are accumulated sums
//! along the parent chain. The free body — every direction coordinate
//! an unconstrained solver constant — is the base case for every
//! "does there exist a body such that…" query.
//!
//! # Solver Invariants
//!
//! 1. **The context is an explicit handle**: every constructor and
//!    query takes `&Context`. One context must never be shared across
//!    threads; give each worker its own.
//!
//! 2. **Timeouts degrade to `Unknown`**: a timed-out query is an
//!    indeterminate outcome, never `Unsat`. Callers resolve `Unknown`
//!    to their conservative branch.
//!
//! 3. **Bodies are immutable inputs**: transforms and witness
//!    extraction produce new bodies; an existing body's expressions
//!    are never rewritten in place.

pub mod body;
pub mod solver;
pub mod sym;
pub mod trig;

pub use body::SymBody;
pub use solver::{body_witness, check, is_unsat, solver_context, SolverOutcome};
pub use sym::{real_lit, real_to_f64, SymPoint3D};
