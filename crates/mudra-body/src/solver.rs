// ─────────────────────────────────────────────────────────────────────
// Mudra — Solver Queries
// ─────────────────────────────────────────────────────────────────────
//! Satisfiability checks and witness extraction. Every query runs on
//! an explicit context handle and under a timeout; a timed-out check
//! is an [`SolverOutcome::Unknown`], never `Unsat`.

use z3::ast::{Ast, Bool};
use z3::{Config, Context, Model, Params, SatResult, Solver};

use mudra_types::{Axis, JointType, Point3D};

use crate::body::SymBody;
use crate::sym::{real_to_f64, SymPoint3D};

/// Classified result of one satisfiability query.
#[derive(Debug)]
pub enum SolverOutcome<'ctx> {
    /// Satisfiable, with the model proving it.
    Sat(Model<'ctx>),
    /// Proven unsatisfiable.
    Unsat,
    /// Indeterminate within resource limits, with the solver's reason
    /// when it offers one. Callers take their conservative branch.
    Unknown(Option<String>),
}

impl SolverOutcome<'_> {
    pub fn is_sat(&self) -> bool {
        matches!(self, SolverOutcome::Sat(_))
    }

    pub fn is_unsat(&self) -> bool {
        matches!(self, SolverOutcome::Unsat)
    }
}

/// A fresh solver context. One per worker; a context must never be
/// shared across threads.
pub fn solver_context() -> Context {
    Context::new(&Config::new())
}

/// Check satisfiability of `constraint` under `timeout_ms`.
pub fn check<'ctx>(
    ctx: &'ctx Context,
    constraint: &Bool<'ctx>,
    timeout_ms: u64,
) -> SolverOutcome<'ctx> {
    let solver = Solver::new(ctx);
    let mut params = Params::new(ctx);
    params.set_u32("timeout", timeout_ms.min(u32::MAX as u64) as u32);
    solver.set_params(&params);
    solver.assert(constraint);
    match solver.check() {
        SatResult::Sat => match solver.get_model() {
            Some(model) => SolverOutcome::Sat(model),
            None => {
                log::warn!("solver reported sat but produced no model");
                SolverOutcome::Unknown(Some("sat without model".to_string()))
            }
        },
        SatResult::Unsat => SolverOutcome::Unsat,
        SatResult::Unknown => {
            let reason = solver.get_reason_unknown();
            log::debug!("solver unknown: {}", reason.as_deref().unwrap_or("no reason"));
            SolverOutcome::Unknown(reason)
        }
    }
}

/// True iff the negation of `predicate` is unsatisfiable — i.e. the
/// predicate holds for every assignment. An `Unknown` outcome reads as
/// not proven.
pub fn is_unsat<'ctx>(ctx: &'ctx Context, predicate: &Bool<'ctx>, timeout_ms: u64) -> bool {
    check(ctx, predicate, timeout_ms).is_unsat()
}

/// Extract a concrete witness body from a model.
///
/// Joints listed in `joints` are read from `template`'s expressions
/// under the model (with completion, so unconstrained coordinates read
/// as zero); all other joints fall back to `default`'s values. Norms
/// are evaluated the same way.
pub fn body_witness<'ctx>(
    ctx: &'ctx Context,
    template: &SymBody<'ctx>,
    model: &Model<'ctx>,
    joints: &[JointType],
    default: &SymBody<'ctx>,
) -> SymBody<'ctx> {
    let mut witness = default.clone();
    for &joint in joints {
        let dir = template.direction(joint);
        let point = Point3D::new(
            eval_component(model, dir, Axis::X),
            eval_component(model, dir, Axis::Y),
            eval_component(model, dir, Axis::Z),
        );
        witness = witness.with_direction(joint, SymPoint3D::from_point(ctx, point));
    }
    witness
}

fn eval_component(model: &Model<'_>, point: &SymPoint3D<'_>, axis: Axis) -> f64 {
    model
        .eval(point.axis(axis), true)
        .as_ref()
        .and_then(real_to_f64)
        .unwrap_or(0.0)
}
