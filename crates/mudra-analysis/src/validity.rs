// ─────────────────────────────────────────────────────────────────────
// Mudra — Validity Checking
// ─────────────────────────────────────────────────────────────────────
//! Internal validity: a pose is usable iff some safe body satisfies
//! the pose and is carried into another safe body —
//! `input-safe ∧ transform-applied-restriction ∧ output-safe` must be
//! satisfiable. `Unsat` and `Unknown` both mean invalid.

use std::time::Instant;

use z3::ast::Bool;
use z3::Context;

use mudra_body::{check, SolverOutcome, SymBody};
use mudra_gestures::{App, Pose};

use crate::report::{CheckReport, Violation};
use crate::safety::safety_predicate;

/// Check one pose for internal validity.
pub fn check_pose_validity<'ctx>(ctx: &'ctx Context, pose: &Pose, timeout_ms: u64) -> bool {
    let default = SymBody::default_body(ctx);
    let resolved = pose.resolve(&default);

    let input = SymBody::free(ctx, "validity");
    let transformed = pose.effective_transform(&resolved).apply(ctx, &input);

    let input_safe = safety_predicate(ctx, &input);
    let transformed_restricted = pose
        .effective_restriction(&resolved)
        .predicate(ctx, &transformed);
    let output_safe = safety_predicate(ctx, &transformed);

    let expr = Bool::and(ctx, &[&input_safe, &transformed_restricted, &output_safe]);

    match check(ctx, &expr, timeout_ms) {
        SolverOutcome::Sat(_) => true,
        SolverOutcome::Unsat => false,
        SolverOutcome::Unknown(reason) => {
            log::warn!(
                "validity check unknown for pose `{}`, treating as invalid: {}",
                pose.name(),
                reason.as_deref().unwrap_or("no reason")
            );
            false
        }
    }
}

/// First restriction member that makes the pose unsatisfiable over its
/// own transform, by incremental conjunction in declaration order.
pub fn first_invalid_statement<'ctx>(
    ctx: &'ctx Context,
    pose: &Pose,
    timeout_ms: u64,
) -> Option<String> {
    let input = SymBody::free(ctx, "validity");
    let transformed = pose.transform().apply(ctx, &input);

    let mut accumulated: Vec<Bool<'ctx>> = Vec::new();
    for restriction in pose.restriction().members() {
        accumulated.push(restriction.predicate(ctx, &transformed));
        let refs: Vec<&Bool<'ctx>> = accumulated.iter().collect();
        if check(ctx, &Bool::and(ctx, &refs), timeout_ms).is_unsat() {
            return Some(restriction.to_string());
        }
    }
    None
}

/// Validity pass over a whole app, one timed query per pose.
pub fn check_app_validity<'ctx>(ctx: &'ctx Context, app: &App, timeout_ms: u64) -> CheckReport {
    let started = Instant::now();
    let mut report = CheckReport::passing();
    for gesture in app.gestures() {
        for pose in gesture.declared_poses() {
            let pose_started = Instant::now();
            if !check_pose_validity(ctx, pose, timeout_ms) {
                let statement = first_invalid_statement(ctx, pose, timeout_ms)
                    .unwrap_or_else(|| "pose failed internal validity check".to_string());
                report.record(Violation {
                    gesture: gesture.name().to_string(),
                    pose: pose.name().to_string(),
                    statement,
                    witness: None,
                    elapsed_ms: pose_started.elapsed().as_secs_f64() * 1000.0,
                });
            }
        }
    }
    report.elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use mudra_body::solver_context;
    use mudra_gestures::{
        BodyRestriction, CompositeRestriction, CompositeTransform, Gesture,
    };
    use mudra_types::{JointType, RelativeDirection};

    const TIMEOUT: u64 = 20_000;

    fn put(direction: RelativeDirection) -> BodyRestriction {
        BodyRestriction::Put {
            joint: JointType::HandRight,
            relative_to: JointType::Head,
            direction,
            negated: false,
        }
    }

    #[test]
    fn test_reachable_pose_is_valid() {
        let ctx = solver_context();
        let pose = Pose::with_restriction(
            &ctx,
            "hand_up",
            CompositeTransform::new(),
            CompositeRestriction::single(put(RelativeDirection::OnTopOfYour)),
            TIMEOUT,
        )
        .unwrap();
        assert!(check_pose_validity(&ctx, &pose, TIMEOUT));
    }

    #[test]
    fn test_contradictory_restriction_is_invalid() {
        let ctx = solver_context();
        // Assembled without the construction check, the way a
        // degenerate front end could emit it.
        let mut pose = Pose::new("impossible");
        pose.compose_restriction(put(RelativeDirection::OnTopOfYour));
        pose.compose_restriction(put(RelativeDirection::OnTopOfYour).dont());

        assert!(!check_pose_validity(&ctx, &pose, TIMEOUT));
        let statement = first_invalid_statement(&ctx, &pose, TIMEOUT).unwrap();
        assert_eq!(
            statement,
            "don't put your right hand on top of your head"
        );
    }

    #[test]
    fn test_app_report_names_invalid_pose() {
        let ctx = solver_context();
        let mut bad = Pose::new("impossible");
        bad.compose_restriction(put(RelativeDirection::BelowYour));
        bad.compose_restriction(put(RelativeDirection::BelowYour).dont());

        let good = Pose::with_restriction(
            &ctx,
            "fine",
            CompositeTransform::new(),
            CompositeRestriction::single(put(RelativeDirection::OnTopOfYour)),
            TIMEOUT,
        )
        .unwrap();

        let app = App::new(
            "demo",
            vec![Gesture::with_poses("mixed", vec![good, bad])],
        );
        let report = check_app_validity(&ctx, &app, TIMEOUT);
        assert!(!report.passed);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].pose, "impossible");
    }
}
