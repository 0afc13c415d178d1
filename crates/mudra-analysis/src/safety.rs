// ─────────────────────────────────────────────────────────────────────
// Mudra — Safety Checking
// ─────────────────────────────────────────────────────────────────────
//! Anatomical safety: a fixed rule set over joint positions, checked
//! against every declared pose. A pose is safe iff no safe input body
//! can satisfy the pose while ending in an unsafe configuration —
//! `input-safe ∧ transform-applied-restriction ∧ ¬output-safe` must be
//! unsatisfiable. `Unknown` fails closed.

use std::time::Instant;

use z3::ast::Bool;
use z3::Context;

use mudra_body::{body_witness, check, SolverOutcome, SymBody};
use mudra_gestures::{App, Pose};
use mudra_types::{Axis, ConcreteBody, JointType};

use crate::report::{CheckReport, Violation};

/// Comparison sense of one safety clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Below,
    Above,
}

/// One safety rule: the body is unsafe when BOTH clauses hold, so the
/// rule itself is their negated conjunction.
#[derive(Debug, Clone)]
pub struct SafetyRule {
    pub clauses: [(JointType, Axis, Sense, JointType); 2],
    pub message: &'static str,
}

impl SafetyRule {
    /// The rule as a predicate: not (clause1 and clause2).
    pub fn predicate<'ctx>(&self, ctx: &'ctx Context, body: &SymBody<'ctx>) -> Bool<'ctx> {
        let parts: Vec<Bool<'ctx>> = self
            .clauses
            .iter()
            .map(|&(joint, axis, sense, relative_to)| {
                let here = body.position(joint);
                let there = body.position(relative_to);
                match sense {
                    Sense::Below => here.axis(axis).lt(there.axis(axis)),
                    Sense::Above => here.axis(axis).gt(there.axis(axis)),
                }
            })
            .collect();
        let refs: Vec<&Bool<'ctx>> = parts.iter().collect();
        Bool::and(ctx, &refs).not()
    }
}

/// The default rule set: don't break any bones.
pub fn default_safety_rules() -> Vec<SafetyRule> {
    use Axis::*;
    use JointType::*;
    use Sense::*;
    vec![
        SafetyRule {
            clauses: [
                (ElbowRight, Z, Below, ShoulderRight),
                (ElbowRight, Y, Above, ShoulderRight),
            ],
            message: "don't put your right elbow behind you and above your shoulders",
        },
        SafetyRule {
            clauses: [
                (ElbowLeft, Z, Below, ShoulderLeft),
                (ElbowLeft, Y, Above, ShoulderLeft),
            ],
            message: "don't put your left elbow behind you and above your shoulders",
        },
        SafetyRule {
            clauses: [
                (ElbowRight, Z, Below, ShoulderRight),
                (ElbowRight, X, Below, ShoulderRight),
            ],
            message: "don't put your right elbow behind you crossing your back",
        },
        SafetyRule {
            clauses: [
                (ElbowLeft, Z, Below, ShoulderLeft),
                (ElbowLeft, X, Above, ShoulderLeft),
            ],
            message: "don't put your left elbow behind you crossing your back",
        },
        SafetyRule {
            clauses: [
                (KneeLeft, Z, Below, HipLeft),
                (KneeLeft, Z, Below, AnkleLeft),
            ],
            message: "don't bend your left knee towards your back",
        },
        SafetyRule {
            clauses: [
                (KneeRight, Z, Below, HipRight),
                (KneeRight, Z, Below, AnkleRight),
            ],
            message: "don't bend your right knee towards your back",
        },
    ]
}

/// Conjunction of every default rule on one body.
pub fn safety_predicate<'ctx>(ctx: &'ctx Context, body: &SymBody<'ctx>) -> Bool<'ctx> {
    let clauses: Vec<Bool<'ctx>> = default_safety_rules()
        .iter()
        .map(|rule| rule.predicate(ctx, body))
        .collect();
    let refs: Vec<&Bool<'ctx>> = clauses.iter().collect();
    Bool::and(ctx, &refs)
}

/// Check one pose. Returns `(safe, witness)`: on an unsafe pose the
/// witness is the concrete counterexample when the solver produced a
/// model, `None` when the outcome was `Unknown` (still unsafe).
pub fn check_pose_safety<'ctx>(
    ctx: &'ctx Context,
    pose: &Pose,
    timeout_ms: u64,
) -> (bool, Option<ConcreteBody>) {
    let default = SymBody::default_body(ctx);
    let resolved = pose.resolve(&default);

    let input = SymBody::free(ctx, "safety");
    let transformed = pose.effective_transform(&resolved).apply(ctx, &input);

    let input_safe = safety_predicate(ctx, &input);
    let transformed_restricted = pose
        .effective_restriction(&resolved)
        .predicate(ctx, &transformed);
    let output_unsafe = safety_predicate(ctx, &transformed).not();

    let expr = Bool::and(ctx, &[&input_safe, &transformed_restricted, &output_unsafe]);

    match check(ctx, &expr, timeout_ms) {
        SolverOutcome::Sat(model) => {
            let witness = body_witness(
                ctx,
                &transformed,
                &model,
                &pose.all_joint_types(),
                &default,
            );
            (false, Some(witness.concretize()))
        }
        SolverOutcome::Unknown(reason) => {
            log::warn!(
                "safety check unknown for pose `{}`, failing closed: {}",
                pose.name(),
                reason.as_deref().unwrap_or("no reason")
            );
            (false, None)
        }
        SolverOutcome::Unsat => (true, None),
    }
}

/// First safety rule a pose cannot coexist with, by incremental
/// conjunction in declaration order. `None` when every rule fits.
pub fn first_unsafe_statement<'ctx>(
    ctx: &'ctx Context,
    pose: &Pose,
    timeout_ms: u64,
) -> Option<&'static str> {
    let default = SymBody::default_body(ctx);
    let resolved = pose.resolve(&default);

    let input = SymBody::free(ctx, "safety");
    let transformed = pose.effective_transform(&resolved).apply(ctx, &input);
    let transformed_restricted = pose
        .effective_restriction(&resolved)
        .predicate(ctx, &transformed);

    let mut accumulated: Vec<Bool<'ctx>> = vec![transformed_restricted];
    for rule in default_safety_rules() {
        accumulated.push(rule.predicate(ctx, &transformed));
        let refs: Vec<&Bool<'ctx>> = accumulated.iter().collect();
        if check(ctx, &Bool::and(ctx, &refs), timeout_ms).is_unsat() {
            return Some(rule.message);
        }
    }
    None
}

/// Safety pass over a whole app, one timed query per pose.
pub fn check_app_safety<'ctx>(ctx: &'ctx Context, app: &App, timeout_ms: u64) -> CheckReport {
    let started = Instant::now();
    let mut report = CheckReport::passing();
    for gesture in app.gestures() {
        for pose in gesture.declared_poses() {
            let pose_started = Instant::now();
            let (safe, witness) = check_pose_safety(ctx, pose, timeout_ms);
            if !safe {
                let statement = first_unsafe_statement(ctx, pose, timeout_ms)
                    .unwrap_or("default safety violation");
                report.record(Violation {
                    gesture: gesture.name().to_string(),
                    pose: pose.name().to_string(),
                    statement: statement.to_string(),
                    witness,
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
        BodyRestriction, CompositeRestriction, CompositeTransform, Gesture, JointTransform,
    };
    use mudra_types::{Direction, RelativeDirection};

    const TIMEOUT: u64 = 20_000;

    fn elbow_behind_above_pose(ctx: &Context) -> Pose {
        // A transform pulls the elbow back while the restriction pins
        // it behind and above the shoulder.
        let mut restriction = CompositeRestriction::single(BodyRestriction::Put {
            joint: JointType::ElbowRight,
            relative_to: JointType::ShoulderRight,
            direction: RelativeDirection::BehindYour,
            negated: false,
        });
        restriction.and(BodyRestriction::Put {
            joint: JointType::ElbowRight,
            relative_to: JointType::ShoulderRight,
            direction: RelativeDirection::OnTopOfYour,
            negated: false,
        });
        Pose::with_restriction(
            ctx,
            "elbow_back_up",
            CompositeTransform::single(
                JointType::ElbowRight,
                JointTransform::Rotate {
                    direction: Direction::Back,
                    degrees: 45,
                },
            ),
            restriction,
            TIMEOUT,
        )
        .unwrap()
    }

    fn harmless_pose(ctx: &Context) -> Pose {
        Pose::with_restriction(
            ctx,
            "hand_up",
            CompositeTransform::new(),
            CompositeRestriction::single(BodyRestriction::Put {
                joint: JointType::HandRight,
                relative_to: JointType::Head,
                direction: RelativeDirection::OnTopOfYour,
                negated: false,
            }),
            TIMEOUT,
        )
        .unwrap()
    }

    #[test]
    fn test_unsafe_pose_yields_witness_in_unsafe_region() {
        let ctx = solver_context();
        let pose = elbow_behind_above_pose(&ctx);
        let (safe, witness) = check_pose_safety(&ctx, &pose, TIMEOUT);
        assert!(!safe);

        let witness = witness.expect("sat outcome carries a witness");
        let elbow = witness.position(JointType::ElbowRight);
        let shoulder = witness.position(JointType::ShoulderRight);
        assert!(elbow.z < shoulder.z, "elbow behind the shoulder");
        assert!(elbow.y > shoulder.y, "elbow above the shoulder");
    }

    #[test]
    fn test_harmless_pose_is_safe() {
        let ctx = solver_context();
        let pose = harmless_pose(&ctx);
        let (safe, witness) = check_pose_safety(&ctx, &pose, TIMEOUT);
        assert!(safe);
        assert!(witness.is_none());
    }

    #[test]
    fn test_first_unsafe_statement_names_elbow_rule() {
        let ctx = solver_context();
        let pose = elbow_behind_above_pose(&ctx);
        let statement = first_unsafe_statement(&ctx, &pose, TIMEOUT);
        assert_eq!(
            statement,
            Some("don't put your right elbow behind you and above your shoulders")
        );
    }

    #[test]
    fn test_app_report_locates_violation() {
        let ctx = solver_context();
        let app = App::new(
            "demo",
            vec![
                Gesture::with_poses("ok", vec![harmless_pose(&ctx)]),
                Gesture::with_poses("bad", vec![elbow_behind_above_pose(&ctx)]),
            ],
        );
        let report = check_app_safety(&ctx, &app, TIMEOUT);
        assert!(!report.passed);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].gesture, "bad");
        assert_eq!(report.violations[0].pose, "elbow_back_up");
    }

    #[test]
    fn test_default_body_satisfies_all_rules() {
        let ctx = solver_context();
        let body = SymBody::default_body(&ctx);
        let predicate = safety_predicate(&ctx, &body);
        // Concrete body: the predicate folds to a constant, and the
        // upright stance violates nothing.
        assert!(check(&ctx, &predicate.not(), TIMEOUT).is_unsat());
    }
}
