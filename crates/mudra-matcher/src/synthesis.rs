// ─────────────────────────────────────────────────────────────────────
// Mudra — Target Synthesis
// ─────────────────────────────────────────────────────────────────────
//! Finding the nearest body a pose can accept: ask the solver for a
//! witness reachable from the start body within an angular threshold,
//! refine the threshold, and fall back to the deterministic transform
//! output when no witness exists. Not safe to run concurrently with
//! other solver use on the same context.

use z3::ast::Bool;
use z3::Context;

use std::collections::BTreeMap;

use mudra_body::{body_witness, check, real_lit, SolverOutcome, SymBody};
use mudra_gestures::{CompositeRestriction, CompositeTransform, Pose, Resolved};
use mudra_types::{merge_joint_lists, JointType, MatcherConfig, Point3D, SensorFrame};

/// A synthesized target: the body to move toward, split by how each
/// joint is constrained.
#[derive(Debug, Clone)]
pub struct Target<'ctx> {
    pub body: SymBody<'ctx>,
    pub transformed_joints: Vec<JointType>,
    pub restricted_joints: Vec<JointType>,
}

impl Target<'_> {
    pub fn all_joint_types(&self) -> Vec<JointType> {
        merge_joint_lists(&[&self.transformed_joints, &self.restricted_joints])
    }

    /// Concrete per-joint positions for a rendering shadow: joints the
    /// target computed are reconstructed from the target body, every
    /// other joint keeps the live frame's position. The renderer owns
    /// any further coordinate change.
    pub fn shadow_positions(&self, base: &SensorFrame) -> BTreeMap<JointType, Point3D> {
        let body = self.body.concretize();
        let targeted = self.all_joint_types();
        JointType::ALL
            .iter()
            .map(|&joint| {
                let position = if targeted.contains(&joint) {
                    body.position(joint)
                } else {
                    base.position(joint).unwrap_or(Point3D::ZERO)
                };
                (joint, position)
            })
            .collect()
    }
}

/// Synthesize the nearest target body for a pose activation.
///
/// The caller resolves delayed statements against the untouched start
/// body first and passes the result in; the declared pose is read-only
/// here. The angular threshold starts wide and is bisected: a witness
/// tightens it, a failure loosens it. With the default single
/// iteration the first witness wins.
pub fn nearest_target_body<'ctx>(
    ctx: &'ctx Context,
    pose: &Pose,
    resolved: &Resolved,
    start_body: &SymBody<'ctx>,
    config: &MatcherConfig,
) -> Target<'ctx> {
    let transform = pose.effective_transform(resolved);
    let restriction = pose.effective_restriction(resolved);

    let mut threshold = config.synthesis_start_degrees as f64;
    let mut increment = threshold;
    let mut target = None;

    for _ in 0..config.synthesis_iterations {
        let candidate = generate_target(
            ctx,
            &transform,
            &restriction,
            start_body,
            threshold,
            config.solver_timeout_ms,
        );
        increment /= 2.0;
        match candidate {
            Some(found) => {
                target = Some(found);
                threshold -= increment;
            }
            None => threshold += increment,
        }
    }

    if let Some(target) = target {
        return target;
    }

    // No witness: derive the target from the deterministic transform
    // alone, ignoring the restriction.
    if !transform.is_empty() {
        log::debug!(
            "target synthesis for pose `{}` fell back to deterministic transform",
            pose.name()
        );
        return Target {
            body: transform.apply(ctx, start_body),
            transformed_joints: transform.joint_types(),
            restricted_joints: Vec::new(),
        };
    }

    // No transform either: the start body itself is the error-proof
    // default — the matcher must never be left without a target.
    log::debug!(
        "target synthesis for pose `{}` fell back to the start body",
        pose.name()
    );
    Target {
        body: start_body.clone(),
        transformed_joints: Vec::new(),
        restricted_joints: Vec::new(),
    }
}

/// One witness query at a fixed angular threshold.
fn generate_target<'ctx>(
    ctx: &'ctx Context,
    transform: &CompositeTransform,
    restriction: &CompositeRestriction,
    start_body: &SymBody<'ctx>,
    threshold_degrees: f64,
    timeout_ms: u64,
) -> Option<Target<'ctx>> {
    let transformed = transform.apply(ctx, start_body);
    // Anchor limb lengths to the observed body: a target must be a
    // body this user can actually reach.
    let free = SymBody::free(ctx, "target").with_norms_from(start_body);

    let transformed_joints = transform.joint_types();
    let restricted_joints = restriction.joint_types();
    let witness_joints = merge_joint_lists(&[&transformed_joints, &restricted_joints]);

    let mut clauses: Vec<Bool<'ctx>> = vec![restriction.predicate(ctx, &free)];

    // Keep witness directions near the unit sphere. The bound is a
    // strict interval so the model stays rational and concretizes
    // exactly.
    let lo = real_lit(ctx, 0.98);
    let hi = real_lit(ctx, 1.02);
    for &joint in &witness_joints {
        let dir = free.direction(joint);
        let squared = dir.dot(dir);
        clauses.push(squared.gt(&lo));
        clauses.push(squared.lt(&hi));
    }

    // Reachability: every transformed joint stays within the angular
    // threshold of where the transform sends it.
    for &joint in &transformed_joints {
        clauses.push(free.direction(joint).angle_below(
            ctx,
            transformed.direction(joint),
            threshold_degrees,
        ));
    }

    let refs: Vec<&Bool<'ctx>> = clauses.iter().collect();
    let expr = Bool::and(ctx, &refs);

    match check(ctx, &expr, timeout_ms) {
        SolverOutcome::Sat(model) => {
            let body = body_witness(ctx, &free, &model, &witness_joints, start_body);
            Some(Target {
                body,
                transformed_joints,
                restricted_joints,
            })
        }
        SolverOutcome::Unsat => None,
        SolverOutcome::Unknown(reason) => {
            log::debug!(
                "target query unknown at {threshold_degrees}°: {}",
                reason.as_deref().unwrap_or("no reason")
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mudra_body::solver_context;
    use mudra_gestures::{BodyRestriction, JointTransform};
    use mudra_types::{Direction, JointType, RelativeDirection};

    fn config() -> MatcherConfig {
        MatcherConfig {
            solver_timeout_ms: 10_000,
            ..Default::default()
        }
    }

    #[test]
    fn test_transform_only_pose_targets_transform_output() {
        let ctx = solver_context();
        let start = SymBody::default_body(&ctx);
        let mut pose = Pose::new("lift_elbow");
        pose.compose_transform(
            JointType::ElbowRight,
            JointTransform::Rotate {
                direction: Direction::Up,
                degrees: 90,
            },
        );

        let target = nearest_target_body(&ctx, &pose, &Resolved::default(), &start, &config());
        assert_eq!(target.transformed_joints, vec![JointType::ElbowRight]);

        // Witness direction within the synthesis threshold of the
        // deterministic transform output.
        let expected = pose
            .transform()
            .apply(&ctx, &start)
            .direction(JointType::ElbowRight)
            .concretize();
        let actual = target.body.direction(JointType::ElbowRight).concretize();
        assert!(expected.radians_to(actual).to_degrees() <= 90.0 + 1.0);
    }

    #[test]
    fn test_restriction_only_pose_yields_satisfying_witness() {
        let ctx = solver_context();
        let start = SymBody::default_body(&ctx);
        let pose = Pose::with_restriction(
            &ctx,
            "hands_up",
            CompositeTransform::new(),
            CompositeRestriction::single(BodyRestriction::Put {
                joint: JointType::HandRight,
                relative_to: JointType::Head,
                direction: RelativeDirection::OnTopOfYour,
                negated: false,
            }),
            10_000,
        )
        .unwrap();

        let target = nearest_target_body(&ctx, &pose, &Resolved::default(), &start, &config());
        assert!(target.transformed_joints.is_empty());
        assert_eq!(
            target.restricted_joints,
            vec![JointType::HandRight, JointType::Head]
        );

        // Witness directions for the restricted joints stay near the
        // unit sphere, and limb norms match the start body.
        for &joint in &target.restricted_joints {
            let dir = target.body.direction(joint).concretize();
            assert!((dir.norm() - 1.0).abs() < 0.02, "{joint:?}");
        }
        let start_concrete = start.concretize();
        let target_concrete = target.body.concretize();
        assert!(
            (start_concrete.norm(JointType::HandRight)
                - target_concrete.norm(JointType::HandRight))
            .abs()
                < 1e-6
        );
    }

    #[test]
    fn test_empty_pose_falls_back_to_start_body() {
        let ctx = solver_context();
        let start = SymBody::default_body(&ctx);
        let pose = Pose::new("idle");

        let target = nearest_target_body(&ctx, &pose, &Resolved::default(), &start, &config());
        assert!(target.transformed_joints.is_empty());
        assert!(target.restricted_joints.is_empty());
        let distances = start.distance_points(&target.body, &[JointType::Head]);
        assert!(distances[&JointType::Head].norm() < 1e-9);
    }

    #[test]
    fn test_contradictory_restriction_falls_back_to_transform() {
        let ctx = solver_context();
        let start = SymBody::default_body(&ctx);
        // Built unchecked on purpose: a self-contradictory restriction
        // can only come out of a degenerate delayed resolution, and
        // synthesis still must produce a target.
        let mut pose = Pose::new("degenerate");
        pose.compose_transform(
            JointType::WristLeft,
            JointTransform::Rotate {
                direction: Direction::Front,
                degrees: 45,
            },
        );
        let put = BodyRestriction::Put {
            joint: JointType::HandLeft,
            relative_to: JointType::Head,
            direction: RelativeDirection::OnTopOfYour,
            negated: false,
        };
        pose.compose_restriction(put.clone());
        pose.compose_restriction(put.dont());

        let target = nearest_target_body(&ctx, &pose, &Resolved::default(), &start, &config());
        assert_eq!(target.transformed_joints, vec![JointType::WristLeft]);
        assert!(target.restricted_joints.is_empty());
    }

    #[test]
    fn test_shadow_merges_target_and_frame() {
        let ctx = solver_context();
        let start = SymBody::default_body(&ctx);
        let mut pose = Pose::new("lift_elbow");
        pose.compose_transform(
            JointType::ElbowRight,
            JointTransform::Rotate {
                direction: Direction::Up,
                degrees: 90,
            },
        );
        let target = nearest_target_body(&ctx, &pose, &Resolved::default(), &start, &config());

        let mut positions = std::collections::BTreeMap::new();
        for joint in JointType::ALL {
            positions.insert(joint, Point3D::new(9.0, 9.0, 9.0));
        }
        let frame = SensorFrame::from_positions(positions);

        let shadow = target.shadow_positions(&frame);
        // Untouched joints come straight from the frame.
        assert_eq!(shadow[&JointType::FootLeft], Point3D::new(9.0, 9.0, 9.0));
        // The targeted joint is reconstructed from the target body.
        assert!(shadow[&JointType::ElbowRight].x < 9.0);
    }

    #[test]
    fn test_multi_iteration_refinement_still_finds_target() {
        let ctx = solver_context();
        let start = SymBody::default_body(&ctx);
        let mut pose = Pose::new("lift");
        pose.compose_transform(
            JointType::ElbowLeft,
            JointTransform::Rotate {
                direction: Direction::Up,
                degrees: 30,
            },
        );
        let config = MatcherConfig {
            synthesis_iterations: 3,
            solver_timeout_ms: 10_000,
            ..Default::default()
        };
        let target = nearest_target_body(&ctx, &pose, &Resolved::default(), &start, &config);
        assert_eq!(target.transformed_joints, vec![JointType::ElbowLeft]);
    }
}
