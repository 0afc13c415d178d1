// ─────────────────────────────────────────────────────────────────────
// Mudra — Pose
// ─────────────────────────────────────────────────────────────────────
//! One named body configuration: a transform, a restriction, and the
//! delayed statements resolved at activation. Construction rejects
//! poses whose restriction can never hold after their own transform.

use std::fmt;

use z3::Context;

use mudra_body::{check, SymBody};
use mudra_types::{merge_joint_lists, JointType, MudraError, MudraResult};

use crate::delayed::{CompositeDelayed, Resolved};
use crate::restriction::{BodyRestriction, CompositeRestriction};
use crate::transform::{CompositeTransform, JointTransform};

#[derive(Debug, Clone)]
pub struct Pose {
    name: String,
    transform: CompositeTransform,
    restriction: CompositeRestriction,
    delayed: CompositeDelayed,
}

impl Pose {
    /// An empty pose: no transform, no restriction.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: CompositeTransform::new(),
            restriction: CompositeRestriction::new(),
            delayed: CompositeDelayed::new(),
        }
    }

    pub fn with_transform(name: impl Into<String>, transform: CompositeTransform) -> Self {
        Self {
            transform,
            ..Self::new(name)
        }
    }

    /// Full constructor. Fails when the restriction is unsatisfiable
    /// over the transform applied to a free body — such a pose can
    /// never be matched and the gesture definition is unusable.
    pub fn with_restriction(
        ctx: &Context,
        name: impl Into<String>,
        transform: CompositeTransform,
        restriction: CompositeRestriction,
        timeout_ms: u64,
    ) -> MudraResult<Self> {
        let pose = Self {
            name: name.into(),
            transform,
            restriction,
            delayed: CompositeDelayed::new(),
        };
        if !pose.transform_accepted_by_restriction(ctx, timeout_ms) {
            log::error!(
                "pose `{}` rejected: restriction refuses every transformed body",
                pose.name
            );
            return Err(MudraError::ContradictoryPose {
                pose: pose.name,
                statement: pose.restriction.to_string(),
            });
        }
        Ok(pose)
    }

    pub fn with_delayed(
        ctx: &Context,
        name: impl Into<String>,
        transform: CompositeTransform,
        restriction: CompositeRestriction,
        delayed: CompositeDelayed,
        timeout_ms: u64,
    ) -> MudraResult<Self> {
        let mut pose = Self::with_restriction(ctx, name, transform, restriction, timeout_ms)?;
        pose.delayed = delayed;
        Ok(pose)
    }

    /// Whether some body satisfies the restriction after the transform.
    /// Only a proven `Unsat` rejects; `Unknown` is accepted here and
    /// left to the validity checker.
    fn transform_accepted_by_restriction(&self, ctx: &Context, timeout_ms: u64) -> bool {
        let body = SymBody::free(ctx, "pose_check");
        let transformed = self.transform.apply(ctx, &body);
        let expr = self.restriction.predicate(ctx, &transformed);
        !check(ctx, &expr, timeout_ms).is_unsat()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn compose_transform(&mut self, joint: JointType, transform: JointTransform) {
        self.transform = self.transform.compose(joint, transform);
    }

    pub fn compose_restriction(&mut self, restriction: BodyRestriction) {
        self.restriction.and(restriction);
    }

    pub fn compose_delayed(&mut self, delayed: &CompositeDelayed) {
        self.delayed = self.delayed.compose(delayed);
    }

    pub fn transform(&self) -> &CompositeTransform {
        &self.transform
    }

    pub fn restriction(&self) -> &CompositeRestriction {
        &self.restriction
    }

    pub fn delayed(&self) -> &CompositeDelayed {
        &self.delayed
    }

    /// Resolve this pose's delayed statements against the body seen at
    /// activation.
    pub fn resolve(&self, start_body: &SymBody<'_>) -> Resolved {
        self.delayed.resolve(start_body)
    }

    /// Declared transform composed with a resolution's transform.
    pub fn effective_transform(&self, resolved: &Resolved) -> CompositeTransform {
        self.transform.compose_with(&resolved.transform)
    }

    /// Declared restriction conjoined with a resolution's restriction.
    pub fn effective_restriction(&self, resolved: &Resolved) -> CompositeRestriction {
        self.restriction.and_composite(&resolved.restriction)
    }

    pub fn is_body_accepted<'ctx>(
        &self,
        ctx: &'ctx Context,
        body: &SymBody<'ctx>,
        timeout_ms: u64,
    ) -> bool {
        self.restriction.is_body_accepted(ctx, body, timeout_ms)
    }

    pub fn is_transformed_body_accepted<'ctx>(
        &self,
        ctx: &'ctx Context,
        body: &SymBody<'ctx>,
        timeout_ms: u64,
    ) -> bool {
        let transformed = self.transform.apply(ctx, body);
        self.is_body_accepted(ctx, &transformed, timeout_ms)
    }

    /// Weakest-link completion of the declared restriction.
    pub fn min_percentage(&self, body: &SymBody<'_>) -> (f64, String) {
        self.restriction.min_percentage(body)
    }

    pub fn transform_joint_types(&self) -> Vec<JointType> {
        self.transform.joint_types()
    }

    pub fn restriction_joint_types(&self) -> Vec<JointType> {
        self.restriction.joint_types()
    }

    pub fn all_joint_types(&self) -> Vec<JointType> {
        merge_joint_lists(&[
            &self.transform.joint_types(),
            &self.restriction.joint_types(),
        ])
    }

    pub fn restriction_count(&self) -> usize {
        self.restriction.restriction_count()
    }

    pub fn transform_count(&self) -> usize {
        self.transform.transform_count()
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} :", self.name)?;
        if self.transform.transform_count() > 0 {
            write!(f, "\n{}", self.transform)?;
        }
        if self.restriction.restriction_count() > 0 {
            write!(f, "\n{}", self.restriction)?;
        }
        if !self.delayed.is_empty() {
            write!(f, "\n{}", self.delayed)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mudra_body::solver_context;
    use mudra_types::{Direction, JointSide, RelativeDirection};

    fn raise_hand_restriction() -> CompositeRestriction {
        CompositeRestriction::single(BodyRestriction::Put {
            joint: JointType::HandRight,
            relative_to: JointType::Head,
            direction: RelativeDirection::OnTopOfYour,
            negated: false,
        })
    }

    #[test]
    fn test_satisfiable_pose_constructs() {
        let ctx = solver_context();
        let pose = Pose::with_restriction(
            &ctx,
            "raise_right_hand",
            CompositeTransform::new(),
            raise_hand_restriction(),
            5_000,
        );
        assert!(pose.is_ok());
    }

    #[test]
    fn test_contradictory_pose_is_rejected() {
        let ctx = solver_context();
        let put = BodyRestriction::Put {
            joint: JointType::HandRight,
            relative_to: JointType::Head,
            direction: RelativeDirection::OnTopOfYour,
            negated: false,
        };
        let mut restriction = CompositeRestriction::single(put.clone());
        restriction.and(put.dont());

        let result = Pose::with_restriction(
            &ctx,
            "impossible",
            CompositeTransform::new(),
            restriction,
            5_000,
        );
        match result {
            Err(MudraError::ContradictoryPose { pose, .. }) => assert_eq!(pose, "impossible"),
            other => panic!("expected contradictory pose, got {other:?}"),
        }
    }

    #[test]
    fn test_effective_transform_composes_resolution() {
        let mut pose = Pose::new("step");
        pose.compose_transform(
            JointType::ElbowRight,
            JointTransform::Rotate {
                direction: Direction::Up,
                degrees: 30,
            },
        );
        let resolved = Resolved {
            transform: CompositeTransform::single(
                JointType::WristRight,
                JointTransform::Rotate {
                    direction: Direction::Front,
                    degrees: 10,
                },
            ),
            ..Resolved::default()
        };
        let effective = pose.effective_transform(&resolved);
        assert_eq!(
            effective.joint_types(),
            vec![JointType::ElbowRight, JointType::WristRight]
        );
        // Declared pose keeps only its own transform.
        assert_eq!(pose.transform_joint_types(), vec![JointType::ElbowRight]);
    }

    #[test]
    fn test_all_joint_types_merges() {
        let ctx = solver_context();
        let pose = Pose::with_restriction(
            &ctx,
            "touch_head",
            CompositeTransform::single(
                JointType::ElbowRight,
                JointTransform::Rotate {
                    direction: Direction::Up,
                    degrees: 45,
                },
            ),
            CompositeRestriction::single(BodyRestriction::touch(
                JointType::Head,
                JointSide::Right,
            )),
            5_000,
        )
        .unwrap();
        assert_eq!(
            pose.all_joint_types(),
            vec![JointType::ElbowRight, JointType::Head, JointType::HandRight]
        );
    }

    #[test]
    fn test_display_contains_name_and_parts() {
        let ctx = solver_context();
        let pose = Pose::with_restriction(
            &ctx,
            "salute",
            CompositeTransform::new(),
            raise_hand_restriction(),
            5_000,
        )
        .unwrap();
        let text = pose.to_string();
        assert!(text.starts_with("salute :"));
        assert!(text.contains("put your right hand on top of your head"));
    }
}
