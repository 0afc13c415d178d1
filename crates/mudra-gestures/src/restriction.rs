// ─────────────────────────────────────────────────────────────────────
// Mudra — Restriction Algebra
// ─────────────────────────────────────────────────────────────────────
//! Predicates over a symbolic body, each paired with the continuous
//! completion percentage of the same condition. The two laws of every
//! kind live in one variant so they cannot drift apart. Composites are
//! conjunctions with weakest-link percentage semantics.

use std::fmt;

use z3::ast::{Ast, Bool};
use z3::Context;

use mudra_body::{check, real_lit, SymBody};
use mudra_types::{
    Axis, Direction, JointSide, JointType, Point3D, RelativeDirection, SidedJointName,
};

/// Positional slack applied by Put comparisons, in body units.
const PUT_TOLERANCE: f64 = 0.01;

/// Anatomical limit on rotate-direction targets, in degrees.
const ROTATE_LIMIT_DEGREES: f64 = 75.0;

/// One atomic body restriction.
///
/// Every variant carries its parameters only; the predicate and
/// percentage laws are derived in [`BodyRestriction::predicate`] and
/// [`BodyRestriction::percentage`].
#[derive(Debug, Clone, PartialEq)]
pub enum BodyRestriction {
    /// Trivially satisfied.
    None,

    /// `joint` within `threshold` of the sided hand.
    Touch {
        joint: JointType,
        hand_side: JointSide,
        threshold: f64,
        negated: bool,
    },

    /// `joint` placed in `direction` of `relative_to`, with slack.
    Put {
        joint: JointType,
        relative_to: JointType,
        direction: RelativeDirection,
        negated: bool,
    },

    /// Angle between two joint directions below `degrees_threshold`.
    Align {
        joint1: JointType,
        joint2: JointType,
        degrees_threshold: u32,
        negated: bool,
    },

    /// The joint's direction has rotated past a target derived from
    /// the captured start direction plus the requested degrees,
    /// clamped to the anatomical limit.
    RotateDirection {
        joint: JointType,
        start: Point3D,
        degrees: i32,
        direction: Direction,
    },
}

impl BodyRestriction {
    pub fn touch(joint: JointType, hand_side: JointSide) -> Self {
        BodyRestriction::Touch {
            joint,
            hand_side,
            threshold: 0.2,
            negated: false,
        }
    }

    pub fn align(joint1: JointType, joint2: JointType) -> Self {
        BodyRestriction::Align {
            joint1,
            joint2,
            degrees_threshold: 20,
            negated: false,
        }
    }

    /// Negated copy ("don't …"). RotateDirection has no negated form.
    pub fn dont(&self) -> Self {
        let mut result = self.clone();
        match &mut result {
            BodyRestriction::Touch { negated, .. }
            | BodyRestriction::Put { negated, .. }
            | BodyRestriction::Align { negated, .. } => *negated = !*negated,
            BodyRestriction::None | BodyRestriction::RotateDirection { .. } => {}
        }
        result
    }

    pub fn is_negated(&self) -> bool {
        match self {
            BodyRestriction::Touch { negated, .. }
            | BodyRestriction::Put { negated, .. }
            | BodyRestriction::Align { negated, .. } => *negated,
            BodyRestriction::None | BodyRestriction::RotateDirection { .. } => false,
        }
    }

    /// Joints this restriction constrains.
    pub fn joint_types(&self) -> Vec<JointType> {
        match *self {
            BodyRestriction::None => vec![],
            BodyRestriction::Touch {
                joint, hand_side, ..
            } => vec![joint, JointType::sided(SidedJointName::Hand, hand_side)],
            BodyRestriction::Put {
                joint, relative_to, ..
            } => vec![joint, relative_to],
            BodyRestriction::Align { joint1, joint2, .. } => vec![joint1, joint2],
            BodyRestriction::RotateDirection { joint, .. } => vec![joint],
        }
    }

    /// The solver-native satisfaction predicate.
    pub fn predicate<'ctx>(&self, ctx: &'ctx Context, body: &SymBody<'ctx>) -> Bool<'ctx> {
        match *self {
            BodyRestriction::None => Bool::from_bool(ctx, true),

            BodyRestriction::Touch {
                joint,
                hand_side,
                threshold,
                negated,
            } => {
                let hand = JointType::sided(SidedJointName::Hand, hand_side);
                let expr = body
                    .position(joint)
                    .is_nearer_than(ctx, &body.position(hand), threshold);
                negate_if(negated, expr)
            }

            BodyRestriction::Put {
                joint,
                relative_to,
                direction,
                negated,
            } => {
                let p1 = body.position(joint);
                let p2 = body.position(relative_to);
                let slack = real_lit(ctx, PUT_TOLERANCE);
                let (axis, positive) = put_axis(direction);
                let expr = if positive {
                    p1.axis(axis).gt(&(p2.axis(axis) + &slack))
                } else {
                    p1.axis(axis).lt(&(p2.axis(axis) - &slack))
                };
                negate_if(negated, expr)
            }

            BodyRestriction::Align {
                joint1,
                joint2,
                degrees_threshold,
                negated,
            } => {
                let expr = body.direction(joint1).angle_below(
                    ctx,
                    body.direction(joint2),
                    degrees_threshold as f64,
                );
                negate_if(negated, expr)
            }

            BodyRestriction::RotateDirection {
                joint,
                start,
                degrees,
                direction,
            } => {
                let (target, sign) = rotate_target(start, degrees, direction);
                let current = body.direction(joint).axis(direction_axis(direction));
                let bound = real_lit(ctx, target);
                if sign > 0.0 {
                    current.gt(&bound)
                } else {
                    current.lt(&bound)
                }
            }
        }
    }

    /// Completion percentage of this restriction on a concrete body.
    pub fn percentage(&self, body: &SymBody<'_>) -> f64 {
        match *self {
            BodyRestriction::None => 1.0,

            BodyRestriction::Touch {
                joint,
                hand_side,
                threshold,
                negated,
            } => {
                let hand = JointType::sided(SidedJointName::Hand, hand_side);
                let p1 = body.position(joint).concretize();
                let p2 = body.position(hand).concretize();
                let distance = p1.distance_to(p2).max(1e-8);
                if negated {
                    (distance / threshold).min(1.0)
                } else {
                    (threshold / distance).min(1.0)
                }
            }

            BodyRestriction::Put {
                joint,
                relative_to,
                direction,
                negated,
            } => {
                let p1 = body.position(joint).concretize();
                let p2 = body.position(relative_to).concretize();
                // Exact negation: "don't put A right of B" is measured
                // as progress toward the opposite placement.
                let effective = if negated {
                    opposite_direction(direction)
                } else {
                    direction
                };
                let (axis, positive) = put_axis(effective);
                let current = p1.axis(axis);
                let (target, lower_bound) = if positive {
                    (p2.axis(axis) + PUT_TOLERANCE, -1.0)
                } else {
                    (p2.axis(axis) - PUT_TOLERANCE, 1.0)
                };
                linear_percentage(lower_bound, target, current)
            }

            BodyRestriction::Align {
                joint1,
                joint2,
                degrees_threshold,
                negated,
            } => {
                let v1 = body.direction(joint1).concretize();
                let v2 = body.direction(joint2).concretize();
                let degrees = v1.radians_to(v2).to_degrees().abs();
                let threshold = degrees_threshold as f64;
                let ratio = if negated {
                    degrees / threshold
                } else {
                    threshold / degrees
                };
                if ratio.is_nan() {
                    1.0
                } else {
                    ratio.clamp(0.0, 1.0)
                }
            }

            BodyRestriction::RotateDirection {
                joint,
                start,
                degrees,
                direction,
            } => {
                let (target, sign) = rotate_target(start, degrees, direction);
                let current = body
                    .direction(joint)
                    .concretize()
                    .axis(direction_axis(direction));
                linear_percentage(-sign, target, current)
            }
        }
    }

    /// Solver-backed equivalence: two restrictions are equal when their
    /// predicates cannot disagree on any body.
    pub fn equivalent<'ctx>(
        &self,
        ctx: &'ctx Context,
        other: &BodyRestriction,
        timeout_ms: u64,
    ) -> bool {
        let body = SymBody::free(ctx, "equiv");
        let here = self.predicate(ctx, &body);
        let there = other.predicate(ctx, &body);
        check(ctx, &here._eq(&there).not(), timeout_ms).is_unsat()
    }
}

impl fmt::Display for BodyRestriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dont = if self.is_negated() { "don't " } else { "" };
        match self {
            BodyRestriction::None => write!(f, "none"),
            BodyRestriction::Touch {
                joint, hand_side, ..
            } => write!(f, "{dont}touch your {joint} with your {hand_side} hand"),
            BodyRestriction::Put {
                joint,
                relative_to,
                direction,
                ..
            } => write!(f, "{dont}put your {joint} {direction} {relative_to}"),
            BodyRestriction::Align { joint1, joint2, .. } => {
                write!(f, "{dont}align your {joint1} and your {joint2}")
            }
            BodyRestriction::RotateDirection {
                joint,
                degrees,
                direction,
                ..
            } => write!(f, "rotate your {joint} {degrees} degrees {direction}"),
        }
    }
}

fn negate_if(negated: bool, expr: Bool<'_>) -> Bool<'_> {
    if negated {
        expr.not()
    } else {
        expr
    }
}

/// Axis and comparison sense of a relative placement.
fn put_axis(direction: RelativeDirection) -> (Axis, bool) {
    match direction {
        RelativeDirection::InFrontOfYour => (Axis::Z, true),
        RelativeDirection::BehindYour => (Axis::Z, false),
        RelativeDirection::ToTheRightOfYour => (Axis::X, true),
        RelativeDirection::ToTheLeftOfYour => (Axis::X, false),
        RelativeDirection::OnTopOfYour => (Axis::Y, true),
        RelativeDirection::BelowYour => (Axis::Y, false),
    }
}

fn opposite_direction(direction: RelativeDirection) -> RelativeDirection {
    match direction {
        RelativeDirection::InFrontOfYour => RelativeDirection::BehindYour,
        RelativeDirection::BehindYour => RelativeDirection::InFrontOfYour,
        RelativeDirection::ToTheRightOfYour => RelativeDirection::ToTheLeftOfYour,
        RelativeDirection::ToTheLeftOfYour => RelativeDirection::ToTheRightOfYour,
        RelativeDirection::OnTopOfYour => RelativeDirection::BelowYour,
        RelativeDirection::BelowYour => RelativeDirection::OnTopOfYour,
    }
}

fn direction_axis(direction: Direction) -> Axis {
    match direction {
        Direction::Right | Direction::Left => Axis::X,
        Direction::Up | Direction::Down => Axis::Y,
        Direction::Front | Direction::Back => Axis::Z,
    }
}

fn direction_sign(direction: Direction) -> f64 {
    match direction {
        Direction::Right | Direction::Up | Direction::Front => 1.0,
        Direction::Left | Direction::Down | Direction::Back => -1.0,
    }
}

/// Target coordinate for a rotate-direction restriction: the start
/// angle advanced by the requested degrees, clamped so the target
/// neither regresses past the start nor exceeds the anatomical limit.
fn rotate_target(start: Point3D, degrees: i32, direction: Direction) -> (f64, f64) {
    let sign = direction_sign(direction);
    let limit = sign * ROTATE_LIMIT_DEGREES.to_radians().sin();

    let start_value = start.axis(direction_axis(direction)).clamp(-1.0, 1.0);
    let start_radians = start_value.asin();
    let target_radians = start_radians + sign * (degrees as f64).to_radians();
    let mut target = target_radians.sin();

    let regresses = sign * target < sign * start_value;
    let exceeds_limit = target.abs() > limit.abs();
    if regresses || exceeds_limit {
        target = limit;
    }
    (target, sign)
}

/// Clamped linear interpolation between a fully-wrong bound and the
/// target coordinate.
fn linear_percentage(lower_bound: f64, target: f64, current: f64) -> f64 {
    let denom = target - lower_bound;
    if denom.abs() < 1e-12 {
        return 1.0;
    }
    ((current - lower_bound) / denom).clamp(0.0, 1.0)
}

/// Conjunction of atomic restrictions, insertion-ordered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeRestriction {
    restrictions: Vec<BodyRestriction>,
}

impl CompositeRestriction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(restriction: BodyRestriction) -> Self {
        Self {
            restrictions: vec![restriction],
        }
    }

    pub fn and(&mut self, restriction: BodyRestriction) {
        self.restrictions.push(restriction);
    }

    /// New composite conjoining both operand sets, left first.
    pub fn and_composite(&self, other: &CompositeRestriction) -> Self {
        let mut restrictions = self.restrictions.clone();
        restrictions.extend(other.restrictions.iter().cloned());
        Self { restrictions }
    }

    pub fn members(&self) -> &[BodyRestriction] {
        &self.restrictions
    }

    pub fn restriction_count(&self) -> usize {
        self.restrictions.len()
    }

    pub fn negated_count(&self) -> usize {
        self.restrictions.iter().filter(|r| r.is_negated()).count()
    }

    pub fn joint_types(&self) -> Vec<JointType> {
        let mut result = Vec::new();
        for restriction in &self.restrictions {
            for joint in restriction.joint_types() {
                if !result.contains(&joint) {
                    result.push(joint);
                }
            }
        }
        result
    }

    pub fn distinct_restricted_joints_count(&self) -> usize {
        self.joint_types().len()
    }

    /// Conjunction of all member predicates; true when empty.
    pub fn predicate<'ctx>(&self, ctx: &'ctx Context, body: &SymBody<'ctx>) -> Bool<'ctx> {
        if self.restrictions.is_empty() {
            return Bool::from_bool(ctx, true);
        }
        let clauses: Vec<Bool<'ctx>> = self
            .restrictions
            .iter()
            .map(|r| r.predicate(ctx, body))
            .collect();
        let refs: Vec<&Bool<'ctx>> = clauses.iter().collect();
        Bool::and(ctx, &refs)
    }

    /// Accepted iff the negated predicate is unsatisfiable on this
    /// concrete body.
    pub fn is_body_accepted<'ctx>(
        &self,
        ctx: &'ctx Context,
        body: &SymBody<'ctx>,
        timeout_ms: u64,
    ) -> bool {
        check(ctx, &self.predicate(ctx, body).not(), timeout_ms).is_unsat()
    }

    /// Weakest-link percentage plus the text of the least satisfied
    /// member (first in insertion order on ties) — the instruction the
    /// user should follow next. Empty composites are complete.
    pub fn min_percentage(&self, body: &SymBody<'_>) -> (f64, String) {
        let mut minimum = 1.0;
        let mut instruction = String::new();
        for restriction in &self.restrictions {
            let percentage = restriction.percentage(body);
            if percentage < minimum {
                minimum = percentage;
                instruction = restriction.to_string();
            }
        }
        (minimum, instruction)
    }
}

impl fmt::Display for CompositeRestriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, restriction) in self.restrictions.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{restriction}")?;
        }
        Ok(())
    }
}
