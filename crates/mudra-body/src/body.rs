// ─────────────────────────────────────────────────────────────────────
// Mudra — Symbolic Body
// ─────────────────────────────────────────────────────────────────────
//! A body as the solver sees it: per-joint parent-relative unit
//! directions plus scalar limb norms, with absolute positions derived
//! by accumulation along the parent chain.

use std::collections::BTreeMap;

use z3::ast::{Bool, Real};
use z3::Context;

use mudra_types::{ConcreteBody, Direction, JointType, Point3D, SensorFrame};

use crate::sym::{real_lit, real_to_f64, SymPoint3D};
use crate::trig::chord_distance;

/// Symbolic skeletal body.
///
/// Once constructed a body is an immutable input: transforms and
/// seeding produce new bodies via [`SymBody::with_direction`], never by
/// mutating expressions in place.
#[derive(Debug, Clone)]
pub struct SymBody<'ctx> {
    joints: BTreeMap<JointType, SymPoint3D<'ctx>>,
    norms: BTreeMap<JointType, Real<'ctx>>,
}

impl<'ctx> SymBody<'ctx> {
    /// The free body: every direction coordinate is an unconstrained
    /// solver constant, while limb norms carry the synthetic defaults
    /// — existence queries range over configurations, not over limb
    /// lengths, and literal norms keep position constraints linear.
    /// Constants are named after `tag`, so two free bodies built with
    /// the same tag in the same context denote the same variables.
    pub fn free(ctx: &'ctx Context, tag: &str) -> Self {
        let mut joints = BTreeMap::new();
        let mut norms = BTreeMap::new();
        for joint in JointType::ALL {
            joints.insert(
                joint,
                SymPoint3D::new_const(ctx, &format!("{tag}_{joint:?}")),
            );
            norms.insert(joint, real_lit(ctx, default_norm(joint)));
        }
        Self { joints, norms }
    }

    /// A copy of `self` carrying `other`'s limb norms, used to anchor
    /// an existence query to an observed body's proportions.
    pub fn with_norms_from(&self, other: &SymBody<'ctx>) -> Self {
        Self {
            joints: self.joints.clone(),
            norms: other.norms.clone(),
        }
    }

    /// The canonical default body: upright stance, arms and legs
    /// hanging down, synthetic limb norms.
    pub fn default_body(ctx: &'ctx Context) -> Self {
        let mut joints = BTreeMap::new();
        let mut norms = BTreeMap::new();
        for joint in JointType::ALL {
            joints.insert(
                joint,
                SymPoint3D::direction_point(ctx, default_direction(joint)),
            );
            norms.insert(joint, real_lit(ctx, default_norm(joint)));
        }
        Self { joints, norms }
    }

    /// Build a concrete symbolic body from a sensor frame: per joint,
    /// the unit direction from its parent and the limb length. The
    /// root keeps its own position as direction · norm.
    pub fn from_frame(ctx: &'ctx Context, frame: &SensorFrame) -> Self {
        let mut joints = BTreeMap::new();
        let mut norms = BTreeMap::new();
        for joint in JointType::ALL {
            let position = frame.position(joint).unwrap_or(Point3D::ZERO);
            let vector = if joint == JointType::ROOT {
                position
            } else {
                let parent = frame.position(joint.parent()).unwrap_or(Point3D::ZERO);
                position - parent
            };
            joints.insert(joint, SymPoint3D::from_point(ctx, vector.normalized()));
            norms.insert(joint, real_lit(ctx, vector.norm()));
        }
        Self { joints, norms }
    }

    /// Rebuild from an already concrete body (witness, seeded target).
    pub fn from_concrete(ctx: &'ctx Context, body: &ConcreteBody) -> Self {
        let mut joints = BTreeMap::new();
        let mut norms = BTreeMap::new();
        for joint in JointType::ALL {
            joints.insert(joint, SymPoint3D::from_point(ctx, body.direction(joint)));
            norms.insert(joint, real_lit(ctx, body.norm(joint)));
        }
        Self { joints, norms }
    }

    pub fn direction(&self, joint: JointType) -> &SymPoint3D<'ctx> {
        &self.joints[&joint]
    }

    pub fn norm(&self, joint: JointType) -> &Real<'ctx> {
        &self.norms[&joint]
    }

    /// A new body with one joint's direction replaced.
    pub fn with_direction(&self, joint: JointType, direction: SymPoint3D<'ctx>) -> Self {
        let mut result = self.clone();
        result.joints.insert(joint, direction);
        result
    }

    /// Absolute position: the root contributes direction · norm, each
    /// joint below adds its scaled direction to its parent's position.
    pub fn position(&self, joint: JointType) -> SymPoint3D<'ctx> {
        let root = JointType::ROOT;
        let mut position = self.joints[&root].scale(&self.norms[&root]);
        for link in joint.chain_to_root().into_iter().rev() {
            position = position.add(&self.joints[&link].scale(&self.norms[&link]));
        }
        position
    }

    /// Both bodies' directions within the chord of `precision_degrees`
    /// at every one of the given joints (all joints when empty).
    pub fn is_nearer_than(
        &self,
        ctx: &'ctx Context,
        other: &SymBody<'ctx>,
        precision_degrees: f64,
    ) -> Bool<'ctx> {
        let chord = chord_distance(precision_degrees);
        let clauses: Vec<Bool<'ctx>> = JointType::ALL
            .iter()
            .map(|&joint| {
                self.joints[&joint].is_nearer_than(ctx, &other.joints[&joint], chord)
            })
            .collect();
        let refs: Vec<&Bool<'ctx>> = clauses.iter().collect();
        Bool::and(ctx, &refs)
    }

    /// Concrete direction-space displacement from `other`, per joint.
    /// Only meaningful when both bodies concretize.
    pub fn distance_points(
        &self,
        other: &SymBody<'ctx>,
        joints: &[JointType],
    ) -> BTreeMap<JointType, Point3D> {
        joints
            .iter()
            .map(|&joint| {
                let here = self.joints[&joint].concretize();
                let there = other.joints[&joint].concretize();
                (joint, here - there)
            })
            .collect()
    }

    /// Fold every coordinate down to f64. Valid for constant bodies.
    pub fn concretize(&self) -> ConcreteBody {
        let mut body = ConcreteBody::default();
        for joint in JointType::ALL {
            body.directions
                .insert(joint, self.joints[&joint].concretize());
            body.norms
                .insert(joint, real_to_f64(&self.norms[&joint]).unwrap_or(0.0));
        }
        body
    }
}

fn default_direction(joint: JointType) -> Direction {
    use JointType::*;
    match joint {
        SpineBase => Direction::Front,
        SpineMid | SpineShoulder | Neck | Head => Direction::Up,
        ShoulderLeft | HipLeft => Direction::Left,
        ShoulderRight | HipRight => Direction::Right,
        _ => Direction::Down,
    }
}

fn default_norm(joint: JointType) -> f64 {
    use JointType::*;
    match joint {
        SpineBase => 0.0,
        SpineMid | SpineShoulder => 0.3,
        Neck | Head => 0.15,
        ShoulderLeft | ShoulderRight | ElbowLeft | ElbowRight | WristLeft | WristRight => 0.25,
        HandLeft | HandRight | HandTipLeft | HandTipRight | ThumbLeft | ThumbRight => 0.05,
        HipLeft | HipRight => 0.25,
        KneeLeft | KneeRight | AnkleLeft | AnkleRight => 0.35,
        FootLeft | FootRight => 0.1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::solver_context;
    use std::collections::BTreeMap as Map;

    #[test]
    fn test_default_body_directions_are_unit() {
        let ctx = solver_context();
        let body = SymBody::default_body(&ctx);
        for joint in JointType::ALL {
            let dir = body.direction(joint).concretize();
            assert!((dir.norm() - 1.0).abs() < 1e-6, "{joint:?}");
        }
    }

    #[test]
    fn test_default_body_norms_non_negative() {
        let ctx = solver_context();
        let body = SymBody::default_body(&ctx).concretize();
        for joint in JointType::ALL {
            assert!(body.norm(joint) >= 0.0);
        }
    }

    #[test]
    fn test_default_body_head_above_root() {
        let ctx = solver_context();
        let body = SymBody::default_body(&ctx);
        let head = body.position(JointType::Head).concretize();
        let root = body.position(JointType::SpineBase).concretize();
        assert!(head.y > root.y + 0.5);
    }

    #[test]
    fn test_from_frame_recovers_directions_and_norms() {
        let ctx = solver_context();
        let mut positions = Map::new();
        for joint in JointType::ALL {
            positions.insert(joint, Point3D::ZERO);
        }
        positions.insert(JointType::SpineBase, Point3D::ZERO);
        positions.insert(JointType::SpineMid, Point3D::new(0.0, 0.3, 0.0));
        let frame = SensorFrame::from_positions(positions);
        let body = SymBody::from_frame(&ctx, &frame);

        let dir = body.direction(JointType::SpineMid).concretize();
        assert!((dir.y - 1.0).abs() < 1e-6);
        assert!((real_to_f64(body.norm(JointType::SpineMid)).unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_with_direction_is_pure() {
        let ctx = solver_context();
        let body = SymBody::default_body(&ctx);
        let replaced = body.with_direction(
            JointType::ElbowRight,
            SymPoint3D::direction_point(&ctx, Direction::Up),
        );
        let original = body.direction(JointType::ElbowRight).concretize();
        let new = replaced.direction(JointType::ElbowRight).concretize();
        assert!((original.y + 1.0).abs() < 1e-6, "input body untouched");
        assert!((new.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_distance_points_zero_against_self() {
        let ctx = solver_context();
        let body = SymBody::default_body(&ctx);
        let distances = body.distance_points(&body, &[JointType::Head, JointType::FootLeft]);
        for (_, d) in distances {
            assert!(d.norm() < 1e-9);
        }
    }

    #[test]
    fn test_concretize_roundtrip() {
        let ctx = solver_context();
        let body = SymBody::default_body(&ctx);
        let concrete = body.concretize();
        let back = SymBody::from_concrete(&ctx, &concrete).concretize();
        for joint in JointType::ALL {
            assert!(back.direction(joint).distance_to(concrete.direction(joint)) < 1e-9);
        }
    }
}
