// ─────────────────────────────────────────────────────────────────────
// Mudra — Transform Algebra
// ─────────────────────────────────────────────────────────────────────
//! Pure functions from a symbolic body to a transformed symbolic body.
//! A composite is an ordered list of per-joint transforms; composing
//! two transforms for the same joint chains their effects. The set of
//! joints a composite reports is exactly the set it rewrites — the
//! matching engine relies on this to know which displacements count.

use std::fmt;

use z3::Context;

use mudra_body::{SymBody, SymPoint3D};
use mudra_types::{Direction, JointType};

/// One joint-level transform kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointTransform {
    /// Rotate the joint's parent-relative direction toward a principal
    /// direction by the given signed degrees.
    Rotate { direction: Direction, degrees: i32 },
}

impl JointTransform {
    pub fn apply<'ctx>(&self, ctx: &'ctx Context, point: &SymPoint3D<'ctx>) -> SymPoint3D<'ctx> {
        match *self {
            JointTransform::Rotate { direction, degrees } => point.rotated(ctx, direction, degrees),
        }
    }
}

impl fmt::Display for JointTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JointTransform::Rotate { direction, degrees } => {
                write!(f, "rotate {degrees} degrees {direction}")
            }
        }
    }
}

/// Ordered collection of per-joint transforms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositeTransform {
    entries: Vec<(JointType, JointTransform)>,
}

impl CompositeTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(joint: JointType, transform: JointTransform) -> Self {
        Self {
            entries: vec![(joint, transform)],
        }
    }

    /// New composite with one more joint transform appended.
    pub fn compose(&self, joint: JointType, transform: JointTransform) -> Self {
        let mut entries = self.entries.clone();
        entries.push((joint, transform));
        Self { entries }
    }

    /// New composite applying `self` then `other`.
    pub fn compose_with(&self, other: &CompositeTransform) -> Self {
        let mut entries = self.entries.clone();
        entries.extend(other.entries.iter().cloned());
        Self { entries }
    }

    /// Apply to a body, producing a new body. Entries for the same
    /// joint chain: each sees the direction the previous one produced.
    pub fn apply<'ctx>(&self, ctx: &'ctx Context, body: &SymBody<'ctx>) -> SymBody<'ctx> {
        let mut result = body.clone();
        for (joint, transform) in &self.entries {
            let rotated = transform.apply(ctx, result.direction(*joint));
            result = result.with_direction(*joint, rotated);
        }
        result
    }

    /// Exactly the joints this composite can modify, first-seen order.
    pub fn joint_types(&self) -> Vec<JointType> {
        let mut result = Vec::new();
        for (joint, _) in &self.entries {
            if !result.contains(joint) {
                result.push(*joint);
            }
        }
        result
    }

    pub fn transform_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for CompositeTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (joint, transform)) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            match transform {
                JointTransform::Rotate { direction, degrees } => {
                    write!(f, "rotate your {joint} {degrees} degrees {direction}")?;
                }
            }
        }
        Ok(())
    }
}
