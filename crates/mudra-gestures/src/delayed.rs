// ─────────────────────────────────────────────────────────────────────
// Mudra — Delayed Statements
// ─────────────────────────────────────────────────────────────────────
//! Statements whose concrete form depends on the body observed when a
//! pose becomes active ("rotate from wherever you are now"). They are
//! resolved by a pure function into an ordinary transform/restriction
//! pair stored in per-activation state; the declared pose is never
//! mutated.

use std::fmt;

use mudra_body::SymBody;
use mudra_types::{Direction, JointType};

use crate::restriction::{BodyRestriction, CompositeRestriction};
use crate::transform::{CompositeTransform, JointTransform};

/// A rotation whose start direction is captured at activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotateDelayed {
    pub joint: JointType,
    pub direction: Direction,
    pub degrees: i32,
}

impl fmt::Display for RotateDelayed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rotate your {} {} degrees {}",
            self.joint, self.degrees, self.direction
        )
    }
}

/// The transform/restriction pair a composite resolves to for one pose
/// activation.
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    pub transform: CompositeTransform,
    pub restriction: CompositeRestriction,
}

/// Ordered set of delayed statements declared on a pose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositeDelayed {
    statements: Vec<RotateDelayed>,
}

impl CompositeDelayed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(statement: RotateDelayed) -> Self {
        Self {
            statements: vec![statement],
        }
    }

    pub fn compose(&self, other: &CompositeDelayed) -> Self {
        let mut statements = self.statements.clone();
        statements.extend(other.statements.iter().copied());
        Self { statements }
    }

    pub fn statements(&self) -> &[RotateDelayed] {
        &self.statements
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Resolve against the body observed at activation.
    ///
    /// A joint named by exactly one statement becomes a rotate-direction
    /// restriction anchored at its current direction — the user keeps
    /// freedom in how to reach it. A joint named more than once becomes
    /// a chained transform so every requested rotation is represented.
    pub fn resolve(&self, start_body: &SymBody<'_>) -> Resolved {
        let mut resolved = Resolved::default();
        for statement in &self.statements {
            let occurrences = self
                .statements
                .iter()
                .filter(|s| s.joint == statement.joint)
                .count();
            if occurrences == 1 {
                resolved.restriction.and(BodyRestriction::RotateDirection {
                    joint: statement.joint,
                    start: start_body.direction(statement.joint).concretize(),
                    degrees: statement.degrees,
                    direction: statement.direction,
                });
            } else {
                resolved.transform = resolved.transform.compose(
                    statement.joint,
                    JointTransform::Rotate {
                        direction: statement.direction,
                        degrees: statement.degrees,
                    },
                );
            }
        }
        resolved
    }
}

impl fmt::Display for CompositeDelayed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, statement) in self.statements.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{statement}")?;
        }
        Ok(())
    }
}
