// ─────────────────────────────────────────────────────────────────────
// Mudra — Symbolic 3-D Points
// ─────────────────────────────────────────────────────────────────────
//! One coordinate triple of solver-native reals, with the arithmetic
//! the restriction and transform algebras need. Concretization goes
//! through the solver's simplifier, so any point built from literals
//! folds back to exact rationals.

use z3::ast::{Ast, Bool, Real};
use z3::Context;

use mudra_types::{Axis, Direction, Point3D};

use crate::trig::{cos_degrees, sin_degrees};

/// Denominator used when scaling an f64 into an exact rational.
const RATIONAL_SCALE: f64 = 1_000_000.0;

/// Exact rational literal for a concrete coordinate value.
///
/// Non-finite inputs clamp to zero; body coordinates live in a few
/// meters around the origin, well inside the scaled i32 range.
pub fn real_lit<'ctx>(ctx: &'ctx Context, value: f64) -> Real<'ctx> {
    if !value.is_finite() {
        log::warn!("real_lit: non-finite value {value}, clamping to 0");
        return Real::from_real(ctx, 0, 1);
    }
    let scaled = (value * RATIONAL_SCALE).round();
    if scaled.abs() >= i32::MAX as f64 {
        log::warn!("real_lit: value {value} out of rational range, clamping to 0");
        return Real::from_real(ctx, 0, 1);
    }
    Real::from_real(ctx, scaled as i32, RATIONAL_SCALE as i32)
}

/// Fold a constant real expression back to f64, `None` when the
/// expression does not simplify to a numeral.
pub fn real_to_f64(expr: &Real<'_>) -> Option<f64> {
    expr.simplify()
        .as_real()
        .map(|(num, den)| num as f64 / den as f64)
}

/// A symbolic point: three solver-native real expressions.
#[derive(Debug, Clone)]
pub struct SymPoint3D<'ctx> {
    pub x: Real<'ctx>,
    pub y: Real<'ctx>,
    pub z: Real<'ctx>,
}

impl<'ctx> SymPoint3D<'ctx> {
    /// Fresh unconstrained coordinates named `{tag}_x` / `_y` / `_z`.
    pub fn new_const(ctx: &'ctx Context, tag: &str) -> Self {
        Self {
            x: Real::new_const(ctx, format!("{tag}_x")),
            y: Real::new_const(ctx, format!("{tag}_y")),
            z: Real::new_const(ctx, format!("{tag}_z")),
        }
    }

    /// Concrete-valued point, used for witnesses and sensor data.
    pub fn from_point(ctx: &'ctx Context, point: Point3D) -> Self {
        Self {
            x: real_lit(ctx, point.x),
            y: real_lit(ctx, point.y),
            z: real_lit(ctx, point.z),
        }
    }

    /// Unit vector pointing along a principal direction.
    pub fn direction_point(ctx: &'ctx Context, direction: Direction) -> Self {
        let p = match direction {
            Direction::Up => Point3D::new(0.0, 1.0, 0.0),
            Direction::Down => Point3D::new(0.0, -1.0, 0.0),
            Direction::Right => Point3D::new(1.0, 0.0, 0.0),
            Direction::Left => Point3D::new(-1.0, 0.0, 0.0),
            Direction::Front => Point3D::new(0.0, 0.0, 1.0),
            Direction::Back => Point3D::new(0.0, 0.0, -1.0),
        };
        Self::from_point(ctx, p)
    }

    pub fn axis(&self, axis: Axis) -> &Real<'ctx> {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }

    pub fn sub(&self, other: &SymPoint3D<'ctx>) -> SymPoint3D<'ctx> {
        SymPoint3D {
            x: &self.x - &other.x,
            y: &self.y - &other.y,
            z: &self.z - &other.z,
        }
    }

    pub fn add(&self, other: &SymPoint3D<'ctx>) -> SymPoint3D<'ctx> {
        SymPoint3D {
            x: &self.x + &other.x,
            y: &self.y + &other.y,
            z: &self.z + &other.z,
        }
    }

    pub fn scale(&self, factor: &Real<'ctx>) -> SymPoint3D<'ctx> {
        SymPoint3D {
            x: &self.x * factor,
            y: &self.y * factor,
            z: &self.z * factor,
        }
    }

    pub fn dot(&self, other: &SymPoint3D<'ctx>) -> Real<'ctx> {
        &(&(&self.x * &other.x) + &(&self.y * &other.y)) + &(&self.z * &other.z)
    }

    pub fn squared_distance(&self, other: &SymPoint3D<'ctx>) -> Real<'ctx> {
        let diff = self.sub(other);
        diff.dot(&diff)
    }

    /// Euclidean distance below `threshold`, linearized as a squared
    /// comparison.
    pub fn is_nearer_than(
        &self,
        ctx: &'ctx Context,
        other: &SymPoint3D<'ctx>,
        threshold: f64,
    ) -> Bool<'ctx> {
        self.squared_distance(other)
            .lt(&real_lit(ctx, threshold * threshold))
    }

    /// Angle to `other` below `degrees`, linearized to a constant
    /// cosine bound on the dot product. Both points must be unit
    /// directions for the bound to be exact.
    pub fn angle_below(
        &self,
        ctx: &'ctx Context,
        other: &SymPoint3D<'ctx>,
        degrees: f64,
    ) -> Bool<'ctx> {
        self.dot(other).gt(&real_lit(ctx, cos_degrees(degrees)))
    }

    /// Rotate toward a principal direction by `degrees`, as a constant-
    /// coefficient principal-axis rotation. Up/Down and Front/Back
    /// rotate about the X axis, Left/Right about the Y axis; the sine
    /// sign selects the sense. Norm is preserved up to the rational
    /// rounding of the coefficients.
    pub fn rotated(&self, ctx: &'ctx Context, direction: Direction, degrees: i32) -> Self {
        let c = real_lit(ctx, cos_degrees(degrees as f64));
        let s = real_lit(ctx, sin_degrees(degrees as f64));
        match direction {
            Direction::Front => SymPoint3D {
                x: self.x.clone(),
                y: &(&self.y * &c) - &(&self.z * &s),
                z: &(&self.y * &s) + &(&self.z * &c),
            },
            Direction::Back => SymPoint3D {
                x: self.x.clone(),
                y: &(&self.y * &c) + &(&self.z * &s),
                z: &(&self.z * &c) - &(&self.y * &s),
            },
            Direction::Up => SymPoint3D {
                x: self.x.clone(),
                y: &(&self.y * &c) + &(&self.z * &s),
                z: &(&self.z * &c) - &(&self.y * &s),
            },
            Direction::Down => SymPoint3D {
                x: self.x.clone(),
                y: &(&self.y * &c) - &(&self.z * &s),
                z: &(&self.y * &s) + &(&self.z * &c),
            },
            Direction::Right => SymPoint3D {
                x: &(&self.x * &c) + &(&self.z * &s),
                y: self.y.clone(),
                z: &(&self.z * &c) - &(&self.x * &s),
            },
            Direction::Left => SymPoint3D {
                x: &(&self.x * &c) - &(&self.z * &s),
                y: self.y.clone(),
                z: &(&self.z * &c) + &(&self.x * &s),
            },
        }
    }

    /// Fold back to concrete coordinates. Only valid for points whose
    /// expressions are constant; a non-constant coordinate logs and
    /// reads as zero.
    pub fn concretize(&self) -> Point3D {
        Point3D::new(
            component_value(&self.x, "x"),
            component_value(&self.y, "y"),
            component_value(&self.z, "z"),
        )
    }
}

fn component_value(expr: &Real<'_>, name: &str) -> f64 {
    match real_to_f64(expr) {
        Some(v) => v,
        None => {
            log::warn!("concretize: {name} component is not a constant, reading as 0");
            0.0
        }
    }
}
