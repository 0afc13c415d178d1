// ─────────────────────────────────────────────────────────────────────
// Mudra — Angular Linearization Helpers
// ─────────────────────────────────────────────────────────────────────
//! Trigonometric constants folded to f64 before they reach the solver.
//! Restrictions and transforms never emit symbolic trigonometry; an
//! angle bound becomes a constant cosine bound on a dot product, and an
//! angular precision becomes a constant chord length between unit
//! vectors.

/// Chord length between two unit vectors separated by `degrees`.
///
/// This is the displacement bound the matching engine compares joint
/// distance vectors against: `2 * sin(θ/2)`.
pub fn chord_distance(degrees: f64) -> f64 {
    2.0 * (degrees.to_radians() / 2.0).sin()
}

pub fn cos_degrees(degrees: f64) -> f64 {
    degrees.to_radians().cos()
}

pub fn sin_degrees(degrees: f64) -> f64 {
    degrees.to_radians().sin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chord_zero() {
        assert!(chord_distance(0.0).abs() < 1e-12);
    }

    #[test]
    fn test_chord_right_angle() {
        // Unit vectors 90° apart are √2 apart.
        assert!((chord_distance(90.0) - std::f64::consts::SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn test_chord_opposite() {
        assert!((chord_distance(180.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_chord_monotone() {
        assert!(chord_distance(15.0) < chord_distance(30.0));
        assert!(chord_distance(30.0) < chord_distance(60.0));
    }

    #[test]
    fn test_cos_sin_degrees() {
        assert!((cos_degrees(60.0) - 0.5).abs() < 1e-12);
        assert!((sin_degrees(30.0) - 0.5).abs() < 1e-12);
    }
}
