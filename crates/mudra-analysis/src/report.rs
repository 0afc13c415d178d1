// ─────────────────────────────────────────────────────────────────────
// Mudra — Verification Reports
// ─────────────────────────────────────────────────────────────────────
//! Structured results for batch verification runs.

use serde::{Deserialize, Serialize};

use mudra_types::ConcreteBody;

/// One failed check, with enough context to locate and reproduce it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub gesture: String,
    pub pose: String,

    /// The failing statement, human-readable.
    pub statement: String,

    /// Concrete counterexample body, when the solver produced one.
    pub witness: Option<ConcreteBody>,

    pub elapsed_ms: f64,
}

/// Outcome of a safety or validity pass over a whole app.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckReport {
    pub passed: bool,
    pub violations: Vec<Violation>,
    pub elapsed_ms: f64,
}

impl CheckReport {
    pub fn passing() -> Self {
        Self {
            passed: true,
            ..Default::default()
        }
    }

    pub fn record(&mut self, violation: Violation) {
        self.passed = false;
        self.violations.push(violation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_flips_passed() {
        let mut report = CheckReport::passing();
        assert!(report.passed);
        report.record(Violation {
            gesture: "wave".to_string(),
            pose: "hand_up".to_string(),
            statement: "don't bend your left knee towards your back".to_string(),
            witness: None,
            elapsed_ms: 1.5,
        });
        assert!(!report.passed);
        assert_eq!(report.violations.len(), 1);
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut report = CheckReport::passing();
        report.record(Violation {
            gesture: "wave".to_string(),
            pose: "hand_up".to_string(),
            statement: "statement".to_string(),
            witness: Some(ConcreteBody::default()),
            elapsed_ms: 0.0,
        });
        let json = serde_json::to_string(&report).unwrap();
        let back: CheckReport = serde_json::from_str(&json).unwrap();
        assert!(!back.passed);
        assert!(back.violations[0].witness.is_some());
    }
}
