// ─────────────────────────────────────────────────────────────────────
// Mudra — Matcher Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{MudraError, MudraResult};

/// Runtime configuration for per-frame matching and target synthesis.
///
/// One instance is shared by every gesture matcher of a session; the
/// static-analysis pass reuses `solver_timeout_ms` for its queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Angular precision in degrees. A transformed joint counts as
    /// reached when its direction is within this angle of the target.
    /// Default: 15.
    pub precision_degrees: u32,

    /// Flat error added whenever step completion regresses. At the
    /// default frame rate this tolerates roughly 0.3 s of regression.
    /// Default: 0.1.
    pub base_error: f64,

    /// Multiplier on the regression magnitude added on top of
    /// `base_error`. Default: 3.0.
    pub error_weight: f64,

    /// Accumulated error above which the gesture breaks and matching
    /// resets to the first step. Default: 1.0.
    pub break_threshold: f64,

    /// Starting angular threshold (degrees) for target synthesis.
    /// Default: 90.
    pub synthesis_start_degrees: u32,

    /// Bisection iterations refining the synthesis threshold. The
    /// shipped configuration runs a single iteration. Default: 1.
    pub synthesis_iterations: u32,

    /// Per-query solver timeout in milliseconds. A timed-out query is
    /// an `Unknown` outcome, never `Unsat`. Default: 250.
    pub solver_timeout_ms: u64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            precision_degrees: 15,
            base_error: 0.1,
            error_weight: 3.0,
            break_threshold: 1.0,
            synthesis_start_degrees: 90,
            synthesis_iterations: 1,
            solver_timeout_ms: 250,
        }
    }
}

impl MatcherConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> MudraResult<()> {
        if !(1..=90).contains(&self.precision_degrees) {
            return Err(MudraError::Config(format!(
                "precision_degrees must be in [1, 90], got {}",
                self.precision_degrees
            )));
        }
        if self.base_error <= 0.0 || !self.base_error.is_finite() {
            return Err(MudraError::Config(format!(
                "base_error must be > 0, got {}",
                self.base_error
            )));
        }
        if self.error_weight < 0.0 || !self.error_weight.is_finite() {
            return Err(MudraError::Config(format!(
                "error_weight must be >= 0, got {}",
                self.error_weight
            )));
        }
        if self.break_threshold <= 0.0 || !self.break_threshold.is_finite() {
            return Err(MudraError::Config(format!(
                "break_threshold must be > 0, got {}",
                self.break_threshold
            )));
        }
        if !(1..=180).contains(&self.synthesis_start_degrees) {
            return Err(MudraError::Config(format!(
                "synthesis_start_degrees must be in [1, 180], got {}",
                self.synthesis_start_degrees
            )));
        }
        if self.synthesis_iterations < 1 {
            return Err(MudraError::Config(
                "synthesis_iterations must be >= 1".to_string(),
            ));
        }
        if self.solver_timeout_ms == 0 {
            return Err(MudraError::Config(
                "solver_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> MudraResult<Self> {
        let config: MatcherConfig = serde_json::from_str(json)
            .map_err(|e| MudraError::Config(format!("JSON parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}
