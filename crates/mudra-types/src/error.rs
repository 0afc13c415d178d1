// ─────────────────────────────────────────────────────────────────────
// Mudra — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all Mudra kernel failures.
///
/// Solver indeterminacy is deliberately absent: an `Unknown` outcome is
/// a first-class result, not an error, and the caller resolves it to
/// the conservative branch.
#[derive(Error, Debug)]
pub enum MudraError {
    /// Front-end syntax or semantic error, with source location.
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: u32,
        column: u32,
        message: String,
    },

    /// A pose whose restriction rejects every output of its own
    /// transform. Raised at construction; the pose is unusable.
    #[error("pose `{pose}` is contradictory: no transformed body satisfies `{statement}`")]
    ContradictoryPose { pose: String, statement: String },

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// The solver backend failed outside of a query (context setup,
    /// resource exhaustion).
    #[error("solver error: {0}")]
    Solver(String),

    /// Numerical error (NaN/Inf where a finite value is required).
    #[error("numerical error: {0}")]
    Numerical(String),
}

pub type MudraResult<T> = Result<T, MudraError>;
