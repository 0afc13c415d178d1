// ─────────────────────────────────────────────────────────────────────
// Mudra — Ambiguity Checking
// ─────────────────────────────────────────────────────────────────────
//! Pairwise distinguishability of gestures, two independent checks:
//!
//! - **Final-state conflict**: both gestures' full pose chains, run
//!   from one shared free body, can land within a numeric precision of
//!   each other while both chains' restrictions hold.
//! - **Step-interval conflict**: a two-cursor walk over both step
//!   sequences — simultaneous satisfiability advances both cursors; an
//!   exhausted gesture rewinds to its last conflicted step so a short
//!   gesture is tested as a sub-sequence of the long one. The conflict
//!   is full when the conflicted count reaches the shorter gesture's
//!   length.
//!
//! `Unknown` outcomes count conservatively as conflicts and are
//! reported distinctly, with no fabricated witness.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use z3::ast::Bool;
use z3::Context;

use mudra_body::{body_witness, check, SolverOutcome, SymBody};
use mudra_gestures::{App, Gesture};
use mudra_types::{ConcreteBody, JointType};

/// How a final-state conflict was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictOutcome {
    /// The solver produced a concrete witness body.
    Witnessed,
    /// The solver gave up; counted as a conflict, fail-closed.
    Unknown,
}

/// Two gestures whose final states can be made indistinguishable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalStateConflict {
    pub gesture1: String,
    pub gesture2: String,
    pub outcome: ConflictOutcome,
    pub witness: Option<ConcreteBody>,
    pub elapsed_ms: f64,
}

/// Classification of a step-interval conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictKind {
    /// One gesture's execution is entirely contained in a window of
    /// the other's.
    Full,
    /// One gesture may be started before the other one ended.
    Partial,
}

/// Two gestures with overlapping step sequences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConflict {
    pub gesture1: String,
    pub gesture2: String,
    pub conflicted_steps: usize,
    pub kind: ConflictKind,
    pub elapsed_ms: f64,
}

/// Combined ambiguity outcome for a whole app.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AmbiguityReport {
    pub passed: bool,
    pub final_state: Vec<FinalStateConflict>,
    pub step_intervals: Vec<StepConflict>,
    pub elapsed_ms: f64,
}

/// Run both pairwise checks over every gesture pair of an app.
pub fn check_app_ambiguity<'ctx>(
    ctx: &'ctx Context,
    app: &App,
    precision_degrees: f64,
    timeout_ms: u64,
) -> AmbiguityReport {
    let started = Instant::now();
    let mut report = AmbiguityReport {
        passed: true,
        ..Default::default()
    };

    let gestures = app.gestures();
    for i in 0..gestures.len() {
        for j in (i + 1)..gestures.len() {
            if let Some(conflict) =
                final_state_conflict(ctx, &gestures[i], &gestures[j], precision_degrees, timeout_ms)
            {
                report.passed = false;
                report.final_state.push(conflict);
            }
            if let Some(conflict) =
                step_interval_conflict(ctx, &gestures[i], &gestures[j], timeout_ms)
            {
                report.passed = false;
                report.step_intervals.push(conflict);
            }
        }
    }

    report.elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    report
}

/// Final-state check for one gesture pair.
pub fn final_state_conflict<'ctx>(
    ctx: &'ctx Context,
    gesture1: &Gesture,
    gesture2: &Gesture,
    precision_degrees: f64,
    timeout_ms: u64,
) -> Option<FinalStateConflict> {
    let started = Instant::now();
    let default = SymBody::default_body(ctx);
    let input = SymBody::free(ctx, "amb");

    let (final1, evaluation1) = gesture1.final_state(ctx, &input, &default);
    let (final2, evaluation2) = gesture2.final_state(ctx, &input, &default);

    let near = final1.is_nearer_than(ctx, &final2, precision_degrees);
    let expr = Bool::and(ctx, &[&near, &evaluation1, &evaluation2]);

    match check(ctx, &expr, timeout_ms) {
        SolverOutcome::Sat(model) => {
            let witness = body_witness(ctx, &input, &model, &JointType::ALL, &default);
            Some(FinalStateConflict {
                gesture1: gesture1.name().to_string(),
                gesture2: gesture2.name().to_string(),
                outcome: ConflictOutcome::Witnessed,
                witness: Some(witness.concretize()),
                elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
            })
        }
        SolverOutcome::Unknown(reason) => {
            log::warn!(
                "final-state ambiguity unknown for `{}` / `{}`, counting as conflict: {}",
                gesture1.name(),
                gesture2.name(),
                reason.as_deref().unwrap_or("no reason")
            );
            Some(FinalStateConflict {
                gesture1: gesture1.name().to_string(),
                gesture2: gesture2.name().to_string(),
                outcome: ConflictOutcome::Unknown,
                witness: None,
                elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
            })
        }
        SolverOutcome::Unsat => None,
    }
}

/// Step-interval check for one gesture pair.
pub fn step_interval_conflict<'ctx>(
    ctx: &'ctx Context,
    gesture1: &Gesture,
    gesture2: &Gesture,
    timeout_ms: u64,
) -> Option<StepConflict> {
    let started = Instant::now();
    let steps1 = gesture1.step_count();
    let steps2 = gesture2.step_count();
    if steps1 == 0 || steps2 == 0 {
        return None;
    }

    let default = SymBody::default_body(ctx);
    let shared = SymBody::free(ctx, "step_amb");

    let mut cursor1 = 0usize;
    let mut cursor2 = 0usize;
    let mut last_conflicted1 = 0usize;
    let mut advance_on = 1u8;
    let mut conflicted = 0usize;

    while cursor1 < steps1 && cursor2 < steps2 {
        let expr1 = step_expression(ctx, gesture1, cursor1, &shared, &default);
        let expr2 = step_expression(ctx, gesture2, cursor2, &shared, &default);
        let both = Bool::and(ctx, &[&expr1, &expr2]);

        // Unknown counts as a simultaneous match: conservative branch.
        let outcome = check(ctx, &both, timeout_ms);
        if outcome.is_unsat() {
            if cursor1 == steps1 - 1 {
                // Gesture 1 is exhausted: rewind it to its last
                // conflicted step and only advance gesture 2 from now
                // on, testing sub-sequence containment.
                cursor1 = last_conflicted1;
                advance_on = 2;
            } else if cursor2 == steps2 - 1 {
                conflicted = 0;
            }
            if advance_on == 1 {
                cursor1 += 1;
            } else {
                cursor2 += 1;
            }
        } else {
            if matches!(outcome, SolverOutcome::Unknown(_)) {
                log::warn!(
                    "step-interval ambiguity unknown for `{}`[{}] / `{}`[{}], counting as conflict",
                    gesture1.name(),
                    cursor1,
                    gesture2.name(),
                    cursor2
                );
            }
            last_conflicted1 = cursor1;
            cursor1 += 1;
            cursor2 += 1;
            conflicted += 1;
            advance_on = 1;
        }
    }

    if conflicted == 0 {
        return None;
    }
    let kind = if conflicted >= steps1.min(steps2) {
        ConflictKind::Full
    } else {
        ConflictKind::Partial
    };
    Some(StepConflict {
        gesture1: gesture1.name().to_string(),
        gesture2: gesture2.name().to_string(),
        conflicted_steps: conflicted,
        kind,
        elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
    })
}

/// The constraint one gesture step imposes on the shared body.
fn step_expression<'ctx>(
    ctx: &'ctx Context,
    gesture: &Gesture,
    step_index: usize,
    shared: &SymBody<'ctx>,
    delayed_seed: &SymBody<'ctx>,
) -> Bool<'ctx> {
    let pose = &gesture.steps()[step_index].pose;
    let resolved = pose.resolve(delayed_seed);
    let transformed = pose.effective_transform(&resolved).apply(ctx, shared);
    pose.effective_restriction(&resolved)
        .predicate(ctx, &transformed)
}
