// ─────────────────────────────────────────────────────────────────────
// Mudra — Gestures and Apps
// ─────────────────────────────────────────────────────────────────────
//! A gesture is an ordered sequence of poses to be matched in order;
//! an app is the named set of gestures a compiled program declares.
//! Built once by the front end, read-only afterwards.

use std::fmt;

use z3::ast::Bool;
use z3::Context;

use mudra_body::SymBody;

use crate::pose::Pose;

/// One step of a gesture: a pose to reach.
#[derive(Debug, Clone)]
pub struct ExecutionStep {
    pub pose: Pose,
}

impl ExecutionStep {
    pub fn new(pose: Pose) -> Self {
        Self { pose }
    }
}

impl fmt::Display for ExecutionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pose)
    }
}

#[derive(Debug, Clone)]
pub struct Gesture {
    name: String,
    steps: Vec<ExecutionStep>,
}

impl Gesture {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    pub fn with_poses(name: impl Into<String>, poses: Vec<Pose>) -> Self {
        Self {
            name: name.into(),
            steps: poses.into_iter().map(ExecutionStep::new).collect(),
        }
    }

    pub fn add_pose(&mut self, pose: Pose) {
        self.steps.push(ExecutionStep::new(pose));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[ExecutionStep] {
        &self.steps
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn declared_poses(&self) -> impl Iterator<Item = &Pose> {
        self.steps.iter().map(|step| &step.pose)
    }

    /// Fold the whole pose chain over one input body: each step's
    /// effective transform advances the body, each step's effective
    /// restriction is conjoined on the state it applies to. Delayed
    /// statements are resolved against `delayed_seed` (offline callers
    /// pass the canonical default body).
    pub fn final_state<'ctx>(
        &self,
        ctx: &'ctx Context,
        input: &SymBody<'ctx>,
        delayed_seed: &SymBody<'ctx>,
    ) -> (SymBody<'ctx>, Bool<'ctx>) {
        let mut body = input.clone();
        let mut clauses: Vec<Bool<'ctx>> = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            let resolved = step.pose.resolve(delayed_seed);
            body = step.pose.effective_transform(&resolved).apply(ctx, &body);
            clauses.push(
                step.pose
                    .effective_restriction(&resolved)
                    .predicate(ctx, &body),
            );
        }
        if clauses.is_empty() {
            return (body, Bool::from_bool(ctx, true));
        }
        let refs: Vec<&Bool<'ctx>> = clauses.iter().collect();
        (body, Bool::and(ctx, &refs))
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GESTURE {} =", self.name)?;
        for step in &self.steps {
            write!(f, "\n\t{step}")?;
        }
        Ok(())
    }
}

/// A compiled gesture program: the object graph the front end emits.
#[derive(Debug, Clone)]
pub struct App {
    name: String,
    gestures: Vec<Gesture>,
}

impl App {
    pub fn new(name: impl Into<String>, gestures: Vec<Gesture>) -> Self {
        Self {
            name: name.into(),
            gestures,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gestures(&self) -> &[Gesture] {
        &self.gestures
    }
}

impl fmt::Display for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "APP {} =", self.name)?;
        for gesture in &self.gestures {
            write!(f, "\n\n\t{gesture}")?;
        }
        Ok(())
    }
}
