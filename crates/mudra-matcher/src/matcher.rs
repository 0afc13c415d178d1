// ─────────────────────────────────────────────────────────────────────
// Mudra — Per-Frame Gesture Matcher
// ─────────────────────────────────────────────────────────────────────
//! The frame-driven state machine: one [`GestureMatcher`] per gesture,
//! driven in sequence by a [`BodyMatcher`] once per sensor frame.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use z3::Context;

use mudra_body::trig::chord_distance;
use mudra_body::{SymBody, SymPoint3D};
use mudra_gestures::{App, Gesture, Resolved};
use mudra_types::{GestureStatus, JointType, MatcherConfig, Point3D};

use crate::stats::{MatchStatistics, TimingEntry};
use crate::synthesis::{nearest_target_body, Target};

/// Regression smaller than this does not count as performance error.
const REGRESSION_FLOOR: f64 = 1e-5;

/// Drives every gesture matcher of a compiled app over incoming
/// frames. Matching shares one solver context and therefore runs the
/// matchers strictly in sequence.
pub struct BodyMatcher<'ctx> {
    ctx: &'ctx Context,
    config: MatcherConfig,
    stats: Arc<MatchStatistics>,
    matchers: Vec<GestureMatcher<'ctx>>,
}

impl<'ctx> BodyMatcher<'ctx> {
    pub fn new(ctx: &'ctx Context, app: &App, config: MatcherConfig) -> Self {
        Self::from_gestures(ctx, app.gestures().to_vec(), config)
    }

    pub fn from_gestures(
        ctx: &'ctx Context,
        gestures: Vec<Gesture>,
        config: MatcherConfig,
    ) -> Self {
        let stats = Arc::new(MatchStatistics::new());
        let matchers = gestures
            .into_iter()
            .map(|gesture| GestureMatcher::new(gesture, config.clone(), Arc::clone(&stats)))
            .collect();
        Self {
            ctx,
            config,
            stats,
            matchers,
        }
    }

    pub fn add_gesture(&mut self, gesture: Gesture) {
        self.matchers.push(GestureMatcher::new(
            gesture,
            self.config.clone(),
            Arc::clone(&self.stats),
        ));
    }

    pub fn stats(&self) -> &MatchStatistics {
        &self.stats
    }

    /// Run one frame through every matcher, in sequence.
    pub fn test_body(&mut self, body: &SymBody<'ctx>) -> Vec<GestureStatus> {
        // Target synthesis first: it is not parallel-safe because the
        // solver context cannot be shared across threads.
        for matcher in &mut self.matchers {
            matcher.init_body(self.ctx, body);
        }

        let statuses: Vec<GestureStatus> = self
            .matchers
            .iter_mut()
            .map(|matcher| matcher.match_body(self.ctx, body))
            .collect();

        // A completed gesture starts over: synthesize its first-step
        // target from the frame that completed it.
        for matcher in &mut self.matchers {
            if matcher.last_succeeded() {
                matcher.update_target_body(self.ctx, body);
            }
        }

        statuses
    }

    pub fn last_status(&self) -> Option<GestureStatus> {
        self.matchers.last().map(|m| m.status())
    }

    pub fn last_target(&self) -> Option<&Target<'ctx>> {
        self.matchers.last().and_then(|m| m.target())
    }
}

/// Matching state for one gesture.
pub struct GestureMatcher<'ctx> {
    gesture: Gesture,
    config: MatcherConfig,
    stats: Arc<MatchStatistics>,

    current_step: usize,
    accumulated_error: f64,
    step_last_percentage: f64,
    completed_count: u32,
    target: Option<Target<'ctx>>,
    resolved: Resolved,
    last_distance_vectors: BTreeMap<JointType, Point3D>,
    main_instruction: String,
    last_succeeded: bool,
    last_broke: bool,
    frame_count: u64,
}

impl<'ctx> GestureMatcher<'ctx> {
    pub fn new(gesture: Gesture, config: MatcherConfig, stats: Arc<MatchStatistics>) -> Self {
        let main_instruction = gesture
            .steps()
            .first()
            .map(|step| step.pose.restriction().to_string())
            .unwrap_or_default();
        Self {
            gesture,
            config,
            stats,
            current_step: 0,
            accumulated_error: 0.0,
            step_last_percentage: 0.0,
            completed_count: 0,
            target: None,
            resolved: Resolved::default(),
            last_distance_vectors: BTreeMap::new(),
            main_instruction,
            last_succeeded: false,
            last_broke: false,
            frame_count: 0,
        }
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn target(&self) -> Option<&Target<'ctx>> {
        self.target.as_ref()
    }

    pub fn last_succeeded(&self) -> bool {
        self.last_succeeded
    }

    /// Synthesize the initial target if this matcher has none yet.
    pub fn init_body(&mut self, ctx: &'ctx Context, body: &SymBody<'ctx>) {
        if self.target.is_none() {
            self.update_target_body(ctx, body);
        }
    }

    /// One frame transition. See the crate invariants for the rules.
    pub fn match_body(&mut self, ctx: &'ctx Context, body: &SymBody<'ctx>) -> GestureStatus {
        let started = Instant::now();
        if self.gesture.step_count() == 0 {
            return self.status();
        }
        self.init_body(ctx, body);

        self.last_distance_vectors = self.update_distance_vectors(body);

        let (transforms_pct, restrictions_pct, instruction) = self.calc_percentages(body);
        self.main_instruction = instruction;

        let mut succeeded = false;
        let mut broke = false;
        let step_percentage = transforms_pct.min(restrictions_pct);
        let performance_error = (self.step_last_percentage - step_percentage).max(0.0);
        let step_succeeded = step_percentage >= 1.0;
        self.step_last_percentage = step_percentage;

        // Only regression accumulates error.
        if performance_error > REGRESSION_FLOOR {
            self.accumulated_error +=
                self.config.base_error + self.config.error_weight * performance_error;

            if self.accumulated_error > self.config.break_threshold {
                log::debug!(
                    "gesture `{}` broke at step {} (accumulated error {:.3})",
                    self.gesture.name(),
                    self.current_step,
                    self.accumulated_error
                );
                self.reset(ctx, body);
                broke = true;
                self.recompute_step_percentage(body);
            }
        }

        if step_succeeded {
            self.current_step += 1;
            self.accumulated_error = 0.0;

            if self.current_step >= self.gesture.step_count() {
                self.current_step = 0;
                self.completed_count += 1;
                succeeded = true;
            }
            self.update_target_body(ctx, body);
            self.recompute_step_percentage(body);
        }

        self.last_succeeded = succeeded;
        self.last_broke = broke;

        let status = self.status();

        self.stats.record_match(TimingEntry {
            gesture: self.gesture.name().to_string(),
            pose: self.current_pose_name(),
            uid: self.frame_count,
            elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
        });
        self.frame_count += 1;

        status
    }

    /// Resynthesize the target for the current step.
    ///
    /// Delayed statements resolve against the untouched start body
    /// first; only then are the previous step's transformed joints
    /// seeded from the previous target's concrete values, so matching
    /// precision does not compound across steps.
    pub fn update_target_body(&mut self, ctx: &'ctx Context, start_body: &SymBody<'ctx>) {
        let started = Instant::now();
        let Some(step) = self.gesture.steps().get(self.current_step) else {
            return;
        };
        self.resolved = step.pose.resolve(start_body);

        let mut seeded = start_body.clone();
        if self.current_step > 0 {
            if let Some(previous) = &self.target {
                let previous_pose = &self.gesture.steps()[self.current_step - 1].pose;
                for joint in previous_pose.transform_joint_types() {
                    let concrete = previous.body.direction(joint).concretize();
                    seeded =
                        seeded.with_direction(joint, SymPoint3D::from_point(ctx, concrete));
                }
            }
        }

        let target = nearest_target_body(ctx, &step.pose, &self.resolved, &seeded, &self.config);
        self.target = Some(target);
        self.last_distance_vectors = self.update_distance_vectors(&seeded);

        self.stats.record_synthesis(TimingEntry {
            gesture: self.gesture.name().to_string(),
            pose: step.pose.name().to_string(),
            uid: self.frame_count,
            elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
        });
    }

    /// Completion of the current step against the current target.
    fn calc_percentages(&self, body: &SymBody<'ctx>) -> (f64, f64, String) {
        let transforms_pct = match &self.target {
            Some(target) if !target.transformed_joints.is_empty() => {
                let max_distance = self.max_distance(&target.transformed_joints);
                if max_distance > 0.0 {
                    (chord_distance(self.config.precision_degrees as f64) / max_distance).min(1.0)
                } else {
                    1.0
                }
            }
            _ => 1.0,
        };

        let pose = &self.gesture.steps()[self.current_step].pose;
        let (restrictions_pct, instruction) = pose
            .effective_restriction(&self.resolved)
            .min_percentage(body);

        (transforms_pct, restrictions_pct, instruction)
    }

    fn recompute_step_percentage(&mut self, body: &SymBody<'ctx>) {
        let (transforms_pct, restrictions_pct, _) = self.calc_percentages(body);
        self.step_last_percentage = transforms_pct.min(restrictions_pct);
    }

    fn update_distance_vectors(&self, body: &SymBody<'ctx>) -> BTreeMap<JointType, Point3D> {
        match &self.target {
            Some(target) => body.distance_points(&target.body, &target.all_joint_types()),
            None => BTreeMap::new(),
        }
    }

    fn max_distance(&self, joints: &[JointType]) -> f64 {
        joints
            .iter()
            .filter_map(|joint| self.last_distance_vectors.get(joint))
            .map(|d| d.norm())
            .fold(0.0, f64::max)
    }

    /// Break: back to the first step with a fresh target and no error.
    fn reset(&mut self, ctx: &'ctx Context, body: &SymBody<'ctx>) {
        self.current_step = 0;
        self.accumulated_error = 0.0;
        self.update_target_body(ctx, body);
    }

    fn current_pose_name(&self) -> String {
        self.gesture
            .steps()
            .get(self.current_step)
            .map(|step| step.pose.name().to_string())
            .unwrap_or_default()
    }

    /// Snapshot the matcher into a status record.
    pub fn status(&self) -> GestureStatus {
        let mut status = GestureStatus {
            name: self.gesture.name().to_string(),
            main_instruction: self.main_instruction.clone(),
            current_step: self.current_step,
            num_steps: self.gesture.step_count(),
            step_percentage: self.step_last_percentage,
            distance_vectors: self.last_distance_vectors.clone(),
            completed_count: self.completed_count,
            succeeded: self.last_succeeded,
            succeeded_first_frame: self.last_succeeded && self.completed_count == 1,
            broke: self.last_broke,
            accumulated_error: self.accumulated_error,
            confidence: 0.0,
        };
        status.confidence = status.gesture_percentage();
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mudra_body::solver_context;
    use mudra_gestures::{BodyRestriction, CompositeRestriction, CompositeTransform, Pose};
    use mudra_types::{RelativeDirection, SensorFrame};

    fn config() -> MatcherConfig {
        MatcherConfig {
            solver_timeout_ms: 10_000,
            ..Default::default()
        }
    }

    /// Upright body with the right hand at the given height.
    fn frame_with_hand_y(hand_y: f64) -> SensorFrame {
        let mut positions: BTreeMap<JointType, Point3D> = JointType::ALL
            .iter()
            .map(|&j| (j, Point3D::ZERO))
            .collect();
        positions.insert(JointType::SpineMid, Point3D::new(0.0, 0.3, 0.0));
        positions.insert(JointType::SpineShoulder, Point3D::new(0.0, 0.6, 0.0));
        positions.insert(JointType::Neck, Point3D::new(0.0, 0.75, 0.0));
        positions.insert(JointType::Head, Point3D::new(0.0, 0.9, 0.0));
        positions.insert(JointType::ShoulderRight, Point3D::new(0.25, 0.6, 0.0));
        positions.insert(JointType::ElbowRight, Point3D::new(0.25, 0.75, 0.0));
        positions.insert(JointType::WristRight, Point3D::new(0.25, 0.9, 0.0));
        positions.insert(JointType::HandRight, Point3D::new(0.25, hand_y, 0.0));
        SensorFrame::from_positions(positions)
    }

    fn put(direction: RelativeDirection, relative_to: JointType) -> BodyRestriction {
        BodyRestriction::Put {
            joint: JointType::HandRight,
            relative_to,
            direction,
            negated: false,
        }
    }

    fn raise_gesture(ctx: &Context) -> Gesture {
        let pose = Pose::with_restriction(
            ctx,
            "hand_above_head",
            CompositeTransform::new(),
            CompositeRestriction::single(put(RelativeDirection::OnTopOfYour, JointType::Head)),
            10_000,
        )
        .unwrap();
        Gesture::with_poses("raise_right_hand", vec![pose])
    }

    #[test]
    fn test_one_step_gesture_completes_on_first_matching_frame() {
        let ctx = solver_context();
        let mut matcher = BodyMatcher::from_gestures(&ctx, vec![raise_gesture(&ctx)], config());

        let body = SymBody::from_frame(&ctx, &frame_with_hand_y(1.15));
        let statuses = matcher.test_body(&body);
        let status = &statuses[0];

        assert!(status.succeeded);
        assert!(status.succeeded_first_frame);
        assert_eq!(status.completed_count, 1);
        assert_eq!(status.current_step, 0);
        assert_eq!(status.gesture_percentage(), 1.0);
        assert_eq!(status.accumulated_error, 0.0);
    }

    #[test]
    fn test_unmatched_frame_reports_partial_percentage() {
        let ctx = solver_context();
        let mut matcher = BodyMatcher::from_gestures(&ctx, vec![raise_gesture(&ctx)], config());

        let body = SymBody::from_frame(&ctx, &frame_with_hand_y(0.4));
        let status = matcher.test_body(&body).remove(0);

        assert!(!status.succeeded);
        assert_eq!(status.completed_count, 0);
        assert!(status.step_percentage > 0.0 && status.step_percentage < 1.0);
        assert_eq!(
            status.main_instruction,
            "put your right hand on top of your head"
        );
    }

    #[test]
    fn test_two_step_gesture_advances_then_completes() {
        let ctx = solver_context();
        let up = Pose::with_restriction(
            &ctx,
            "hand_up",
            CompositeTransform::new(),
            CompositeRestriction::single(put(RelativeDirection::OnTopOfYour, JointType::Head)),
            10_000,
        )
        .unwrap();
        let down = Pose::with_restriction(
            &ctx,
            "hand_down",
            CompositeTransform::new(),
            CompositeRestriction::single(put(RelativeDirection::BelowYour, JointType::SpineMid)),
            10_000,
        )
        .unwrap();
        let gesture = Gesture::with_poses("raise_then_lower", vec![up, down]);
        let mut matcher = BodyMatcher::from_gestures(&ctx, vec![gesture], config());

        // Frame 1: first step satisfied, advance but no completion.
        let status = matcher
            .test_body(&SymBody::from_frame(&ctx, &frame_with_hand_y(1.15)))
            .remove(0);
        assert!(!status.succeeded);
        assert_eq!(status.current_step, 1);
        // The freshly synthesized second step is not already complete.
        assert!(status.step_percentage < 1.0);

        // Frame 2: second step satisfied, gesture completes.
        let status = matcher
            .test_body(&SymBody::from_frame(&ctx, &frame_with_hand_y(0.05)))
            .remove(0);
        assert!(status.succeeded);
        assert_eq!(status.completed_count, 1);
        assert_eq!(status.current_step, 0);
    }

    #[test]
    fn test_sustained_regression_breaks_gesture() {
        let ctx = solver_context();
        let mut matcher = BodyMatcher::from_gestures(&ctx, vec![raise_gesture(&ctx)], config());

        let heights = [0.8, 0.65, 0.5, 0.35, 0.2];
        let mut broke_frames = Vec::new();
        for (i, &hand_y) in heights.iter().enumerate() {
            let body = SymBody::from_frame(&ctx, &frame_with_hand_y(hand_y));
            let status = matcher.test_body(&body).remove(0);
            if status.broke {
                broke_frames.push(i);
                assert_eq!(status.current_step, 0, "reset in the breaking frame");
                assert_eq!(status.accumulated_error, 0.0, "error zeroed on break");
            }
        }
        assert_eq!(broke_frames.len(), 1, "one break across the regression run");
    }

    #[test]
    fn test_improvement_accumulates_no_error() {
        let ctx = solver_context();
        let mut matcher = BodyMatcher::from_gestures(&ctx, vec![raise_gesture(&ctx)], config());

        for hand_y in [0.2, 0.4, 0.6, 0.8] {
            let body = SymBody::from_frame(&ctx, &frame_with_hand_y(hand_y));
            let status = matcher.test_body(&body).remove(0);
            assert_eq!(status.accumulated_error, 0.0);
            assert!(!status.broke);
        }
    }

    #[test]
    fn test_completion_repeats_across_session() {
        let ctx = solver_context();
        let mut matcher = BodyMatcher::from_gestures(&ctx, vec![raise_gesture(&ctx)], config());
        let body = SymBody::from_frame(&ctx, &frame_with_hand_y(1.15));

        let first = matcher.test_body(&body).remove(0);
        let second = matcher.test_body(&body).remove(0);

        assert!(first.succeeded && first.succeeded_first_frame);
        assert!(second.succeeded && !second.succeeded_first_frame);
        assert_eq!(second.completed_count, 2);
    }

    #[test]
    fn test_statistics_accumulate_per_frame() {
        let ctx = solver_context();
        let mut matcher = BodyMatcher::from_gestures(&ctx, vec![raise_gesture(&ctx)], config());
        let body = SymBody::from_frame(&ctx, &frame_with_hand_y(0.4));

        matcher.test_body(&body);
        matcher.test_body(&body);

        assert_eq!(matcher.stats().match_count(), 2);
        assert!(matcher.stats().synthesis_count() >= 1);
    }

    #[test]
    fn test_empty_gesture_is_inert() {
        let ctx = solver_context();
        let gesture = Gesture::new("empty");
        let mut matcher = BodyMatcher::from_gestures(&ctx, vec![gesture], config());
        let body = SymBody::from_frame(&ctx, &frame_with_hand_y(0.4));
        let status = matcher.test_body(&body).remove(0);
        assert_eq!(status.num_steps, 0);
        assert_eq!(status.gesture_percentage(), 0.0);
    }
}
