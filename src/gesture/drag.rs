use std::time::{Duration, Instant};

use serde::Serialize;

use crate::animation::{interpolate_clamped, Tween};
use crate::config::{
    LightboxConfig, DEFAULT_BACKDROP_FADE_RANGE, DEFAULT_COMMIT_OVERSHOOT_PROGRESS,
    DEFAULT_DISMISS_DISTANCE_THRESHOLD, DEFAULT_DISMISS_VELOCITY_THRESHOLD,
    DEFAULT_SETTLE_DURATION_MS,
};

use super::sample::DragSample;
use super::velocity::VelocityTracker;

const OPAQUE_TO_CLEAR: [f64; 2] = [1.0, 0.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragState {
    pub phase: DragPhase,
    pub dismiss_progress: f64,
    /// Signed, downward positive, units per second.
    pub vertical_velocity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DragVerdict {
    /// Dismiss the overlay.
    Commit,
    /// Bounce back and stay open.
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DismissThresholds {
    /// Progress, in container heights, that must be exceeded to commit.
    pub distance: f64,
    /// Downward velocity that must be exceeded to commit.
    pub velocity: f64,
    /// Progress range over which the backdrop fades from opaque to clear.
    pub fade_range: [f64; 2],
    pub settle_duration: Duration,
    /// Progress the commit animation heads toward.
    pub overshoot: f64,
}

impl Default for DismissThresholds {
    fn default() -> Self {
        Self {
            distance: DEFAULT_DISMISS_DISTANCE_THRESHOLD,
            velocity: DEFAULT_DISMISS_VELOCITY_THRESHOLD,
            fade_range: DEFAULT_BACKDROP_FADE_RANGE,
            settle_duration: Duration::from_millis(DEFAULT_SETTLE_DURATION_MS),
            overshoot: DEFAULT_COMMIT_OVERSHOOT_PROGRESS,
        }
    }
}

impl DismissThresholds {
    pub fn from_config(config: &LightboxConfig) -> Self {
        Self {
            distance: config.dismiss_distance_threshold,
            velocity: config.dismiss_velocity_threshold,
            fade_range: config.backdrop_fade_range,
            settle_duration: config.settle_duration(),
            overshoot: config.commit_overshoot_progress,
        }
    }

    pub fn verdict(&self, dismiss_progress: f64, vertical_velocity: f64) -> DragVerdict {
        if dismiss_progress > self.distance || vertical_velocity > self.velocity {
            DragVerdict::Commit
        } else {
            DragVerdict::Cancel
        }
    }

    pub fn backdrop_opacity(&self, dismiss_progress: f64) -> f64 {
        interpolate_clamped(dismiss_progress, self.fade_range, OPAQUE_TO_CLEAR)
    }
}

/// Turns a vertical drag on a carousel item into dismissal progress and a verdict.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    thresholds: DismissThresholds,
    state: DragState,
    /// Suppresses the click that follows a drag release.
    is_dragging: bool,
    tracker: VelocityTracker,
    settle: Option<Tween>,
}

impl DragController {
    pub fn new(thresholds: DismissThresholds) -> Self {
        Self {
            thresholds,
            ..Self::default()
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn phase(&self) -> DragPhase {
        self.state.phase
    }

    pub fn dismiss_progress(&self) -> f64 {
        self.state.dismiss_progress
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    pub fn is_settling(&self) -> bool {
        self.settle.is_some()
    }

    pub fn backdrop_opacity(&self) -> f64 {
        self.thresholds.backdrop_opacity(self.state.dismiss_progress)
    }

    pub fn start(&mut self, sample: &DragSample) {
        if self.state.phase == DragPhase::Dragging {
            tracing::debug!("drag restarted before previous drag ended");
        }
        self.settle = None;
        self.tracker.reset();
        self.state = DragState {
            phase: DragPhase::Dragging,
            ..DragState::default()
        };
        self.is_dragging = true;
        self.tracker.add_sample(sample.at, sample.offset.y);
        self.apply_progress(sample);
    }

    /// Returns the current progress; samples outside a drag are ignored.
    pub fn update(&mut self, sample: &DragSample) -> f64 {
        if self.state.phase != DragPhase::Dragging {
            tracing::trace!("drag move without an active drag ignored");
            return self.state.dismiss_progress;
        }
        self.tracker.add_sample(sample.at, sample.offset.y);
        self.apply_progress(sample);
        self.state.dismiss_progress
    }

    /// Finish the drag and start the matching settle animation.
    ///
    /// The click-suppression flag stays raised; the owner releases it on the
    /// next scheduler tick via [`DragController::release_drag_flag`].
    pub fn end(&mut self, sample: &DragSample) -> Option<DragVerdict> {
        if self.state.phase != DragPhase::Dragging {
            tracing::debug!("drag end without an active drag ignored");
            return None;
        }
        self.tracker.add_sample(sample.at, sample.offset.y);
        self.apply_progress(sample);

        let velocity = sample
            .velocity
            .map(|velocity| velocity.y)
            .filter(|velocity| velocity.is_finite())
            .unwrap_or_else(|| self.tracker.velocity());
        self.state.vertical_velocity = velocity;
        self.state.phase = DragPhase::Idle;

        let progress = self.state.dismiss_progress;
        let verdict = self.thresholds.verdict(progress, velocity);
        let target = match verdict {
            DragVerdict::Commit => self.thresholds.overshoot,
            DragVerdict::Cancel => 0.0,
        };
        self.settle = Some(Tween::new(
            progress,
            target,
            sample.at,
            self.thresholds.settle_duration,
        ));
        tracing::debug!(progress, velocity, ?verdict, "drag ended");
        Some(verdict)
    }

    pub fn release_drag_flag(&mut self) {
        self.is_dragging = false;
    }

    /// Step the settle animation; returns whether it is still running.
    pub fn advance(&mut self, now: Instant) -> bool {
        let Some(tween) = self.settle else {
            return false;
        };
        self.state.dismiss_progress = tween.value_at(now);
        if tween.is_finished(now) {
            self.settle = None;
            return false;
        }
        true
    }

    fn apply_progress(&mut self, sample: &DragSample) {
        match sample.dismiss_progress() {
            Some(progress) => self.state.dismiss_progress = progress,
            None => tracing::trace!(
                height = sample.container_height,
                "drag sample without a usable container height ignored"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector;

    fn dragged(controller: &mut DragController, start: Instant) {
        controller.start(&DragSample::vertical(0.0, 500.0, start));
    }

    #[test]
    fn verdict_table_matches_distance_and_velocity_thresholds() {
        let thresholds = DismissThresholds::default();
        assert_eq!(thresholds.verdict(0.5, 0.0), DragVerdict::Cancel);
        assert_eq!(thresholds.verdict(0.1, 600.0), DragVerdict::Commit);
        assert_eq!(thresholds.verdict(3.5, 0.0), DragVerdict::Commit);
        assert_eq!(thresholds.verdict(3.0, 500.0), DragVerdict::Cancel);
        assert_eq!(thresholds.verdict(0.2, -900.0), DragVerdict::Cancel);
    }

    #[test]
    fn start_raises_suppression_flag_and_moves_track_progress() {
        let mut controller = DragController::default();
        let start = Instant::now();
        dragged(&mut controller, start);

        assert_eq!(controller.phase(), DragPhase::Dragging);
        assert!(controller.is_dragging());

        let progress = controller.update(&DragSample::vertical(
            -100.0,
            500.0,
            start + Duration::from_millis(16),
        ));
        assert!((progress - 0.2).abs() < 1e-12);
        assert!((controller.backdrop_opacity() - 0.5).abs() < 1e-12);

        controller.update(&DragSample::vertical(
            400.0,
            500.0,
            start + Duration::from_millis(32),
        ));
        assert_eq!(controller.backdrop_opacity(), 0.0);
    }

    #[test]
    fn zero_height_samples_leave_progress_untouched() {
        let mut controller = DragController::default();
        let start = Instant::now();
        controller.start(&DragSample::vertical(0.0, 0.0, start));
        assert_eq!(controller.dismiss_progress(), 0.0);

        controller.update(&DragSample::vertical(
            120.0,
            0.0,
            start + Duration::from_millis(16),
        ));
        assert_eq!(controller.dismiss_progress(), 0.0);

        controller.update(&DragSample::vertical(
            120.0,
            600.0,
            start + Duration::from_millis(32),
        ));
        assert!((controller.dismiss_progress() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn cancelled_drag_bounces_back_to_zero() {
        let mut controller = DragController::default();
        let start = Instant::now();
        dragged(&mut controller, start);

        let end_at = start + Duration::from_millis(300);
        let verdict = controller.end(
            &DragSample::vertical(250.0, 500.0, end_at).with_velocity(Vector::ZERO),
        );
        assert_eq!(verdict, Some(DragVerdict::Cancel));
        assert_eq!(controller.phase(), DragPhase::Idle);
        assert!(controller.is_dragging());
        assert!(controller.is_settling());

        assert!(controller.advance(end_at + Duration::from_millis(250)));
        assert!((controller.dismiss_progress() - 0.25).abs() < 1e-9);
        assert!(!controller.advance(end_at + Duration::from_millis(500)));
        assert_eq!(controller.dismiss_progress(), 0.0);
        assert!(!controller.is_settling());

        controller.release_drag_flag();
        assert!(!controller.is_dragging());
    }

    #[test]
    fn fast_flick_commits_toward_overshoot() {
        let mut controller = DragController::default();
        let start = Instant::now();
        dragged(&mut controller, start);

        let end_at = start + Duration::from_millis(80);
        let verdict = controller.end(
            &DragSample::vertical(50.0, 500.0, end_at).with_velocity(Vector::new(0.0, 600.0)),
        );
        assert_eq!(verdict, Some(DragVerdict::Commit));
        assert_eq!(controller.state().vertical_velocity, 600.0);

        controller.advance(end_at + Duration::from_secs(1));
        assert_eq!(controller.dismiss_progress(), DEFAULT_COMMIT_OVERSHOOT_PROGRESS);
    }

    #[test]
    fn missing_velocity_is_estimated_from_move_history() {
        let mut controller = DragController::default();
        let start = Instant::now();
        dragged(&mut controller, start);
        for step in 1..=4u64 {
            controller.update(&DragSample::vertical(
                step as f64 * 10.0,
                800.0,
                start + Duration::from_millis(step * 10),
            ));
        }

        let verdict = controller.end(&DragSample::vertical(
            50.0,
            800.0,
            start + Duration::from_millis(50),
        ));
        assert_eq!(verdict, Some(DragVerdict::Commit));
        assert!((controller.state().vertical_velocity - 1000.0).abs() < 1.0);
    }

    #[test]
    fn moves_and_ends_outside_a_drag_are_ignored() {
        let mut controller = DragController::default();
        let now = Instant::now();
        assert_eq!(controller.update(&DragSample::vertical(300.0, 500.0, now)), 0.0);
        assert_eq!(controller.end(&DragSample::vertical(300.0, 500.0, now)), None);
        assert!(!controller.is_dragging());
    }

    #[test]
    fn new_drag_cancels_running_settle_animation() {
        let mut controller = DragController::default();
        let start = Instant::now();
        dragged(&mut controller, start);
        controller.end(&DragSample::vertical(200.0, 500.0, start).with_velocity(Vector::ZERO));
        assert!(controller.is_settling());

        controller.start(&DragSample::vertical(0.0, 500.0, start + Duration::from_millis(100)));
        assert!(!controller.is_settling());
        assert_eq!(controller.state().vertical_velocity, 0.0);
        assert!(!controller.advance(start + Duration::from_millis(600)));
        assert_eq!(controller.dismiss_progress(), 0.0);
    }

    #[test]
    fn custom_thresholds_change_the_verdict() {
        let thresholds = DismissThresholds {
            distance: 0.3,
            velocity: 2_000.0,
            ..DismissThresholds::default()
        };
        let mut controller = DragController::new(thresholds);
        let start = Instant::now();
        dragged(&mut controller, start);
        let verdict = controller.end(
            &DragSample::vertical(200.0, 500.0, start + Duration::from_millis(200))
                .with_velocity(Vector::new(0.0, 900.0)),
        );
        assert_eq!(verdict, Some(DragVerdict::Commit));
    }
}
