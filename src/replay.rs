//! Scripted playback of user interactions against a headless lightbox.
//!
//! A scenario lists the gallery items, the viewport and a sequence of steps.
//! Every step is followed by a layout pass, the same way a UI re-renders after
//! each event, and the resulting projection is recorded.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::LightboxConfig;
use crate::error::LightboxResult;
use crate::geometry::{Size, Vector};
use crate::gesture::{DragSample, DragVerdict};
use crate::overlay::{Lightbox, Projection};
use crate::platform::{HeadlessContainer, HeadlessObserver, ScrollContainer};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl From<Viewport> for Size {
    fn from(viewport: Viewport) -> Self {
        Size::new(viewport.width, viewport.height)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Scenario {
    pub items: Vec<String>,
    /// Missing until the first `resize` step when omitted.
    #[serde(default)]
    pub viewport: Option<Viewport>,
    /// Overrides the user configuration file when present.
    #[serde(default)]
    pub config: Option<LightboxConfig>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Open {
        identity: String,
        index: usize,
    },
    Close,
    RequestClose,
    Resize {
        width: f64,
        height: f64,
    },
    /// User scroll of the carousel followed by an intersection pass.
    Scroll {
        offset: f64,
    },
    DragStart {
        #[serde(default)]
        x: f64,
        y: f64,
    },
    DragMove {
        #[serde(default)]
        x: f64,
        y: f64,
    },
    DragEnd {
        #[serde(default)]
        x: f64,
        y: f64,
        #[serde(default)]
        velocity_y: Option<f64>,
    },
    Tap,
    /// Run tasks deferred to the next tick.
    Tick,
    /// Move the frame clock forward and step animations.
    Advance {
        ms: u64,
    },
    SetThreshold {
        percent: f64,
    },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Open { .. } => "open",
            Step::Close => "close",
            Step::RequestClose => "request_close",
            Step::Resize { .. } => "resize",
            Step::Scroll { .. } => "scroll",
            Step::DragStart { .. } => "drag_start",
            Step::DragMove { .. } => "drag_move",
            Step::DragEnd { .. } => "drag_end",
            Step::Tap => "tap",
            Step::Tick => "tick",
            Step::Advance { .. } => "advance",
            Step::SetThreshold { .. } => "set_threshold",
        }
    }
}

/// Outcome of one step together with the projection rendered after it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub step: usize,
    pub op: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<DragVerdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub projection: Projection,
}

/// A mounted lightbox wired to headless platform backends and a virtual clock.
#[derive(Debug)]
pub struct Replay {
    lightbox: Lightbox,
    container: HeadlessContainer,
    observer: HeadlessObserver,
    origin: Instant,
    elapsed: Duration,
}

impl Replay {
    pub fn new(
        items: Vec<String>,
        viewport: Option<Viewport>,
        config: LightboxConfig,
    ) -> LightboxResult<Self> {
        let container = HeadlessContainer::unmeasured();
        container.resize(viewport.map(Size::from));
        let observer = HeadlessObserver::new();
        let lightbox = Lightbox::builder(items)
            .config(config)
            .container(container.clone())
            .observer(observer.clone())
            .pointer_gestures(true)
            .mount()?;
        Ok(Self {
            lightbox,
            container,
            observer,
            origin: Instant::now(),
            elapsed: Duration::ZERO,
        })
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    fn now(&self) -> Instant {
        self.origin + self.elapsed
    }

    fn sample(&self, x: f64, y: f64) -> DragSample {
        let height = self.container.size().map_or(0.0, |size| size.height);
        DragSample::new(Vector::new(x, y), height, self.now())
    }

    /// Apply `step`, then run a layout pass.
    pub fn apply(&mut self, step: &Step) -> LightboxResult<Option<DragVerdict>> {
        let verdict = self.dispatch(step)?;
        self.lightbox.layout();
        Ok(verdict)
    }

    fn dispatch(&mut self, step: &Step) -> LightboxResult<Option<DragVerdict>> {
        match step {
            Step::Open { identity, index } => {
                let now = self.now();
                self.lightbox.open_at(identity, *index, now)?;
            }
            Step::Close => self.lightbox.close()?,
            Step::RequestClose => self.lightbox.request_close()?,
            Step::Resize { width, height } => {
                self.container.resize(Some(Size::new(*width, *height)));
            }
            Step::Scroll { offset } => {
                self.container.user_scroll_to(*offset);
                match self.container.size() {
                    Some(viewport) if viewport.is_measured() => {
                        let entered = self.observer.emit_for_scroll(viewport, *offset);
                        tracing::debug!(offset, entered, "replayed scroll");
                    }
                    _ => tracing::debug!(offset, "scroll before measurement; no intersections"),
                }
            }
            Step::DragStart { x, y } => {
                let sample = self.sample(*x, *y);
                self.lightbox.drag_start(&sample);
            }
            Step::DragMove { x, y } => {
                let sample = self.sample(*x, *y);
                self.lightbox.drag_move(&sample);
            }
            Step::DragEnd { x, y, velocity_y } => {
                let mut sample = self.sample(*x, *y);
                if let Some(velocity_y) = velocity_y {
                    sample = sample.with_velocity(Vector::new(0.0, *velocity_y));
                }
                return self.lightbox.drag_end(&sample);
            }
            Step::Tap => {
                self.lightbox.tap();
            }
            Step::Tick => {
                self.lightbox.run_pending_tasks()?;
            }
            Step::Advance { ms } => {
                self.elapsed += Duration::from_millis(*ms);
                let now = self.now();
                self.lightbox.advance(now);
            }
            Step::SetThreshold { percent } => self.lightbox.set_visible_threshold(*percent)?,
        }
        Ok(None)
    }
}

/// Play `scenario` to the end. Step failures are recorded and playback
/// continues; only a failed mount aborts.
pub fn run_scenario(scenario: &Scenario, config: LightboxConfig) -> LightboxResult<Vec<StepRecord>> {
    let mut replay = Replay::new(scenario.items.clone(), scenario.viewport, config)?;
    let mut records = Vec::with_capacity(scenario.steps.len());
    for (index, step) in scenario.steps.iter().enumerate() {
        let (verdict, error) = match replay.apply(step) {
            Ok(verdict) => (verdict, None),
            Err(err) => {
                tracing::warn!(step = index, op = step.name(), %err, "replay step failed");
                (None, Some(err.to_string()))
            }
        };
        records.push(StepRecord {
            step: index,
            op: step.name(),
            verdict,
            error,
            projection: replay.lightbox.projection(),
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LightboxError;

    fn parse(json: &str) -> Scenario {
        serde_json::from_str(json).expect("scenario should parse")
    }

    fn quiet_config() -> LightboxConfig {
        LightboxConfig {
            strict_preconditions: Some(true),
            entrance_duration_ms: 0,
            ..LightboxConfig::default()
        }
    }

    #[test]
    fn cancelled_drag_scenario_returns_to_rest() {
        let scenario = parse(
            r#"{
                "items": ["a", "b", "c"],
                "viewport": { "width": 300, "height": 500 },
                "steps": [
                    { "op": "open", "identity": "b", "index": 1 },
                    { "op": "drag_start", "y": 0 },
                    { "op": "advance", "ms": 400 },
                    { "op": "drag_end", "y": 200, "velocity_y": 0 },
                    { "op": "tap" },
                    { "op": "tick" },
                    { "op": "advance", "ms": 500 }
                ]
            }"#,
        );
        let records = run_scenario(&scenario, quiet_config()).expect("replay should run");

        assert_eq!(records.len(), 7);
        assert_eq!(records[0].projection.active_index, Some(1));
        assert_eq!(records[3].verdict, Some(DragVerdict::Cancel));
        assert_eq!(records[3].projection.dismiss_progress, 0.4);
        let last = &records[6].projection;
        assert!(last.is_open);
        assert_eq!(last.active_index, Some(1));
        assert_eq!(last.dismiss_progress, 0.0);
        assert!(!last.is_dragging);
    }

    #[test]
    fn scroll_then_tap_closes_from_new_item() {
        let scenario = parse(
            r#"{
                "items": ["a", "b", "c"],
                "steps": [
                    { "op": "open", "identity": "a", "index": 0 },
                    { "op": "resize", "width": 300, "height": 500 },
                    { "op": "scroll", "offset": 600 },
                    { "op": "tap" },
                    { "op": "tick" }
                ]
            }"#,
        );
        let records = run_scenario(&scenario, quiet_config()).expect("replay should run");

        assert!(!records[0].projection.renderable);
        assert!(records[1].projection.renderable);
        assert_eq!(records[2].projection.active_identity.as_deref(), Some("c"));
        assert!(records[3].projection.is_open);
        assert!(!records[4].projection.is_open);
    }

    #[test]
    fn half_threshold_scroll_activates_page_once_contained() {
        let scenario = parse(
            r#"{
                "items": ["a", "b", "c"],
                "viewport": { "width": 300, "height": 500 },
                "steps": [
                    { "op": "set_threshold", "percent": 50 },
                    { "op": "open", "identity": "a", "index": 0 },
                    { "op": "scroll", "offset": 0 },
                    { "op": "scroll", "offset": 150 },
                    { "op": "scroll", "offset": 300 }
                ]
            }"#,
        );
        let records = run_scenario(&scenario, quiet_config()).expect("replay should run");

        assert!(records.iter().all(|record| record.error.is_none()));
        assert_eq!(records[2].projection.active_index, Some(0));
        assert_eq!(records[3].projection.active_index, Some(0));
        assert_eq!(records[4].projection.active_index, Some(1));
        assert_eq!(records[4].projection.active_identity.as_deref(), Some("b"));
    }

    #[test]
    fn failed_steps_are_recorded_and_playback_continues() {
        let scenario = parse(
            r#"{
                "items": ["a", "b"],
                "viewport": { "width": 300, "height": 500 },
                "steps": [
                    { "op": "close" },
                    { "op": "open", "identity": "a", "index": 0 },
                    { "op": "set_threshold", "percent": 150 }
                ]
            }"#,
        );
        let records = run_scenario(&scenario, quiet_config()).expect("replay should run");

        assert!(records[0]
            .error
            .as_deref()
            .is_some_and(|error| error.contains("already closed")));
        assert!(records[1].error.is_none());
        assert!(records[1].projection.is_open);
        assert!(records[2].error.is_some());
    }

    #[test]
    fn duplicate_items_abort_the_mount() {
        let scenario = parse(r#"{ "items": ["a", "a"], "steps": [] }"#);
        let err = run_scenario(&scenario, quiet_config()).expect_err("mount should fail");
        assert!(matches!(err, LightboxError::Config(_)));
    }

    #[test]
    fn records_serialize_with_lowercase_verdicts() {
        let scenario = parse(
            r#"{
                "items": ["a", "b"],
                "viewport": { "width": 300, "height": 500 },
                "config": { "entrance_duration_ms": 0 },
                "steps": [
                    { "op": "open", "identity": "a", "index": 0 },
                    { "op": "drag_start", "y": 0 },
                    { "op": "drag_end", "y": 40, "velocity_y": 900 }
                ]
            }"#,
        );
        let config = scenario.config.clone().expect("config override present");
        let records = run_scenario(&scenario, config).expect("replay should run");
        let json = serde_json::to_value(&records).expect("records serialize");

        assert_eq!(json[2]["verdict"], "commit");
        assert_eq!(json[2]["projection"]["is_open"], false);
        assert_eq!(json[0]["projection"]["drag_axis"], "vertical");
        assert!(json[0].get("error").is_none());
    }
}
