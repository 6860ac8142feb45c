use std::collections::VecDeque;
use std::time::Instant;

const HISTORY_SIZE: usize = 20;

/// Only samples this close to the newest one contribute.
const HORIZON_MS: f64 = 100.0;

/// Below `MIN_MOVEMENT` over longer than this, the pointer is treated as resting.
const ASSUME_STOPPED_MS: f64 = 40.0;
const MIN_MOVEMENT: f64 = 2.0;

/// Per-sample weight decay from newest to oldest.
const RECENCY_DECAY: f64 = 0.95;

/// One-axis velocity estimate from timestamped positions, in units per second.
#[derive(Debug, Clone, Default)]
pub struct VelocityTracker {
    samples: VecDeque<(Instant, f64)>,
}

impl VelocityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sample(&mut self, at: Instant, position: f64) {
        if self.samples.len() == HISTORY_SIZE {
            self.samples.pop_front();
        }
        self.samples.push_back((at, position));
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }

    pub fn velocity(&self) -> f64 {
        let Some(&(newest_at, newest_position)) = self.samples.back() else {
            return 0.0;
        };

        // (age in ms going backwards, position), newest first
        let window: Vec<(f64, f64)> = self
            .samples
            .iter()
            .rev()
            .map(|&(at, position)| {
                let age_ms = newest_at.saturating_duration_since(at).as_secs_f64() * 1000.0;
                (age_ms, position)
            })
            .take_while(|&(age_ms, _)| age_ms <= HORIZON_MS)
            .collect();

        if window.len() < 2 {
            return 0.0;
        }

        if let Some(&(oldest_age_ms, oldest_position)) = window.last() {
            let movement = (newest_position - oldest_position).abs();
            if oldest_age_ms > ASSUME_STOPPED_MS && movement < MIN_MOVEMENT {
                return 0.0;
            }
        }

        let (mut sum_w, mut sum_t, mut sum_x, mut sum_tt, mut sum_tx) = (0.0, 0.0, 0.0, 0.0, 0.0);
        let mut weight = 1.0;
        for &(age_ms, position) in &window {
            let t = -age_ms;
            sum_w += weight;
            sum_t += weight * t;
            sum_x += weight * position;
            sum_tt += weight * t * t;
            sum_tx += weight * t * position;
            weight *= RECENCY_DECAY;
        }

        let denominator = sum_w * sum_tt - sum_t * sum_t;
        if denominator.abs() < f64::EPSILON {
            return 0.0;
        }
        let per_ms = (sum_w * sum_tx - sum_t * sum_x) / denominator;
        per_ms * 1000.0
    }
}
