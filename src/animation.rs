use std::time::{Duration, Instant};

/// Linear interpolation of a scalar between two values over a fixed duration.
///
/// Driven by the caller's frame clock: nothing advances until `value_at` is
/// sampled with a later instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    from: f64,
    to: f64,
    started_at: Instant,
    duration: Duration,
}

impl Tween {
    pub fn new(from: f64, to: f64, started_at: Instant, duration: Duration) -> Self {
        Self {
            from,
            to,
            started_at,
            duration,
        }
    }

    pub fn target(&self) -> f64 {
        self.to
    }

    pub fn fraction_at(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn value_at(&self, now: Instant) -> f64 {
        let fraction = self.fraction_at(now);
        if fraction >= 1.0 {
            return self.to;
        }
        self.from + (self.to - self.from) * fraction
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.fraction_at(now) >= 1.0
    }
}

/// Map `value` from `input` to `output` linearly, clamping outside the input range.
pub fn interpolate_clamped(value: f64, input: [f64; 2], output: [f64; 2]) -> f64 {
    let [in_start, in_end] = input;
    let [out_start, out_end] = output;
    if !value.is_finite() || in_end == in_start {
        return out_start;
    }
    let t = ((value - in_start) / (in_end - in_start)).clamp(0.0, 1.0);
    out_start + (out_end - out_start) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tween_interpolates_and_settles_on_target() {
        let start = Instant::now();
        let tween = Tween::new(0.4, 0.0, start, Duration::from_millis(500));

        assert_eq!(tween.value_at(start), 0.4);
        assert!((tween.value_at(start + Duration::from_millis(250)) - 0.2).abs() < 1e-9);
        assert!(!tween.is_finished(start + Duration::from_millis(499)));
        assert_eq!(tween.value_at(start + Duration::from_millis(500)), 0.0);
        assert!(tween.is_finished(start + Duration::from_secs(2)));
    }

    #[test]
    fn zero_duration_tween_is_immediately_finished() {
        let start = Instant::now();
        let tween = Tween::new(0.0, 1.0, start, Duration::ZERO);
        assert!(tween.is_finished(start));
        assert_eq!(tween.value_at(start), 1.0);
    }

    #[test]
    fn interpolate_clamped_maps_fade_range_to_opacity() {
        let range = [0.0, 0.4];
        let opacity = [1.0, 0.0];
        assert_eq!(interpolate_clamped(0.0, range, opacity), 1.0);
        assert!((interpolate_clamped(0.2, range, opacity) - 0.5).abs() < 1e-12);
        assert_eq!(interpolate_clamped(0.4, range, opacity), 0.0);
        assert_eq!(interpolate_clamped(3.0, range, opacity), 0.0);
        assert_eq!(interpolate_clamped(-1.0, range, opacity), 1.0);
        assert_eq!(interpolate_clamped(f64::NAN, range, opacity), 1.0);
    }
}
