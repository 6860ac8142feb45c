use std::time::Instant;

use crate::geometry::Vector;

/// One pointer-drag sample as delivered by the platform gesture recognizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSample {
    /// Offset from the drag origin; `y` grows downward.
    pub offset: Vector,
    /// Recognizer-reported velocity in units per second, when available.
    pub velocity: Option<Vector>,
    /// Height of the carousel container at the time of the sample.
    pub container_height: f64,
    pub at: Instant,
}

impl DragSample {
    pub fn new(offset: Vector, container_height: f64, at: Instant) -> Self {
        Self {
            offset,
            velocity: None,
            container_height,
            at,
        }
    }

    pub fn vertical(offset_y: f64, container_height: f64, at: Instant) -> Self {
        Self::new(Vector::new(0.0, offset_y), container_height, at)
    }

    pub fn with_velocity(mut self, velocity: Vector) -> Self {
        self.velocity = Some(velocity);
        self
    }

    /// `|offset.y| / container_height`, or `None` for an unusable height.
    pub fn dismiss_progress(&self) -> Option<f64> {
        let height = self.container_height;
        if !height.is_finite() || height <= 0.0 || !self.offset.y.is_finite() {
            return None;
        }
        Some((self.offset.y / height).abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dismiss_progress_is_unsigned_ratio_of_height() {
        let now = Instant::now();
        assert_eq!(DragSample::vertical(200.0, 500.0, now).dismiss_progress(), Some(0.4));
        assert_eq!(DragSample::vertical(-250.0, 500.0, now).dismiss_progress(), Some(0.5));
        assert_eq!(DragSample::vertical(2_000.0, 500.0, now).dismiss_progress(), Some(4.0));
    }

    #[test]
    fn unusable_height_has_no_progress() {
        let now = Instant::now();
        assert_eq!(DragSample::vertical(200.0, 0.0, now).dismiss_progress(), None);
        assert_eq!(DragSample::vertical(200.0, -5.0, now).dismiss_progress(), None);
        assert_eq!(DragSample::vertical(200.0, f64::NAN, now).dismiss_progress(), None);
    }
}
