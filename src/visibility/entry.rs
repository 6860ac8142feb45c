use crate::geometry::Rect;

/// Tolerance for ratios produced by float division at exact containment.
const RATIO_EPSILON: f64 = 1e-9;

/// One intersection report for a tracked carousel item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub bounding_rect: Rect,
    pub root_bounds: Option<Rect>,
    pub intersection_ratio: f64,
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    /// Build the entry a root-scoped observer would report for `target` inside `root`.
    pub fn from_rects(target: Rect, root: Rect) -> Self {
        let target_area = target.area();
        let visible_area = target.intersection(root).map_or(0.0, Rect::area);
        let intersection_ratio = if target_area > 0.0 {
            (visible_area / target_area).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            bounding_rect: target,
            root_bounds: Some(root),
            intersection_ratio,
            is_intersecting: visible_area > 0.0,
        }
    }

    /// The bounding rect lies entirely inside the root bounds.
    pub fn is_contained(&self) -> bool {
        self.root_bounds
            .is_some_and(|root| root.contains_rect(self.bounding_rect))
    }

    pub fn meets_threshold(&self, threshold: f64) -> bool {
        self.is_intersecting && self.intersection_ratio + RATIO_EPSILON >= threshold
    }

    /// Qualifies as an "enter": threshold met and fully contained.
    pub fn qualifies(&self, threshold: f64) -> bool {
        self.meets_threshold(threshold) && self.is_contained()
    }
}
