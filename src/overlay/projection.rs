use serde::Serialize;

use crate::carousel::CarouselMode;

/// Axes a carousel item may be dragged along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DragAxis {
    Vertical,
    Free,
}

impl From<CarouselMode> for DragAxis {
    fn from(mode: CarouselMode) -> Self {
        match mode {
            CarouselMode::Paged => DragAxis::Vertical,
            CarouselMode::Single => DragAxis::Free,
        }
    }
}

/// Read-only render state published by the overlay controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub is_open: bool,
    /// Open and the container has a positive width.
    pub renderable: bool,
    pub active_index: Option<usize>,
    pub active_identity: Option<String>,
    pub source_identity: Option<String>,
    pub item_count: usize,
    pub dismiss_progress: f64,
    pub backdrop_opacity: f64,
    pub backdrop_color: [u8; 3],
    pub drag_axis: Option<DragAxis>,
    pub is_dragging: bool,
}

impl Projection {
    pub(crate) fn closed(backdrop_color: [u8; 3]) -> Self {
        Self {
            is_open: false,
            renderable: false,
            active_index: None,
            active_identity: None,
            source_identity: None,
            item_count: 0,
            dismiss_progress: 0.0,
            backdrop_opacity: 0.0,
            backdrop_color,
            drag_axis: None,
            is_dragging: false,
        }
    }
}
