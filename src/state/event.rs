use super::model::OverlayState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayEvent {
    /// Thumbnail tapped.
    Open,
    /// Drag-to-dismiss committed.
    DragCommit,
    /// Backdrop tap or platform back request.
    RequestClose,
    /// Deferred close from a plain tap on a carousel item.
    TapClose,
    /// Close issued by the embedding application.
    ProgrammaticClose,
}

impl OverlayEvent {
    pub const fn is_close(self) -> bool {
        !matches!(self, OverlayEvent::Open)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    pub from: Option<OverlayState>,
    pub event: OverlayEvent,
    pub to: OverlayState,
}

impl StateTransition {
    pub const fn new(from: Option<OverlayState>, event: OverlayEvent, to: OverlayState) -> Self {
        Self { from, event, to }
    }
}
