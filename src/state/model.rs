#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayState {
    #[default]
    Closed,
    Open,
}

impl OverlayState {
    pub const fn is_open(self) -> bool {
        matches!(self, OverlayState::Open)
    }
}
