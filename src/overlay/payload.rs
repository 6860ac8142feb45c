/// What the overlay was opened with; exists only while it is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerPayload {
    pub source_identity: String,
    pub initial_index: usize,
}

impl ViewerPayload {
    pub fn new(source_identity: impl Into<String>, initial_index: usize) -> Self {
        Self {
            source_identity: source_identity.into(),
            initial_index,
        }
    }
}
