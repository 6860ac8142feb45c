use super::error::{StateError, StateResult};
use super::{event::StateTransition, OverlayEvent, OverlayState};

/// Upper bound on remembered transitions; oldest entries are dropped first.
const HISTORY_LIMIT: usize = 64;

#[derive(Debug)]
pub struct StateMachine {
    state: OverlayState,
    transition_history: Vec<StateTransition>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: OverlayState::default(),
            transition_history: Vec::new(),
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn can_transition(&self, event: OverlayEvent) -> bool {
        self.next_state(event).is_some()
    }

    pub fn next_state(&self, event: OverlayEvent) -> Option<OverlayState> {
        match (self.state, event) {
            (OverlayState::Closed, OverlayEvent::Open) => Some(OverlayState::Open),
            (OverlayState::Open, event) if event.is_close() => Some(OverlayState::Closed),
            _ => None,
        }
    }

    pub fn transition(&mut self, event: OverlayEvent) -> StateResult<OverlayState> {
        tracing::debug!(from = ?self.state, event = ?event, "request overlay transition");
        let next = self.next_state(event).ok_or_else(|| {
            let from = self.state;
            tracing::warn!(from = ?from, event = ?event, "invalid overlay transition requested");
            StateError::InvalidStateTransition { from, event }
        })?;

        let record = StateTransition::new(Some(self.state), event, next);
        self.state = next;
        if self.transition_history.len() == HISTORY_LIMIT {
            self.transition_history.remove(0);
        }
        self.transition_history.push(record);

        Ok(self.state)
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.transition_history
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OverlayState::{:?}", self.state)
    }
}
