//! Request lifecycle state machine.

use std::collections::{HashMap, VecDeque};

use common::RequestId;
use serde::{Deserialize, Serialize};

/// Finished requests whose state stays queryable.
pub const RETAINED_FINISHED_REQUESTS: usize = 256;

/// The state of a dispatched request intent.
///
/// State transitions:
/// ```text
/// Dispatched ──► InFlight ──┬──► Succeeded
///                           └──► Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RequestState {
    /// The intent was accepted but its task has not started.
    #[default]
    Dispatched,

    /// The transport call (or local lookup) is running.
    InFlight,

    /// The payload was merged into the store (terminal state).
    Succeeded,

    /// The error set was replaced (terminal state).
    Failed,
}

impl RequestState {
    /// Returns true if `next` is a legal successor of this state.
    pub fn can_transition_to(&self, next: RequestState) -> bool {
        matches!(
            (self, next),
            (RequestState::Dispatched, RequestState::InFlight)
                | (RequestState::InFlight, RequestState::Succeeded)
                | (RequestState::InFlight, RequestState::Failed)
        )
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestState::Succeeded | RequestState::Failed)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestState::Dispatched => "Dispatched",
            RequestState::InFlight => "InFlight",
            RequestState::Succeeded => "Succeeded",
            RequestState::Failed => "Failed",
        }
    }
}

impl std::fmt::Display for RequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of every live request plus the most recent finished ones.
///
/// Active requests are always tracked; once a request reaches a terminal
/// state it is kept until `capacity` newer requests have finished.
#[derive(Debug)]
pub struct StatusTable {
    states: HashMap<RequestId, RequestState>,
    finished: VecDeque<RequestId>,
    capacity: usize,
}

impl StatusTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            states: HashMap::new(),
            finished: VecDeque::new(),
            capacity,
        }
    }

    pub fn get(&self, request_id: RequestId) -> Option<RequestState> {
        self.states.get(&request_id).copied()
    }

    /// Records `next` and returns the previous state.
    pub fn set(&mut self, request_id: RequestId, next: RequestState) -> Option<RequestState> {
        let previous = self.states.insert(request_id, next);
        let was_terminal = previous.is_some_and(|state| state.is_terminal());
        if next.is_terminal() && !was_terminal {
            self.finished.push_back(request_id);
            while self.finished.len() > self.capacity {
                if let Some(evicted) = self.finished.pop_front() {
                    self.states.remove(&evicted);
                }
            }
        }
        previous
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl Default for StatusTable {
    fn default() -> Self {
        Self::new(RETAINED_FINISHED_REQUESTS)
    }
}
