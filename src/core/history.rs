//! State transition history tracking.
//!
//! Provides immutable tracking of the messages a machine accepted over time.
//! Histories are filled by [`HistoryListener`](crate::engine::HistoryListener).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single accepted message.
///
/// `from == to` for internal transitions and deferred messages.
///
/// # Example
///
/// ```rust
/// use statecraft::core::StateTransition;
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: "Locked",
///     to: "Unlocked",
///     event: "coin",
///     timestamp: Utc::now(),
/// };
/// assert!(transition.changed_state());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition<S, E> {
    /// The state the message was delivered to
    pub from: S,
    /// The state the machine was in after processing
    pub to: S,
    /// The event that was accepted
    pub event: E,
    /// When the message was accepted
    pub timestamp: DateTime<Utc>,
}

impl<S: PartialEq, E> StateTransition<S, E> {
    pub fn changed_state(&self) -> bool {
        self.from != self.to
    }
}

/// Ordered history of accepted messages.
///
/// History is immutable - the `record` method returns a new history
/// with the transition added.
///
/// # Example
///
/// ```rust
/// use statecraft::core::{StateHistory, StateTransition};
/// use chrono::Utc;
///
/// let history = StateHistory::new()
///     .record(StateTransition { from: "S1", to: "S2", event: "E1", timestamp: Utc::now() })
///     .record(StateTransition { from: "S2", to: "S3", event: "E1", timestamp: Utc::now() });
///
/// assert_eq!(history.get_path(), vec![&"S1", &"S2", &"S3"]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateHistory<S, E> {
    transitions: Vec<StateTransition<S, E>>,
}

impl<S: Clone, E: Clone> Default for StateHistory<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone, E: Clone> StateHistory<S, E> {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// The existing history is left untouched.
    pub fn record(&self, transition: StateTransition<S, E>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` state of the first record followed by the `to`
    /// state of every record, so internal transitions and deferrals show up
    /// as repeated entries.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Duration between the first and last record, `None` if empty.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    pub fn transitions(&self) -> &[StateTransition<S, E>] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
    enum TestState {
        Initial,
        Processing,
        Complete,
    }

    #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
    enum TestEvent {
        Begin,
        Finish,
    }

    fn transition(from: TestState, to: TestState, event: TestEvent) -> StateTransition<TestState, TestEvent> {
        StateTransition {
            from,
            to,
            event,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history: StateHistory<TestState, TestEvent> = StateHistory::new();
        assert!(history.is_empty());
        assert!(history.get_path().is_empty());
        assert!(history.duration().is_none());
    }

    #[test]
    fn record_is_immutable() {
        let history = StateHistory::new();

        let new_history = history.record(transition(
            TestState::Initial,
            TestState::Processing,
            TestEvent::Begin,
        ));

        assert_eq!(history.len(), 0);
        assert_eq!(new_history.len(), 1);
    }

    #[test]
    fn get_path_returns_state_sequence() {
        let history = StateHistory::new()
            .record(transition(TestState::Initial, TestState::Processing, TestEvent::Begin))
            .record(transition(TestState::Processing, TestState::Complete, TestEvent::Finish));

        let path = history.get_path();
        assert_eq!(path.len(), 3);
        assert_eq!(path[0], &TestState::Initial);
        assert_eq!(path[1], &TestState::Processing);
        assert_eq!(path[2], &TestState::Complete);
    }

    #[test]
    fn internal_records_do_not_change_state() {
        let record = transition(TestState::Processing, TestState::Processing, TestEvent::Begin);
        assert!(!record.changed_state());
    }

    #[test]
    fn duration_calculates_elapsed_time() {
        let start = Utc::now();
        let history = StateHistory::new()
            .record(StateTransition {
                from: TestState::Initial,
                to: TestState::Processing,
                event: TestEvent::Begin,
                timestamp: start,
            })
            .record(StateTransition {
                from: TestState::Processing,
                to: TestState::Complete,
                event: TestEvent::Finish,
                timestamp: start + chrono::Duration::milliseconds(10),
            });

        assert_eq!(history.duration(), Some(Duration::from_millis(10)));
    }

    #[test]
    fn history_serializes_correctly() {
        let history = StateHistory::new()
            .record(transition(TestState::Initial, TestState::Processing, TestEvent::Begin));

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: StateHistory<TestState, TestEvent> = serde_json::from_str(&json).unwrap();

        assert_eq!(history.len(), deserialized.len());
        assert_eq!(history.get_path(), deserialized.get_path());
    }
}
