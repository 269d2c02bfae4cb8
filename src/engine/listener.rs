//! Lifecycle listeners.
//!
//! Listeners observe a machine; they cannot influence it. They are invoked
//! synchronously after the operation they describe has completed.

use crate::core::{EventId, MachineDetails, Message, StateHistory, StateId, StateTransition};
use chrono::Utc;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

/// Observer of a machine's lifecycle.
///
/// Every hook defaults to doing nothing.
pub trait MachineListener<S: StateId, E: EventId>: Send + Sync {
    /// Called after the start actions and the initial state's entry actions ran.
    fn on_start(&self, _details: &MachineDetails<'_, S>) {}

    /// Called after the stop actions ran.
    fn on_stop(&self, _details: &MachineDetails<'_, S>) {}

    /// Called after a message was accepted, including when it was deferred.
    fn on_state_changed(
        &self,
        _message: &Message<E>,
        _previous: &S,
        _details: &MachineDetails<'_, S>,
    ) {
    }

    /// Called when a message was not accepted. `message` is `None` when the
    /// host delivered no message at all.
    fn on_event_not_accepted(
        &self,
        _message: Option<&Message<E>>,
        _details: &MachineDetails<'_, S>,
    ) {
    }
}

/// Handle returned by [`StateMachine::add_listener`](super::StateMachine::add_listener).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

pub(crate) struct ListenerRegistry<S: StateId, E: EventId> {
    listeners: Vec<(ListenerId, Arc<dyn MachineListener<S, E>>)>,
}

impl<S: StateId, E: EventId> ListenerRegistry<S, E> {
    pub(crate) fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, listener: Arc<dyn MachineListener<S, E>>) -> ListenerId {
        let id = ListenerId(Uuid::new_v4());
        self.listeners.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(registered, _)| *registered != id);
        self.listeners.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn notify(&self, mut notify: impl FnMut(&dyn MachineListener<S, E>)) {
        for (_, listener) in &self.listeners {
            notify(listener.as_ref());
        }
    }
}

/// Listener recording every accepted message into a [`StateHistory`].
///
/// Keep a clone of the `Arc` to read the history back.
///
/// # Example
///
/// ```rust
/// use statecraft::builder::StateMachineBuilder;
/// use statecraft::engine::HistoryListener;
/// use std::sync::Arc;
///
/// let mut builder = StateMachineBuilder::new();
/// builder.define_state("S1").unwrap().as_initial().unwrap();
/// builder.define_state("S2").unwrap().as_final().unwrap();
/// builder.define_external_transition_for("S1").to("S2").by("E1");
/// let mut machine = builder.build().unwrap();
///
/// let history = Arc::new(HistoryListener::<&str, &str>::new());
/// machine.add_listener(history.clone());
///
/// machine.start().unwrap();
/// machine.accept("E1").unwrap();
///
/// assert_eq!(history.history().get_path(), vec![&"S1", &"S2"]);
/// ```
pub struct HistoryListener<S: StateId, E: EventId> {
    history: Mutex<StateHistory<S, E>>,
}

impl<S: StateId, E: EventId> HistoryListener<S, E> {
    pub fn new() -> Self {
        Self {
            history: Mutex::new(StateHistory::new()),
        }
    }

    /// Snapshot of the history recorded so far.
    pub fn history(&self) -> StateHistory<S, E> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<S: StateId, E: EventId> Default for HistoryListener<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StateId, E: EventId> MachineListener<S, E> for HistoryListener<S, E> {
    fn on_state_changed(
        &self,
        message: &Message<E>,
        previous: &S,
        details: &MachineDetails<'_, S>,
    ) {
        let transition = StateTransition {
            from: previous.clone(),
            to: details.current_state().clone(),
            event: message.event().clone(),
            timestamp: Utc::now(),
        };
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        *history = history.record(transition);
    }
}
