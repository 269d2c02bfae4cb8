//! Transitions: immutable edges of a built state machine.

use crate::core::{
    ActionResult, EventId, Guard, MachineDetails, Message, StateId, TransitionAction,
};
use std::fmt;

/// Whether a transition leaves its source state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// Runs the source's exit actions and the target's entry actions.
    External,
    /// Runs only the transition's own actions; the state does not change.
    Internal,
}

/// One edge of the state graph.
///
/// Owned by its source [`State`](super::State) and indexed there by event.
pub struct Transition<S: StateId, E: EventId> {
    pub(crate) source: S,
    pub(crate) target: Option<S>,
    pub(crate) event: E,
    pub(crate) guard: Option<Guard<S, E>>,
    pub(crate) actions: Vec<TransitionAction<S, E>>,
    pub(crate) kind: TransitionKind,
}

impl<S: StateId, E: EventId> Transition<S, E> {
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Target state; always present for external transitions, absent for
    /// internal ones.
    pub fn target(&self) -> Option<&S> {
        self.target.as_ref()
    }

    pub fn event(&self) -> &E {
        &self.event
    }

    pub fn guard(&self) -> Option<&Guard<S, E>> {
        self.guard.as_ref()
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    pub fn is_external(&self) -> bool {
        self.kind == TransitionKind::External
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Check whether this transition may fire for `message` (pure).
    pub fn can_fire(&self, message: &Message<E>, details: &MachineDetails<'_, S>) -> bool {
        if *message.event() != self.event {
            return false;
        }

        self.guard
            .as_ref()
            .is_none_or(|g| g.evaluate(message, details))
    }

    /// Run the actions in declaration order, stopping at the first failure.
    pub(crate) fn execute(
        &self,
        message: &Message<E>,
        details: &mut MachineDetails<'_, S>,
    ) -> ActionResult {
        for action in &self.actions {
            action(message, details)?;
        }
        Ok(())
    }
}

impl<S: StateId, E: EventId> Clone for Transition<S, E> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            target: self.target.clone(),
            event: self.event.clone(),
            guard: self.guard.clone(),
            actions: self.actions.clone(),
            kind: self.kind,
        }
    }
}

impl<S: StateId, E: EventId> fmt::Debug for Transition<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("kind", &self.kind)
            .field("source", &self.source)
            .field("target", &self.target)
            .field("event", &self.event)
            .field("guarded", &self.guard.is_some())
            .field("actions", &self.actions.len())
            .finish()
    }
}
