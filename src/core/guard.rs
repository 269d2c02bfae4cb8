//! Guard predicates for controlling transitions.
//!
//! Guards are pure boolean functions that decide whether a transition may
//! fire for a given message. They see the machine through a shared
//! [`MachineDetails`] reference, so they can read the context but never
//! write to it.

use super::details::MachineDetails;
use super::message::Message;
use super::state::{EventId, StateId};
use std::fmt;
use std::sync::Arc;

type Predicate<S, E> = dyn Fn(&Message<E>, &MachineDetails<'_, S>) -> bool + Send + Sync;

/// Pure predicate that determines if a transition can fire.
///
/// Cloning a guard is cheap; clones share the same predicate.
///
/// # Example
///
/// ```rust
/// use statecraft::core::{consider_all, Guard};
///
/// let has_payload: Guard<&'static str, &'static str> = Guard::new(|message, _| message.payload().is_some());
/// let paid: Guard<&'static str, &'static str> = Guard::new(|_, details| {
///     details.context().get::<bool>("paid").copied().unwrap_or(false)
/// });
///
/// let ready = consider_all([has_payload, paid]);
/// # let _ = ready;
/// ```
pub struct Guard<S: StateId, E: EventId> {
    predicate: Arc<Predicate<S, E>>,
}

impl<S: StateId, E: EventId> Guard<S, E> {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be deterministic and free of side effects.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Message<E>, &MachineDetails<'_, S>) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    /// Guard that always passes.
    pub fn always() -> Self {
        Self::new(|_, _| true)
    }

    /// Guard that never passes.
    pub fn never() -> Self {
        Self::new(|_, _| false)
    }

    /// Evaluate the guard for `message`.
    pub fn evaluate(&self, message: &Message<E>, details: &MachineDetails<'_, S>) -> bool {
        (self.predicate)(message, details)
    }

    /// Guard passing exactly when this one fails.
    pub fn negate(self) -> Self {
        Self::new(move |message, details| !self.evaluate(message, details))
    }
}

impl<S: StateId, E: EventId> Clone for Guard<S, E> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<S: StateId, E: EventId> fmt::Debug for Guard<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard")
    }
}

/// Guard passing iff every guard passes. No guards at all means it passes.
pub fn consider_all<S, E, I>(guards: I) -> Guard<S, E>
where
    S: StateId,
    E: EventId,
    I: IntoIterator<Item = Guard<S, E>>,
{
    let guards: Vec<Guard<S, E>> = guards.into_iter().collect();
    Guard::new(move |message, details| guards.iter().all(|g| g.evaluate(message, details)))
}

/// Guard passing iff at least one guard passes. No guards at all means it fails.
pub fn consider_any<S, E, I>(guards: I) -> Guard<S, E>
where
    S: StateId,
    E: EventId,
    I: IntoIterator<Item = Guard<S, E>>,
{
    let guards: Vec<Guard<S, E>> = guards.into_iter().collect();
    Guard::new(move |message, details| guards.iter().any(|g| g.evaluate(message, details)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Context;

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestState {
        Idle,
    }

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestEvent {
        Go,
        Stop,
    }

    fn check(guard: &Guard<TestState, TestEvent>, event: TestEvent) -> bool {
        let mut context = Context::new();
        let details = MachineDetails::new(&TestState::Idle, true, &mut context);
        guard.evaluate(&Message::new(event), &details)
    }

    #[test]
    fn guard_sees_message_event() {
        let guard = Guard::new(|m: &Message<TestEvent>, _: &MachineDetails<'_, TestState>| {
            *m.event() == TestEvent::Go
        });

        assert!(check(&guard, TestEvent::Go));
        assert!(!check(&guard, TestEvent::Stop));
    }

    #[test]
    fn guard_reads_context() {
        let guard: Guard<TestState, TestEvent> =
            Guard::new(|_, details| details.context().contains_key("token"));

        let mut context = Context::new();
        context.set_value("token", "abc");
        let details = MachineDetails::new(&TestState::Idle, true, &mut context);

        assert!(guard.evaluate(&Message::new(TestEvent::Go), &details));
        assert!(!check(&guard, TestEvent::Go));
    }

    #[test]
    fn negate_inverts_result() {
        assert!(!check(&Guard::always().negate(), TestEvent::Go));
        assert!(check(&Guard::never().negate(), TestEvent::Go));
    }

    #[test]
    fn consider_all_requires_every_guard() {
        assert!(check(&consider_all([Guard::always(), Guard::always()]), TestEvent::Go));
        assert!(!check(&consider_all([Guard::always(), Guard::never()]), TestEvent::Go));
    }

    #[test]
    fn consider_any_requires_one_guard() {
        assert!(check(&consider_any([Guard::never(), Guard::always()]), TestEvent::Go));
        assert!(!check(&consider_any([Guard::never(), Guard::never()]), TestEvent::Go));
    }

    #[test]
    fn empty_compositions_use_identity_values() {
        let none: Vec<Guard<TestState, TestEvent>> = Vec::new();

        assert!(check(&consider_all(none.clone()), TestEvent::Go));
        assert!(!check(&consider_any(none), TestEvent::Go));
    }

    #[test]
    fn clones_share_predicate() {
        let guard = Guard::new(|m: &Message<TestEvent>, _: &MachineDetails<'_, TestState>| {
            *m.event() == TestEvent::Stop
        });
        let cloned = guard.clone();

        assert_eq!(check(&guard, TestEvent::Stop), check(&cloned, TestEvent::Stop));
    }
}
