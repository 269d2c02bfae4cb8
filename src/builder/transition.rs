//! Fluent configuration of declared transitions.
//!
//! A transition is registered as soon as it is defined; whatever the
//! configurer leaves unset is reported by `build`.

use super::config::{MachineConfig, TransitionDecl};
use crate::core::{
    transition_action, ActionResult, EventId, Guard, MachineDetails, Message, StateId,
    TransitionAction,
};
use std::marker::PhantomData;

/// Marker for configurers of external transitions.
pub struct External;

/// Marker for configurers of internal transitions.
pub struct Internal;

/// Configures one declared transition.
///
/// Use it through [`ExternalTransitionConfigurer`] or
/// [`InternalTransitionConfigurer`]; only external transitions accept a
/// target.
pub struct TransitionConfigurer<'a, S: StateId, E: EventId, K> {
    config: &'a mut MachineConfig<S, E>,
    slot: usize,
    _kind: PhantomData<K>,
}

pub type ExternalTransitionConfigurer<'a, S, E> = TransitionConfigurer<'a, S, E, External>;
pub type InternalTransitionConfigurer<'a, S, E> = TransitionConfigurer<'a, S, E, Internal>;

impl<'a, S: StateId, E: EventId, K> TransitionConfigurer<'a, S, E, K> {
    pub(crate) fn new(config: &'a mut MachineConfig<S, E>, slot: usize) -> Self {
        Self {
            config,
            slot,
            _kind: PhantomData,
        }
    }

    /// Set the triggering event.
    pub fn by(mut self, event: E) -> Self {
        self.decl().event = Some(event);
        self
    }

    /// Set the guard, replacing any guard set before.
    pub fn guarded_by(mut self, guard: Guard<S, E>) -> Self {
        self.decl().guard = Some(guard);
        self
    }

    /// Set the guard from a closure.
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&Message<E>, &MachineDetails<'_, S>) -> bool + Send + Sync + 'static,
    {
        self.guarded_by(Guard::new(predicate))
    }

    /// Add an action run while the transition fires.
    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: Fn(&Message<E>, &mut MachineDetails<'_, S>) -> ActionResult + Send + Sync + 'static,
    {
        self.decl().actions.push(transition_action(action));
        self
    }

    pub fn with_actions(mut self, actions: impl IntoIterator<Item = TransitionAction<S, E>>) -> Self {
        self.decl().actions.extend(actions);
        self
    }

    fn decl(&mut self) -> &mut TransitionDecl<S, E> {
        &mut self.config.transitions[self.slot]
    }
}

impl<S: StateId, E: EventId> TransitionConfigurer<'_, S, E, External> {
    /// Set the target state.
    pub fn to(mut self, target: S) -> Self {
        self.decl().target = Some(target);
        self
    }
}
