//! Machine-level start and stop actions.

use super::config::MachineConfig;
use crate::core::{lifecycle_action, ActionResult, EventId, MachineDetails, StateId};

/// Returned by
/// [`StateMachineBuilder::define_start_stop_actions`](super::StateMachineBuilder::define_start_stop_actions).
///
/// Actions accumulate across calls. Start actions see the initial state with
/// the machine not yet running; stop actions see the state the machine
/// stopped in.
pub struct StartStopActionsConfigurer<'a, S: StateId, E: EventId> {
    config: &'a mut MachineConfig<S, E>,
}

impl<'a, S: StateId, E: EventId> StartStopActionsConfigurer<'a, S, E> {
    pub(crate) fn new(config: &'a mut MachineConfig<S, E>) -> Self {
        Self { config }
    }

    pub fn on_start<F>(self, action: F) -> Self
    where
        F: Fn(&mut MachineDetails<'_, S>) -> ActionResult + Send + Sync + 'static,
    {
        self.config.start_actions.push(lifecycle_action(action));
        self
    }

    pub fn on_stop<F>(self, action: F) -> Self
    where
        F: Fn(&mut MachineDetails<'_, S>) -> ActionResult + Send + Sync + 'static,
    {
        self.config.stop_actions.push(lifecycle_action(action));
        self
    }
}
