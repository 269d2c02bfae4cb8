//! Fluent configuration of a single declared state.

use super::config::{MachineConfig, StateDecl};
use super::error::BuildError;
use crate::core::{lifecycle_action, ActionResult, EventId, MachineDetails, StateAction, StateId};
use std::sync::Arc;

/// Returned by [`StateMachineBuilder::define_state`](super::StateMachineBuilder::define_state).
///
/// Actions and deferred events accumulate across calls; actions keep the
/// order in which they were added.
pub struct StateConfigurer<'a, S: StateId, E: EventId> {
    config: &'a mut MachineConfig<S, E>,
    slot: usize,
}

impl<'a, S: StateId, E: EventId> StateConfigurer<'a, S, E> {
    pub(crate) fn new(config: &'a mut MachineConfig<S, E>, slot: usize) -> Self {
        Self { config, slot }
    }

    pub fn id(&self) -> &S {
        &self.config.states[self.slot].id
    }

    /// Mark this state as the initial state.
    ///
    /// Fails if an initial state is already marked, this one included.
    pub fn as_initial(self) -> Result<Self, BuildError<S, E>> {
        self.config.mark_initial(self.slot)?;
        Ok(self)
    }

    /// Mark this state as the final state.
    ///
    /// Reaching the final state stops the machine. Fails if a final state is
    /// already marked, this one included.
    pub fn as_final(self) -> Result<Self, BuildError<S, E>> {
        self.config.mark_final(self.slot)?;
        Ok(self)
    }

    /// Add an action run when the state is entered.
    pub fn on_entry<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut MachineDetails<'_, S>) -> ActionResult + Send + Sync + 'static,
    {
        self.decl().entry_actions.push(lifecycle_action(action));
        self
    }

    /// Add an action run when the state is exited.
    pub fn on_exit<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut MachineDetails<'_, S>) -> ActionResult + Send + Sync + 'static,
    {
        self.decl().exit_actions.push(lifecycle_action(action));
        self
    }

    /// Attach both hooks of a [`StateAction`].
    pub fn with_action<A>(self, action: A) -> Self
    where
        A: StateAction<S> + 'static,
    {
        let enter = Arc::new(action);
        let exit = Arc::clone(&enter);
        self.on_entry(move |details| enter.on_enter(details))
            .on_exit(move |details| exit.on_exit(details))
    }

    /// Hold `event` while in this state instead of processing it.
    pub fn with_deferred_event(mut self, event: E) -> Self {
        self.decl().deferred_events.push(event);
        self
    }

    pub fn with_deferred_events(mut self, events: impl IntoIterator<Item = E>) -> Self {
        self.decl().deferred_events.extend(events);
        self
    }

    fn decl(&mut self) -> &mut StateDecl<S, E> {
        &mut self.config.states[self.slot]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl StateAction<&'static str> for Noop {}

    #[test]
    fn configurer_accumulates_attributes() {
        let mut config: MachineConfig<&'static str, &'static str> = MachineConfig::new();
        let slot = config.add_state("S1").unwrap();

        let configurer = StateConfigurer::new(&mut config, slot)
            .as_initial()
            .unwrap()
            .on_entry(|_| Ok(()))
            .on_exit(|_| Ok(()))
            .with_action(Noop)
            .with_deferred_event("E1")
            .with_deferred_events(["E2", "E3"]);
        assert_eq!(configurer.id(), &"S1");

        let decl = &config.states[slot];
        assert_eq!(decl.entry_actions.len(), 2);
        assert_eq!(decl.exit_actions.len(), 2);
        assert_eq!(decl.deferred_events, vec!["E1", "E2", "E3"]);
        assert_eq!(config.initial, Some(slot));
    }

    #[test]
    fn as_final_reports_conflict() {
        let mut config: MachineConfig<&'static str, &'static str> = MachineConfig::new();
        let first = config.add_state("S1").unwrap();
        let second = config.add_state("S2").unwrap();

        assert!(StateConfigurer::new(&mut config, first).as_final().is_ok());
        let error = StateConfigurer::new(&mut config, second)
            .as_final()
            .err()
            .unwrap();
        assert_eq!(
            error,
            BuildError::FinalStateAlreadyDefined {
                defined: "S1",
                requested: "S2",
            }
        );
    }
}
