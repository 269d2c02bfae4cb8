//! Builder for constructing state machines.

use super::config::MachineConfig;
use super::error::BuildError;
use super::start_stop::StartStopActionsConfigurer;
use super::state::StateConfigurer;
use super::transition::{ExternalTransitionConfigurer, InternalTransitionConfigurer};
use super::validation::validate;
use crate::core::{EventId, StateId};
use crate::engine::{StateMachine, TransitionKind};
use tracing::debug;

/// Collects state, transition and action declarations and turns them into a
/// validated [`StateMachine`].
///
/// Declaration-time problems (duplicate states, a second initial or final
/// state) are returned immediately. Everything else is checked by
/// [`build`](Self::build), which reports all problems of the first failing
/// validation stage at once.
///
/// # Example
///
/// ```rust
/// use statecraft::builder::StateMachineBuilder;
///
/// let mut builder = StateMachineBuilder::new();
/// builder
///     .define_state("Locked")
///     .unwrap()
///     .as_initial()
///     .unwrap()
///     .with_deferred_event("Push");
/// builder.define_state("Unlocked").unwrap();
/// builder.define_state("Broken").unwrap().as_final().unwrap();
///
/// builder.define_external_transition_for("Locked").to("Unlocked").by("Coin");
/// builder.define_external_transition_for("Unlocked").to("Locked").by("Push");
/// builder.define_external_transition_for("Unlocked").to("Broken").by("Kick");
/// builder.define_internal_transition_for("Unlocked").by("Coin");
///
/// let machine = builder.build().unwrap();
/// assert_eq!(machine.initial_state().id(), &"Locked");
/// ```
pub struct StateMachineBuilder<S: StateId, E: EventId> {
    config: MachineConfig<S, E>,
}

impl<S: StateId, E: EventId> StateMachineBuilder<S, E> {
    pub fn new() -> Self {
        Self {
            config: MachineConfig::new(),
        }
    }

    /// Declare a state and configure it.
    pub fn define_state(&mut self, id: S) -> Result<StateConfigurer<'_, S, E>, BuildError<S, E>> {
        let slot = self.config.add_state(id)?;
        Ok(StateConfigurer::new(&mut self.config, slot))
    }

    /// Declare several plain states. Stops at the first duplicate; states
    /// before it stay declared.
    pub fn define_states(&mut self, ids: impl IntoIterator<Item = S>) -> Result<(), BuildError<S, E>> {
        for id in ids {
            self.config.add_state(id)?;
        }
        Ok(())
    }

    /// Declare a transition from `source` that moves the machine to another
    /// state (possibly `source` itself) and runs exit and entry actions.
    pub fn define_external_transition_for(&mut self, source: S) -> ExternalTransitionConfigurer<'_, S, E> {
        let slot = self.config.add_transition(source, TransitionKind::External);
        ExternalTransitionConfigurer::new(&mut self.config, slot)
    }

    /// Declare a transition that runs its actions without leaving `source`.
    pub fn define_internal_transition_for(&mut self, source: S) -> InternalTransitionConfigurer<'_, S, E> {
        let slot = self.config.add_transition(source, TransitionKind::Internal);
        InternalTransitionConfigurer::new(&mut self.config, slot)
    }

    pub fn define_start_stop_actions(&mut self) -> StartStopActionsConfigurer<'_, S, E> {
        StartStopActionsConfigurer::new(&mut self.config)
    }

    /// Validate the declarations and build a stopped machine with an empty
    /// context.
    pub fn build(self) -> Result<StateMachine<S, E>, BuildError<S, E>> {
        let endpoints = validate(&self.config).map_err(|violations| {
            debug!(violations = violations.len(), "state machine definition rejected");
            BuildError::Invalid { violations }
        })?;

        let states = self.config.states.len();
        let transitions = self.config.transitions.len();
        let machine = StateMachine::new(self.config.into_graph(endpoints));
        debug!(
            machine = %machine.id(),
            states,
            transitions,
            "state machine built"
        );
        Ok(machine)
    }
}

impl<S: StateId, E: EventId> Default for StateMachineBuilder<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Violation;

    #[test]
    fn build_without_states_fails() {
        let builder: StateMachineBuilder<&'static str, &'static str> = StateMachineBuilder::new();
        let error = builder.build().err().unwrap();
        assert_eq!(error.violations(), &[Violation::NoStates]);
    }

    #[test]
    fn duplicate_state_fails_immediately() {
        let mut builder: StateMachineBuilder<u8, u8> = StateMachineBuilder::new();
        builder.define_states([1, 2]).unwrap();
        assert_eq!(builder.define_states([3, 1]), Err(BuildError::DuplicateState(1)));
        assert!(matches!(
            builder.define_state(3),
            Err(BuildError::DuplicateState(3))
        ));
    }

    #[test]
    fn built_machine_starts_stopped_with_empty_context() {
        let mut builder = StateMachineBuilder::new();
        builder.define_state("S1").unwrap().as_initial().unwrap();
        builder.define_state("S2").unwrap().as_final().unwrap();
        builder.define_external_transition_for("S1").to("S2").by("E1");

        let machine = builder.build().unwrap();
        assert!(!machine.is_running());
        assert!(machine.current_state().is_none());
        assert!(machine.context().is_empty());
        assert_eq!(machine.final_state().id(), &"S2");
        assert_eq!(
            machine
                .state(&"S1")
                .map(|state| state.transitions_for(&"E1").len()),
            Some(1)
        );
    }

    #[test]
    fn dangling_internal_transition_is_rejected() {
        let mut builder = StateMachineBuilder::new();
        builder.define_state("S1").unwrap().as_initial().unwrap();
        builder.define_state("S2").unwrap().as_final().unwrap();
        builder.define_external_transition_for("S1").to("S2").by("E1");
        builder.define_internal_transition_for("S1");

        let error = builder.build().err().unwrap();
        assert!(matches!(
            error.violations(),
            [Violation::TransitionsWithoutEvent(found)] if found.len() == 1
        ));
    }
}
