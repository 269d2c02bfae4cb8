//! Staging arena filled by the configurers and consumed by `build`.

use super::error::{BuildError, TransitionRef};
use crate::core::{EventId, Guard, LifecycleAction, StateId, TransitionAction};
use crate::engine::{MachineGraph, State, Transition, TransitionKind};
use std::collections::HashMap;

pub(crate) struct StateDecl<S: StateId, E: EventId> {
    pub(crate) id: S,
    pub(crate) entry_actions: Vec<LifecycleAction<S>>,
    pub(crate) exit_actions: Vec<LifecycleAction<S>>,
    pub(crate) deferred_events: Vec<E>,
}

/// A transition as declared; any field may still be missing or wrong.
pub(crate) struct TransitionDecl<S: StateId, E: EventId> {
    pub(crate) source: S,
    pub(crate) target: Option<S>,
    pub(crate) event: Option<E>,
    pub(crate) guard: Option<Guard<S, E>>,
    pub(crate) actions: Vec<TransitionAction<S, E>>,
    pub(crate) kind: TransitionKind,
}

impl<S: StateId, E: EventId> TransitionDecl<S, E> {
    pub(crate) fn reference(&self) -> TransitionRef<S, E> {
        TransitionRef {
            source: self.source.clone(),
            target: self.target.clone(),
            event: self.event.clone(),
            kind: self.kind,
        }
    }

    pub(crate) fn is_external(&self) -> bool {
        self.kind == TransitionKind::External
    }
}

/// Slots of the initial and final state, known once validation passed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Endpoints {
    pub(crate) initial: usize,
    pub(crate) final_state: usize,
}

pub(crate) struct MachineConfig<S: StateId, E: EventId> {
    pub(crate) states: Vec<StateDecl<S, E>>,
    pub(crate) index: HashMap<S, usize>,
    pub(crate) transitions: Vec<TransitionDecl<S, E>>,
    pub(crate) initial: Option<usize>,
    pub(crate) final_state: Option<usize>,
    pub(crate) start_actions: Vec<LifecycleAction<S>>,
    pub(crate) stop_actions: Vec<LifecycleAction<S>>,
}

impl<S: StateId, E: EventId> MachineConfig<S, E> {
    pub(crate) fn new() -> Self {
        Self {
            states: Vec::new(),
            index: HashMap::new(),
            transitions: Vec::new(),
            initial: None,
            final_state: None,
            start_actions: Vec::new(),
            stop_actions: Vec::new(),
        }
    }

    pub(crate) fn add_state(&mut self, id: S) -> Result<usize, BuildError<S, E>> {
        if self.index.contains_key(&id) {
            return Err(BuildError::DuplicateState(id));
        }

        let slot = self.states.len();
        self.index.insert(id.clone(), slot);
        self.states.push(StateDecl {
            id,
            entry_actions: Vec::new(),
            exit_actions: Vec::new(),
            deferred_events: Vec::new(),
        });
        Ok(slot)
    }

    pub(crate) fn add_transition(&mut self, source: S, kind: TransitionKind) -> usize {
        self.transitions.push(TransitionDecl {
            source,
            target: None,
            event: None,
            guard: None,
            actions: Vec::new(),
            kind,
        });
        self.transitions.len() - 1
    }

    pub(crate) fn mark_initial(&mut self, slot: usize) -> Result<(), BuildError<S, E>> {
        match self.initial {
            Some(defined) => Err(BuildError::InitialStateAlreadyDefined {
                defined: self.states[defined].id.clone(),
                requested: self.states[slot].id.clone(),
            }),
            None => {
                self.initial = Some(slot);
                Ok(())
            }
        }
    }

    pub(crate) fn mark_final(&mut self, slot: usize) -> Result<(), BuildError<S, E>> {
        match self.final_state {
            Some(defined) => Err(BuildError::FinalStateAlreadyDefined {
                defined: self.states[defined].id.clone(),
                requested: self.states[slot].id.clone(),
            }),
            None => {
                self.final_state = Some(slot);
                Ok(())
            }
        }
    }

    /// Wire every transition into its source state. Only called on a
    /// validated configuration.
    pub(crate) fn into_graph(self, endpoints: Endpoints) -> MachineGraph<S, E> {
        let mut states: Vec<State<S, E>> = self
            .states
            .into_iter()
            .map(|decl| {
                let mut state = State::new(decl.id);
                decl.entry_actions
                    .into_iter()
                    .for_each(|action| state.add_entry_action(action));
                decl.exit_actions
                    .into_iter()
                    .for_each(|action| state.add_exit_action(action));
                decl.deferred_events
                    .into_iter()
                    .for_each(|event| state.add_deferred_event(event));
                state
            })
            .collect();

        for decl in self.transitions {
            let (Some(event), Some(&slot)) = (decl.event, self.index.get(&decl.source)) else {
                continue;
            };
            states[slot].add_transition(Transition {
                source: decl.source,
                target: decl.target,
                event,
                guard: decl.guard,
                actions: decl.actions,
                kind: decl.kind,
            });
        }

        MachineGraph::new(
            states,
            self.index,
            endpoints.initial,
            endpoints.final_state,
            self.start_actions,
            self.stop_actions,
        )
    }
}
