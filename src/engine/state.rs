//! States of a built machine and transition resolution.

use super::transition::Transition;
use crate::core::{ActionResult, EventId, LifecycleAction, MachineDetails, Message, StateId};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A state of the machine: its id, entry/exit actions, deferred events and
/// outgoing transitions.
///
/// Actions and transitions keep their declaration order. For several
/// transitions on the same event the first whose guard passes wins.
pub struct State<S: StateId, E: EventId> {
    id: S,
    entry_actions: Vec<LifecycleAction<S>>,
    exit_actions: Vec<LifecycleAction<S>>,
    deferred_events: HashSet<E>,
    transitions: HashMap<E, Vec<Transition<S, E>>>,
}

impl<S: StateId, E: EventId> State<S, E> {
    pub(crate) fn new(id: S) -> Self {
        Self {
            id,
            entry_actions: Vec::new(),
            exit_actions: Vec::new(),
            deferred_events: HashSet::new(),
            transitions: HashMap::new(),
        }
    }

    pub fn id(&self) -> &S {
        &self.id
    }

    /// Find the transition that fires for `message`, if any.
    ///
    /// Candidates registered for the message's event are tried in
    /// declaration order; the first without a guard or with a passing guard
    /// is returned.
    pub fn suitable_transition(
        &self,
        message: &Message<E>,
        details: &MachineDetails<'_, S>,
    ) -> Option<&Transition<S, E>> {
        self.transitions
            .get(message.event())?
            .iter()
            .find(|transition| transition.can_fire(message, details))
    }

    /// Run the entry actions in declaration order.
    pub fn on_enter(&self, details: &mut MachineDetails<'_, S>) -> ActionResult {
        self.entry_actions.iter().try_for_each(|action| action(details))
    }

    /// Run the exit actions in declaration order.
    pub fn on_exit(&self, details: &mut MachineDetails<'_, S>) -> ActionResult {
        self.exit_actions.iter().try_for_each(|action| action(details))
    }

    pub fn can_defer(&self, message: &Message<E>) -> bool {
        self.deferred_events.contains(message.event())
    }

    pub fn deferred_events(&self) -> impl Iterator<Item = &E> {
        self.deferred_events.iter()
    }

    /// Transitions registered for `event`, in declaration order.
    pub fn transitions_for(&self, event: &E) -> &[Transition<S, E>] {
        self.transitions
            .get(event)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn add_entry_action(&mut self, action: LifecycleAction<S>) {
        self.entry_actions.push(action);
    }

    pub(crate) fn add_exit_action(&mut self, action: LifecycleAction<S>) {
        self.exit_actions.push(action);
    }

    pub(crate) fn add_deferred_event(&mut self, event: E) {
        self.deferred_events.insert(event);
    }

    pub(crate) fn add_transition(&mut self, transition: Transition<S, E>) {
        self.transitions
            .entry(transition.event.clone())
            .or_default()
            .push(transition);
    }
}

impl<S: StateId, E: EventId> fmt::Debug for State<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("id", &self.id)
            .field("deferred_events", &self.deferred_events)
            .field("entry_actions", &self.entry_actions.len())
            .field("exit_actions", &self.exit_actions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{lifecycle_action, Context, Guard};
    use crate::engine::TransitionKind;

    type Id = &'static str;

    fn external(to: Id, event: Id, guard: Option<Guard<Id, Id>>) -> Transition<Id, Id> {
        Transition {
            source: "S1",
            target: Some(to),
            event,
            guard,
            actions: Vec::new(),
            kind: TransitionKind::External,
        }
    }

    fn resolve(state: &State<Id, Id>, event: Id) -> Option<&Transition<Id, Id>> {
        let mut context = Context::new();
        let details = MachineDetails::new(state.id(), true, &mut context);
        state.suitable_transition(&Message::new(event), &details)
    }

    #[test]
    fn unknown_event_resolves_to_none() {
        let mut state = State::new("S1");
        state.add_transition(external("S2", "E1", None));

        assert!(resolve(&state, "E2").is_none());
    }

    #[test]
    fn first_passing_guard_wins_in_declaration_order() {
        let mut state = State::new("S1");
        state.add_transition(external("S2", "E1", Some(Guard::never())));
        state.add_transition(external("S3", "E1", Some(Guard::always())));
        state.add_transition(external("S4", "E1", Some(Guard::always())));

        let transition = resolve(&state, "E1").unwrap();
        assert_eq!(transition.target(), Some(&"S3"));
    }

    #[test]
    fn unguarded_transition_always_fires() {
        let mut state = State::new("S1");
        state.add_transition(external("S2", "E1", None));
        state.add_transition(external("S3", "E1", Some(Guard::always())));

        assert_eq!(resolve(&state, "E1").unwrap().target(), Some(&"S2"));
    }

    #[test]
    fn all_guards_failing_resolves_to_none() {
        let mut state = State::new("S1");
        state.add_transition(external("S2", "E1", Some(Guard::never())));

        assert!(resolve(&state, "E1").is_none());
        assert_eq!(state.transitions_for(&"E1").len(), 1);
        assert!(state.transitions_for(&"E9").is_empty());
    }

    #[test]
    fn can_defer_checks_deferred_set() {
        let mut state: State<Id, Id> = State::new("S1");
        state.add_deferred_event("E2");

        assert!(state.can_defer(&Message::new("E2")));
        assert!(!state.can_defer(&Message::new("E1")));
        assert_eq!(state.deferred_events().count(), 1);
    }

    #[test]
    fn entry_and_exit_actions_run_in_order() {
        let mut state: State<Id, Id> = State::new("S1");
        for label in ["first", "second"] {
            state.add_entry_action(lifecycle_action(move |details| {
                let mut trail = details
                    .context_mut()
                    .take::<Vec<&str>>("trail")
                    .unwrap_or_default();
                trail.push(label);
                details.context_mut().set_value("trail", trail);
                Ok(())
            }));
        }
        state.add_exit_action(lifecycle_action(|details| {
            details.context_mut().set_value("exited", true);
            Ok(())
        }));

        let mut context = Context::new();
        state
            .on_enter(&mut MachineDetails::new(&"S1", true, &mut context))
            .unwrap();
        assert_eq!(
            context.get::<Vec<&str>>("trail"),
            Some(&vec!["first", "second"])
        );
        assert!(!context.contains_key("exited"));

        state
            .on_exit(&mut MachineDetails::new(&"S1", true, &mut context))
            .unwrap();
        assert_eq!(context.get::<bool>("exited"), Some(&true));
    }
}
