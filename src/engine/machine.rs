//! State machine that executes event-driven transitions.

use super::error::{ActionStage, EngineError};
use super::listener::{ListenerId, ListenerRegistry, MachineListener};
use super::state::State;
use crate::core::{
    ActionResult, Context, EventId, LifecycleAction, MachineDetails, Message, StateId,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Validated state graph produced by the builder.
pub(crate) struct MachineGraph<S: StateId, E: EventId> {
    states: Vec<State<S, E>>,
    index: HashMap<S, usize>,
    initial: usize,
    final_state: usize,
    start_actions: Vec<LifecycleAction<S>>,
    stop_actions: Vec<LifecycleAction<S>>,
}

impl<S: StateId, E: EventId> MachineGraph<S, E> {
    pub(crate) fn new(
        states: Vec<State<S, E>>,
        index: HashMap<S, usize>,
        initial: usize,
        final_state: usize,
        start_actions: Vec<LifecycleAction<S>>,
        stop_actions: Vec<LifecycleAction<S>>,
    ) -> Self {
        Self {
            states,
            index,
            initial,
            final_state,
            start_actions,
            stop_actions,
        }
    }

    fn state(&self, slot: usize) -> &State<S, E> {
        &self.states[slot]
    }

    fn slot_of(&self, id: &S) -> Option<usize> {
        self.index.get(id).copied()
    }
}

/// Mutable part of a machine: everything start/stop/accept change.
struct Runtime<E: EventId> {
    current: Option<usize>,
    running: bool,
    faulted: bool,
    deferred: Option<Message<E>>,
    context: Context,
}

impl<E: EventId> Runtime<E> {
    fn new() -> Self {
        Self {
            current: None,
            running: false,
            faulted: false,
            deferred: None,
            context: Context::new(),
        }
    }

    fn details<'a, S: StateId>(&'a mut self, state: &'a S) -> MachineDetails<'a, S> {
        MachineDetails::new(state, self.running, &mut self.context)
    }

    /// Turn an action failure into a faulted machine.
    fn check_action<S: StateId>(
        &mut self,
        machine: Uuid,
        result: ActionResult,
        stage: ActionStage,
        state: &S,
    ) -> Result<(), EngineError<S>> {
        result.map_err(|source| {
            warn!(
                machine = %machine,
                state = ?state,
                stage = %stage,
                error = %source,
                "action failed, state machine is faulted"
            );
            self.faulted = true;
            self.running = false;
            self.deferred = None;
            EngineError::ActionFailed {
                stage,
                state: state.clone(),
                source,
            }
        })
    }
}

/// A built, validated state machine.
///
/// Created by [`StateMachineBuilder::build`](crate::builder::StateMachineBuilder::build).
/// The machine starts out stopped; [`start`](Self::start) enters the initial
/// state and [`accept`](Self::accept) drives it with events until the final
/// state is reached, at which point it stops itself. A stopped machine can be
/// started again.
///
/// All operations take `&mut self`; the machine does no locking of its own.
///
/// # Example
///
/// ```rust
/// use statecraft::builder::StateMachineBuilder;
///
/// let mut builder = StateMachineBuilder::new();
/// builder.define_state("S1").unwrap().as_initial().unwrap();
/// builder.define_state("S2").unwrap();
/// builder.define_state("S3").unwrap().as_final().unwrap();
/// builder.define_external_transition_for("S1").to("S2").by("E1");
/// builder.define_external_transition_for("S2").to("S3").by("E1");
///
/// let mut machine = builder.build().unwrap();
/// machine.start().unwrap();
/// assert!(machine.accept("E1").unwrap());
/// assert!(machine.accept("E1").unwrap());
///
/// assert!(!machine.is_running());
/// assert_eq!(machine.current_state_id(), Some(&"S3"));
/// ```
pub struct StateMachine<S: StateId, E: EventId> {
    id: Uuid,
    graph: MachineGraph<S, E>,
    runtime: Runtime<E>,
    listeners: ListenerRegistry<S, E>,
}

impl<S: StateId, E: EventId> StateMachine<S, E> {
    pub(crate) fn new(graph: MachineGraph<S, E>) -> Self {
        Self {
            id: Uuid::new_v4(),
            graph,
            runtime: Runtime::new(),
            listeners: ListenerRegistry::new(),
        }
    }

    /// Unique id of this machine instance, used in log records.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_running(&self) -> bool {
        self.runtime.running
    }

    /// Whether an action failed and the machine became unusable.
    pub fn is_faulted(&self) -> bool {
        self.runtime.faulted
    }

    /// The current state; `None` until the machine was started once.
    pub fn current_state(&self) -> Option<&State<S, E>> {
        self.runtime.current.map(|slot| self.graph.state(slot))
    }

    pub fn current_state_id(&self) -> Option<&S> {
        self.current_state().map(State::id)
    }

    pub fn initial_state(&self) -> &State<S, E> {
        self.graph.state(self.graph.initial)
    }

    pub fn final_state(&self) -> &State<S, E> {
        self.graph.state(self.graph.final_state)
    }

    pub fn state(&self, id: &S) -> Option<&State<S, E>> {
        self.graph.slot_of(id).map(|slot| self.graph.state(slot))
    }

    /// All states in declaration order.
    pub fn states(&self) -> impl Iterator<Item = &State<S, E>> {
        self.graph.states.iter()
    }

    pub fn context(&self) -> &Context {
        &self.runtime.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.runtime.context
    }

    pub fn has_deferred_message(&self) -> bool {
        self.runtime.deferred.is_some()
    }

    pub fn deferred_message(&self) -> Option<&Message<E>> {
        self.runtime.deferred.as_ref()
    }

    pub fn add_listener(&mut self, listener: Arc<dyn MachineListener<S, E>>) -> ListenerId {
        self.listeners.add(listener)
    }

    /// Unregister a listener. Returns `false` if `id` was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Start the machine.
    ///
    /// Drops any deferred message left over from a previous run, runs the
    /// start actions, enters the initial state and notifies listeners.
    /// Start actions already see the initial state as current, with
    /// `is_running()` still false.
    pub fn start(&mut self) -> Result<(), EngineError<S>> {
        self.ensure_usable()?;
        if self.runtime.running {
            return Err(EngineError::AlreadyRunning);
        }

        self.runtime.deferred = None;
        let initial = self.graph.state(self.graph.initial);
        for action in &self.graph.start_actions {
            let result = action(&mut self.runtime.details(initial.id()));
            self.runtime
                .check_action(self.id, result, ActionStage::Start, initial.id())?;
        }

        self.runtime.running = true;
        self.runtime.current = Some(self.graph.initial);
        let result = initial.on_enter(&mut self.runtime.details(initial.id()));
        self.runtime
            .check_action(self.id, result, ActionStage::Entry, initial.id())?;

        info!(machine = %self.id, state = ?initial.id(), "state machine started");
        let details = self.runtime.details(initial.id());
        self.listeners.notify(|listener| listener.on_start(&details));
        Ok(())
    }

    /// Stop the machine.
    ///
    /// Runs the current state's exit actions, then the stop actions, then
    /// notifies listeners. The current state is kept.
    pub fn stop(&mut self) -> Result<(), EngineError<S>> {
        self.ensure_usable()?;
        let current = self.running_slot()?;
        let state = self.graph.state(current);

        let result = state.on_exit(&mut self.runtime.details(state.id()));
        self.runtime
            .check_action(self.id, result, ActionStage::Exit, state.id())?;

        self.runtime.running = false;
        for action in &self.graph.stop_actions {
            let result = action(&mut self.runtime.details(state.id()));
            self.runtime
                .check_action(self.id, result, ActionStage::Stop, state.id())?;
        }

        info!(machine = %self.id, state = ?state.id(), "state machine stopped");
        let details = self.runtime.details(state.id());
        self.listeners.notify(|listener| listener.on_stop(&details));
        Ok(())
    }

    /// Deliver an event without payload.
    ///
    /// Returns `Ok(true)` if the event fired a transition or was deferred,
    /// `Ok(false)` if the current state had nothing to do with it.
    pub fn accept(&mut self, event: E) -> Result<bool, EngineError<S>> {
        self.accept_message(Message::new(event))
    }

    /// Deliver a message. Passing `None` is a no-op reported as not accepted.
    pub fn accept_message(
        &mut self,
        message: impl Into<Option<Message<E>>>,
    ) -> Result<bool, EngineError<S>> {
        self.ensure_usable()?;
        let previous = self.running_slot()?;
        let message = message.into();

        let accepted = match &message {
            Some(message) => self.dispatch(message)?,
            None => false,
        };

        let current = self.runtime.current.unwrap_or(previous);
        let previous = self.graph.state(previous).id();
        let details = self.runtime.details(self.graph.state(current).id());
        match message.as_ref() {
            Some(message) if accepted => self
                .listeners
                .notify(|listener| listener.on_state_changed(message, previous, &details)),
            _ => self
                .listeners
                .notify(|listener| listener.on_event_not_accepted(message.as_ref(), &details)),
        }
        Ok(accepted)
    }

    fn ensure_usable(&self) -> Result<(), EngineError<S>> {
        if self.runtime.faulted {
            return Err(EngineError::Faulted);
        }
        Ok(())
    }

    fn running_slot(&self) -> Result<usize, EngineError<S>> {
        match self.runtime.current {
            Some(slot) if self.runtime.running => Ok(slot),
            _ => Err(EngineError::NotRunning),
        }
    }

    /// Defer the message or process it, then replay a held message once the
    /// machine reached a state that no longer defers it.
    fn dispatch(&mut self, message: &Message<E>) -> Result<bool, EngineError<S>> {
        let current = self.running_slot()?;
        let state = self.graph.state(current);
        if state.can_defer(message) {
            debug!(
                machine = %self.id,
                state = ?state.id(),
                event = ?message.event(),
                "message deferred"
            );
            if let Some(dropped) = self.runtime.deferred.replace(message.clone()) {
                debug!(
                    machine = %self.id,
                    event = ?dropped.event(),
                    "previously deferred message overwritten"
                );
            }
            return Ok(true);
        }

        let accepted = self.process(message)?;

        if let Some(current) = self.runtime.current {
            let state = self.graph.state(current);
            let replay = current != self.graph.final_state
                && self
                    .runtime
                    .deferred
                    .as_ref()
                    .is_some_and(|deferred| !state.can_defer(deferred));

            if replay {
                if let Some(deferred) = self.runtime.deferred.take() {
                    debug!(
                        machine = %self.id,
                        state = ?state.id(),
                        event = ?deferred.event(),
                        "replaying deferred message"
                    );
                    self.process(&deferred)?;
                }
            }
        }

        Ok(accepted)
    }

    /// Resolve and fire one transition for `message`.
    fn process(&mut self, message: &Message<E>) -> Result<bool, EngineError<S>> {
        let current = self.running_slot()?;
        let source = self.graph.state(current);
        let transition = source.suitable_transition(message, &self.runtime.details(source.id()));

        let Some(transition) = transition else {
            debug!(
                machine = %self.id,
                state = ?source.id(),
                event = ?message.event(),
                "message not accepted"
            );
            return Ok(false);
        };

        let target = match transition.target() {
            Some(target) if transition.is_external() => self.graph.slot_of(target),
            _ => None,
        };

        if target.is_some() {
            let result = source.on_exit(&mut self.runtime.details(source.id()));
            self.runtime
                .check_action(self.id, result, ActionStage::Exit, source.id())?;
        }

        let result = transition.execute(message, &mut self.runtime.details(source.id()));
        self.runtime
            .check_action(self.id, result, ActionStage::Transition, source.id())?;

        match target {
            Some(target) => {
                let entered = self.graph.state(target);
                self.runtime.current = Some(target);
                let result = entered.on_enter(&mut self.runtime.details(entered.id()));
                self.runtime
                    .check_action(self.id, result, ActionStage::Entry, entered.id())?;

                debug!(
                    machine = %self.id,
                    from = ?source.id(),
                    to = ?entered.id(),
                    event = ?message.event(),
                    "external transition fired"
                );
            }
            None => debug!(
                machine = %self.id,
                state = ?source.id(),
                event = ?message.event(),
                "internal transition fired"
            ),
        }

        if self.runtime.current == Some(self.graph.final_state) {
            self.stop()?;
        }
        Ok(true)
    }
}

impl<S: StateId, E: EventId> fmt::Debug for StateMachine<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("id", &self.id)
            .field("current", &self.current_state_id())
            .field("running", &self.runtime.running)
            .field("faulted", &self.runtime.faulted)
            .field("deferred", &self.runtime.deferred)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::StateMachineBuilder;
    use crate::core::ActionError;

    fn trail(details: &mut MachineDetails<'_, &'static str>, entry: &'static str) -> ActionResult {
        let mut trail = details
            .context_mut()
            .take::<Vec<&'static str>>("trail")
            .unwrap_or_default();
        trail.push(entry);
        details.context_mut().set_value("trail", trail);
        Ok(())
    }

    fn recorded(machine: &StateMachine<&'static str, &'static str>) -> Vec<&'static str> {
        machine
            .context()
            .get::<Vec<&'static str>>("trail")
            .cloned()
            .unwrap_or_default()
    }

    fn two_states() -> StateMachineBuilder<&'static str, &'static str> {
        let mut builder = StateMachineBuilder::new();
        builder
            .define_state("S1")
            .unwrap()
            .as_initial()
            .unwrap()
            .on_entry(|details| trail(details, "enter S1"))
            .on_exit(|details| trail(details, "exit S1"));
        builder
            .define_state("S2")
            .unwrap()
            .as_final()
            .unwrap()
            .on_entry(|details| trail(details, "enter S2"))
            .on_exit(|details| trail(details, "exit S2"));
        builder
            .define_external_transition_for("S1")
            .to("S2")
            .by("E1")
            .with_action(|_, details| trail(details, "E1"));
        builder
    }

    #[test]
    fn start_runs_start_actions_before_entering_initial_state() {
        let mut builder = two_states();
        builder.define_start_stop_actions().on_start(|details| {
            assert!(!details.is_running());
            assert_eq!(details.current_state(), &"S1");
            trail(details, "start")
        });
        let mut machine = builder.build().unwrap();

        machine.start().unwrap();

        assert!(machine.is_running());
        assert_eq!(machine.current_state_id(), Some(&"S1"));
        assert_eq!(recorded(&machine), vec!["start", "enter S1"]);
    }

    #[test]
    fn lifecycle_misuse_is_reported() {
        let mut machine = two_states().build().unwrap();

        assert!(matches!(machine.stop(), Err(EngineError::NotRunning)));
        assert!(matches!(machine.accept("E1"), Err(EngineError::NotRunning)));

        machine.start().unwrap();
        assert!(matches!(machine.start(), Err(EngineError::AlreadyRunning)));
    }

    #[test]
    fn external_transition_runs_exit_action_entry_in_order() {
        let mut machine = two_states().build().unwrap();
        machine.start().unwrap();

        assert!(machine.accept("E1").unwrap());

        assert_eq!(
            recorded(&machine),
            vec!["enter S1", "exit S1", "E1", "enter S2", "exit S2"]
        );
        assert!(!machine.is_running());
        assert_eq!(machine.current_state_id(), Some(&"S2"));
    }

    #[test]
    fn deferred_slot_keeps_latest_message() {
        let mut builder = StateMachineBuilder::new();
        builder
            .define_state("S1")
            .unwrap()
            .as_initial()
            .unwrap()
            .with_deferred_event("E2");
        builder.define_state("S2").unwrap().as_final().unwrap();
        builder.define_external_transition_for("S1").to("S2").by("E1");
        let mut machine = builder.build().unwrap();
        machine.start().unwrap();

        assert!(machine.accept_message(Message::with_payload("E2", 1.into())).unwrap());
        assert!(machine.accept_message(Message::with_payload("E2", 2.into())).unwrap());

        assert!(machine.has_deferred_message());
        assert_eq!(
            machine.deferred_message().and_then(|m| m.payload_as::<u8>()),
            Some(2)
        );
    }

    #[test]
    fn restart_clears_deferred_message() {
        let mut builder = StateMachineBuilder::new();
        builder
            .define_state("S1")
            .unwrap()
            .as_initial()
            .unwrap()
            .with_deferred_event("E2");
        builder.define_state("S2").unwrap().as_final().unwrap();
        builder.define_external_transition_for("S1").to("S2").by("E1");
        let mut machine = builder.build().unwrap();

        machine.start().unwrap();
        machine.accept("E2").unwrap();
        machine.stop().unwrap();
        assert!(machine.has_deferred_message());

        machine.start().unwrap();
        assert!(!machine.has_deferred_message());
    }

    #[test]
    fn failing_entry_action_faults_machine() {
        let mut builder = two_states();
        builder
            .define_state("S3")
            .unwrap()
            .on_entry(|_| Err(ActionError::failed("unreachable backend")));
        builder.define_external_transition_for("S1").to("S3").by("E3");
        builder.define_external_transition_for("S3").to("S2").by("E1");
        let mut machine = builder.build().unwrap();
        machine.start().unwrap();

        let error = machine.accept("E3").unwrap_err();
        assert!(matches!(
            error,
            EngineError::ActionFailed {
                stage: ActionStage::Entry,
                state: "S3",
                ..
            }
        ));
        assert!(machine.is_faulted());
        assert!(!machine.is_running());
        assert!(matches!(machine.accept("E1"), Err(EngineError::Faulted)));
        assert!(matches!(machine.start(), Err(EngineError::Faulted)));
    }

    #[test]
    fn debug_shows_runtime_status() {
        let mut machine = two_states().build().unwrap();
        machine.start().unwrap();

        let debug = format!("{machine:?}");
        assert!(debug.contains("running: true"));
        assert!(debug.contains("\"S1\""));
    }
}
