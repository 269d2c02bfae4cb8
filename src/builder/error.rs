//! Build errors for state machine declarations.

use crate::core::{EventId, StateId};
use crate::engine::TransitionKind;
use std::fmt;
use thiserror::Error;

/// Identifies a declared transition inside a [`Violation`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionRef<S, E> {
    pub source: S,
    pub target: Option<S>,
    pub event: Option<E>,
    pub kind: TransitionKind,
}

impl<S: fmt::Debug, E: fmt::Debug> fmt::Display for TransitionRef<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            TransitionKind::External => "external",
            TransitionKind::Internal => "internal",
        };
        write!(f, "{kind} {:?}", self.source)?;
        if let Some(target) = &self.target {
            write!(f, " -> {target:?}")?;
        }
        match &self.event {
            Some(event) => write!(f, " by {event:?}"),
            None => f.write_str(" by <no event>"),
        }
    }
}

/// A structural problem found by [`StateMachineBuilder::build`](super::StateMachineBuilder::build).
///
/// Id lists keep the order in which the offending ids were declared and
/// contain every id once.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Violation<S: StateId, E: EventId> {
    #[error("There are no states defined")]
    NoStates,

    #[error("Initial state is not defined")]
    MissingInitialState,

    #[error("Final state is not defined")]
    MissingFinalState,

    #[error("Transitions have unknown source states: {0:?}")]
    UnknownSourceStates(Vec<S>),

    #[error("Transitions have unknown target states: {0:?}")]
    UnknownTargetStates(Vec<S>),

    #[error("External transitions have no target state: {}", list(.0))]
    ExternalTransitionsWithoutTarget(Vec<TransitionRef<S, E>>),

    #[error("Internal transitions must not have a target state: {}", list(.0))]
    InternalTransitionsWithTarget(Vec<TransitionRef<S, E>>),

    #[error("Transitions have no triggering event: {}", list(.0))]
    TransitionsWithoutEvent(Vec<TransitionRef<S, E>>),

    #[error("Final state must not be the source of a transition: {}", list(.0))]
    TransitionsFromFinalState(Vec<TransitionRef<S, E>>),

    #[error("There are states without inbound transition: {0:?}")]
    StatesWithoutInboundTransition(Vec<S>),

    #[error("There are states without outbound transition: {0:?}")]
    StatesWithoutOutboundTransition(Vec<S>),
}

/// Errors that can occur while declaring or building a state machine.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BuildError<S: StateId, E: EventId> {
    #[error("State {0:?} is already defined")]
    DuplicateState(S),

    #[error("Initial state is already defined as {defined:?}, cannot make {requested:?} initial")]
    InitialStateAlreadyDefined { defined: S, requested: S },

    #[error("Final state is already defined as {defined:?}, cannot make {requested:?} final")]
    FinalStateAlreadyDefined { defined: S, requested: S },

    #[error("Invalid state machine definition: {}", list(.violations))]
    Invalid { violations: Vec<Violation<S, E>> },
}

impl<S: StateId, E: EventId> BuildError<S, E> {
    /// Violations reported by `build`; empty for declaration-time errors.
    pub fn violations(&self) -> &[Violation<S, E>] {
        match self {
            Self::Invalid { violations } => violations,
            _ => &[],
        }
    }
}

fn list<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_ref_display() {
        let external: TransitionRef<&str, &str> = TransitionRef {
            source: "S1",
            target: Some("S2"),
            event: Some("E1"),
            kind: TransitionKind::External,
        };
        assert_eq!(external.to_string(), r#"external "S1" -> "S2" by "E1""#);

        let internal: TransitionRef<&str, &str> = TransitionRef {
            source: "S1",
            target: None,
            event: None,
            kind: TransitionKind::Internal,
        };
        assert_eq!(internal.to_string(), r#"internal "S1" by <no event>"#);
    }

    #[test]
    fn invalid_lists_every_violation() {
        let error: BuildError<&str, &str> = BuildError::Invalid {
            violations: vec![
                Violation::MissingInitialState,
                Violation::MissingFinalState,
            ],
        };

        assert_eq!(
            error.to_string(),
            "Invalid state machine definition: Initial state is not defined; Final state is not defined"
        );
        assert_eq!(error.violations().len(), 2);
        assert!(BuildError::<&str, &str>::DuplicateState("S1")
            .violations()
            .is_empty());
    }

    #[test]
    fn unknown_ids_are_listed() {
        let violation: Violation<&str, &str> = Violation::UnknownSourceStates(vec!["S4", "S5"]);
        assert_eq!(
            violation.to_string(),
            r#"Transitions have unknown source states: ["S4", "S5"]"#
        );
    }
}
