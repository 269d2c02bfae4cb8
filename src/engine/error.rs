//! Runtime errors of a built machine.

use crate::core::{ActionError, StateId};
use std::fmt;
use thiserror::Error;

/// Lifecycle point at which an action failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionStage {
    Start,
    Stop,
    Entry,
    Exit,
    Transition,
}

impl fmt::Display for ActionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Entry => "entry",
            Self::Exit => "exit",
            Self::Transition => "transition",
        };
        f.write_str(name)
    }
}

/// Errors returned by [`StateMachine`](super::StateMachine) operations.
///
/// Rejected events are not errors; `accept` reports them as `Ok(false)`.
#[derive(Debug, Error)]
pub enum EngineError<S: StateId> {
    #[error("State machine is already running")]
    AlreadyRunning,

    #[error("State machine is not running")]
    NotRunning,

    #[error("State machine is faulted after a failed action and cannot be used")]
    Faulted,

    #[error("{stage} action failed in state {state:?}: {source}")]
    ActionFailed {
        stage: ActionStage,
        state: S,
        #[source]
        source: ActionError,
    },
}
