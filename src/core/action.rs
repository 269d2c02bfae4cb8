//! Actions run by a machine: transition actions, state entry/exit actions,
//! and machine start/stop actions.
//!
//! Actions are side-effecting only. They report failure through
//! [`ActionError`]; a failing action faults the machine that ran it.

use super::details::MachineDetails;
use super::message::Message;
use super::state::{EventId, StateId};
use std::sync::Arc;
use thiserror::Error;

/// Error raised by a host-supplied action.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ActionError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

pub type ActionResult = Result<(), ActionError>;

/// Action executed while a transition fires.
pub type TransitionAction<S, E> =
    Arc<dyn Fn(&Message<E>, &mut MachineDetails<'_, S>) -> ActionResult + Send + Sync>;

/// Action bound to a lifecycle point: state entry/exit or machine start/stop.
pub type LifecycleAction<S> =
    Arc<dyn Fn(&mut MachineDetails<'_, S>) -> ActionResult + Send + Sync>;

/// Combined entry/exit behaviour attached to a state as one value.
///
/// Both hooks default to doing nothing, so implementors override only what
/// they need.
///
/// # Example
///
/// ```rust
/// use statecraft::core::{ActionResult, MachineDetails, StateAction};
///
/// struct CountVisits;
///
/// impl StateAction<&'static str> for CountVisits {
///     fn on_enter(&self, details: &mut MachineDetails<'_, &'static str>) -> ActionResult {
///         let visits = details.context().get::<u32>("visits").copied().unwrap_or(0);
///         details.context_mut().set_value("visits", visits + 1);
///         Ok(())
///     }
/// }
/// ```
pub trait StateAction<S: StateId>: Send + Sync {
    fn on_enter(&self, _details: &mut MachineDetails<'_, S>) -> ActionResult {
        Ok(())
    }

    fn on_exit(&self, _details: &mut MachineDetails<'_, S>) -> ActionResult {
        Ok(())
    }
}

pub(crate) fn transition_action<S, E, F>(action: F) -> TransitionAction<S, E>
where
    S: StateId,
    E: EventId,
    F: Fn(&Message<E>, &mut MachineDetails<'_, S>) -> ActionResult + Send + Sync + 'static,
{
    Arc::new(action)
}

pub(crate) fn lifecycle_action<S, F>(action: F) -> LifecycleAction<S>
where
    S: StateId,
    F: Fn(&mut MachineDetails<'_, S>) -> ActionResult + Send + Sync + 'static,
{
    Arc::new(action)
}
