//! Core state machine types.
//!
//! This module contains the building blocks shared by the builder and the
//! engine:
//! - Identifier traits for states and events
//! - The message envelope and the shared context store
//! - Guard predicates and their composition
//! - Action types and the machine details view they receive
//! - Immutable history records

mod action;
mod context;
mod details;
mod guard;
mod history;
mod message;
mod state;

pub use action::{ActionError, ActionResult, LifecycleAction, StateAction, TransitionAction};
pub(crate) use action::{lifecycle_action, transition_action};
pub use context::{Context, ContextValue};
pub use details::MachineDetails;
pub use guard::{consider_all, consider_any, Guard};
pub use history::{StateHistory, StateTransition};
pub use message::Message;
pub use state::{EventId, StateId};
