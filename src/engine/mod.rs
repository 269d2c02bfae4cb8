//! Runtime side of a state machine.
//!
//! A [`StateMachine`] owns the validated graph of [`State`]s and
//! [`Transition`]s produced by the builder, the shared context and the
//! registered listeners.

mod error;
mod listener;
mod machine;
mod state;
mod transition;

pub use error::{ActionStage, EngineError};
pub use listener::{HistoryListener, ListenerId, MachineListener};
pub use machine::StateMachine;
pub(crate) use machine::MachineGraph;
pub use state::State;
pub use transition::{Transition, TransitionKind};
