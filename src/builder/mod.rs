//! Declaration and validation of state machines.
//!
//! [`StateMachineBuilder`] hands out configurers for states, transitions and
//! machine start/stop actions. Nothing is checked beyond duplicate ids and
//! conflicting initial/final markers until [`StateMachineBuilder::build`]
//! runs the structural validation.

mod config;
mod error;
mod machine;
mod start_stop;
mod state;
mod transition;
mod validation;

pub use error::{BuildError, TransitionRef, Violation};
pub use machine::StateMachineBuilder;
pub use start_stop::StartStopActionsConfigurer;
pub use state::StateConfigurer;
pub use transition::{
    External, ExternalTransitionConfigurer, Internal, InternalTransitionConfigurer,
    TransitionConfigurer,
};
