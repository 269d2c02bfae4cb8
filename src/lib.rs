//! Statecraft: an embeddable finite state machine runtime
//!
//! Statecraft lets a host declare states, transitions, guards and actions,
//! proves at build time that the declaration is a well-formed machine, and
//! then executes event-driven transitions with UML-style semantics.
//!
//! # Core Concepts
//!
//! - **Builder**: Fluent declaration API with staged structural validation
//! - **Transitions**: External (exit, act, enter) and internal (act only)
//! - **Guards**: Pure predicates deciding which transition fires
//! - **Deferred events**: A state can hold one event until it is left
//! - **Context**: String-keyed store shared by guards and actions
//! - **Listeners**: Observers of start, stop and every processed message
//!
//! # Example
//!
//! ```rust
//! use statecraft::{Message, StateMachineBuilder};
//!
//! let mut builder = StateMachineBuilder::new();
//! builder.define_state("Idle").unwrap().as_initial().unwrap();
//! builder.define_state("Working").unwrap();
//! builder.define_state("Done").unwrap().as_final().unwrap();
//!
//! builder
//!     .define_external_transition_for("Idle")
//!     .to("Working")
//!     .by("Begin");
//! builder
//!     .define_external_transition_for("Working")
//!     .to("Done")
//!     .by("Progress")
//!     .when(|_, details| details.context().get::<u32>("done") >= Some(&10));
//! builder
//!     .define_internal_transition_for("Working")
//!     .by("Progress")
//!     .with_action(|message, details| {
//!         let step = message.payload_as::<u32>().unwrap_or(1);
//!         let done = details.context().get::<u32>("done").copied().unwrap_or(0);
//!         details.context_mut().set_value("done", done + step);
//!         Ok(())
//!     });
//!
//! let mut machine = builder.build().unwrap();
//! machine.start().unwrap();
//! machine.accept("Begin").unwrap();
//! machine
//!     .accept_message(Message::with_payload("Progress", 10.into()))
//!     .unwrap();
//! machine.accept("Progress").unwrap();
//!
//! assert_eq!(machine.current_state_id(), Some(&"Done"));
//! assert!(!machine.is_running());
//! ```

pub mod builder;
pub mod core;
pub mod engine;

// Re-export commonly used types
pub use crate::builder::{BuildError, StateMachineBuilder, Violation};
pub use crate::core::{
    consider_all, consider_any, ActionError, ActionResult, Context, EventId, Guard,
    MachineDetails, Message, StateAction, StateHistory, StateId, StateTransition,
};
pub use crate::engine::{EngineError, HistoryListener, ListenerId, MachineListener, StateMachine};
