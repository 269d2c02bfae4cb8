//! Identifier traits for states and events.
//!
//! A state machine is generic over the type identifying its states and the
//! type identifying its events. Both only need value semantics: equality,
//! stable hashing and cloning. Plain enums, strings and integers all qualify.

use std::fmt::Debug;
use std::hash::Hash;

/// Identifier of a state.
///
/// Blanket-implemented for every type meeting the bounds, so hosts never
/// implement it by hand.
///
/// # Required Traits
///
/// - `Clone`: ids are copied into transitions, history and listener callbacks
/// - `Eq` + `Hash`: ids key the state table
/// - `Debug`: ids appear in build errors and log records
/// - `Send` + `Sync`: machines may be moved between threads by the host
///
/// # Example
///
/// ```rust
/// use statecraft::core::StateId;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum Door {
///     Open,
///     Closed,
/// }
///
/// fn assert_state_id<S: StateId>() {}
///
/// assert_state_id::<Door>();
/// assert_state_id::<String>();
/// assert_state_id::<&'static str>();
/// ```
pub trait StateId: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> StateId for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// Identifier of an event.
///
/// Same bounds as [`StateId`]; kept separate so signatures read clearly.
pub trait EventId: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> EventId for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Clone, PartialEq, Eq, Hash, Debug)]
    enum TestState {
        Initial,
        Processing,
        Complete,
    }

    fn ids<S: StateId>(values: &[S]) -> HashSet<S> {
        values.iter().cloned().collect()
    }

    #[test]
    fn enum_ids_are_hashable_and_comparable() {
        let set = ids(&[
            TestState::Initial,
            TestState::Processing,
            TestState::Complete,
            TestState::Initial,
        ]);

        assert_eq!(set.len(), 3);
        assert!(set.contains(&TestState::Processing));
    }

    #[test]
    fn string_ids_qualify() {
        let set = ids(&["S1".to_string(), "S2".to_string()]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn integer_event_ids_qualify() {
        fn takes_event<E: EventId>(event: E) -> E {
            event
        }

        assert_eq!(takes_event(42u32), 42);
    }
}
