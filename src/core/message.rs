//! The message envelope delivered to a running machine.

use super::state::EventId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// An event together with an optional, opaque payload.
///
/// Payloads are carried as [`serde_json::Value`] so guards and actions can
/// read them back into whatever type the host agreed on.
///
/// # Example
///
/// ```rust
/// use statecraft::core::Message;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize, PartialEq, Debug)]
/// struct Coin {
///     cents: u32,
/// }
///
/// let message = Message::try_with_payload("coin", &Coin { cents: 25 }).unwrap();
///
/// assert_eq!(message.event(), &"coin");
/// assert_eq!(message.payload_as::<Coin>(), Some(Coin { cents: 25 }));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Message<E: EventId> {
    event: E,
    payload: Option<Value>,
}

impl<E: EventId> Message<E> {
    /// Create a message without a payload.
    pub fn new(event: E) -> Self {
        Self {
            event,
            payload: None,
        }
    }

    /// Create a message carrying an already-encoded payload.
    pub fn with_payload(event: E, payload: Value) -> Self {
        Self {
            event,
            payload: Some(payload),
        }
    }

    /// Create a message by serializing `payload`.
    pub fn try_with_payload<T: Serialize>(event: E, payload: &T) -> serde_json::Result<Self> {
        Ok(Self::with_payload(event, serde_json::to_value(payload)?))
    }

    pub fn event(&self) -> &E {
        &self.event
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// Decode the payload into `T`.
    ///
    /// Returns `None` when there is no payload or it does not decode as `T`.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.payload
            .as_ref()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

impl<E: EventId> From<E> for Message<E> {
    fn from(event: E) -> Self {
        Self::new(event)
    }
}
