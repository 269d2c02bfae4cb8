//! Key-value store shared by the guards and actions of one machine.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// Boxed value held by a [`Context`].
pub type ContextValue = Box<dyn Any + Send + Sync>;

/// String-keyed store of arbitrarily typed values.
///
/// Every machine owns exactly one context for its whole lifetime. Actions
/// write to it, guards read from it. Values of any `'static + Send + Sync`
/// type can be stored; typed accessors downcast on the way out.
///
/// # Example
///
/// ```rust
/// use statecraft::core::Context;
///
/// let mut context = Context::new();
/// context.set_value("attempts", 1u32);
///
/// if let Some(attempts) = context.get_mut::<u32>("attempts") {
///     *attempts += 1;
/// }
///
/// assert_eq!(context.get::<u32>("attempts"), Some(&2));
/// assert_eq!(context.get::<String>("attempts"), None);
/// ```
#[derive(Default)]
pub struct Context {
    values: HashMap<String, ContextValue>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Untyped lookup.
    pub fn get_value(&self, key: &str) -> Option<&(dyn Any + Send + Sync)> {
        self.values.get(key).map(|value| value.as_ref())
    }

    /// Store `value` under `key`, returning whatever was stored there before.
    pub fn set_value<K, T>(&mut self, key: K, value: T) -> Option<ContextValue>
    where
        K: Into<String>,
        T: Any + Send + Sync,
    {
        self.values.insert(key.into(), Box::new(value))
    }

    /// Remove and return the value under `key`.
    pub fn remove_value(&mut self, key: &str) -> Option<ContextValue> {
        self.values.remove(key)
    }

    /// Typed lookup. `None` if the key is absent or holds another type.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|value| value.downcast_ref::<T>())
    }

    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.values
            .get_mut(key)
            .and_then(|value| value.downcast_mut::<T>())
    }

    /// Typed removal.
    ///
    /// A value of a different type is left in place.
    pub fn take<T: Any>(&mut self, key: &str) -> Option<T> {
        if !self.values.get(key).is_some_and(|value| value.is::<T>()) {
            return None;
        }
        self.values
            .remove(key)
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.values.keys().collect();
        keys.sort();
        f.debug_struct("Context").field("keys", &keys).finish()
    }
}
