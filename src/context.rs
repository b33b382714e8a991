//! Per-request key-value store.
//!
//! Every [`Request`](crate::Request) carries one [`Context`], created empty
//! when the request is parsed. Middleware writes into it; handlers read from
//! it. It lives exactly as long as the request — nothing in it survives the
//! response.
//!
//! Keys and values are plain strings. This is deliberate: the store crosses
//! middleware boundaries, and a stringly-typed contract is the only one every
//! layer can agree on without sharing types.

use std::collections::HashMap;

/// The mutable per-request store.
///
/// ```rust
/// use zonal::Context;
///
/// let mut ctx = Context::new();
/// ctx.insert("dummy.time_zone", "Paris");
/// assert_eq!(ctx.get("dummy.time_zone"), Some("Paris"));
/// ```
#[derive(Debug, Default)]
pub struct Context {
    entries: HashMap<String, String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Stores `value` under `key`, returning the previous value if the key
    /// was already present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over all entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_returns_previous_value() {
        let mut ctx = Context::new();
        assert_eq!(ctx.insert("k", "a"), None);
        assert_eq!(ctx.insert("k", "b"), Some("a".to_owned()));
        assert_eq!(ctx.get("k"), Some("b"));
    }

    #[test]
    fn missing_key_is_none() {
        let ctx = Context::new();
        assert!(ctx.is_empty());
        assert_eq!(ctx.get("absent"), None);
        assert!(!ctx.contains_key("absent"));
    }
}
