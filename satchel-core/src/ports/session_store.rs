//! Session store port - durable string key-value storage

use crate::domain::result::Result;

/// Durable string-keyed store holding the persisted session record
///
/// Writes are synchronous: once `apply` returns the change is durable.
pub trait SessionStore: Send + Sync {
    /// Read a single entry
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Apply a batch of changes atomically. `None` removes the key.
    fn apply(&self, changes: &[(&str, Option<&str>)]) -> Result<()>;

    /// Set a single entry
    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.apply(&[(key, Some(value))])
    }

    /// Remove a single entry
    fn remove(&self, key: &str) -> Result<()> {
        self.apply(&[(key, None)])
    }
}
