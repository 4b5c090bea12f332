use async_trait::async_trait;

use crate::error::KvError;

/// Trait for persisting client session state.
///
/// A deliberately small surface: string keys to string values, the shape
/// of browser local storage. Implementations must be `Send + Sync` and
/// safe for concurrent access.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Get the value for a key. Returns `None` if not present.
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Set a value, overwriting any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), KvError>;

    /// Remove a key. Returns `true` if the key existed.
    async fn remove(&self, key: &str) -> Result<bool, KvError>;
}
