// # Memory State Store
//
// In-memory implementation of StateStore.
//
// ## Purpose
//
// Holds the last applied address in process memory. Useful for tests and for
// embedding the sync cycle in a long-running process that is fine with one
// redundant update after a restart.
//
// ## Crash Behavior
//
// - State is lost on restart
// - The first cycle after a restart always updates the record

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::address::Address;
use crate::traits::state_store::StateStore;
use crate::Error;

/// In-memory state store implementation
///
/// Clones share the same underlying value.
///
/// # Example
///
/// ```rust,no_run
/// use cfddns_core::state::MemoryStateStore;
/// use cfddns_core::traits::StateStore;
/// use cfddns_core::Address;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryStateStore::new();
///
///     store.write_last_address(&Address::from("203.0.113.5")).await?;
///
///     let last = store.read_last_address().await?;
///     assert_eq!(last, Some(Address::from("203.0.113.5")));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<Option<Address>>>,
}

impl MemoryStateStore {
    /// Create a new empty memory state store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `address`
    pub fn with_address(address: impl Into<Address>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(address.into()))),
        }
    }

    /// Current value, without going through the trait
    pub async fn snapshot(&self) -> Option<Address> {
        self.inner.read().await.clone()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn read_last_address(&self) -> Result<Option<Address>, Error> {
        Ok(self.inner.read().await.clone())
    }

    async fn write_last_address(&self, address: &Address) -> Result<(), Error> {
        *self.inner.write().await = Some(address.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
