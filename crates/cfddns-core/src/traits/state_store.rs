// # State Store Trait
//
// Defines the interface for persisting the last applied address.
//
// ## Purpose
//
// The state store is what makes repeated runs idempotent: when the resolved
// address equals the stored one, the cycle ends without calling the provider.
// It holds a single value and has no lifecycle of its own; the
// `SyncController` decides when it is read and written.
//
// ## Implementations
//
// - File-based: single plain-text file (`FileStateStore`)
// - In-memory: `MemoryStateStore` (tests, embedding)
//
// ## Usage
//
// ```rust,ignore
// use cfddns_core::{Address, StateStore};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let store = /* StateStore implementation */;
//
//     // Check last applied address
//     let last = store.read_last_address().await?;
//
//     // Record it after a confirmed DNS update
//     store.write_last_address(&Address::from("203.0.113.5")).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::address::Address;

/// Trait for state store implementations
///
/// # Trust Level: Trusted (Core Component)
///
/// ## Allowed Capabilities
/// - ✅ Perform I/O for persistent storage
///
/// ## Forbidden Capabilities
/// - ❌ Decide when to write (owned by `SyncController`)
/// - ❌ Delete the stored value
/// - ❌ Normalize addresses
///
/// ## Implementation Guidelines
///
/// - **Atomic replace**: after a crash the store holds either the previous
///   value or the new one, never a partial write
/// - **Absent is not an error**: a store that was never written reads as `None`
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Get the last applied address
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Address))`: The last applied address
    /// - `Ok(None)`: Nothing recorded yet (first run, or the file was removed)
    /// - `Err(Error)`: Storage error
    async fn read_last_address(&self) -> Result<Option<Address>, crate::Error>;

    /// Durably overwrite the last applied address
    ///
    /// Only called after the record updater confirmed the update.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Successfully persisted
    /// - `Err(Error)`: Storage error
    async fn write_last_address(&self, address: &Address) -> Result<(), crate::Error>;

    /// Human-readable location of the stored value (for logging)
    fn describe(&self) -> String;
}
