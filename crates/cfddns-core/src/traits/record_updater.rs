// # Record Updater Trait
//
// Defines the interface for pushing an address into a DNS provider's record.
//
// ## Implementations
//
// - Cloudflare: `cfddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use cfddns_core::{Address, RecordReference, RecordUpdater};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let updater = /* RecordUpdater implementation */;
//     let record = RecordReference::new("zone-id", "record-id", "home.example.com");
//
//     updater.apply_address(&record, &Address::from("203.0.113.5")).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::address::Address;

/// Identifies the DNS record to update
///
/// An opaque (zone identifier, record identifier, record name) triple taken
/// from configuration. Nothing in the core validates or resolves it; the
/// zone and record IDs are obtained once with the lookup tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordReference {
    /// Provider zone identifier
    pub zone_id: String,
    /// Provider record identifier
    pub record_id: String,
    /// Record name (e.g., "home.example.com" or "*.example.com")
    pub name: String,
}

impl RecordReference {
    /// Create a new record reference
    pub fn new(
        zone_id: impl Into<String>,
        record_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            zone_id: zone_id.into(),
            record_id: record_id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RecordReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (zone {}, record {})", self.name, self.zone_id, self.record_id)
    }
}

/// Trait for record updater implementations
///
/// # Trust Level: Untrusted
///
/// Updaters are external integrations and are kept single-shot:
///
/// ## Allowed Capabilities
/// - ✅ Perform exactly one authenticated write request per call
/// - ✅ Parse the provider's response and attach its error payload on failure
///
/// ## Forbidden Capabilities
/// - ❌ Retry or back off (a failed cycle is retried by the next scheduled run)
/// - ❌ Decide whether an update is needed (owned by `SyncController`)
/// - ❌ Access the state store (owned by `SyncController`)
/// - ❌ Read the current record first (the write is unconditional)
#[async_trait]
pub trait RecordUpdater: Send + Sync {
    /// Set the record's content to `address`
    ///
    /// # Parameters
    ///
    /// - `record`: The record to write
    /// - `address`: The new content
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The provider confirmed the update
    /// - `Err(Error::UpdateFailed)`: Transport failure, non-2xx status, or a
    ///   response reporting failure; carries the provider's error payload
    async fn apply_address(
        &self,
        record: &RecordReference,
        address: &Address,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
