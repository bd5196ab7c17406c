// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare record updater for cfddns, plus the zone
// and record ID lookups used to fill in its configuration.
//
// ## Architectural Constraints
//
// ### Trust Level: Untrusted (DNS Provider)
//
// **Allowed Capabilities**:
// - ✅ Perform HTTP/HTTPS API calls to the configured Cloudflare endpoint
// - ✅ Parse Cloudflare response envelopes
//
// **Forbidden Capabilities**:
// - ❌ Retry or back off (the next scheduled cycle is the retry)
// - ❌ Access the state store (owned by SyncController)
// - ❌ Derive the record type from the address (it is static configuration)
// - ❌ Spawn tasks or threads
//
// ## Security Requirements
//
// - API token NEVER appears in logs, errors or Debug output
// - Provider MUST fail fast if token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`
// - List DNS Records: GET `/zones/:zone_id/dns_records?name=...`
// - List Zones: GET `/zones?name=...`

pub mod api;
pub mod client;

pub use client::CloudflareClient;

use async_trait::async_trait;
use cfddns_core::config::{ProviderConfig, RecordConfig, RecordType};
use cfddns_core::traits::{RecordReference, RecordUpdater};
use cfddns_core::{Address, Error, Result};

/// Cloudflare record updater
///
/// # Trust Level: Untrusted
///
/// Exactly one PUT per `apply_address` call. The record type and proxied
/// flag are fixed at construction.
#[derive(Debug)]
pub struct CloudflareUpdater {
    client: CloudflareClient,
    record_type: RecordType,
    proxied: bool,
}

impl CloudflareUpdater {
    /// Create an updater from provider and record configuration
    pub fn new(provider: &ProviderConfig, record: &RecordConfig) -> Result<Self> {
        Ok(Self::with_client(
            CloudflareClient::new(provider)?,
            record.record_type,
            record.proxied,
        ))
    }

    /// Create an updater around an existing client
    pub fn with_client(client: CloudflareClient, record_type: RecordType, proxied: bool) -> Self {
        Self {
            client,
            record_type,
            proxied,
        }
    }

    /// Record type written on every update
    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    /// Whether updates set `proxied: true`
    pub fn proxied(&self) -> bool {
        self.proxied
    }
}

#[async_trait]
impl RecordUpdater for CloudflareUpdater {
    async fn apply_address(&self, record: &RecordReference, address: &Address) -> Result<()> {
        tracing::info!(
            "Updating Cloudflare DNS record: {} -> {} ({}, proxied: {})",
            record.name,
            address,
            self.record_type,
            self.proxied
        );

        self.client
            .update_dns_record(
                &record.zone_id,
                &record.record_id,
                self.record_type,
                &record.name,
                address.as_str(),
                self.proxied,
            )
            .await
            .map_err(|e| Error::update_failed(self.provider_name(), e.to_string()))
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}
