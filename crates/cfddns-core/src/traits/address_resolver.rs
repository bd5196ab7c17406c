// # Address Resolver Trait
//
// Defines the interface for looking up the host's current public address.
//
// ## Implementations
//
// - HTTP lookup service (ipify-style): `cfddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use cfddns_core::AddressResolver;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let resolver = /* AddressResolver implementation */;
//
//     let current = resolver.resolve_current_address().await?;
//     println!("public address: {}", current);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::address::Address;

/// Trait for address resolver implementations
///
/// A resolver answers one question per call: what is the public address
/// right now. It is a read-only observer.
///
/// ## Allowed
/// - One outbound read request per call
///
/// ## Not Allowed
/// - Retrying or sleeping (the external scheduler owns cadence)
/// - Caching a previous answer between calls
/// - Touching the state store or the DNS provider
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Resolve the current public address
    ///
    /// # Returns
    ///
    /// - `Ok(Address)`: The address exactly as the lookup service reported it
    /// - `Err(Error::ResolutionFailed)`: Transport failure, non-2xx status or
    ///   malformed payload
    async fn resolve_current_address(&self) -> Result<Address, crate::Error>;

    /// Get the resolver name (for logging/debugging)
    fn resolver_name(&self) -> &'static str;
}
