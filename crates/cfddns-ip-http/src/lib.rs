// # HTTP Address Resolver
//
// This crate provides the HTTP-based address resolver for cfddns.
//
// ## Purpose
//
// Asks a third-party lookup service which address the host's traffic comes
// from. Two body formats are understood:
// - `json`: `{"ip": "203.0.113.5"}` (e.g., `https://api.ipify.org?format=json`)
// - `plain_text`: the body is the address (e.g., `https://icanhazip.com`)
//
// ## Behavior
//
// One GET per call, bounded by the configured timeout. No caching and no
// retries: a failed lookup is reported and the caller skips the cycle.

use cfddns_core::config::{ResolverConfig, ResponseFormat};
use cfddns_core::traits::AddressResolver;
use cfddns_core::{Address, Error, Result};

use serde::Deserialize;

/// Body of a JSON lookup response
#[derive(Debug, Deserialize)]
struct LookupResponse {
    ip: String,
}

/// HTTP-based address resolver
pub struct HttpAddressResolver {
    /// URL to fetch the address from
    url: String,

    /// How the response body carries the address
    format: ResponseFormat,

    /// HTTP client (carries the request timeout)
    client: reqwest::Client,
}

impl HttpAddressResolver {
    /// Create a new HTTP address resolver
    ///
    /// Fails with a configuration error when the HTTP client cannot be built.
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: config.url.clone(),
            format: config.format,
            client,
        })
    }

    /// Extract the address from a response body
    fn parse_body(&self, body: &str) -> Result<Address> {
        let ip = match self.format {
            ResponseFormat::Json => {
                let parsed: LookupResponse = serde_json::from_str(body).map_err(|e| {
                    Error::resolution(format!("Malformed response from {}: {}", self.url, e))
                })?;
                parsed.ip
            }
            ResponseFormat::PlainText => body.trim().to_string(),
        };

        if ip.is_empty() {
            return Err(Error::resolution(format!(
                "Malformed response from {}: empty address",
                self.url
            )));
        }

        Ok(Address::new(ip))
    }
}

#[async_trait::async_trait]
impl AddressResolver for HttpAddressResolver {
    async fn resolve_current_address(&self) -> Result<Address> {
        tracing::debug!("Looking up current address via {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::resolution(format!("Request to {} failed: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::resolution(format!(
                "Lookup service {} returned HTTP {}",
                self.url, status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::resolution(format!("Failed to read response: {}", e)))?;

        self.parse_body(&body)
    }

    fn resolver_name(&self) -> &'static str {
        "http"
    }
}
