//! Cloudflare API v4 client
//!
//! One HTTP request per method call. No retries, no caching: callers decide
//! what to do with a failure.

use cfddns_core::config::{ProviderConfig, RecordType};
use cfddns_core::{Error, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::api::{CloudflareResponse, DnsRecord, UpdateRecordRequest, Zone, describe_errors};

const PROVIDER: &str = "cloudflare";

/// Cloudflare API client
///
/// # Security
///
/// The Debug implementation does NOT expose the API token, and the token is
/// never part of a log line or error message.
pub struct CloudflareClient {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL without trailing slash
    base_url: String,

    /// HTTP client (carries the request timeout)
    http: reqwest::Client,
}

impl std::fmt::Debug for CloudflareClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareClient")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CloudflareClient {
    /// Create a new Cloudflare client
    ///
    /// Fails fast on an empty token or when the HTTP client cannot be built.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        if config.api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token: config.api_token.clone(),
            base_url: config.api_base.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// API base URL in use
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Overwrite a DNS record's content
    ///
    /// # API Call
    ///
    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// Authorization: Bearer <token>
    ///
    /// {"type": "A", "name": "...", "content": "...", "ttl": 1, "proxied": true}
    /// ```
    ///
    /// Succeeds only on a 2xx response whose envelope reports `success: true`.
    pub async fn update_dns_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record_type: RecordType,
        name: &str,
        content: &str,
        proxied: bool,
    ) -> Result<()> {
        let url = format!("{}/zones/{}/dns_records/{}", self.base_url, zone_id, record_id);
        let payload = UpdateRecordRequest {
            record_type: record_type.as_str(),
            name,
            content,
            ttl: 1,
            proxied,
        };

        tracing::debug!("PUT {} ({} {} -> {})", url, record_type, name, content);

        let response = self
            .http
            .put(&url)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::http(format!("Request to Cloudflare failed: {}", e)))?;

        let _: CloudflareResponse<serde_json::Value> =
            self.read_envelope(response, &format!("record {}", name)).await?;
        Ok(())
    }

    /// Look up the ID of the zone named `domain`
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /zones?name=example.com
    /// Authorization: Bearer <token>
    /// ```
    ///
    /// Returns `Ok(None)` when no zone matches.
    pub async fn find_zone_id(&self, domain: &str) -> Result<Option<String>> {
        let url = format!("{}/zones", self.base_url);
        tracing::debug!("Looking up zone ID for domain: {}", domain);

        let zones: Vec<Zone> = self
            .get_list(&url, &[("name", domain)], &format!("zone {}", domain))
            .await?;

        Ok(zones.into_iter().next().map(|zone| zone.id))
    }

    /// Look up the ID of the record named `name` in `zone_id`
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?name=home.example.com
    /// Authorization: Bearer <token>
    /// ```
    ///
    /// Returns `Ok(None)` when no record matches.
    pub async fn find_record_id(&self, zone_id: &str, name: &str) -> Result<Option<String>> {
        let url = format!("{}/zones/{}/dns_records", self.base_url, zone_id);
        tracing::debug!("Looking up record ID: {} (zone {})", name, zone_id);

        let records: Vec<DnsRecord> = self
            .get_list(&url, &[("name", name)], &format!("record {}", name))
            .await?;

        Ok(records.into_iter().next().map(|record| record.id))
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        subject: &str,
    ) -> Result<Vec<T>> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.api_token)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::http(format!("Request to Cloudflare failed: {}", e)))?;

        let envelope: CloudflareResponse<Vec<T>> = self.read_envelope(response, subject).await?;
        Ok(envelope.result.unwrap_or_default())
    }

    /// Check status and envelope of a response
    ///
    /// Non-2xx statuses are mapped by class; a 2xx body that is not an
    /// envelope, or that reports `success: false`, is a provider error.
    async fn read_envelope<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        subject: &str,
    ) -> Result<CloudflareResponse<T>> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read Cloudflare response: {}", e)))?;

        if !status.is_success() {
            return Err(status_error(status, &body, subject));
        }

        let envelope: CloudflareResponse<T> = serde_json::from_str(&body).map_err(|e| {
            Error::provider(
                PROVIDER,
                format!("Unexpected response for {} ({}): {}", subject, e, body.trim()),
            )
        })?;

        if !envelope.success {
            return Err(Error::provider(
                PROVIDER,
                format!("Request for {} was not successful: {}", subject, describe_errors(&body)),
            ));
        }

        Ok(envelope)
    }
}

/// Map a non-2xx status to an error carrying Cloudflare's error details
fn status_error(status: StatusCode, body: &str, subject: &str) -> Error {
    let details = describe_errors(body);

    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "Invalid API token or insufficient permissions for {}. Status: {} - {}",
            subject, status, details
        )),
        404 => Error::not_found(format!("{} (status {}): {}", subject, status, details)),
        409 => Error::provider(
            PROVIDER,
            format!("Conflict updating {}. Status: {} - {}", subject, status, details),
        ),
        429 => Error::rate_limited(format!(
            "Cloudflare rate limit exceeded. Status: {} - {}",
            status, details
        )),
        500..=599 => Error::provider(
            PROVIDER,
            format!("Cloudflare server error (transient): {} - {}", status, details),
        ),
        _ => Error::provider(
            PROVIDER,
            format!("Request for {} failed: {} - {}", subject, status, details),
        ),
    }
}
