//! Configuration types for cfddns
//!
//! One immutable [`SyncConfig`] is built at startup and handed to the
//! components at construction time. Nothing reads configuration after that.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::traits::RecordReference;

/// Default address lookup service (returns `{"ip": "..."}`)
pub const DEFAULT_LOOKUP_URL: &str = "https://api.ipify.org?format=json";

/// Default Cloudflare API v4 base URL
pub const DEFAULT_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default state file, relative to the working directory
pub const DEFAULT_STATE_FILE: &str = "current_ip.txt";

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Main sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Address lookup service
    pub resolver: ResolverConfig,

    /// DNS provider credentials and endpoint
    pub provider: ProviderConfig,

    /// The record to keep in sync
    pub record: RecordConfig,

    /// Path of the last-applied-address file
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
}

impl SyncConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.resolver.validate()?;
        self.provider.validate()?;
        self.record.validate()?;

        if self.state_file.as_os_str().is_empty() {
            return Err(crate::Error::config("State file path cannot be empty"));
        }

        Ok(())
    }
}

/// Address lookup service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// URL to fetch the address from
    #[serde(default = "default_lookup_url")]
    pub url: String,

    /// How the response body carries the address
    #[serde(default)]
    pub format: ResponseFormat,

    /// Request timeout (in seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ResolverConfig {
    /// Validate the resolver configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.url.is_empty() {
            return Err(crate::Error::config("Address lookup URL cannot be empty"));
        }
        if !self.url.starts_with("https://") && !self.url.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "Address lookup URL must use HTTP or HTTPS scheme. Got: {}",
                self.url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Address lookup timeout must be > 0"));
        }
        Ok(())
    }

    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            url: default_lookup_url(),
            format: ResponseFormat::default(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Response body format of the lookup service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// JSON object with an `ip` string field
    #[default]
    Json,
    /// The whole body is the address
    PlainText,
}

/// DNS provider configuration
///
/// The `Debug` implementation never prints the API token.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Bearer token with DNS edit permission on the zone
    pub api_token: String,

    /// API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Request timeout (in seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// Create a provider configuration with default endpoint and timeout
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.api_token.is_empty() {
            return Err(crate::Error::config("API token cannot be empty"));
        }
        if self.api_base.is_empty() {
            return Err(crate::Error::config("API base URL cannot be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(crate::Error::config("Provider timeout must be > 0"));
        }
        Ok(())
    }

    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_token", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// DNS record configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordConfig {
    /// Zone ID
    pub zone_id: String,

    /// Record ID
    pub record_id: String,

    /// Record name (e.g., "home.example.com" or "*.example.com")
    pub name: String,

    /// Record type written on every update
    #[serde(default)]
    pub record_type: RecordType,

    /// Route traffic through the provider's edge
    #[serde(default = "default_proxied")]
    pub proxied: bool,
}

impl RecordConfig {
    /// Create a new record configuration (type A, proxied)
    pub fn new(
        zone_id: impl Into<String>,
        record_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            zone_id: zone_id.into(),
            record_id: record_id.into(),
            name: name.into(),
            record_type: RecordType::default(),
            proxied: default_proxied(),
        }
    }

    /// Set the record type
    pub fn with_record_type(mut self, record_type: RecordType) -> Self {
        self.record_type = record_type;
        self
    }

    /// Enable or disable proxying
    pub fn with_proxied(mut self, proxied: bool) -> Self {
        self.proxied = proxied;
        self
    }

    /// The (zone, record, name) triple the controller works with
    pub fn reference(&self) -> RecordReference {
        RecordReference::new(&self.zone_id, &self.record_id, &self.name)
    }

    /// Validate the record configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.zone_id.is_empty() {
            return Err(crate::Error::config("Zone ID cannot be empty"));
        }
        if self.record_id.is_empty() {
            return Err(crate::Error::config("Record ID cannot be empty"));
        }
        if self.name.is_empty() {
            return Err(crate::Error::config("Record name cannot be empty"));
        }
        Ok(())
    }
}

/// DNS record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// A record (IPv4)
    #[default]
    A,
    /// AAAA record (IPv6)
    Aaaa,
}

impl RecordType {
    /// Wire name of the record type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecordType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::Aaaa),
            other => Err(crate::Error::config(format!(
                "Unsupported record type '{}'. Supported: A, AAAA",
                other
            ))),
        }
    }
}

fn default_lookup_url() -> String {
    DEFAULT_LOOKUP_URL.to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_state_file() -> PathBuf {
    PathBuf::from(DEFAULT_STATE_FILE)
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_proxied() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SyncConfig {
        SyncConfig {
            resolver: ResolverConfig::default(),
            provider: ProviderConfig::new("0123456789abcdef0123456789abcdef01234567"),
            record: RecordConfig::new("zone-1", "record-1", "*.example.com"),
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
        }
    }

    #[test]
    fn test_sample_is_valid() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_empty_fields_rejected() {
        let mut config = sample();
        config.provider.api_token.clear();
        assert!(config.validate().is_err());

        let mut config = sample();
        config.record.record_id.clear();
        assert!(config.validate().is_err());

        let mut config = sample();
        config.resolver.url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = sample();
        config.resolver.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_record_reference_from_config() {
        let reference = sample().record.reference();
        assert_eq!(reference, RecordReference::new("zone-1", "record-1", "*.example.com"));
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let config: SyncConfig = serde_json::from_value(serde_json::json!({
            "resolver": {},
            "provider": { "api_token": "token" },
            "record": { "zone_id": "z", "record_id": "r", "name": "example.com" }
        }))
        .unwrap();

        assert_eq!(config.resolver.url, DEFAULT_LOOKUP_URL);
        assert_eq!(config.resolver.format, ResponseFormat::Json);
        assert_eq!(config.provider.api_base, DEFAULT_API_BASE);
        assert_eq!(config.record.record_type, RecordType::A);
        assert!(config.record.proxied);
        assert_eq!(config.state_file, PathBuf::from("current_ip.txt"));
    }

    #[test]
    fn test_record_type_parse() {
        assert_eq!("a".parse::<RecordType>().unwrap(), RecordType::A);
        assert_eq!("AAAA".parse::<RecordType>().unwrap(), RecordType::Aaaa);
        assert!("CNAME".parse::<RecordType>().is_err());
        assert_eq!(RecordType::Aaaa.to_string(), "AAAA");
    }

    #[test]
    fn test_api_token_not_exposed_in_debug() {
        let debug_str = format!("{:?}", ProviderConfig::new("secret_token_12345"));
        assert!(!debug_str.contains("secret_token"));
        assert!(debug_str.contains("<REDACTED>"));
    }
}
