//! Environment configuration for the cfddns binary
//!
//! Variables are read through a lookup function so parsing can be tested
//! without touching the process environment. Empty values count as unset.

use anyhow::{Context, Result};
use cfddns_core::config::{
    DEFAULT_API_BASE, DEFAULT_LOOKUP_URL, DEFAULT_STATE_FILE, DEFAULT_TIMEOUT_SECS,
};
use cfddns_core::{ProviderConfig, RecordConfig, RecordType, ResolverConfig, ResponseFormat, SyncConfig};
use std::path::PathBuf;

/// Binary configuration, one field per environment variable
///
/// The `Debug` implementation never prints the API token.
#[derive(Clone)]
pub struct Config {
    pub api_token: String,
    pub zone_id: Option<String>,
    pub record_id: Option<String>,
    pub record_name: Option<String>,
    pub domain_name: Option<String>,
    pub proxied: bool,
    pub record_type: RecordType,
    pub state_file: PathBuf,
    pub lookup_url: String,
    pub lookup_format: ResponseFormat,
    pub timeout_secs: u64,
    pub api_base: String,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_token = var("API_TOKEN").context(
            "API_TOKEN is required. \
            Set it via: export API_TOKEN=your_cloudflare_token",
        )?;

        let proxied = match var("PROXIED") {
            Some(value) => parse_bool(&value).with_context(|| {
                format!("PROXIED '{}' is not valid. Use true/false, 1/0 or yes/no", value)
            })?,
            None => true,
        };

        let record_type = match var("RECORD_TYPE") {
            Some(value) => value
                .parse::<RecordType>()
                .map_err(|e| anyhow::anyhow!("RECORD_TYPE: {}", e))?,
            None => RecordType::default(),
        };

        let lookup_format = match var("IP_LOOKUP_FORMAT").as_deref() {
            None | Some("json") => ResponseFormat::Json,
            Some("plain_text") | Some("text") => ResponseFormat::PlainText,
            Some(other) => anyhow::bail!(
                "IP_LOOKUP_FORMAT '{}' is not supported. Supported formats: json, plain_text",
                other
            ),
        };

        let timeout_secs = match var("HTTP_TIMEOUT_SECS") {
            Some(value) => value
                .parse::<u64>()
                .with_context(|| format!("HTTP_TIMEOUT_SECS must be a number of seconds. Got: {}", value))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_token,
            zone_id: var("ZONE_ID"),
            record_id: var("RECORD_ID"),
            record_name: var("RECORD_NAME"),
            domain_name: var("DOMAIN_NAME"),
            proxied,
            record_type,
            state_file: var("IP_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE)),
            lookup_url: var("IP_LOOKUP_URL").unwrap_or_else(|| DEFAULT_LOOKUP_URL.to_string()),
            lookup_format,
            timeout_secs,
            api_base: var("CLOUDFLARE_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate settings shared by every command
    ///
    /// Command-specific variables (record, zone, domain) are checked when
    /// the command asks for them.
    pub fn validate(&self) -> Result<()> {
        // Check for obvious placeholder tokens (common mistake)
        let token_lower = self.api_token.to_lowercase();
        if token_lower.contains("your_token")
            || token_lower.contains("your_cloudflare_token")
            || token_lower.contains("replace_me")
            || token_lower.contains("changeme")
            || token_lower == "token"
        {
            anyhow::bail!(
                "API_TOKEN appears to be a placeholder. \
                Use an API token with DNS edit permission from the Cloudflare dashboard."
            );
        }

        if !(1..=60).contains(&self.timeout_secs) {
            anyhow::bail!(
                "HTTP_TIMEOUT_SECS must be between 1 and 60 seconds. Got: {}",
                self.timeout_secs
            );
        }

        for (name, url) in [("IP_LOOKUP_URL", &self.lookup_url), ("CLOUDFLARE_API_BASE", &self.api_base)] {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                anyhow::bail!("{} must use HTTP or HTTPS scheme. Got: {}", name, url);
            }
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Provider settings (token, API base, timeout)
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            api_token: self.api_token.clone(),
            api_base: self.api_base.clone(),
            timeout_secs: self.timeout_secs,
        }
    }

    /// Build the sync configuration; requires ZONE_ID, RECORD_ID and RECORD_NAME
    ///
    /// RECORD_NAME is passed to Cloudflare as given (`@`, a trailing dot and
    /// wildcards included); only presence is checked here.
    pub fn sync_config(&self) -> Result<SyncConfig> {
        let zone_id = require(&self.zone_id, "ZONE_ID")?;
        let record_id = require(&self.record_id, "RECORD_ID")?;
        let record_name = require(&self.record_name, "RECORD_NAME")?;

        let config = SyncConfig {
            resolver: ResolverConfig {
                url: self.lookup_url.clone(),
                format: self.lookup_format,
                timeout_secs: self.timeout_secs,
            },
            provider: self.provider_config(),
            record: RecordConfig::new(zone_id, record_id, record_name)
                .with_record_type(self.record_type)
                .with_proxied(self.proxied),
            state_file: self.state_file.clone(),
        };
        config.validate()?;

        Ok(config)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("record_id", &self.record_id)
            .field("record_name", &self.record_name)
            .field("domain_name", &self.domain_name)
            .field("proxied", &self.proxied)
            .field("record_type", &self.record_type)
            .field("state_file", &self.state_file)
            .field("lookup_url", &self.lookup_url)
            .field("lookup_format", &self.lookup_format)
            .field("timeout_secs", &self.timeout_secs)
            .field("api_base", &self.api_base)
            .field("log_level", &self.log_level)
            .finish()
    }
}

fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .with_context(|| format!("{} is required. Set it via: export {}=...", name, name))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Validate that a string is a valid domain name
///
/// Basic RFC 1035 checks. A leading `*` label is accepted for wildcard
/// records (e.g., "*.example.com").
pub fn validate_domain_name(domain: &str) -> Result<()> {
    if domain.is_empty() {
        anyhow::bail!("Domain name cannot be empty");
    }

    // Total length limit (RFC 1035: 253 chars max)
    if domain.len() > 253 {
        anyhow::bail!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        );
    }

    for (index, label) in domain.split('.').enumerate() {
        if label.is_empty() {
            anyhow::bail!("Domain name has empty label: '{}'", domain);
        }

        if index == 0 && label == "*" {
            continue;
        }

        if label.len() > 63 {
            anyhow::bail!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            );
        }

        if !label.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
            anyhow::bail!(
                "Domain label contains invalid characters. Label: '{}'. \
                Valid: alphanumeric, hyphen and underscore only.",
                label
            );
        }

        if label.starts_with('-') || label.ends_with('-') {
            anyhow::bail!(
                "Domain label cannot start or end with hyphen. Label: '{}'",
                label
            );
        }
    }

    Ok(())
}
