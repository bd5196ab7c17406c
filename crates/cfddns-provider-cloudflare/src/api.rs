//! Cloudflare API v4 wire types

use serde::{Deserialize, Serialize};

/// Response envelope shared by every Cloudflare API v4 endpoint
#[derive(Debug, Deserialize)]
pub struct CloudflareResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<CloudflareApiError>,
    pub result: Option<T>,
}

/// One entry of the envelope's `errors` list
#[derive(Debug, Clone, Deserialize)]
pub struct CloudflareApiError {
    pub code: i64,
    pub message: String,
}

impl std::fmt::Display for CloudflareApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Body of `PUT /zones/{zone_id}/dns_records/{record_id}`
#[derive(Debug, Serialize)]
pub struct UpdateRecordRequest<'a> {
    #[serde(rename = "type")]
    pub record_type: &'a str,
    pub name: &'a str,
    pub content: &'a str,
    /// `1` means automatic
    pub ttl: u32,
    pub proxied: bool,
}

/// Entry of `GET /zones`
#[derive(Debug, Deserialize)]
pub struct Zone {
    pub id: String,
}

/// Entry of `GET /zones/{zone_id}/dns_records`
#[derive(Debug, Deserialize)]
pub struct DnsRecord {
    pub id: String,
}

/// Render the envelope's error list as `[code] message; [code] message`
///
/// Falls back to the raw body when it is not an envelope or carries no errors.
pub fn describe_errors(body: &str) -> String {
    let errors = serde_json::from_str::<CloudflareResponse<serde_json::Value>>(body)
        .map(|envelope| envelope.errors)
        .unwrap_or_default();

    if errors.is_empty() {
        let body = body.trim();
        if body.is_empty() {
            return "empty response body".to_string();
        }
        return body.to_string();
    }

    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
