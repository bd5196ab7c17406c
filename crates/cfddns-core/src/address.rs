//! The address value compared and persisted by the sync cycle

use serde::{Deserialize, Serialize};
use std::fmt;

/// A public network address as reported by the lookup service.
///
/// The value is opaque: it is never parsed as an IP address. Two addresses
/// are equal iff their strings are byte-identical, so `"2001:db8::1"` and
/// `"2001:0db8::1"` are different addresses, as are `"203.0.113.5"` and
/// `"203.0.113.5 "`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wrap an address string without any normalization
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The address exactly as received
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the address and return the inner string
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
