//! Account address type with `0x` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An account address, always prefixed with `0x`.
///
/// Used both for owners on the authorization roster and for the targets of
/// submitted actions. The engine never interprets the part after the prefix.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// The standard prefix for all covault addresses.
    pub const PREFIX: &'static str = "0x";

    /// Create a new address from a raw string.
    ///
    /// # Panics
    /// Panics if the string does not start with `0x`.
    pub fn new(raw: impl Into<String>) -> Self {
        let s = raw.into();
        assert!(s.starts_with(Self::PREFIX), "address must start with 0x");
        Self(s)
    }

    /// Parse an address, returning `None` if it is not well-formed.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.starts_with(Self::PREFIX) && raw.len() > Self::PREFIX.len() {
            Some(Self(raw.to_string()))
        } else {
            None
        }
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate that this address is well-formed.
    pub fn is_valid(&self) -> bool {
        self.0.starts_with(Self::PREFIX) && self.0.len() > Self::PREFIX.len()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
