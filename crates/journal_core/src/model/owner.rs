//! Wallet owner identity.
//!
//! # Responsibility
//! - Validate and normalize the wallet address that scopes all records.
//!
//! # Invariants
//! - Stored form is `0x` + 40 lower-case hex digits.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static WALLET_ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0[xX][0-9a-fA-F]{40}$").expect("valid wallet address regex"));

/// Errors from owner address parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerAddressError {
    /// Input is not `0x` followed by 40 hex digits.
    Malformed(String),
}

impl Display for OwnerAddressError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(value) => write!(f, "malformed wallet address: `{value}`"),
        }
    }
}

impl Error for OwnerAddressError {}

/// Authenticated wallet address owning notes and folders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerAddress(String);

impl OwnerAddress {
    /// Parses and normalizes a wallet address.
    pub fn parse(value: &str) -> Result<Self, OwnerAddressError> {
        let trimmed = value.trim();
        if !WALLET_ADDRESS_RE.is_match(trimmed) {
            return Err(OwnerAddressError::Malformed(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Returns the normalized `0x...` form.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for OwnerAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OwnerAddress {
    type Error = OwnerAddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value.as_str())
    }
}

impl From<OwnerAddress> for String {
    fn from(value: OwnerAddress) -> Self {
        value.0
    }
}
