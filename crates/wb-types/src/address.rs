use alloy_primitives::Address;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::ParseError;

/// An account identifier held in canonical EIP-55 checksummed form.
///
/// Parsing accepts all-lowercase or all-uppercase hex (with or without the
/// `0x` prefix). Mixed-case input is treated as a checksum claim and must
/// match, the same rule wallets apply before signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WalletAddress(Address);

impl WalletAddress {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let trimmed = input.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseError::InvalidAddress(input.to_owned()));
        }

        let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());

        let address = if has_lower && has_upper {
            Address::parse_checksummed(format!("0x{hex}"), None)
                .map_err(|_| ParseError::BadChecksum(input.to_owned()))?
        } else {
            Address::from_str(hex).map_err(|_| ParseError::InvalidAddress(input.to_owned()))?
        };

        Ok(Self(address))
    }

    pub fn as_address(&self) -> &Address {
        &self.0
    }

    pub fn checksummed(&self) -> String {
        self.0.to_checksum(None)
    }

    /// `0x1234…abcd`, for compact log lines.
    pub fn short(&self) -> String {
        let full = self.checksummed();
        format!("{}…{}", &full[..6], &full[full.len() - 4..])
    }
}

impl From<Address> for WalletAddress {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl FromStr for WalletAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.checksummed())
    }
}

impl Serialize for WalletAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.checksummed())
    }
}

impl<'de> Deserialize<'de> for WalletAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
