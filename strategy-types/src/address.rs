use crate::error::TypesError;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A `0x`-prefixed, 20-byte hex-encoded on-chain address.
///
/// Used for pairs, tokens, wallets, and the custody contract alike — the
/// core never needs to distinguish the address *kind* structurally, only
/// by the role it plays in a given call (mirrors `jackbot-instrument`'s
/// preference for small validated newtypes over stringly-typed fields).
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Display, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_well_formed(s: &str) -> bool {
        s.len() == 42
            && s.starts_with("0x")
            && s[2..].chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl FromStr for Address {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if Self::is_well_formed(s) {
            Ok(Self(s.to_ascii_lowercase()))
        } else {
            Err(TypesError::BadAddress(s.to_string()))
        }
    }
}

impl TryFrom<String> for Address {
    type Error = TypesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_address() {
        let addr: Address = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".parse().unwrap();
        assert_eq!(addr.as_str(), "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
    }

    #[test]
    fn rejects_short_address() {
        assert!("0xAAAA".parse::<Address>().is_err());
    }

    #[test]
    fn rejects_missing_prefix() {
        let bad = "A".repeat(40);
        assert!(bad.parse::<Address>().is_err());
    }

    #[test]
    fn rejects_non_hex_characters() {
        let bad = format!("0x{}", "g".repeat(40));
        assert!(bad.parse::<Address>().is_err());
    }
}
