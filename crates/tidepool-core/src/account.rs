// crates/tidepool-core/src/account.rs
//
// Account addresses.
//
// Every balance holder — external accounts, the vault's custody account,
// and asset ledgers themselves — is identified by a 20-byte address.
// Addresses display and serialize as 0x-prefixed lowercase hex so they can
// key JSON maps in state snapshots.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::VaultError;

/// A 20-byte account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Raw bytes of the address.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Address(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl FromStr for Address {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix("0x").unwrap_or(s);
        if !hex.is_ascii() {
            return Err(VaultError::Serialization(
                "invalid hex in address".to_string(),
            ));
        }
        if hex.len() != 40 {
            return Err(VaultError::Serialization(format!(
                "address must be 40 hex chars, got {}",
                hex.len()
            )));
        }
        let mut bytes = [0u8; 20];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|e| {
                VaultError::Serialization(format!("invalid hex in address: {}", e))
            })?;
        }
        Ok(Address(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

struct AddressVisitor;

impl Visitor<'_> for AddressVisitor {
    type Value = Address;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a 0x-prefixed 40-character hex address")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Address, E> {
        v.parse().map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(AddressVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let addr = Address([0xab; 20]);
        assert_eq!(
            addr.to_string(),
            "0xabababababababababababababababababababab"
        );
    }

    #[test]
    fn test_parse_roundtrip() {
        let addr = Address([0x3c; 20]);
        let parsed: Address = addr.to_string().parse().unwrap();
        assert_eq!(parsed, addr);
    }

    #[test]
    fn test_parse_without_prefix() {
        let parsed: Address = "0101010101010101010101010101010101010101".parse().unwrap();
        assert_eq!(parsed, Address([0x01; 20]));
    }

    #[test]
    fn test_parse_rejects_bad_length() {
        assert!("0x1234".parse::<Address>().is_err());
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        assert!("0xzzababababababababababababababababababab"
            .parse::<Address>()
            .is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let addr = Address([0x42; 20]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_serde_as_map_key() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(Address([0x11; 20]), 5u64);
        let json = serde_json::to_string(&map).unwrap();
        let back: HashMap<Address, u64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get(&Address([0x11; 20])), Some(&5));
    }
}
