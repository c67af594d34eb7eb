//! Ethereum account addresses with EIP-55 checksums.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::constants::{ADDRESS_HEX_LEN, ADDRESS_SIZE};
use crate::error::{Result, ShadeError};

/// A 20-byte Ethereum address.
///
/// Equality is on bytes, so comparison is case-insensitive with respect to
/// any textual form. Displays and serializes with the EIP-55 checksum.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    bytes: [u8; ADDRESS_SIZE],
}

impl Address {
    /// Creates an address from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; ADDRESS_SIZE] = bytes.try_into().map_err(|_| {
            ShadeError::InvalidAddress(format!(
                "expected {} bytes, got {}",
                ADDRESS_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self { bytes: arr })
    }

    /// Creates from a fixed-size array.
    pub fn from_array(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.bytes
    }

    /// Parses a hex address (with or without `0x`).
    ///
    /// All-lowercase and all-uppercase input is accepted as is; mixed-case
    /// input must carry a correct EIP-55 checksum.
    pub fn from_hex(s: &str) -> Result<Self> {
        let body = s.strip_prefix("0x").unwrap_or(s);
        if body.len() != ADDRESS_SIZE * 2 {
            return Err(ShadeError::InvalidAddress(format!(
                "expected {} hex characters, got {}",
                ADDRESS_SIZE * 2,
                body.len()
            )));
        }

        let bytes = hex::decode(body)
            .map_err(|e| ShadeError::InvalidAddress(format!("{}: {}", s, e)))?;
        let address = Self::from_bytes(&bytes)?;

        if is_mixed_case(body) && address.to_checksum_string()[2..] != *body {
            return Err(ShadeError::InvalidAddress(format!("bad EIP-55 checksum: {}", s)));
        }

        Ok(address)
    }

    /// Returns the EIP-55 checksummed `0x` string.
    pub fn to_checksum_string(&self) -> String {
        let lower = hex::encode(self.bytes);
        let hash = Keccak256::digest(lower.as_bytes());

        let mut out = String::with_capacity(ADDRESS_HEX_LEN);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }

    /// Returns the lowercase `0x` string.
    pub fn to_lower_hex(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }

    /// Returns the zero address.
    pub fn zero() -> Self {
        Self {
            bytes: [0u8; ADDRESS_SIZE],
        }
    }

    /// Returns true if this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.bytes.iter().all(|&b| b == 0)
    }
}

fn is_mixed_case(body: &str) -> bool {
    body.bytes().any(|b| b.is_ascii_lowercase()) && body.bytes().any(|b| b.is_ascii_uppercase())
}

/// Pure format check for an address string.
///
/// Requires `0x` + 40 hex characters; mixed case must match EIP-55.
/// Says nothing about whether the address is reachable or funded.
pub fn is_valid_address(s: &str) -> bool {
    s.len() == ADDRESS_HEX_LEN && s.starts_with("0x") && Address::from_hex(s).is_ok()
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address({})", self.to_checksum_string())
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_checksum_string())
    }
}

impl std::str::FromStr for Address {
    type Err = ShadeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_checksum_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    // Vectors from EIP-55
    #[test_case("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed")]
    #[test_case("0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359")]
    #[test_case("0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB")]
    #[test_case("0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb")]
    fn test_eip55_checksum(expected: &str) {
        let addr = Address::from_hex(&expected.to_lowercase()).unwrap();
        assert_eq!(addr.to_checksum_string(), expected);
        assert!(is_valid_address(expected));
    }

    #[test]
    fn test_bad_checksum_rejected() {
        // Flip the case of one letter in a valid checksummed address
        let bad = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD";
        assert!(Address::from_hex(bad).is_err());
        assert!(!is_valid_address(bad));
    }

    #[test_case("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed", true ; "all lowercase")]
    #[test_case("0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED", true ; "all uppercase")]
    #[test_case("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed", false ; "missing prefix")]
    #[test_case("0x5aaeb6053f3e94c9b9a09f33669435e7ef1bea", false ; "too short")]
    #[test_case("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaedaa", false ; "too long")]
    #[test_case("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beagg", false ; "non hex")]
    #[test_case("", false ; "empty")]
    fn test_is_valid_address(input: &str, expected: bool) {
        assert_eq!(is_valid_address(input), expected);
    }

    #[test]
    fn test_address_formatting() {
        let addr = Address::from_array([0xAB; 20]);
        let s = addr.to_checksum_string();
        assert!(s.starts_with("0x"));
        assert_eq!(s.len(), 42);
        assert_eq!(addr.to_lower_hex(), format!("0x{}", "ab".repeat(20)));
    }

    #[test]
    fn test_case_insensitive_equality() {
        let a = Address::from_hex("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        let b = Address::from_hex("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_address_zero() {
        assert!(Address::zero().is_zero());
        assert!(!Address::from_array([1; 20]).is_zero());
    }

    #[test]
    fn test_address_serde_uses_checksum() {
        let addr = Address::from_hex("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, back);
    }

    proptest::proptest! {
        #[test]
        fn prop_checksum_form_parses_back(bytes in proptest::array::uniform20(proptest::num::u8::ANY)) {
            let addr = Address::from_array(bytes);
            let checksummed = addr.to_checksum_string();
            proptest::prop_assert!(is_valid_address(&checksummed));
            proptest::prop_assert_eq!(Address::from_hex(&checksummed).unwrap(), addr);
            proptest::prop_assert_eq!(checksummed.to_lowercase(), addr.to_lower_hex());
        }
    }
}
