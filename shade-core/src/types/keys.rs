//! Key types for Shade.
//!
//! - [`PrivateKey`]: 32-byte secp256k1 scalar in `[1, n)`, zeroized on drop
//! - [`PublicKey`]: 33-byte SEC 1 compressed point
//! - [`KeyPair`]: private + public halves
//! - [`SharedSecret`]: hashed ECDH output, zeroized on drop
//!
//! These are byte containers with format checks only. Curve membership of a
//! public key is checked by `shade-crypto` when the point is decoded.

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::decode_prefixed_hex;
use crate::constants::{COMPRESSED_PUBLIC_KEY_SIZE, PRIVATE_KEY_SIZE, SECP256K1_ORDER, SHARED_SECRET_SIZE};
use crate::error::{Result, ShadeError};

// ═══════════════════════════════════════════════════════════════════════════════
// PRIVATE KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// secp256k1 private key.
///
/// Always a non-zero scalar below the group order. Never logged, never
/// serialized implicitly; use [`PrivateKey::to_hex`] deliberately.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    bytes: [u8; PRIVATE_KEY_SIZE],
}

impl PrivateKey {
    /// Creates a private key from raw big-endian bytes.
    ///
    /// # Errors
    /// `InvalidKeyFormat` if the length is not 32 or the scalar is zero or `>= n`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; PRIVATE_KEY_SIZE] = bytes.try_into().map_err(|_| {
            ShadeError::InvalidKeyFormat(format!(
                "private key must be {} bytes, got {}",
                PRIVATE_KEY_SIZE,
                bytes.len()
            ))
        })?;
        Self::from_array(arr)
    }

    /// Creates a private key from a fixed-size array.
    pub fn from_array(bytes: [u8; PRIVATE_KEY_SIZE]) -> Result<Self> {
        if !is_valid_scalar(&bytes) {
            return Err(ShadeError::InvalidKeyFormat(
                "private key is not a scalar in [1, n)".into(),
            ));
        }
        Ok(Self { bytes })
    }

    /// Parses a `0x`-prefixed (or bare) 64-character hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = decode_prefixed_hex(s)
            .map_err(|e| ShadeError::InvalidKeyFormat(format!("private key hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Returns the raw bytes.
    ///
    /// # Security
    /// Handle the returned bytes carefully - do not log or expose them.
    pub fn as_bytes(&self) -> &[u8; PRIVATE_KEY_SIZE] {
        &self.bytes
    }

    /// Returns the key as `0x` + 64 hex characters.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.bytes[..].ct_eq(&other.bytes[..]).into()
    }
}

impl Eq for PrivateKey {}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrivateKey([REDACTED])")
    }
}

/// Returns true if `bytes` is a big-endian scalar in `[1, n)`.
pub fn is_valid_scalar(bytes: &[u8; PRIVATE_KEY_SIZE]) -> bool {
    bytes.iter().any(|&b| b != 0) && bytes.as_slice() < SECP256K1_ORDER.as_slice()
}

// ═══════════════════════════════════════════════════════════════════════════════
// PUBLIC KEY
// ═══════════════════════════════════════════════════════════════════════════════

/// SEC 1 compressed secp256k1 public key.
///
/// Safe to share. The prefix byte is checked here; whether the X coordinate
/// lies on the curve is checked when `shade-crypto` decodes the point.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    bytes: [u8; COMPRESSED_PUBLIC_KEY_SIZE],
}

impl PublicKey {
    /// Creates a public key from 33 compressed bytes.
    ///
    /// # Errors
    /// `InvalidKeyFormat` on wrong length or a prefix other than `0x02`/`0x03`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; COMPRESSED_PUBLIC_KEY_SIZE] = bytes.try_into().map_err(|_| {
            ShadeError::InvalidKeyFormat(format!(
                "compressed public key must be {} bytes, got {}",
                COMPRESSED_PUBLIC_KEY_SIZE,
                bytes.len()
            ))
        })?;
        Self::from_array(arr)
    }

    /// Creates a public key from a fixed-size array.
    pub fn from_array(bytes: [u8; COMPRESSED_PUBLIC_KEY_SIZE]) -> Result<Self> {
        if bytes[0] != 0x02 && bytes[0] != 0x03 {
            return Err(ShadeError::InvalidKeyFormat(format!(
                "compressed public key prefix must be 0x02 or 0x03, got 0x{:02x}",
                bytes[0]
            )));
        }
        Ok(Self { bytes })
    }

    /// Parses a `0x`-prefixed (or bare) 66-character hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = decode_prefixed_hex(s)
            .map_err(|e| ShadeError::InvalidKeyFormat(format!("public key hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }

    /// Returns the raw compressed bytes.
    pub fn as_bytes(&self) -> &[u8; COMPRESSED_PUBLIC_KEY_SIZE] {
        &self.bytes
    }

    /// Returns the key as `0x` + 66 hex characters.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for PublicKey {
    type Err = ShadeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

// Serde implementation that uses 0x-hex encoding
impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// KEY PAIR
// ═══════════════════════════════════════════════════════════════════════════════

/// A secp256k1 key pair with `public = G * private`.
///
/// Build it through `shade_crypto::keypair_from_private_key` or the
/// generators so the invariant holds.
#[derive(Clone)]
pub struct KeyPair {
    /// Private scalar (keep private, auto-zeroized)
    pub private: PrivateKey,
    /// Compressed public point (safe to share)
    pub public: PublicKey,
}

impl KeyPair {
    /// Pairs an already-matching private and public key.
    pub fn new(private: PrivateKey, public: PublicKey) -> Self {
        Self { private, public }
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .field("private", &"[REDACTED]")
            .finish()
    }
}

/// Ephemeral key pair generated by a sender for a single payment.
pub type EphemeralKeyPair = KeyPair;

// ═══════════════════════════════════════════════════════════════════════════════
// SHARED SECRET
// ═══════════════════════════════════════════════════════════════════════════════

/// Hashed ECDH shared secret (32 bytes).
///
/// Identical on both sides of an exchange. Sender-side only in payment
/// records; never persisted.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret {
    bytes: [u8; SHARED_SECRET_SIZE],
}

impl SharedSecret {
    /// Wraps a 32-byte digest.
    pub fn from_array(bytes: [u8; SHARED_SECRET_SIZE]) -> Self {
        Self { bytes }
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; SHARED_SECRET_SIZE] {
        &self.bytes
    }
}

impl PartialEq for SharedSecret {
    fn eq(&self, other: &Self) -> bool {
        self.bytes[..].ct_eq(&other.bytes[..]).into()
    }
}

impl Eq for SharedSecret {}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SharedSecret([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const GENERATOR_COMPRESSED: &str =
        "0x0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

    fn one() -> [u8; 32] {
        let mut b = [0u8; 32];
        b[31] = 1;
        b
    }

    #[test]
    fn test_private_key_from_bytes() {
        let sk = PrivateKey::from_bytes(&one()).unwrap();
        assert_eq!(sk.as_bytes(), &one());
    }

    #[test_case(&[0u8; 32] ; "zero scalar")]
    #[test_case(&SECP256K1_ORDER ; "group order")]
    #[test_case(&[0xFF; 32] ; "above order")]
    #[test_case(&[1u8; 31] ; "too short")]
    #[test_case(&[1u8; 33] ; "too long")]
    fn test_private_key_rejected(bytes: &[u8]) {
        let result = PrivateKey::from_bytes(bytes);
        assert!(matches!(result, Err(ShadeError::InvalidKeyFormat(_))));
    }

    #[test]
    fn test_order_minus_one_is_valid() {
        let mut bytes = SECP256K1_ORDER;
        bytes[31] -= 1;
        assert!(PrivateKey::from_array(bytes).is_ok());
    }

    #[test]
    fn test_private_key_hex_roundtrip() {
        let sk = PrivateKey::from_bytes(&one()).unwrap();
        let hex = sk.to_hex();
        assert_eq!(hex.len(), 66);
        assert!(hex.starts_with("0x"));
        assert_eq!(PrivateKey::from_hex(&hex).unwrap(), sk);
    }

    #[test]
    fn test_private_key_debug_redacted() {
        let sk = PrivateKey::from_bytes(&one()).unwrap();
        let debug = format!("{:?}", sk);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("01"));
    }

    #[test]
    fn test_public_key_hex_roundtrip() {
        let pk = PublicKey::from_hex(GENERATOR_COMPRESSED).unwrap();
        assert_eq!(pk.to_hex(), GENERATOR_COMPRESSED);
        assert_eq!(pk.to_hex().len(), 68);
    }

    #[test]
    fn test_public_key_bad_prefix() {
        let mut bytes = [0x11u8; COMPRESSED_PUBLIC_KEY_SIZE];
        bytes[0] = 0x04;
        assert!(matches!(
            PublicKey::from_bytes(&bytes),
            Err(ShadeError::InvalidKeyFormat(_))
        ));
    }

    #[test]
    fn test_public_key_wrong_size() {
        let result = PublicKey::from_bytes(&[0x02; 65]);
        assert!(matches!(result, Err(ShadeError::InvalidKeyFormat(_))));
    }

    #[test]
    fn test_public_key_serde() {
        let pk = PublicKey::from_hex(GENERATOR_COMPRESSED).unwrap();
        let json = serde_json::to_string(&pk).unwrap();
        assert_eq!(json, format!("\"{}\"", GENERATOR_COMPRESSED));
        let pk2: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(pk, pk2);
    }

    #[test]
    fn test_shared_secret_debug_redacted() {
        let secret = SharedSecret::from_array([0xAB; 32]);
        assert_eq!(format!("{:?}", secret), "SharedSecret([REDACTED])");
        assert_eq!(secret, SharedSecret::from_array([0xAB; 32]));
    }
}
