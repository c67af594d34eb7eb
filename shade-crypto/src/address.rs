//! Address codec: public key to Ethereum address.
//!
//! ```text
//! address = keccak256(X || Y)[12..32]
//! ```
//!
//! where `X || Y` is the 64-byte uncompressed point without its `0x04` prefix.

use k256::elliptic_curve::sec1::ToEncodedPoint;

use shade_core::constants::ADDRESS_SIZE;
use shade_core::error::Result;
use shade_core::types::{Address, PrivateKey, PublicKey};

use crate::hash::keccak256;
use crate::keys::{derive_public_key, parse_public_key, to_k256_public_key};

pub use shade_core::types::is_valid_address;

/// Derives the address of a curve point.
pub fn point_to_address(point: &k256::PublicKey) -> Address {
    let uncompressed = point.to_encoded_point(false);
    let hash = keccak256(&uncompressed.as_bytes()[1..]);

    let mut bytes = [0u8; ADDRESS_SIZE];
    bytes.copy_from_slice(&hash[32 - ADDRESS_SIZE..]);
    Address::from_array(bytes)
}

/// Derives the address of a SEC 1 encoded public key (33 or 65 bytes).
///
/// # Errors
/// `InvalidKeyFormat` or `PointNotOnCurve` for malformed keys.
pub fn public_key_to_address(public_key: &[u8]) -> Result<Address> {
    Ok(point_to_address(&parse_public_key(public_key)?))
}

/// Derives the address of a compressed public key.
pub fn address_of(public_key: &PublicKey) -> Result<Address> {
    Ok(point_to_address(&to_k256_public_key(public_key)?))
}

/// Derives the address controlled by a private key.
pub fn private_key_to_address(private_key: &PrivateKey) -> Result<Address> {
    address_of(&derive_public_key(private_key)?)
}
