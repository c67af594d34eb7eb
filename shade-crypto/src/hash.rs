//! Keccak256 hashing.
//!
//! Keccak256 is the only hash in the protocol: it collapses ECDH points into
//! shared secrets, combines secrets with spend keys, and produces addresses.
//!
//! Note: Keccak256 is NOT SHA3-256. They use different padding.

use sha3::{Digest, Keccak256};

use shade_core::constants::KECCAK256_SIZE;

/// Computes Keccak256 of a single input.
pub fn keccak256(input: &[u8]) -> [u8; KECCAK256_SIZE] {
    Keccak256::digest(input).into()
}

/// Computes Keccak256 of the plain concatenation of `inputs`.
///
/// No length prefixes are added: `keccak256_concat(&[a, b]) == keccak256(a || b)`.
pub fn keccak256_concat(inputs: &[&[u8]]) -> [u8; KECCAK256_SIZE] {
    let mut hasher = Keccak256::new();
    for input in inputs {
        hasher.update(input);
    }
    hasher.finalize().into()
}
