//! Domain types for Shade.
//!
//! - [`PrivateKey`], [`PublicKey`], [`KeyPair`], [`SharedSecret`]: secp256k1 key material
//! - [`MetaAddress`] / [`PublicMetaAddress`]: a recipient's long-lived identity
//! - [`Address`]: a 20-byte EIP-55 account address
//! - [`Announcement`]: the published record of one stealth payment

mod keys;
mod address;
mod meta;
mod announcement;

pub use keys::*;
pub use address::*;
pub use meta::*;
pub use announcement::*;

use crate::error::Result;

/// Decodes a hex string with an optional `0x` / `0X` prefix.
pub(crate) fn decode_prefixed_hex(s: &str) -> Result<Vec<u8>> {
    let body = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    Ok(hex::decode(body)?)
}
