//! # Shade Cryptography
//!
//! secp256k1 primitives for the Shade stealth address protocol.
//!
//! This crate provides:
//!
//! - **Keys**: key pair generation with scalar-range rejection, SEC 1 parsing
//! - **ECDH**: hashed shared secrets between a private key and a public key
//! - **View Hints**: cheap prefilter values taken from the shared secret
//! - **Address**: Keccak256-based Ethereum addresses with EIP-55 checksums
//! - **Schemes**: the one-way combination of shared secret and spend key
//!
//! ## Security Properties
//!
//! - Raw ECDH points never leave this crate; only their Keccak256 digest does
//! - Private keys and shared secrets are zeroized on drop
//! - View hint checks use constant-time comparison
//!
//! ## Example
//!
//! ```rust
//! use shade_crypto::{compute_shared_secret, generate_keypair};
//!
//! let alice = generate_keypair().unwrap();
//! let bob = generate_keypair().unwrap();
//!
//! let ab = compute_shared_secret(&alice.private, &bob.public).unwrap();
//! let ba = compute_shared_secret(&bob.private, &alice.public).unwrap();
//! assert_eq!(ab, ba);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod address;
pub mod ecdh;
pub mod hash;
pub mod keys;
pub mod scheme;
pub mod view_hint;

// Re-export main functions at crate root
pub use address::{address_of, is_valid_address, private_key_to_address, public_key_to_address};
pub use ecdh::compute_shared_secret;
pub use hash::{keccak256, keccak256_concat};
pub use keys::{
    compress_public_key, derive_public_key, generate_keypair, generate_keypair_with_rng,
    keypair_from_private_key, parse_public_key, validate_public_key, verify_keypair,
};
pub use scheme::{HashedSecretScheme, PointAdditionScheme, StealthScheme};
pub use view_hint::{compute_view_hint, verify_view_hint, ViewHintStats};
