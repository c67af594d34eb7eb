//! Stealth key derivation schemes.
//!
//! A scheme turns a shared secret and the recipient's spend key into the
//! one-time stealth key pair. Sender and recipient must use the same scheme.
//!
//! ## Hashed secret (default)
//!
//! ```text
//! stealth_sk = keccak256(shared_secret || compress(spend_pk))
//! stealth_pk = G * stealth_sk
//! ```
//!
//! The spend key only enters through the hash, so anyone holding the viewing
//! key can derive `stealth_sk` without the spend private key.
//!
//! ## Point addition (EIP-5564 style)
//!
//! ```text
//! s          = shared_secret as scalar
//! stealth_pk = spend_pk + G * s
//! stealth_sk = spend_sk + s
//! ```
//!
//! Here spending requires the spend private key.

use k256::elliptic_curve::ff::PrimeField;
use k256::{NonZeroScalar, ProjectivePoint, Scalar};
use zeroize::Zeroizing;

use shade_core::error::{Result, ShadeError};
use shade_core::types::{Address, PrivateKey, PublicKey, SharedSecret};

use crate::address::address_of;
use crate::hash::keccak256_concat;
use crate::keys::{derive_public_key, from_k256_public_key, to_k256_public_key, to_secret_key};

/// One-way combination of a shared secret with a spend key.
///
/// `derive_stealth_private_key` must be the exact mirror of
/// `derive_stealth_public_key`: for matching spend keys,
/// `G * derive_stealth_private_key(s, sk) == derive_stealth_public_key(s, G * sk)`.
pub trait StealthScheme: Send + Sync + std::fmt::Debug {
    /// Short identifier used in logs and configuration.
    fn name(&self) -> &'static str;

    /// Sender side (and view-only scanner side): the one-time public key.
    fn derive_stealth_public_key(
        &self,
        shared_secret: &SharedSecret,
        spend_public_key: &PublicKey,
    ) -> Result<PublicKey>;

    /// Recipient side: the one-time private key.
    fn derive_stealth_private_key(
        &self,
        shared_secret: &SharedSecret,
        spend_private_key: &PrivateKey,
    ) -> Result<PrivateKey>;

    /// The one-time address.
    fn derive_stealth_address(
        &self,
        shared_secret: &SharedSecret,
        spend_public_key: &PublicKey,
    ) -> Result<Address> {
        address_of(&self.derive_stealth_public_key(shared_secret, spend_public_key)?)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HASHED SECRET
// ═══════════════════════════════════════════════════════════════════════════════

/// `stealth_sk = keccak256(shared_secret || spend_pk)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HashedSecretScheme;

impl HashedSecretScheme {
    fn stealth_private_key(
        shared_secret: &SharedSecret,
        spend_public_key: &PublicKey,
    ) -> Result<PrivateKey> {
        let seed = Zeroizing::new(keccak256_concat(&[
            &shared_secret.as_bytes()[..],
            &spend_public_key.as_bytes()[..],
        ]));

        PrivateKey::from_array(*seed).map_err(|_| {
            ShadeError::StealthDerivationError("hashed seed is not a valid scalar".into())
        })
    }
}

impl StealthScheme for HashedSecretScheme {
    fn name(&self) -> &'static str {
        "hashed-secret"
    }

    fn derive_stealth_public_key(
        &self,
        shared_secret: &SharedSecret,
        spend_public_key: &PublicKey,
    ) -> Result<PublicKey> {
        let stealth_sk = Self::stealth_private_key(shared_secret, spend_public_key)?;
        derive_public_key(&stealth_sk)
    }

    fn derive_stealth_private_key(
        &self,
        shared_secret: &SharedSecret,
        spend_private_key: &PrivateKey,
    ) -> Result<PrivateKey> {
        let spend_public_key = derive_public_key(spend_private_key)?;
        Self::stealth_private_key(shared_secret, &spend_public_key)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// POINT ADDITION
// ═══════════════════════════════════════════════════════════════════════════════

/// `stealth_pk = spend_pk + G * s`, `stealth_sk = spend_sk + s`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointAdditionScheme;

impl PointAdditionScheme {
    fn secret_scalar(shared_secret: &SharedSecret) -> Result<NonZeroScalar> {
        let repr = k256::FieldBytes::clone_from_slice(shared_secret.as_bytes());
        Option::<NonZeroScalar>::from(NonZeroScalar::from_repr(repr)).ok_or_else(|| {
            ShadeError::StealthDerivationError("shared secret is not a valid scalar".into())
        })
    }
}

impl StealthScheme for PointAdditionScheme {
    fn name(&self) -> &'static str {
        "point-addition"
    }

    fn derive_stealth_public_key(
        &self,
        shared_secret: &SharedSecret,
        spend_public_key: &PublicKey,
    ) -> Result<PublicKey> {
        let s = Self::secret_scalar(shared_secret)?;
        let spend = to_k256_public_key(spend_public_key)?;

        let stealth = spend.to_projective() + ProjectivePoint::GENERATOR * *s;
        let point = k256::PublicKey::from_affine(stealth.to_affine()).map_err(|_| {
            ShadeError::StealthDerivationError("stealth point is the identity".into())
        })?;

        from_k256_public_key(&point)
    }

    fn derive_stealth_private_key(
        &self,
        shared_secret: &SharedSecret,
        spend_private_key: &PrivateKey,
    ) -> Result<PrivateKey> {
        let s = Self::secret_scalar(shared_secret)?;
        let spend = to_secret_key(spend_private_key)?;

        let sum: Scalar = *spend.to_nonzero_scalar() + *s;
        let mut bytes = Zeroizing::new([0u8; 32]);
        bytes.copy_from_slice(&sum.to_repr());

        PrivateKey::from_array(*bytes).map_err(|_| {
            ShadeError::StealthDerivationError("stealth scalar is zero".into())
        })
    }
}
