//! Stealth private key reconstruction (recipient side).

use tracing::error;

use shade_core::error::{Result, ShadeError};
use shade_core::types::{Address, PrivateKey, PublicKey};
use shade_crypto::{compute_shared_secret, private_key_to_address};

use crate::service::StealthService;

impl StealthService {
    /// Reconstructs the private key of a stealth address.
    ///
    /// Mirrors [`StealthService::derive_stealth_address`]: the shared secret
    /// comes from the viewing key and the published ephemeral key, then the
    /// same scheme is applied. The result is not checked against any address;
    /// use [`StealthService::recover_stealth_private_key`] for that.
    ///
    /// # Errors
    /// `InvalidKeyFormat` / `PointNotOnCurve` for malformed inputs.
    pub fn derive_stealth_private_key(
        &self,
        spend_private_key: &PrivateKey,
        ephemeral_public_key: &PublicKey,
        viewing_private_key: &PrivateKey,
    ) -> Result<PrivateKey> {
        let shared_secret = compute_shared_secret(viewing_private_key, ephemeral_public_key)?;
        self.scheme()
            .derive_stealth_private_key(&shared_secret, spend_private_key)
    }

    /// Reconstructs the private key and verifies it controls `expected_address`.
    ///
    /// # Errors
    /// `DerivationMismatch` if the reconstructed key's address differs. This
    /// means wrong keys, a mismatched scheme, or a corrupted announcement.
    pub fn recover_stealth_private_key(
        &self,
        spend_private_key: &PrivateKey,
        ephemeral_public_key: &PublicKey,
        viewing_private_key: &PrivateKey,
        expected_address: &Address,
    ) -> Result<PrivateKey> {
        let stealth_key = self.derive_stealth_private_key(
            spend_private_key,
            ephemeral_public_key,
            viewing_private_key,
        )?;
        verify_stealth_key(&stealth_key, expected_address)?;
        Ok(stealth_key)
    }
}

/// Checks that `stealth_key` controls `expected_address`.
///
/// Logs and returns `DerivationMismatch` otherwise.
pub fn verify_stealth_key(stealth_key: &PrivateKey, expected_address: &Address) -> Result<()> {
    let derived = private_key_to_address(stealth_key)?;
    if derived != *expected_address {
        error!(
            expected = %expected_address,
            derived = %derived,
            "reconstructed stealth key does not control the expected address"
        );
        return Err(ShadeError::DerivationMismatch {
            expected: expected_address.to_string(),
            derived: derived.to_string(),
        });
    }
    Ok(())
}

/// Reconstructs a stealth private key with the default configuration.
pub fn derive_stealth_private_key(
    spend_private_key: &PrivateKey,
    ephemeral_public_key: &PublicKey,
    viewing_private_key: &PrivateKey,
) -> Result<PrivateKey> {
    StealthService::default().derive_stealth_private_key(
        spend_private_key,
        ephemeral_public_key,
        viewing_private_key,
    )
}

/// Reconstructs and verifies a stealth private key with the default configuration.
pub fn recover_stealth_private_key(
    spend_private_key: &PrivateKey,
    ephemeral_public_key: &PublicKey,
    viewing_private_key: &PrivateKey,
    expected_address: &Address,
) -> Result<PrivateKey> {
    StealthService::default().recover_stealth_private_key(
        spend_private_key,
        ephemeral_public_key,
        viewing_private_key,
        expected_address,
    )
}
