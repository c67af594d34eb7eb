//! Payment ownership checks (view-only).
//!
//! Only the viewing private key and the spend public key are needed, so a
//! watch-only scanner can find payments without spending authority.

use subtle::ConstantTimeEq;

use shade_core::error::{Result, ShadeError};
use shade_core::types::{Address, Announcement, PrivateKey, PublicKey, SharedSecret};
use shade_crypto::{compute_shared_secret, verify_view_hint};

use crate::service::StealthService;

impl StealthService {
    /// Returns true if the payment `(ephemeral_public_key, claimed_address)`
    /// was derived for the given keys.
    ///
    /// `claimed_address` is compared case-insensitively, so any casing of a
    /// well-formed address is accepted.
    ///
    /// # Errors
    /// Only for malformed input (`InvalidAddress`, `InvalidKeyFormat`,
    /// `PointNotOnCurve`). A payment for someone else is `Ok(false)`.
    pub fn check_payment_ownership(
        &self,
        ephemeral_public_key: &PublicKey,
        claimed_address: &str,
        viewing_private_key: &PrivateKey,
        spend_public_key: &PublicKey,
    ) -> Result<bool> {
        let claimed = parse_address_any_case(claimed_address)?;
        self.owns_address(ephemeral_public_key, &claimed, viewing_private_key, spend_public_key)
    }

    /// Ownership check against an already parsed address.
    pub fn owns_address(
        &self,
        ephemeral_public_key: &PublicKey,
        claimed: &Address,
        viewing_private_key: &PrivateKey,
        spend_public_key: &PublicKey,
    ) -> Result<bool> {
        let shared_secret = compute_shared_secret(viewing_private_key, ephemeral_public_key)?;
        let expected = self
            .scheme()
            .derive_stealth_address(&shared_secret, spend_public_key)?;
        Ok(expected.as_bytes()[..].ct_eq(&claimed.as_bytes()[..]).into())
    }

    /// Ownership check for an announcement, using its view hint as a prefilter
    /// when enabled.
    pub fn check_announcement(
        &self,
        announcement: &Announcement,
        viewing_private_key: &PrivateKey,
        spend_public_key: &PublicKey,
    ) -> Result<bool> {
        let outcome = self.match_announcement(announcement, viewing_private_key, spend_public_key)?;
        Ok(matches!(outcome, AnnouncementMatch::Owned(_)))
    }

    /// Hint filter then constant-time address comparison.
    pub(crate) fn match_announcement(
        &self,
        announcement: &Announcement,
        viewing_private_key: &PrivateKey,
        spend_public_key: &PublicKey,
    ) -> Result<AnnouncementMatch> {
        let shared_secret =
            compute_shared_secret(viewing_private_key, &announcement.ephemeral_public_key)?;

        if self.config().use_view_hint
            && !verify_view_hint(
                &shared_secret,
                self.config().view_hint_bytes,
                announcement.view_hint,
            )?
        {
            return Ok(AnnouncementMatch::HintMiss);
        }

        let expected = self
            .scheme()
            .derive_stealth_address(&shared_secret, spend_public_key)?;
        let owned: bool = expected.as_bytes()[..]
            .ct_eq(&announcement.stealth_address.as_bytes()[..])
            .into();
        Ok(if owned {
            AnnouncementMatch::Owned(shared_secret)
        } else {
            AnnouncementMatch::Mismatch
        })
    }
}

/// How an announcement relates to a set of viewing keys.
pub(crate) enum AnnouncementMatch {
    /// Rejected by the view hint.
    HintMiss,
    /// Hint passed but the address differs.
    Mismatch,
    /// Ours; carries the shared secret for key recovery.
    Owned(SharedSecret),
}

fn parse_address_any_case(s: &str) -> Result<Address> {
    if !s.starts_with("0x") && !s.starts_with("0X") {
        return Err(ShadeError::InvalidAddress(format!("missing 0x prefix: {}", s)));
    }
    Address::from_hex(&s.to_ascii_lowercase())
}

/// Ownership check with the default configuration.
pub fn check_payment_ownership(
    ephemeral_public_key: &PublicKey,
    claimed_address: &str,
    viewing_private_key: &PrivateKey,
    spend_public_key: &PublicKey,
) -> Result<bool> {
    StealthService::default().check_payment_ownership(
        ephemeral_public_key,
        claimed_address,
        viewing_private_key,
        spend_public_key,
    )
}
