//! Stealth payment creation (sender side).

use serde::{Deserialize, Serialize};

use shade_core::error::{Result, ShadeError};
use shade_core::types::{
    Address, Announcement, AnnouncementBuilder, KeyPair, PrivateKey, PublicKey, PublicMetaAddress,
    SharedSecret,
};
use shade_crypto::{
    address_of, compute_shared_secret, generate_keypair, keypair_from_private_key,
    validate_public_key,
};

use crate::service::StealthService;

/// Everything a sender learns when deriving a stealth address.
///
/// The ephemeral private key and shared secret are sender-side only and are
/// never persisted; only [`StealthAddressResult::announcement`] is published.
#[derive(Clone, Debug)]
pub struct StealthAddressResult {
    /// One-time address to send funds to
    pub stealth_address: Address,
    /// One-time public key behind the address
    pub stealth_public_key: PublicKey,
    /// Ephemeral public key to publish
    pub ephemeral_public_key: PublicKey,
    /// Ephemeral private key (discard after use)
    pub ephemeral_private_key: PrivateKey,
    /// Hashed ECDH secret shared with the recipient
    pub shared_secret: SharedSecret,
    /// Prefilter value for scanners
    pub view_hint: u64,
}

impl StealthAddressResult {
    /// Builds the announcement to publish for this payment.
    pub fn announcement(&self) -> Announcement {
        Announcement::new(self.ephemeral_public_key, self.stealth_address, self.view_hint)
    }
}

impl StealthService {
    /// Derives a one-time stealth address for a recipient.
    ///
    /// A fresh ephemeral key is generated when `ephemeral_private_key` is
    /// `None`. Otherwise the derivation is pure.
    ///
    /// # Errors
    /// - `PointNotOnCurve` / `InvalidKeyFormat` for bad recipient keys
    /// - `EntropyFailure` if a fresh ephemeral key cannot be drawn
    /// - `StealthDerivationError` if the scheme yields an unusable key
    pub fn derive_stealth_address(
        &self,
        spend_public_key: &PublicKey,
        viewing_public_key: &PublicKey,
        ephemeral_private_key: Option<&PrivateKey>,
    ) -> Result<StealthAddressResult> {
        validate_public_key(spend_public_key)?;

        let ephemeral: KeyPair = match ephemeral_private_key {
            Some(sk) => keypair_from_private_key(sk.clone())?,
            None => generate_keypair()?,
        };

        let shared_secret = compute_shared_secret(&ephemeral.private, viewing_public_key)?;
        let stealth_public_key = self
            .scheme()
            .derive_stealth_public_key(&shared_secret, spend_public_key)?;
        let stealth_address = address_of(&stealth_public_key)?;
        let view_hint = self.view_hint(&shared_secret)?;

        Ok(StealthAddressResult {
            stealth_address,
            stealth_public_key,
            ephemeral_public_key: ephemeral.public,
            ephemeral_private_key: ephemeral.private,
            shared_secret,
            view_hint,
        })
    }
}

/// Derives a stealth address with the default configuration.
pub fn derive_stealth_address(
    spend_public_key: &PublicKey,
    viewing_public_key: &PublicKey,
    ephemeral_private_key: Option<&PrivateKey>,
) -> Result<StealthAddressResult> {
    StealthService::default().derive_stealth_address(
        spend_public_key,
        viewing_public_key,
        ephemeral_private_key,
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// PAYMENT RECORD
// ═══════════════════════════════════════════════════════════════════════════════

/// Stealth payment: address to send to and announcement to publish.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StealthPayment {
    /// The one-time address to send funds to
    pub stealth_address: Address,
    /// The one-time public key
    pub stealth_public_key: PublicKey,
    /// The announcement to publish
    pub announcement: Announcement,
    /// Metadata about the payment
    #[serde(default)]
    pub metadata: PaymentMetadata,
}

/// Metadata about a stealth payment. Never published.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMetadata {
    /// Payment amount (informational only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    /// Payment token (e.g., "ETH", "USDC")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Optional memo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

/// Builder for stealth payments.
#[derive(Default)]
pub struct StealthPaymentBuilder {
    service: Option<StealthService>,
    recipient: Option<PublicMetaAddress>,
    ephemeral_private_key: Option<PrivateKey>,
    amount: Option<String>,
    token: Option<String>,
    memo: Option<String>,
    block_number: Option<u64>,
    tx_hash: Option<String>,
}

impl StealthPaymentBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a specific service (defaults to [`StealthService::default`]).
    pub fn service(mut self, service: StealthService) -> Self {
        self.service = Some(service);
        self
    }

    /// Sets the recipient meta-address (required).
    pub fn recipient(mut self, meta_address: PublicMetaAddress) -> Self {
        self.recipient = Some(meta_address);
        self
    }

    /// Fixes the ephemeral key instead of drawing a fresh one.
    pub fn ephemeral_private_key(mut self, key: PrivateKey) -> Self {
        self.ephemeral_private_key = Some(key);
        self
    }

    /// Sets the informational amount.
    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    /// Sets the informational token symbol.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets a memo.
    pub fn memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Records the block the funding transaction landed in.
    pub fn block_number(mut self, block: u64) -> Self {
        self.block_number = Some(block);
        self
    }

    /// Records the funding transaction hash.
    pub fn tx_hash(mut self, hash: impl Into<String>) -> Self {
        self.tx_hash = Some(hash.into());
        self
    }

    /// Derives the stealth address and assembles the payment.
    pub fn build(self) -> Result<StealthPayment> {
        let recipient = self.recipient.ok_or_else(|| {
            ShadeError::ValidationError("recipient meta-address is required".into())
        })?;
        let service = self.service.unwrap_or_default();

        let result = service.derive_stealth_address(
            &recipient.spend_public_key,
            &recipient.viewing_public_key,
            self.ephemeral_private_key.as_ref(),
        )?;

        let mut announcement = AnnouncementBuilder::new()
            .ephemeral_public_key(result.ephemeral_public_key)
            .stealth_address(result.stealth_address)
            .view_hint(result.view_hint);
        if let Some(block) = self.block_number {
            announcement = announcement.block_number(block);
        }
        if let Some(hash) = self.tx_hash {
            announcement = announcement.tx_hash(hash);
        }

        Ok(StealthPayment {
            stealth_address: result.stealth_address,
            stealth_public_key: result.stealth_public_key,
            announcement: announcement.build()?,
            metadata: PaymentMetadata {
                amount: self.amount,
                token: self.token,
                memo: self.memo,
            },
        })
    }
}

/// Creates a stealth payment to `recipient` with the default configuration.
pub fn create_stealth_payment(recipient: &PublicMetaAddress) -> Result<StealthPayment> {
    StealthPaymentBuilder::new().recipient(*recipient).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SchemeKind, StealthConfig};
    use crate::meta::generate_meta_address;
    use shade_core::is_valid_address;
    use shade_crypto::generate_keypair;

    #[test]
    fn test_derive_stealth_address_fields() {
        let meta = generate_meta_address().unwrap();
        let result =
            derive_stealth_address(meta.spend_public_key(), meta.viewing_public_key(), None)
                .unwrap();

        assert!(!result.stealth_address.is_zero());
        assert!(is_valid_address(&result.stealth_address.to_string()));
        assert!(result.view_hint <= 255);
        assert_eq!(address_of(&result.stealth_public_key).unwrap(), result.stealth_address);
        assert_eq!(
            shade_crypto::derive_public_key(&result.ephemeral_private_key).unwrap(),
            result.ephemeral_public_key
        );
    }

    #[test]
    fn test_fixed_ephemeral_is_deterministic() {
        let meta = generate_meta_address().unwrap();
        let eph = generate_keypair().unwrap();

        let a = derive_stealth_address(
            meta.spend_public_key(),
            meta.viewing_public_key(),
            Some(&eph.private),
        )
        .unwrap();
        let b = derive_stealth_address(
            meta.spend_public_key(),
            meta.viewing_public_key(),
            Some(&eph.private),
        )
        .unwrap();

        assert_eq!(a.stealth_address, b.stealth_address);
        assert_eq!(a.view_hint, b.view_hint);
        assert_eq!(a.shared_secret, b.shared_secret);
        assert_eq!(a.ephemeral_public_key, eph.public);
    }

    #[test]
    fn test_different_ephemeral_keys_give_different_addresses() {
        let meta = generate_meta_address().unwrap();
        let a = derive_stealth_address(meta.spend_public_key(), meta.viewing_public_key(), None)
            .unwrap();
        let b = derive_stealth_address(meta.spend_public_key(), meta.viewing_public_key(), None)
            .unwrap();
        assert_ne!(a.stealth_address, b.stealth_address);
        assert_ne!(a.ephemeral_public_key, b.ephemeral_public_key);
    }

    #[test]
    fn test_view_hint_is_secret_prefix() {
        let meta = generate_meta_address().unwrap();
        let service = StealthService::new(StealthConfig::new().with_view_hint_bytes(3)).unwrap();
        let result = service
            .derive_stealth_address(meta.spend_public_key(), meta.viewing_public_key(), None)
            .unwrap();

        let s = result.shared_secret.as_bytes();
        let expected = (u64::from(s[0]) << 16) | (u64::from(s[1]) << 8) | u64::from(s[2]);
        assert_eq!(result.view_hint, expected);
    }

    #[test]
    fn test_off_curve_recipient_rejected() {
        let meta = generate_meta_address().unwrap();
        let mut bogus = [0xFFu8; 33];
        bogus[0] = 0x03;
        let bogus = PublicKey::from_array(bogus).unwrap();

        assert!(matches!(
            derive_stealth_address(&bogus, meta.viewing_public_key(), None),
            Err(ShadeError::PointNotOnCurve(_))
        ));
        assert!(matches!(
            derive_stealth_address(meta.spend_public_key(), &bogus, None),
            Err(ShadeError::PointNotOnCurve(_))
        ));
    }

    #[test]
    fn test_payment_builder() {
        let meta = generate_meta_address().unwrap();
        let payment = StealthPaymentBuilder::new()
            .recipient(meta.public())
            .amount("1.5")
            .token("ETH")
            .memo("rent")
            .block_number(42)
            .build()
            .unwrap();

        assert_eq!(payment.announcement.stealth_address, payment.stealth_address);
        assert_eq!(payment.announcement.block_number, Some(42));
        assert_eq!(payment.metadata.token.as_deref(), Some("ETH"));
        assert!(payment.announcement.validate().is_ok());
    }

    #[test]
    fn test_payment_builder_missing_recipient() {
        let result = StealthPaymentBuilder::new().amount("1").build();
        assert!(matches!(result, Err(ShadeError::ValidationError(_))));
    }

    #[test]
    fn test_payment_builder_uses_service_scheme() {
        let meta = generate_meta_address().unwrap();
        let eph = generate_keypair().unwrap();

        let hashed = StealthPaymentBuilder::new()
            .recipient(meta.public())
            .ephemeral_private_key(eph.private.clone())
            .build()
            .unwrap();
        let point = StealthPaymentBuilder::new()
            .service(
                StealthService::new(StealthConfig::new().with_scheme(SchemeKind::PointAddition))
                    .unwrap(),
            )
            .recipient(meta.public())
            .ephemeral_private_key(eph.private)
            .build()
            .unwrap();

        assert_eq!(hashed.announcement.view_hint, point.announcement.view_hint);
        assert_ne!(hashed.stealth_address, point.stealth_address);
    }

    #[test]
    fn test_payment_serialization() {
        let meta = generate_meta_address().unwrap();
        let payment = create_stealth_payment(&meta.public()).unwrap();

        let json = serde_json::to_string(&payment).unwrap();
        let back: StealthPayment = serde_json::from_str(&json).unwrap();
        assert_eq!(back.stealth_address, payment.stealth_address);
        assert_eq!(back.announcement, payment.announcement);
    }
}
