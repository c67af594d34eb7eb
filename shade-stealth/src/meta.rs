//! Meta-address generation and restoration.

use rand::{CryptoRng, RngCore};

use shade_core::error::{Result, ShadeError};
use shade_core::types::{MetaAddress, PrivateKey, PublicMetaAddress};
use shade_crypto::{generate_keypair, generate_keypair_with_rng, keypair_from_private_key, validate_public_key};

/// Generates a meta-address from two independent OS entropy draws.
///
/// # Example
///
/// ```rust
/// use shade_stealth::generate_meta_address;
///
/// let meta = generate_meta_address().unwrap();
/// let link = meta.public().encode();
/// assert!(link.starts_with("st:eth:0x"));
/// ```
pub fn generate_meta_address() -> Result<MetaAddress> {
    let spend = generate_keypair()?;
    let viewing = generate_keypair()?;
    Ok(MetaAddress::new(spend, viewing))
}

/// Generates a meta-address from the supplied RNG.
///
/// The two key pairs still come from two separate draws.
pub fn generate_meta_address_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> Result<MetaAddress> {
    let spend = generate_keypair_with_rng(rng)?;
    let viewing = generate_keypair_with_rng(rng)?;
    Ok(MetaAddress::new(spend, viewing))
}

/// Rebuilds a meta-address from stored private keys.
///
/// # Errors
/// `InvalidMetaAddress` if both private keys are the same.
pub fn meta_address_from_private_keys(
    spend_private_key: PrivateKey,
    viewing_private_key: PrivateKey,
) -> Result<MetaAddress> {
    if spend_private_key == viewing_private_key {
        return Err(ShadeError::InvalidMetaAddress(
            "spend and viewing keys must be independent".into(),
        ));
    }
    Ok(MetaAddress::new(
        keypair_from_private_key(spend_private_key)?,
        keypair_from_private_key(viewing_private_key)?,
    ))
}

/// Parses an `st:eth:0x...` meta-address and checks both keys are curve points.
pub fn parse_public_meta_address(s: &str) -> Result<PublicMetaAddress> {
    let meta = PublicMetaAddress::parse(s)?;
    validate_public_meta_address(&meta)?;
    Ok(meta)
}

/// Checks both keys of a public meta-address decode to curve points.
pub fn validate_public_meta_address(meta: &PublicMetaAddress) -> Result<()> {
    validate_public_key(&meta.spend_public_key)
        .map_err(|e| ShadeError::InvalidMetaAddress(format!("spend key: {}", e)))?;
    validate_public_key(&meta.viewing_public_key)
        .map_err(|e| ShadeError::InvalidMetaAddress(format!("viewing key: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use shade_core::types::PublicKey;
    use shade_crypto::verify_keypair;

    #[test]
    fn test_generate_meta_address_independent_pairs() {
        let meta = generate_meta_address().unwrap();
        assert_ne!(meta.spend_private_key(), meta.viewing_private_key());
        assert_ne!(meta.spend_public_key(), meta.viewing_public_key());
        assert!(verify_keypair(meta.spend()).unwrap());
        assert!(verify_keypair(meta.viewing()).unwrap());
    }

    #[test]
    fn test_generate_with_seeded_rng() {
        let a = generate_meta_address_with_rng(&mut ChaCha20Rng::seed_from_u64(1)).unwrap();
        let b = generate_meta_address_with_rng(&mut ChaCha20Rng::seed_from_u64(1)).unwrap();
        assert_eq!(a.public(), b.public());
        assert_ne!(a.spend_private_key(), a.viewing_private_key());
    }

    #[test]
    fn test_restore_from_private_keys() {
        let meta = generate_meta_address().unwrap();
        let restored = meta_address_from_private_keys(
            meta.spend_private_key().clone(),
            meta.viewing_private_key().clone(),
        )
        .unwrap();
        assert_eq!(restored.public(), meta.public());
    }

    #[test]
    fn test_restore_rejects_identical_keys() {
        let meta = generate_meta_address().unwrap();
        let result = meta_address_from_private_keys(
            meta.spend_private_key().clone(),
            meta.spend_private_key().clone(),
        );
        assert!(matches!(result, Err(ShadeError::InvalidMetaAddress(_))));
    }

    #[test]
    fn test_parse_public_meta_address() {
        let meta = generate_meta_address().unwrap();
        let encoded = meta.public().encode();
        assert_eq!(parse_public_meta_address(&encoded).unwrap(), meta.public());
    }

    #[test]
    fn test_parse_rejects_off_curve_key() {
        let meta = generate_meta_address().unwrap();
        let mut bogus = [0xFFu8; 33];
        bogus[0] = 0x02;
        let bad = PublicMetaAddress::new(
            *meta.spend_public_key(),
            PublicKey::from_array(bogus).unwrap(),
        );

        let result = parse_public_meta_address(&bad.encode());
        assert!(matches!(result, Err(ShadeError::InvalidMetaAddress(_))));
    }
}
