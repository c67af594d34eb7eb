//! Elliptic-curve Diffie-Hellman over secp256k1.
//!
//! ```text
//! shared_secret = keccak256(compress(counterparty_pub * private))
//! ```
//!
//! The raw point is never returned; callers only ever see the hash.

use k256::elliptic_curve::sec1::ToEncodedPoint;

use shade_core::error::Result;
use shade_core::types::{PrivateKey, PublicKey, SharedSecret};

use crate::hash::keccak256;
use crate::keys::{to_k256_public_key, to_secret_key};

/// Computes the hashed ECDH shared secret.
///
/// Symmetric: `compute_shared_secret(a, B) == compute_shared_secret(b, A)`.
///
/// # Errors
/// - `InvalidKeyFormat` if `private_key` is not a usable scalar
/// - `PointNotOnCurve` if `counterparty` does not decode to a curve point
pub fn compute_shared_secret(
    private_key: &PrivateKey,
    counterparty: &PublicKey,
) -> Result<SharedSecret> {
    let secret = to_secret_key(private_key)?;
    let point = to_k256_public_key(counterparty)?;

    // Prime-order group and a non-zero scalar: the product is never the identity.
    let shared = (point.to_projective() * *secret.to_nonzero_scalar()).to_affine();
    let encoded = shared.to_encoded_point(true);

    Ok(SharedSecret::from_array(keccak256(encoded.as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{generate_keypair, generate_keypair_with_rng, keypair_from_private_key};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use shade_core::ShadeError;

    fn private_key(n: u8) -> PrivateKey {
        let mut bytes = [0u8; 32];
        bytes[31] = n;
        PrivateKey::from_array(bytes).unwrap()
    }

    #[test]
    fn test_known_shared_secret() {
        // 1 * (2G) == 2 * G, compressed 2G is 02c6047f...
        let one = keypair_from_private_key(private_key(1)).unwrap();
        let two = keypair_from_private_key(private_key(2)).unwrap();

        let expected = keccak256(
            &hex::decode("02c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5")
                .unwrap(),
        );

        let ab = compute_shared_secret(&one.private, &two.public).unwrap();
        let ba = compute_shared_secret(&two.private, &one.public).unwrap();
        assert_eq!(ab.as_bytes(), &expected);
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_symmetry_random_pairs() {
        for _ in 0..16 {
            let a = generate_keypair().unwrap();
            let b = generate_keypair().unwrap();
            assert_eq!(
                compute_shared_secret(&a.private, &b.public).unwrap(),
                compute_shared_secret(&b.private, &a.public).unwrap()
            );
        }
    }

    #[test]
    fn test_different_counterparties_differ() {
        let a = generate_keypair().unwrap();
        let b = generate_keypair().unwrap();
        let c = generate_keypair().unwrap();
        assert_ne!(
            compute_shared_secret(&a.private, &b.public).unwrap(),
            compute_shared_secret(&a.private, &c.public).unwrap()
        );
    }

    #[test]
    fn test_off_curve_counterparty_rejected() {
        let a = generate_keypair().unwrap();
        let mut bytes = [0xFFu8; 33];
        bytes[0] = 0x03;
        let bogus = PublicKey::from_array(bytes).unwrap();

        assert!(matches!(
            compute_shared_secret(&a.private, &bogus),
            Err(ShadeError::PointNotOnCurve(_))
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_ecdh_symmetry(seed_a in any::<u64>(), seed_b in any::<u64>()) {
            let a = generate_keypair_with_rng(&mut ChaCha20Rng::seed_from_u64(seed_a)).unwrap();
            let b = generate_keypair_with_rng(&mut ChaCha20Rng::seed_from_u64(seed_b)).unwrap();

            let ab = compute_shared_secret(&a.private, &b.public).unwrap();
            let ba = compute_shared_secret(&b.private, &a.public).unwrap();
            prop_assert_eq!(ab, ba);
        }
    }
}
