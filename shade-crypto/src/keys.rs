//! secp256k1 key generation and conversion.
//!
//! Bridges the byte containers in `shade-core` and the `k256` curve types.
//! Every conversion from bytes to a curve point goes through
//! [`parse_public_key`], which is where off-curve input is rejected.

use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use shade_core::constants::{
    COMPRESSED_PUBLIC_KEY_SIZE, MAX_KEYGEN_ATTEMPTS, PRIVATE_KEY_SIZE, UNCOMPRESSED_PUBLIC_KEY_SIZE,
};
use shade_core::error::{Result, ShadeError};
use shade_core::types::{KeyPair, PrivateKey, PublicKey};

// ═══════════════════════════════════════════════════════════════════════════════
// KEY GENERATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Generates a fresh key pair from the operating system's CSPRNG.
///
/// # Errors
/// `EntropyFailure` if the OS random source fails.
pub fn generate_keypair() -> Result<KeyPair> {
    generate_keypair_with_rng(&mut OsRng)
}

/// Generates a key pair from the supplied RNG.
///
/// Draws 32 bytes per attempt and rejects zero or out-of-range scalars,
/// retrying with fresh randomness up to [`MAX_KEYGEN_ATTEMPTS`] times.
///
/// # Errors
/// `EntropyFailure` if the RNG reports an error or never yields a usable scalar.
pub fn generate_keypair_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> Result<KeyPair> {
    for _ in 0..MAX_KEYGEN_ATTEMPTS {
        let mut candidate = Zeroizing::new([0u8; PRIVATE_KEY_SIZE]);
        rng.try_fill_bytes(&mut candidate[..])
            .map_err(|e| ShadeError::EntropyFailure(e.to_string()))?;

        if let Ok(private) = PrivateKey::from_array(*candidate) {
            return keypair_from_private_key(private);
        }
    }

    Err(ShadeError::EntropyFailure(format!(
        "no valid scalar after {} draws",
        MAX_KEYGEN_ATTEMPTS
    )))
}

/// Completes a key pair from its private half.
pub fn keypair_from_private_key(private: PrivateKey) -> Result<KeyPair> {
    let public = derive_public_key(&private)?;
    Ok(KeyPair::new(private, public))
}

/// Computes `G * private` in compressed form.
pub fn derive_public_key(private: &PrivateKey) -> Result<PublicKey> {
    let secret = to_secret_key(private)?;
    from_k256_public_key(&secret.public_key())
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONVERSIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Converts a private key into a `k256` secret key.
pub fn to_secret_key(private: &PrivateKey) -> Result<k256::SecretKey> {
    k256::SecretKey::from_slice(private.as_bytes())
        .map_err(|_| ShadeError::InvalidKeyFormat("private key is not a valid scalar".into()))
}

/// Parses a SEC 1 public key, compressed (33 bytes) or uncompressed (65 bytes).
///
/// # Errors
/// - `InvalidKeyFormat` on a wrong length or prefix
/// - `PointNotOnCurve` if the coordinates do not satisfy the curve equation
pub fn parse_public_key(bytes: &[u8]) -> Result<k256::PublicKey> {
    let prefix_ok = match bytes.len() {
        COMPRESSED_PUBLIC_KEY_SIZE => bytes[0] == 0x02 || bytes[0] == 0x03,
        UNCOMPRESSED_PUBLIC_KEY_SIZE => bytes[0] == 0x04,
        len => {
            return Err(ShadeError::InvalidKeyFormat(format!(
                "public key must be {} or {} bytes, got {}",
                COMPRESSED_PUBLIC_KEY_SIZE, UNCOMPRESSED_PUBLIC_KEY_SIZE, len
            )))
        }
    };

    if !prefix_ok {
        return Err(ShadeError::InvalidKeyFormat(format!(
            "unexpected SEC 1 prefix 0x{:02x} for a {}-byte key",
            bytes[0],
            bytes.len()
        )));
    }

    k256::PublicKey::from_sec1_bytes(bytes)
        .map_err(|_| ShadeError::PointNotOnCurve(format!("0x{}", hex::encode(bytes))))
}

/// Decodes a compressed public key into a curve point.
pub fn to_k256_public_key(public: &PublicKey) -> Result<k256::PublicKey> {
    parse_public_key(public.as_bytes())
}

/// Encodes a curve point as a compressed public key.
pub fn from_k256_public_key(point: &k256::PublicKey) -> Result<PublicKey> {
    PublicKey::from_bytes(point.to_encoded_point(true).as_bytes())
}

/// Normalises any SEC 1 encoding to a validated compressed public key.
pub fn compress_public_key(bytes: &[u8]) -> Result<PublicKey> {
    from_k256_public_key(&parse_public_key(bytes)?)
}

/// Checks that a compressed public key decodes to a curve point.
pub fn validate_public_key(public: &PublicKey) -> Result<()> {
    to_k256_public_key(public).map(|_| ())
}

/// Checks that a key pair satisfies `public == G * private`.
pub fn verify_keypair(keypair: &KeyPair) -> Result<bool> {
    Ok(derive_public_key(&keypair.private)? == keypair.public)
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::{ProjectivePoint, Scalar};
    use k256::elliptic_curve::ff::PrimeField;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    const G_COMPRESSED: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
    const G_X: &str = "79be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
    const G_Y: &str = "483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8";

    fn private_key(n: u8) -> PrivateKey {
        let mut bytes = [0u8; 32];
        bytes[31] = n;
        PrivateKey::from_array(bytes).unwrap()
    }

    #[test]
    fn test_generator_from_private_key_one() {
        let kp = keypair_from_private_key(private_key(1)).unwrap();
        assert_eq!(hex::encode(kp.public.as_bytes()), G_COMPRESSED);
    }

    #[test]
    fn test_generated_public_key_matches_base_point_multiple() {
        for _ in 0..8 {
            let kp = generate_keypair().unwrap();

            let repr = k256::FieldBytes::clone_from_slice(kp.private.as_bytes());
            let scalar = Option::<Scalar>::from(Scalar::from_repr(repr)).unwrap();
            let expected = (ProjectivePoint::GENERATOR * scalar).to_affine();

            assert_eq!(
                kp.public.as_bytes().as_slice(),
                expected.to_encoded_point(true).as_bytes()
            );
            assert!(verify_keypair(&kp).unwrap());
        }
    }

    #[test]
    fn test_generate_keypair_unique() {
        let a = generate_keypair().unwrap();
        let b = generate_keypair().unwrap();
        assert_ne!(a.private, b.private);
        assert_ne!(a.public, b.public);
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let a = generate_keypair_with_rng(&mut ChaCha20Rng::seed_from_u64(7)).unwrap();
        let b = generate_keypair_with_rng(&mut ChaCha20Rng::seed_from_u64(7)).unwrap();
        let c = generate_keypair_with_rng(&mut ChaCha20Rng::seed_from_u64(8)).unwrap();

        assert_eq!(a.private, b.private);
        assert_ne!(a.private, c.private);
    }

    /// RNG that only ever yields zero bytes, i.e. the invalid scalar 0.
    struct ZeroRng;

    impl RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            dest.fill(0);
            Ok(())
        }
    }

    impl CryptoRng for ZeroRng {}

    /// RNG whose backing source is unavailable.
    struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, _dest: &mut [u8]) {}
        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            Err(rand::Error::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                "entropy device unavailable",
            )))
        }
    }

    impl CryptoRng for BrokenRng {}

    #[test]
    fn test_exhausted_retries_is_entropy_failure() {
        let result = generate_keypair_with_rng(&mut ZeroRng);
        assert!(matches!(result, Err(ShadeError::EntropyFailure(_))));
    }

    #[test]
    fn test_rng_error_is_entropy_failure() {
        let result = generate_keypair_with_rng(&mut BrokenRng);
        match result {
            Err(ShadeError::EntropyFailure(msg)) => assert!(msg.contains("unavailable")),
            other => panic!("expected EntropyFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_uncompressed_generator() {
        let bytes = hex::decode(format!("04{}{}", G_X, G_Y)).unwrap();
        let pk = compress_public_key(&bytes).unwrap();
        assert_eq!(hex::encode(pk.as_bytes()), G_COMPRESSED);
    }

    #[test]
    fn test_off_curve_uncompressed_rejected() {
        // Generator X with Y + 1
        let mut bytes = hex::decode(format!("04{}{}", G_X, G_Y)).unwrap();
        bytes[64] ^= 0x01;
        assert!(matches!(
            parse_public_key(&bytes),
            Err(ShadeError::PointNotOnCurve(_))
        ));
    }

    #[test]
    fn test_invalid_x_coordinate_rejected() {
        // X >= field prime has no point
        let mut bytes = [0xFFu8; 33];
        bytes[0] = 0x02;
        let pk = PublicKey::from_array(bytes).unwrap();
        assert!(matches!(
            validate_public_key(&pk),
            Err(ShadeError::PointNotOnCurve(_))
        ));
    }

    #[test]
    fn test_bad_lengths_and_prefixes() {
        assert!(matches!(
            parse_public_key(&[0x02; 32]),
            Err(ShadeError::InvalidKeyFormat(_))
        ));
        assert!(matches!(
            parse_public_key(&[0x04; 33]),
            Err(ShadeError::InvalidKeyFormat(_))
        ));
        assert!(matches!(
            parse_public_key(&[0x02; 65]),
            Err(ShadeError::InvalidKeyFormat(_))
        ));
    }

    #[test]
    fn test_verify_keypair_detects_mismatch() {
        let a = generate_keypair().unwrap();
        let b = generate_keypair().unwrap();
        let mixed = KeyPair::new(a.private.clone(), b.public);
        assert!(!verify_keypair(&mixed).unwrap());
    }
}
