//! View hint computation for efficient scanning.
//!
//! A view hint is the big-endian value of the first `width` bytes of the
//! shared secret. Recipients compare it before doing the full stealth key
//! derivation, so at the default width of one byte ~255/256 of foreign
//! announcements are rejected after a single ECDH.
//!
//! The hint is an optimisation only. Ignoring it never changes which
//! payments are found.

use std::collections::BTreeMap;

use subtle::ConstantTimeEq;

use shade_core::constants::MAX_VIEW_HINT_BYTES;
use shade_core::error::{Result, ShadeError};
use shade_core::types::SharedSecret;

/// Checks that `width` is in `1..=MAX_VIEW_HINT_BYTES`.
pub fn check_view_hint_width(width: u8) -> Result<()> {
    if width == 0 || width > MAX_VIEW_HINT_BYTES {
        return Err(ShadeError::InvalidViewHintWidth(width));
    }
    Ok(())
}

/// Computes the view hint: the first `width` bytes of the secret, big-endian.
///
/// # Example
///
/// ```rust
/// use shade_core::SharedSecret;
/// use shade_crypto::compute_view_hint;
///
/// let mut bytes = [0u8; 32];
/// bytes[0] = 0xAB;
/// bytes[1] = 0xCD;
/// let secret = SharedSecret::from_array(bytes);
///
/// assert_eq!(compute_view_hint(&secret, 1).unwrap(), 0xAB);
/// assert_eq!(compute_view_hint(&secret, 2).unwrap(), 0xABCD);
/// ```
pub fn compute_view_hint(shared_secret: &SharedSecret, width: u8) -> Result<u64> {
    check_view_hint_width(width)?;
    Ok(shared_secret.as_bytes()[..width as usize]
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}

/// Checks a view hint against the value expected for a shared secret.
///
/// Constant-time comparison.
pub fn verify_view_hint(shared_secret: &SharedSecret, width: u8, expected: u64) -> Result<bool> {
    let computed = compute_view_hint(shared_secret, width)?;
    Ok(computed.ct_eq(&expected).into())
}

/// Largest hint value representable at `width` bytes.
pub fn max_view_hint(width: u8) -> Result<u64> {
    check_view_hint_width(width)?;
    Ok(if width == MAX_VIEW_HINT_BYTES {
        u64::MAX
    } else {
        (1u64 << (8 * u32::from(width))) - 1
    })
}

/// Distribution of observed view hints.
///
/// Useful for checking that a registry's hints look uniform.
#[derive(Debug, Clone)]
pub struct ViewHintStats {
    width: u8,
    /// Count per hint value (only observed values are present)
    pub distribution: BTreeMap<u64, u64>,
    /// Total number of hints recorded
    pub total: u64,
}

impl ViewHintStats {
    /// Creates a tracker for hints of the given width.
    pub fn new(width: u8) -> Result<Self> {
        check_view_hint_width(width)?;
        Ok(Self {
            width,
            distribution: BTreeMap::new(),
            total: 0,
        })
    }

    /// Records a hint.
    pub fn add(&mut self, hint: u64) {
        *self.distribution.entry(hint).or_insert(0) += 1;
        self.total += 1;
    }

    /// Returns the most common hint and its count.
    pub fn most_common(&self) -> Option<(u64, u64)> {
        self.distribution
            .iter()
            .max_by_key(|(_, &count)| count)
            .map(|(&hint, &count)| (hint, count))
    }

    /// Number of possible hint values at this width.
    pub fn space(&self) -> f64 {
        2f64.powi(8 * i32::from(self.width))
    }

    /// Expected count per hint under a uniform distribution.
    pub fn expected_uniform_count(&self) -> f64 {
        self.total as f64 / self.space()
    }

    /// Chi-squared statistic against the uniform distribution.
    ///
    /// Unobserved buckets each contribute `expected`.
    pub fn chi_squared(&self) -> f64 {
        let expected = self.expected_uniform_count();
        if expected == 0.0 {
            return 0.0;
        }

        let observed: f64 = self
            .distribution
            .values()
            .map(|&count| {
                let diff = count as f64 - expected;
                (diff * diff) / expected
            })
            .sum();
        let unobserved = self.space() - self.distribution.len() as f64;

        observed + unobserved * expected
    }
}
