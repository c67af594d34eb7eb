//! Error types for Shade.
//!
//! A single `thiserror` hierarchy shared by every crate in the workspace.
//! Cryptographic failures are reported to the immediate caller and never
//! retried inside the core.

use thiserror::Error;

/// Result type alias using `ShadeError`.
pub type Result<T> = std::result::Result<T, ShadeError>;

/// Main error type for all Shade operations.
#[derive(Debug, Error)]
pub enum ShadeError {
    // ═══════════════════════════════════════════════════════════════════════════
    // CRYPTOGRAPHIC ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The random source is unavailable or keeps producing unusable output.
    #[error("Entropy source failure: {0}")]
    EntropyFailure(String),

    /// Wrong byte length, bad encoding, or not a valid scalar.
    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    /// Public key does not satisfy the secp256k1 curve equation.
    #[error("Point not on curve: {0}")]
    PointNotOnCurve(String),

    /// A reconstructed stealth address differs from the expected one.
    #[error("Derivation mismatch: expected {expected}, derived {derived}")]
    DerivationMismatch {
        /// Address the caller expected
        expected: String,
        /// Address actually reconstructed
        derived: String,
    },

    /// The derivation produced an unusable scalar or point.
    #[error("Stealth key derivation failed: {0}")]
    StealthDerivationError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // STEALTH ADDRESS ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Invalid meta-address format or content.
    #[error("Invalid meta-address: {0}")]
    InvalidMetaAddress(String),

    /// Invalid address format.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// View hint width outside the supported range.
    #[error("Invalid view hint width: {0} bytes (supported: 1-8)")]
    InvalidViewHintWidth(u8),

    // ═══════════════════════════════════════════════════════════════════════════
    // REGISTRY ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Invalid announcement format.
    #[error("Invalid announcement: {0}")]
    InvalidAnnouncement(String),

    /// Announcement not found.
    #[error("Announcement not found: {0}")]
    AnnouncementNotFound(u64),

    /// Duplicate announcement (same transaction hash).
    #[error("Duplicate announcement for transaction {0}")]
    DuplicateAnnouncement(String),

    /// Registry is unusable.
    #[error("Registry error: {0}")]
    RegistryError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid hex encoding.
    #[error("Invalid hex encoding: {0}")]
    HexError(#[from] hex::FromHexError),

    // ═══════════════════════════════════════════════════════════════════════════
    // STORAGE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// File I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Input validation failed.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Internal invariant violation (should never happen).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ShadeError {
    /// Returns true if this is a cryptographic error.
    ///
    /// Callers should surface these differently from "no payments found".
    pub fn is_crypto_error(&self) -> bool {
        matches!(
            self,
            ShadeError::EntropyFailure(_)
                | ShadeError::InvalidKeyFormat(_)
                | ShadeError::PointNotOnCurve(_)
                | ShadeError::DerivationMismatch { .. }
                | ShadeError::StealthDerivationError(_)
        )
    }

    /// Returns true if this error signals a broken derivation or key pairing.
    ///
    /// These must be raised loudly, never swallowed.
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, ShadeError::DerivationMismatch { .. })
    }

    /// Returns true if this is a validation error on caller-supplied data.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            ShadeError::ValidationError(_)
                | ShadeError::InvalidMetaAddress(_)
                | ShadeError::InvalidAddress(_)
                | ShadeError::InvalidAnnouncement(_)
                | ShadeError::InvalidViewHintWidth(_)
                | ShadeError::HexError(_)
        )
    }
}
