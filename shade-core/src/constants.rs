//! Protocol constants for Shade.
//!
//! Sizes follow secp256k1 (SEC 1 encodings) and Ethereum account addresses.

// ═══════════════════════════════════════════════════════════════════════════════
// SECP256K1 SIZES
// ═══════════════════════════════════════════════════════════════════════════════

/// Size of a secp256k1 private key (scalar) in bytes.
pub const PRIVATE_KEY_SIZE: usize = 32;

/// Size of a SEC 1 compressed public key in bytes (parity prefix + X).
pub const COMPRESSED_PUBLIC_KEY_SIZE: usize = 33;

/// Size of a SEC 1 uncompressed public key in bytes (0x04 + X + Y).
pub const UNCOMPRESSED_PUBLIC_KEY_SIZE: usize = 65;

/// Size of the hashed ECDH shared secret.
pub const SHARED_SECRET_SIZE: usize = 32;

/// Order `n` of the secp256k1 group, big-endian.
///
/// Valid private keys are scalars in `[1, n)`.
pub const SECP256K1_ORDER: [u8; PRIVATE_KEY_SIZE] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// Maximum number of fresh random draws before key generation gives up.
///
/// A single rejection has probability ~2^-128, so exhausting this bound
/// means the random source is broken.
pub const MAX_KEYGEN_ATTEMPTS: usize = 16;

// ═══════════════════════════════════════════════════════════════════════════════
// VIEW HINT CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default view hint width in bytes.
/// With 1 byte a scanner rejects ~255/256 of foreign payments cheaply.
pub const DEFAULT_VIEW_HINT_BYTES: u8 = 1;

/// Maximum view hint width in bytes (the hint is carried as a `u64`).
pub const MAX_VIEW_HINT_BYTES: u8 = 8;

/// Number of distinct hint values at the default width.
pub const VIEW_HINT_SPACE: usize = 256;

// ═══════════════════════════════════════════════════════════════════════════════
// ETHEREUM CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Size of an Ethereum address in bytes (20 bytes = 160 bits).
pub const ADDRESS_SIZE: usize = 20;

/// Length of a `0x`-prefixed hex address string.
pub const ADDRESS_HEX_LEN: usize = 2 + ADDRESS_SIZE * 2;

/// Size of keccak256 hash output.
pub const KECCAK256_SIZE: usize = 32;

// ═══════════════════════════════════════════════════════════════════════════════
// ENCODINGS
// ═══════════════════════════════════════════════════════════════════════════════

/// Prefix of an encoded public meta-address (`st:eth:0x<spend><viewing>`).
pub const META_ADDRESS_PREFIX: &str = "st:eth:";

/// Size of the binary meta-address payload (spend pk + viewing pk, compressed).
pub const META_ADDRESS_PAYLOAD_SIZE: usize = 2 * COMPRESSED_PUBLIC_KEY_SIZE;

// ═══════════════════════════════════════════════════════════════════════════════
// ANNOUNCEMENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// How far in the future (seconds) an announcement timestamp may lie.
pub const MAX_ANNOUNCEMENT_CLOCK_SKEW_SECS: u64 = 3600;

// ═══════════════════════════════════════════════════════════════════════════════
// PERFORMANCE TUNING
// ═══════════════════════════════════════════════════════════════════════════════

/// Default batch size for scanning announcements.
pub const DEFAULT_SCAN_BATCH_SIZE: usize = 1000;

/// Maximum announcements to scan in a single batch.
pub const MAX_SCAN_BATCH_SIZE: usize = 10_000;

/// Default number of batches scanned concurrently.
pub const DEFAULT_SCAN_PARALLELISM: usize = 4;
