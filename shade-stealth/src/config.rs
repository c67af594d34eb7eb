//! Stealth protocol configuration.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use shade_core::constants::DEFAULT_VIEW_HINT_BYTES;
use shade_core::error::{Result, ShadeError};
use shade_crypto::view_hint::check_view_hint_width;
use shade_crypto::{HashedSecretScheme, PointAdditionScheme, StealthScheme};

/// Which stealth key derivation is in use.
///
/// Sender and recipient must agree; addresses from one scheme are never
/// found by a scanner configured for the other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemeKind {
    /// `stealth_sk = keccak256(shared_secret || spend_pk)`
    #[default]
    HashedSecret,
    /// `stealth_pk = spend_pk + G * shared_secret` (EIP-5564 style)
    PointAddition,
}

impl SchemeKind {
    /// Instantiates the scheme.
    pub fn scheme(self) -> Arc<dyn StealthScheme> {
        match self {
            SchemeKind::HashedSecret => Arc::new(HashedSecretScheme),
            SchemeKind::PointAddition => Arc::new(PointAdditionScheme),
        }
    }

    /// Canonical name.
    pub fn as_str(self) -> &'static str {
        match self {
            SchemeKind::HashedSecret => "hashed-secret",
            SchemeKind::PointAddition => "point-addition",
        }
    }
}

impl fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemeKind {
    type Err = ShadeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hashed-secret" | "hashed" => Ok(SchemeKind::HashedSecret),
            "point-addition" | "eip5564" => Ok(SchemeKind::PointAddition),
            other => Err(ShadeError::ConfigError(format!(
                "unknown stealth scheme '{}' (expected hashed-secret or point-addition)",
                other
            ))),
        }
    }
}

/// Configuration shared by senders and recipients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StealthConfig {
    /// Width of the view hint in bytes (1-8)
    pub view_hint_bytes: u8,
    /// Stealth key derivation scheme
    pub scheme: SchemeKind,
    /// Whether recipients use the view hint as a prefilter
    pub use_view_hint: bool,
}

impl Default for StealthConfig {
    fn default() -> Self {
        Self {
            view_hint_bytes: DEFAULT_VIEW_HINT_BYTES,
            scheme: SchemeKind::default(),
            use_view_hint: true,
        }
    }
}

impl StealthConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the view hint width.
    pub fn with_view_hint_bytes(mut self, width: u8) -> Self {
        self.view_hint_bytes = width;
        self
    }

    /// Sets the derivation scheme.
    pub fn with_scheme(mut self, scheme: SchemeKind) -> Self {
        self.scheme = scheme;
        self
    }

    /// Disables view hint prefiltering on the recipient side.
    pub fn without_view_hint(mut self) -> Self {
        self.use_view_hint = false;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        check_view_hint_width(self.view_hint_bytes)
    }
}
