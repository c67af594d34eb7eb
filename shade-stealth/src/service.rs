//! The stealth service: configuration plus the derivation scheme.
//!
//! Operations in this crate are methods on [`StealthService`], which is cheap
//! to clone and carries no network state. Callers construct one from a
//! [`StealthConfig`] and pass it where needed; nothing is global.

use std::sync::Arc;

use shade_core::error::Result;
use shade_core::types::SharedSecret;
use shade_crypto::{compute_view_hint, StealthScheme};

use crate::config::StealthConfig;

/// Entry point for stealth operations under one configuration.
#[derive(Clone, Debug)]
pub struct StealthService {
    config: StealthConfig,
    scheme: Arc<dyn StealthScheme>,
}

impl StealthService {
    /// Creates a service after validating `config`.
    pub fn new(config: StealthConfig) -> Result<Self> {
        config.validate()?;
        let scheme = config.scheme.scheme();
        Ok(Self { config, scheme })
    }

    /// Creates a service with a caller-supplied scheme implementation.
    ///
    /// `config.scheme` is ignored for derivation but kept for display.
    pub fn with_scheme(config: StealthConfig, scheme: Arc<dyn StealthScheme>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, scheme })
    }

    /// Active configuration.
    pub fn config(&self) -> &StealthConfig {
        &self.config
    }

    /// Active derivation scheme.
    pub fn scheme(&self) -> &dyn StealthScheme {
        self.scheme.as_ref()
    }

    /// View hint for a shared secret at the configured width.
    pub fn view_hint(&self, shared_secret: &SharedSecret) -> Result<u64> {
        compute_view_hint(shared_secret, self.config.view_hint_bytes)
    }

    /// Copy of this service with view hint filtering switched on or off.
    pub fn with_view_hint_filter(&self, enabled: bool) -> Self {
        let mut config = self.config.clone();
        config.use_view_hint = enabled;
        Self {
            config,
            scheme: Arc::clone(&self.scheme),
        }
    }
}

impl Default for StealthService {
    fn default() -> Self {
        let config = StealthConfig::default();
        let scheme = config.scheme.scheme();
        Self { config, scheme }
    }
}
