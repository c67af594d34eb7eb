//! Environment configuration for the `shade` binary.

use anyhow::{Context, Result};

use shade_core::constants::{DEFAULT_SCAN_BATCH_SIZE, DEFAULT_SCAN_PARALLELISM, DEFAULT_VIEW_HINT_BYTES};
use shade_scanner::ScannerConfig;
use shade_stealth::{SchemeKind, StealthConfig};

/// Settings read from the environment (and `.env`), overridable by flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliConfig {
    pub view_hint_bytes: u8,
    pub scheme: SchemeKind,
    pub scan_batch_size: usize,
    pub scan_parallelism: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            view_hint_bytes: DEFAULT_VIEW_HINT_BYTES,
            scheme: SchemeKind::default(),
            scan_batch_size: DEFAULT_SCAN_BATCH_SIZE,
            scan_parallelism: DEFAULT_SCAN_PARALLELISM,
        }
    }
}

impl CliConfig {
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let view_hint_bytes = match lookup("SHADE_VIEW_HINT_BYTES") {
            Some(v) => v.trim().parse().context("SHADE_VIEW_HINT_BYTES must be 1-8")?,
            None => defaults.view_hint_bytes,
        };
        let scheme = match lookup("SHADE_SCHEME") {
            Some(v) => v.parse().context("invalid SHADE_SCHEME")?,
            None => defaults.scheme,
        };
        let scan_batch_size = match lookup("SHADE_SCAN_BATCH_SIZE") {
            Some(v) => v.trim().parse().context("invalid SHADE_SCAN_BATCH_SIZE")?,
            None => defaults.scan_batch_size,
        };
        let scan_parallelism = match lookup("SHADE_SCAN_PARALLELISM") {
            Some(v) => v.trim().parse().context("invalid SHADE_SCAN_PARALLELISM")?,
            None => defaults.scan_parallelism,
        };

        Ok(Self {
            view_hint_bytes,
            scheme,
            scan_batch_size,
            scan_parallelism,
        })
    }

    pub fn stealth_config(&self) -> StealthConfig {
        StealthConfig::new()
            .with_view_hint_bytes(self.view_hint_bytes)
            .with_scheme(self.scheme)
    }

    pub fn scanner_config(&self) -> ScannerConfig {
        ScannerConfig::new()
            .batch_size(self.scan_batch_size)
            .parallelism(self.scan_parallelism)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = CliConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.stealth_config(), StealthConfig::default());
        assert_eq!(config.scanner_config(), ScannerConfig::default());
    }

    #[test]
    fn test_reads_all_variables() {
        let config = CliConfig::from_lookup(lookup(&[
            ("SHADE_VIEW_HINT_BYTES", "2"),
            ("SHADE_SCHEME", "point-addition"),
            ("SHADE_SCAN_BATCH_SIZE", " 500 "),
            ("SHADE_SCAN_PARALLELISM", "8"),
        ]))
        .unwrap();

        assert_eq!(config.view_hint_bytes, 2);
        assert_eq!(config.scheme, SchemeKind::PointAddition);
        assert_eq!(config.scanner_config().batch_size, 500);
        assert_eq!(config.scanner_config().max_parallel_batches, 8);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(CliConfig::from_lookup(lookup(&[("SHADE_VIEW_HINT_BYTES", "wide")])).is_err());
        assert!(CliConfig::from_lookup(lookup(&[("SHADE_SCHEME", "rot13")])).is_err());
        assert!(CliConfig::from_lookup(lookup(&[("SHADE_SCAN_BATCH_SIZE", "-1")])).is_err());
    }
}
