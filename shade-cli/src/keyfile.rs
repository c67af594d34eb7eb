//! JSON key files.
//!
//! Private keys are written as hex by hand; the key types themselves never
//! implement `Serialize`.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use shade_core::types::{MetaAddress, PrivateKey, PublicKey};
use shade_stealth::{meta_address_from_private_keys, ScanKeys};

/// On-disk layout of a recipient key file.
#[derive(Debug, Serialize, Deserialize)]
pub struct KeyFile {
    pub spend_private_key: String,
    pub spend_public_key: PublicKey,
    pub viewing_private_key: String,
    pub viewing_public_key: PublicKey,
    pub meta_address: String,
}

impl KeyFile {
    pub fn from_meta_address(meta: &MetaAddress) -> Self {
        Self {
            spend_private_key: meta.spend_private_key().to_hex(),
            spend_public_key: *meta.spend_public_key(),
            viewing_private_key: meta.viewing_private_key().to_hex(),
            viewing_public_key: *meta.viewing_public_key(),
            meta_address: meta.public().encode(),
        }
    }

    /// Rebuilds the meta-address, checking the stored public keys match.
    pub fn to_meta_address(&self) -> Result<MetaAddress> {
        let spend = PrivateKey::from_hex(&self.spend_private_key).context("bad spend_private_key")?;
        let viewing =
            PrivateKey::from_hex(&self.viewing_private_key).context("bad viewing_private_key")?;
        let meta = meta_address_from_private_keys(spend, viewing)?;

        anyhow::ensure!(
            *meta.spend_public_key() == self.spend_public_key,
            "spend_public_key does not match spend_private_key"
        );
        anyhow::ensure!(
            *meta.viewing_public_key() == self.viewing_public_key,
            "viewing_public_key does not match viewing_private_key"
        );
        Ok(meta)
    }

    /// Scan keys, dropping the spend private key when `view_only` is set.
    pub fn scan_keys(&self, view_only: bool) -> Result<ScanKeys> {
        let meta = self.to_meta_address()?;
        let mut keys = ScanKeys::from_meta_address(&meta);
        if view_only {
            keys.spend_private_key = None;
        }
        Ok(keys)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read key file {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("malformed key file {}", path.display()))
    }

    /// Writes the key file, readable by the owner only on Unix.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options
            .open(path)
            .with_context(|| format!("failed to write key file {}", path.display()))?;
        // `mode` only applies on creation; tighten an existing file too.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("failed to restrict key file {}", path.display()))?;
        }
        file.write_all(json.as_bytes())
            .with_context(|| format!("failed to write key file {}", path.display()))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
