//! Announcement types for the Shade registry.
//!
//! Senders publish one announcement per stealth payment. It carries what a
//! recipient needs to recognise the payment: the ephemeral public key, the
//! one-time address, and the view hint.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Address, PublicKey};
use crate::constants::MAX_ANNOUNCEMENT_CLOCK_SKEW_SECS;
use crate::error::{Result, ShadeError};

/// An announcement published to the registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    /// Unique identifier (assigned by registry)
    #[serde(default)]
    pub id: u64,
    /// Sender's ephemeral public key for this payment
    pub ephemeral_public_key: PublicKey,
    /// One-time address the funds were sent to
    pub stealth_address: Address,
    /// Prefilter value derived from the shared secret
    pub view_hint: u64,
    /// Unix timestamp when announcement was created
    pub timestamp: u64,
    /// Optional: Block number if stored on-chain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    /// Optional: Transaction hash if stored on-chain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

impl Announcement {
    /// Creates a new announcement stamped with the current time.
    pub fn new(ephemeral_public_key: PublicKey, stealth_address: Address, view_hint: u64) -> Self {
        Self {
            id: 0, // Assigned by registry
            ephemeral_public_key,
            stealth_address,
            view_hint,
            timestamp: current_timestamp(),
            block_number: None,
            tx_hash: None,
        }
    }

    /// Validates the announcement structure.
    pub fn validate(&self) -> Result<()> {
        if self.stealth_address.is_zero() {
            return Err(ShadeError::InvalidAnnouncement(
                "stealth address is the zero address".into(),
            ));
        }

        let now = current_timestamp();
        if self.timestamp > now + MAX_ANNOUNCEMENT_CLOCK_SKEW_SECS {
            return Err(ShadeError::InvalidAnnouncement(
                "timestamp is too far in the future".into(),
            ));
        }

        if let Some(hash) = &self.tx_hash {
            let well_formed = hash.len() == 66
                && hash.starts_with("0x")
                && hash[2..].bytes().all(|b| b.is_ascii_hexdigit());
            if !well_formed {
                return Err(ShadeError::InvalidAnnouncement(format!(
                    "malformed transaction hash: {}",
                    hash
                )));
            }
        }

        Ok(())
    }
}

/// Returns current Unix timestamp in seconds.
pub fn current_timestamp() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}

/// Builder for creating announcements with optional fields.
#[derive(Default)]
pub struct AnnouncementBuilder {
    ephemeral_public_key: Option<PublicKey>,
    stealth_address: Option<Address>,
    view_hint: Option<u64>,
    timestamp: Option<u64>,
    block_number: Option<u64>,
    tx_hash: Option<String>,
}

impl AnnouncementBuilder {
    /// Creates a new announcement builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ephemeral public key (required).
    pub fn ephemeral_public_key(mut self, key: PublicKey) -> Self {
        self.ephemeral_public_key = Some(key);
        self
    }

    /// Sets the stealth address (required).
    pub fn stealth_address(mut self, address: Address) -> Self {
        self.stealth_address = Some(address);
        self
    }

    /// Sets the view hint (required).
    pub fn view_hint(mut self, hint: u64) -> Self {
        self.view_hint = Some(hint);
        self
    }

    /// Sets a custom timestamp (optional, defaults to now).
    pub fn timestamp(mut self, ts: u64) -> Self {
        self.timestamp = Some(ts);
        self
    }

    /// Sets the block number (optional).
    pub fn block_number(mut self, num: u64) -> Self {
        self.block_number = Some(num);
        self
    }

    /// Sets the transaction hash (optional).
    pub fn tx_hash(mut self, hash: impl Into<String>) -> Self {
        self.tx_hash = Some(hash.into());
        self
    }

    /// Builds and validates the announcement.
    pub fn build(self) -> Result<Announcement> {
        let ephemeral_public_key = self.ephemeral_public_key.ok_or_else(|| {
            ShadeError::ValidationError("ephemeral_public_key is required".into())
        })?;

        let stealth_address = self
            .stealth_address
            .ok_or_else(|| ShadeError::ValidationError("stealth_address is required".into()))?;

        let view_hint = self
            .view_hint
            .ok_or_else(|| ShadeError::ValidationError("view_hint is required".into()))?;

        let mut announcement = Announcement::new(ephemeral_public_key, stealth_address, view_hint);

        if let Some(ts) = self.timestamp {
            announcement.timestamp = ts;
        }
        announcement.block_number = self.block_number;
        announcement.tx_hash = self.tx_hash;

        announcement.validate()?;
        Ok(announcement)
    }
}

/// Statistics about announcements in a registry.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AnnouncementStats {
    /// Total number of announcements
    pub total_count: u64,
    /// Announcements per view hint value
    pub view_hint_distribution: BTreeMap<u64, u64>,
    /// Earliest announcement timestamp
    pub earliest_timestamp: Option<u64>,
    /// Latest announcement timestamp
    pub latest_timestamp: Option<u64>,
    /// Number of announcements tied to a transaction hash
    pub on_chain_count: u64,
}

impl AnnouncementStats {
    /// Creates empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates stats with a new announcement.
    pub fn add(&mut self, announcement: &Announcement) {
        self.total_count += 1;
        *self
            .view_hint_distribution
            .entry(announcement.view_hint)
            .or_insert(0) += 1;

        let ts = announcement.timestamp;
        self.earliest_timestamp = Some(self.earliest_timestamp.map_or(ts, |t| t.min(ts)));
        self.latest_timestamp = Some(self.latest_timestamp.map_or(ts, |t| t.max(ts)));

        if announcement.tx_hash.is_some() {
            self.on_chain_count += 1;
        }
    }

    /// Number of distinct view hint values seen.
    pub fn distinct_view_hints(&self) -> usize {
        self.view_hint_distribution.len()
    }
}
