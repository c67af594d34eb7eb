//! Payment discovery (recipient scan).

use std::time::Instant;

use tracing::{debug, warn};

use shade_core::error::{Result, ShadeError};
use shade_core::types::{Address, Announcement, MetaAddress, PrivateKey, PublicKey};

use crate::ownership::AnnouncementMatch;
use crate::recover::verify_stealth_key;
use crate::service::StealthService;

/// Keys a recipient scans with.
///
/// Without the spend private key the scan is view-only: payments are found
/// but their private keys are not reconstructed.
#[derive(Clone)]
pub struct ScanKeys {
    /// Viewing private key
    pub viewing_private_key: PrivateKey,
    /// Spend public key
    pub spend_public_key: PublicKey,
    /// Spend private key, if spending authority is available
    pub spend_private_key: Option<PrivateKey>,
}

impl ScanKeys {
    /// Full scan keys from a meta-address.
    pub fn from_meta_address(meta: &MetaAddress) -> Self {
        Self {
            viewing_private_key: meta.viewing_private_key().clone(),
            spend_public_key: *meta.spend_public_key(),
            spend_private_key: Some(meta.spend_private_key().clone()),
        }
    }

    /// View-only scan keys.
    pub fn view_only(viewing_private_key: PrivateKey, spend_public_key: PublicKey) -> Self {
        Self {
            viewing_private_key,
            spend_public_key,
            spend_private_key: None,
        }
    }

    /// True when private keys of discovered payments can be reconstructed.
    pub fn can_spend(&self) -> bool {
        self.spend_private_key.is_some()
    }
}

impl std::fmt::Debug for ScanKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanKeys")
            .field("spend_public_key", &self.spend_public_key)
            .field("can_spend", &self.can_spend())
            .finish()
    }
}

/// A payment found during a scan.
#[derive(Clone, Debug)]
pub struct DiscoveredPayment {
    /// The announcement that matched
    pub announcement: Announcement,
    /// The stealth address (equal to `announcement.stealth_address`)
    pub stealth_address: Address,
    /// Reconstructed private key, if the scan had spending authority
    pub private_key: Option<PrivateKey>,
}

/// Result of scanning a single announcement.
#[derive(Debug)]
pub enum ScanResult {
    /// View hint or address did not match - not for this recipient
    NotForUs,
    /// Address matched - payment discovered
    Discovered(DiscoveredPayment),
    /// The announcement or derivation was unusable
    Failed(ShadeError),
}

impl ScanResult {
    /// Returns true if a payment was discovered.
    pub fn is_discovered(&self) -> bool {
        matches!(self, ScanResult::Discovered(_))
    }

    /// Returns the discovered payment if present.
    pub fn into_payment(self) -> Option<DiscoveredPayment> {
        match self {
            ScanResult::Discovered(payment) => Some(payment),
            _ => None,
        }
    }
}

/// Statistics for scanning operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanStats {
    /// Total announcements scanned
    pub total_scanned: u64,
    /// Announcements that passed the view hint filter
    pub view_hint_matches: u64,
    /// Number of payments discovered
    pub discoveries: u64,
    /// Number of errors during scanning
    pub errors: u64,
    /// Duration of the scan in milliseconds
    pub duration_ms: u64,
}

impl ScanStats {
    /// Creates a new stats tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a scan result.
    pub fn record(&mut self, result: &ScanResult, view_hint_matched: bool) {
        self.total_scanned += 1;
        if view_hint_matched {
            self.view_hint_matches += 1;
        }
        match result {
            ScanResult::Discovered(_) => self.discoveries += 1,
            ScanResult::Failed(_) => self.errors += 1,
            ScanResult::NotForUs => {}
        }
    }

    /// Folds another batch's stats into this one.
    pub fn merge(&mut self, other: &ScanStats) {
        self.total_scanned += other.total_scanned;
        self.view_hint_matches += other.view_hint_matches;
        self.discoveries += other.discoveries;
        self.errors += other.errors;
    }

    /// Returns the scan rate (announcements per second).
    pub fn rate(&self) -> f64 {
        if self.duration_ms == 0 {
            0.0
        } else {
            (self.total_scanned as f64 / self.duration_ms as f64) * 1000.0
        }
    }

    /// Returns the filter efficiency (percentage of announcements filtered).
    pub fn filter_efficiency(&self) -> f64 {
        if self.total_scanned == 0 {
            0.0
        } else {
            ((self.total_scanned - self.view_hint_matches) as f64 / self.total_scanned as f64)
                * 100.0
        }
    }
}

impl StealthService {
    /// Scans one announcement.
    ///
    /// Returns the result and whether the view hint matched (always true
    /// when hint filtering is off).
    pub fn scan_announcement_detailed(
        &self,
        announcement: &Announcement,
        keys: &ScanKeys,
    ) -> (ScanResult, bool) {
        let shared_secret = match self.match_announcement(
            announcement,
            &keys.viewing_private_key,
            &keys.spend_public_key,
        ) {
            Ok(AnnouncementMatch::Owned(secret)) => secret,
            Ok(AnnouncementMatch::HintMiss) => return (ScanResult::NotForUs, false),
            Ok(AnnouncementMatch::Mismatch) => {
                debug!(id = announcement.id, "view hint collision");
                return (ScanResult::NotForUs, true);
            }
            Err(e) => return (ScanResult::Failed(e), false),
        };

        let private_key = match &keys.spend_private_key {
            Some(spend) => {
                let recovered = self
                    .scheme()
                    .derive_stealth_private_key(&shared_secret, spend)
                    .and_then(|sk| {
                        verify_stealth_key(&sk, &announcement.stealth_address)?;
                        Ok(sk)
                    });
                match recovered {
                    Ok(sk) => Some(sk),
                    Err(e) => return (ScanResult::Failed(e), true),
                }
            }
            None => None,
        };

        let payment = DiscoveredPayment {
            announcement: announcement.clone(),
            stealth_address: announcement.stealth_address,
            private_key,
        };
        (ScanResult::Discovered(payment), true)
    }

    /// Scans one announcement.
    pub fn scan_announcement(&self, announcement: &Announcement, keys: &ScanKeys) -> ScanResult {
        self.scan_announcement_detailed(announcement, keys).0
    }

    /// Scans a list of announcements sequentially.
    ///
    /// Malformed announcements are skipped with a warning.
    ///
    /// # Errors
    /// Integrity failures (`DerivationMismatch`) abort the scan.
    pub fn scan_announcements(
        &self,
        announcements: &[Announcement],
        keys: &ScanKeys,
    ) -> Result<(Vec<DiscoveredPayment>, ScanStats)> {
        let start = Instant::now();
        let mut stats = ScanStats::new();
        let mut found = Vec::new();

        for announcement in announcements {
            let (result, hint_matched) = self.scan_announcement_detailed(announcement, keys);
            stats.record(&result, hint_matched);
            match result {
                ScanResult::Discovered(payment) => found.push(payment),
                ScanResult::Failed(e) if e.is_integrity_error() => return Err(e),
                ScanResult::Failed(e) => {
                    warn!(id = announcement.id, error = %e, "skipping unusable announcement");
                }
                ScanResult::NotForUs => {}
            }
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;
        Ok((found, stats))
    }
}

/// Scans one announcement with the default configuration.
pub fn scan_announcement(announcement: &Announcement, keys: &ScanKeys) -> ScanResult {
    StealthService::default().scan_announcement(announcement, keys)
}

/// Scans announcements with the default configuration.
pub fn scan_announcements(
    announcements: &[Announcement],
    keys: &ScanKeys,
) -> Result<(Vec<DiscoveredPayment>, ScanStats)> {
    StealthService::default().scan_announcements(announcements, keys)
}
