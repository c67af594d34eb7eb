//! Common traits for Shade.
//!
//! The cryptographic core never reaches for a live network handle. Anything
//! that stores or serves announcements is injected through these traits.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Announcement;

// ═══════════════════════════════════════════════════════════════════════════════
// REGISTRY TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Interface for announcement storage and retrieval.
///
/// Implementations might use:
/// - In-memory storage (for testing/development)
/// - An indexer over on-chain announcement events
#[async_trait]
pub trait AnnouncementRegistry: Send + Sync {
    /// Publishes a new announcement to the registry.
    ///
    /// Returns the assigned announcement ID.
    async fn publish(&self, announcement: Announcement) -> Result<u64>;

    /// Retrieves announcements carrying the given view hint.
    ///
    /// This is the primary query pattern for scanners.
    async fn get_by_view_hint(&self, view_hint: u64) -> Result<Vec<Announcement>>;

    /// Retrieves announcements with `start <= timestamp <= end`.
    async fn get_by_time_range(&self, start: u64, end: u64) -> Result<Vec<Announcement>>;

    /// Retrieves a specific announcement by ID.
    async fn get_by_id(&self, id: u64) -> Result<Option<Announcement>>;

    /// Returns total announcement count.
    async fn count(&self) -> Result<u64>;

    /// Returns the next available announcement ID.
    async fn next_id(&self) -> Result<u64>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCAN PROGRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// Progress update during scanning.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanProgress {
    /// Total announcements to scan
    pub total: u64,
    /// Announcements scanned so far
    pub scanned: u64,
    /// Announcements that passed the view hint filter
    pub matched_view_hint: u64,
    /// Discoveries found so far
    pub discoveries: u64,
}

impl ScanProgress {
    /// Fraction of the work done, in `[0.0, 1.0]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.scanned as f64 / self.total as f64
        }
    }
}

/// Callback for scan progress updates.
pub type ProgressCallback = Box<dyn Fn(ScanProgress) + Send + Sync>;
