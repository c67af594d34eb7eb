//! # Shade Scanner
//!
//! Batch scanning of a registry to discover incoming payments.
//!
//! ## Features
//!
//! - **Parallel Batches**: Announcements are split into batches that run on
//!   the blocking thread pool, several at a time
//! - **Progress Reporting**: Callback after every finished batch
//! - **Resumable Scans**: A [`ScanPosition`] records how far the log has been
//!   scanned; the next scan starts after it
//! - **Verified Keys**: Reconstructed private keys are checked against the
//!   announced address, and a mismatch aborts the scan
//!
//! ## Example
//!
//! ```rust
//! use shade_registry::{MemoryRegistry, Registry};
//! use shade_scanner::Scanner;
//! use shade_stealth::{create_stealth_payment, generate_meta_address};
//!
//! # tokio_test::block_on(async {
//! let meta = generate_meta_address().unwrap();
//! let registry = MemoryRegistry::new();
//! let payment = create_stealth_payment(&meta.public()).unwrap();
//! registry.publish(payment.announcement).await.unwrap();
//!
//! let scanner = Scanner::from_meta_address(&meta);
//! let summary = scanner.scan_all(&registry).await.unwrap();
//! assert_eq!(summary.discoveries.len(), 1);
//! # });
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

use std::time::Instant;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use shade_core::constants::{DEFAULT_SCAN_BATCH_SIZE, DEFAULT_SCAN_PARALLELISM, MAX_SCAN_BATCH_SIZE};
use shade_core::error::{Result, ShadeError};
use shade_core::traits::{AnnouncementRegistry, ProgressCallback, ScanProgress};
use shade_core::types::{Announcement, MetaAddress};
use shade_stealth::{DiscoveredPayment, ScanKeys, ScanStats, StealthService};

/// Scanner configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Announcements per batch
    pub batch_size: usize,
    /// Batches scanned concurrently
    pub max_parallel_batches: usize,
    /// Stop scheduling batches once a payment is found
    pub stop_on_first: bool,
    /// Minimum timestamp to scan from (inclusive)
    pub from_timestamp: Option<u64>,
    /// Maximum timestamp to scan to (inclusive)
    pub to_timestamp: Option<u64>,
    /// Reject announcements by view hint before deriving addresses
    pub use_view_hint: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_SCAN_BATCH_SIZE,
            max_parallel_batches: DEFAULT_SCAN_PARALLELISM,
            stop_on_first: false,
            from_timestamp: None,
            to_timestamp: None,
            use_view_hint: true,
        }
    }
}

impl ScannerConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Sets how many batches run at once.
    pub fn parallelism(mut self, batches: usize) -> Self {
        self.max_parallel_batches = batches;
        self
    }

    /// Enables stopping on first discovery.
    pub fn stop_on_first(mut self) -> Self {
        self.stop_on_first = true;
        self
    }

    /// Sets the time range filter.
    pub fn time_range(mut self, from: u64, to: u64) -> Self {
        self.from_timestamp = Some(from);
        self.to_timestamp = Some(to);
        self
    }

    /// Derives an address for every announcement, ignoring view hints.
    pub fn without_view_hint(mut self) -> Self {
        self.use_view_hint = false;
        self
    }

    /// Checks batch size and parallelism bounds.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 || self.batch_size > MAX_SCAN_BATCH_SIZE {
            return Err(ShadeError::ConfigError(format!(
                "batch size must be between 1 and {}, got {}",
                MAX_SCAN_BATCH_SIZE, self.batch_size
            )));
        }
        if self.max_parallel_batches == 0 {
            return Err(ShadeError::ConfigError(
                "at least one batch must run at a time".into(),
            ));
        }
        if let (Some(from), Some(to)) = (self.from_timestamp, self.to_timestamp) {
            if from > to {
                return Err(ShadeError::ConfigError(format!(
                    "empty time range: {} > {}",
                    from, to
                )));
            }
        }
        Ok(())
    }
}

/// Scan position for resumable scanning.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanPosition {
    /// Highest announcement ID scanned without gaps
    pub last_id: u64,
    /// Timestamp of that announcement
    pub last_timestamp: u64,
    /// Total announcements scanned
    pub total_scanned: u64,
    /// Total discoveries
    pub total_discoveries: u64,
}

impl ScanPosition {
    /// Creates a new scan position.
    pub fn new() -> Self {
        Self::default()
    }

    fn advance(&mut self, batch: &BatchOutcome) {
        self.last_id = batch.last_id;
        self.last_timestamp = batch.last_timestamp;
        self.total_scanned += batch.stats.total_scanned;
        self.total_discoveries += batch.stats.discoveries;
    }
}

/// Result of one scan run.
#[derive(Debug)]
pub struct ScanSummary {
    /// Payments found, ordered by announcement ID
    pub discoveries: Vec<DiscoveredPayment>,
    /// Statistics for this run
    pub stats: ScanStats,
    /// Position after this run; local to the run when a time range was set
    pub position: ScanPosition,
    /// True if the run ended early because of `stop_on_first`
    pub stopped_early: bool,
}

#[derive(Debug)]
struct BatchOutcome {
    index: usize,
    found: Vec<DiscoveredPayment>,
    stats: ScanStats,
    last_id: u64,
    last_timestamp: u64,
}

fn scan_batch(
    index: usize,
    service: &StealthService,
    keys: &ScanKeys,
    batch: Vec<Announcement>,
) -> Result<BatchOutcome> {
    let (found, stats) = service.scan_announcements(&batch, keys)?;
    let (last_id, last_timestamp) = batch
        .last()
        .map_or((0, 0), |a| (a.id, a.timestamp));
    Ok(BatchOutcome {
        index,
        found,
        stats,
        last_id,
        last_timestamp,
    })
}

/// Main scanner for discovering payments.
pub struct Scanner {
    service: StealthService,
    keys: ScanKeys,
    position: RwLock<ScanPosition>,
    stats: RwLock<ScanStats>,
}

impl Scanner {
    /// Creates a scanner from a service and scan keys.
    ///
    /// Private keys are reconstructed only if `keys` carries the spend
    /// private key.
    pub fn new(service: StealthService, keys: ScanKeys) -> Self {
        Self {
            service,
            keys,
            position: RwLock::new(ScanPosition::new()),
            stats: RwLock::new(ScanStats::new()),
        }
    }

    /// Creates a scanner with full keys and the default service.
    pub fn from_meta_address(meta: &MetaAddress) -> Self {
        Self::new(StealthService::default(), ScanKeys::from_meta_address(meta))
    }

    /// Returns the current scan position.
    pub fn position(&self) -> ScanPosition {
        self.position.read().clone()
    }

    /// Restores a previously saved position.
    pub fn set_position(&self, position: ScanPosition) {
        *self.position.write() = position;
    }

    /// Returns statistics accumulated over all runs.
    pub fn stats(&self) -> ScanStats {
        self.stats.read().clone()
    }

    /// Resets the scan position and statistics.
    pub fn reset_position(&self) {
        *self.position.write() = ScanPosition::new();
        *self.stats.write() = ScanStats::new();
    }

    /// Scans every announcement after the current position.
    pub async fn scan_all(&self, registry: &dyn AnnouncementRegistry) -> Result<ScanSummary> {
        self.scan_with_config(registry, ScannerConfig::default()).await
    }

    /// Scans with custom configuration.
    #[instrument(skip(self, registry, config))]
    pub async fn scan_with_config(
        &self,
        registry: &dyn AnnouncementRegistry,
        config: ScannerConfig,
    ) -> Result<ScanSummary> {
        self.run(registry, config, None).await
    }

    /// Scans with a progress callback, called after every batch.
    #[instrument(skip(self, registry, config, progress_callback))]
    pub async fn scan_with_progress(
        &self,
        registry: &dyn AnnouncementRegistry,
        config: ScannerConfig,
        progress_callback: ProgressCallback,
    ) -> Result<ScanSummary> {
        self.run(registry, config, Some(&progress_callback)).await
    }

    async fn run(
        &self,
        registry: &dyn AnnouncementRegistry,
        config: ScannerConfig,
        progress_callback: Option<&ProgressCallback>,
    ) -> Result<ScanSummary> {
        config.validate()?;
        let start = Instant::now();

        // Time-ranged runs skip ids outside the range, so they never move
        // the saved position.
        let tracks_position = config.from_timestamp.is_none() && config.to_timestamp.is_none();
        let mut position = if tracks_position {
            self.position()
        } else {
            ScanPosition::new()
        };
        let resume_after = position.last_id;

        let mut pending: Vec<Announcement> = registry
            .get_by_time_range(
                config.from_timestamp.unwrap_or(0),
                config.to_timestamp.unwrap_or(u64::MAX),
            )
            .await?
            .into_iter()
            .filter(|a| a.id > resume_after)
            .collect();
        pending.sort_by_key(|a| a.id);

        let total = pending.len() as u64;
        info!(
            total,
            resume_after,
            tracks_position,
            batch_size = config.batch_size,
            parallelism = config.max_parallel_batches,
            "Starting scan"
        );

        let service = self.service.with_view_hint_filter(config.use_view_hint);
        let batches: Vec<Vec<Announcement>> = pending
            .chunks(config.batch_size)
            .map(|chunk| chunk.to_vec())
            .collect();
        let batch_count = batches.len();

        let mut queue = batches.into_iter().enumerate();
        let mut tasks = JoinSet::new();
        let mut finished: Vec<Option<BatchOutcome>> = (0..batch_count).map(|_| None).collect();
        let mut next_unmarked = 0;

        let mut run_stats = ScanStats::new();
        let mut discoveries = Vec::new();
        let mut progress = ScanProgress {
            total,
            ..ScanProgress::default()
        };
        let mut stopped_early = false;

        loop {
            // Once stopping, in-flight batches still drain so the position
            // covers every batch whose discoveries are reported.
            while !stopped_early && tasks.len() < config.max_parallel_batches {
                let Some((index, batch)) = queue.next() else {
                    break;
                };
                let service = service.clone();
                let keys = self.keys.clone();
                tasks.spawn_blocking(move || scan_batch(index, &service, &keys, batch));
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };
            let mut outcome = match joined {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(e)) => {
                    tasks.abort_all();
                    warn!(error = %e, "Scan aborted");
                    return Err(e);
                }
                Err(e) => {
                    tasks.abort_all();
                    return Err(ShadeError::InternalError(format!("scan task failed: {}", e)));
                }
            };

            debug!(
                batch = outcome.index,
                scanned = outcome.stats.total_scanned,
                found = outcome.found.len(),
                "Batch complete"
            );

            run_stats.merge(&outcome.stats);
            self.stats.write().merge(&outcome.stats);
            discoveries.append(&mut outcome.found);

            progress.scanned = run_stats.total_scanned;
            progress.matched_view_hint = run_stats.view_hint_matches;
            progress.discoveries = run_stats.discoveries;
            if let Some(callback) = progress_callback {
                callback(progress.clone());
            }

            let index = outcome.index;
            finished[index] = Some(outcome);
            while let Some(Some(batch)) = finished.get(next_unmarked) {
                position.advance(batch);
                next_unmarked += 1;
            }
            if tracks_position {
                self.set_position(position.clone());
            }

            if config.stop_on_first && !stopped_early && !discoveries.is_empty() {
                info!(in_flight = tasks.len(), "Stopping on first discovery");
                stopped_early = true;
            }
        }

        discoveries.sort_by_key(|d| d.announcement.id);
        run_stats.duration_ms = start.elapsed().as_millis() as u64;
        self.stats.write().duration_ms += run_stats.duration_ms;

        info!(
            discoveries = discoveries.len(),
            scanned = run_stats.total_scanned,
            duration_ms = run_stats.duration_ms,
            rate = run_stats.rate(),
            "Scan complete"
        );

        Ok(ScanSummary {
            discoveries,
            stats: run_stats,
            position,
            stopped_early,
        })
    }
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("service", &self.service)
            .field("keys", &self.keys)
            .field("position", &*self.position.read())
            .finish()
    }
}
