//! In-memory announcement registry.
//!
//! Thread-safe storage for development, testing and single-process use.
//! The log can be exported to JSON and loaded back.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::fs;
use tracing::{debug, info, instrument};

use shade_core::error::{Result, ShadeError};
use shade_core::traits::AnnouncementRegistry;
use shade_core::types::{Announcement, AnnouncementStats};

/// In-memory announcement registry.
///
/// # Indexing
///
/// Announcements are indexed by:
/// - ID: For direct lookup
/// - View hint: For scanning (one bucket per hint value)
/// - Tx hash: For duplicate detection (when provided)
///
/// All operations are thread-safe and can be called concurrently.
#[derive(Debug)]
pub struct MemoryRegistry {
    /// Primary storage: ID → Announcement
    announcements: DashMap<u64, Announcement>,
    /// View hint index: hint → [announcement IDs]
    view_hint_index: DashMap<u64, Vec<u64>>,
    /// Tx hash index: normalized tx_hash → announcement ID
    tx_hash_index: DashMap<String, u64>,
    /// Next announcement ID
    next_id: AtomicU64,
    /// Registry statistics
    stats: RwLock<AnnouncementStats>,
}

impl MemoryRegistry {
    /// Creates a new empty in-memory registry.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a registry with preallocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            announcements: DashMap::with_capacity(capacity),
            view_hint_index: DashMap::new(),
            tx_hash_index: DashMap::new(),
            next_id: AtomicU64::new(1),
            stats: RwLock::new(AnnouncementStats::new()),
        }
    }

    fn normalize_tx_hash(hash: &str) -> String {
        hash.trim().to_lowercase()
    }

    /// Returns the current statistics.
    pub fn stats(&self) -> AnnouncementStats {
        self.stats.read().clone()
    }

    /// Clears all announcements.
    pub fn clear(&self) {
        self.announcements.clear();
        self.view_hint_index.clear();
        self.tx_hash_index.clear();
        self.next_id.store(1, Ordering::SeqCst);
        *self.stats.write() = AnnouncementStats::new();
    }

    /// Returns the number of announcements.
    pub fn len(&self) -> usize {
        self.announcements.len()
    }

    /// Returns true if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.announcements.is_empty()
    }

    /// Returns all announcements ordered by ID.
    pub fn all_announcements(&self) -> Vec<Announcement> {
        let mut all: Vec<Announcement> = self
            .announcements
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by_key(|a| a.id);
        all
    }

    fn check_duplicate(&self, announcement: &Announcement) -> Result<Option<String>> {
        let Some(hash) = &announcement.tx_hash else {
            return Ok(None);
        };
        let normalized = Self::normalize_tx_hash(hash);
        if self.tx_hash_index.contains_key(&normalized) {
            return Err(ShadeError::DuplicateAnnouncement(normalized));
        }
        Ok(Some(normalized))
    }

    fn insert(&self, announcement: Announcement, tx_hash: Option<String>) {
        let id = announcement.id;
        self.view_hint_index
            .entry(announcement.view_hint)
            .or_default()
            .push(id);
        if let Some(hash) = tx_hash {
            self.tx_hash_index.insert(hash, id);
        }
        self.stats.write().add(&announcement);
        self.announcements.insert(id, announcement);
    }

    /// Imports announcements, keeping their IDs where free.
    ///
    /// An announcement with ID 0 or an ID already taken gets a fresh one.
    /// Stops at the first invalid or duplicate announcement.
    pub fn import(&self, announcements: Vec<Announcement>) -> Result<usize> {
        let mut imported = 0;

        for mut ann in announcements {
            ann.validate()?;
            let tx_hash = self.check_duplicate(&ann)?;

            if ann.id == 0 || self.announcements.contains_key(&ann.id) {
                ann.id = self.next_id.fetch_add(1, Ordering::SeqCst);
            } else {
                let after = ann.id.checked_add(1).ok_or_else(|| {
                    ShadeError::InvalidAnnouncement(format!("announcement id {} out of range", ann.id))
                })?;
                self.next_id.fetch_max(after, Ordering::SeqCst);
            }

            self.insert(ann, tx_hash);
            imported += 1;
        }

        Ok(imported)
    }

    /// Serializes the whole log as a JSON array ordered by ID.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.all_announcements())?)
    }

    /// Imports announcements from a JSON array.
    pub fn import_json(&self, json: &str) -> Result<usize> {
        let announcements: Vec<Announcement> = serde_json::from_str(json)?;
        self.import(announcements)
    }

    /// Writes the log to `path` as JSON.
    ///
    /// Writes to a temporary sibling first, then renames it over `path`.
    #[instrument(skip(self, path), fields(file = %path.as_ref().display()))]
    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.export_json()?;
        let temp_path = path.with_extension("tmp");

        fs::write(&temp_path, json).await?;
        fs::rename(&temp_path, path).await?;

        info!(count = self.len(), "Saved announcements");
        Ok(())
    }

    /// Loads a registry from a JSON file. A missing file gives an empty registry.
    #[instrument(skip(path), fields(file = %path.as_ref().display()))]
    pub async fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let registry = Self::new();
        let json = match fs::read_to_string(path.as_ref()).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(registry),
            Err(e) => return Err(e.into()),
        };

        let count = registry.import_json(&json).map_err(|e| {
            ShadeError::RegistryError(format!(
                "failed to load {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        info!(count, "Loaded announcements");
        Ok(registry)
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnnouncementRegistry for MemoryRegistry {
    /// Validates, assigns an ID, indexes and stores the announcement.
    #[instrument(skip(self, announcement), fields(view_hint = announcement.view_hint))]
    async fn publish(&self, mut announcement: Announcement) -> Result<u64> {
        announcement.validate()?;
        let tx_hash = self.check_duplicate(&announcement)?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        announcement.id = id;

        debug!(id, view_hint = announcement.view_hint, "Publishing announcement");
        self.insert(announcement, tx_hash);

        Ok(id)
    }

    #[instrument(skip(self))]
    async fn get_by_view_hint(&self, view_hint: u64) -> Result<Vec<Announcement>> {
        let ids = match self.view_hint_index.get(&view_hint) {
            Some(ids) => ids.clone(),
            None => return Ok(Vec::new()),
        };

        let announcements: Vec<Announcement> = ids
            .iter()
            .filter_map(|id| self.announcements.get(id).map(|entry| entry.clone()))
            .collect();

        debug!(view_hint, count = announcements.len(), "Retrieved by view hint");
        Ok(announcements)
    }

    #[instrument(skip(self))]
    async fn get_by_time_range(&self, start: u64, end: u64) -> Result<Vec<Announcement>> {
        let mut announcements: Vec<Announcement> = self
            .announcements
            .iter()
            .filter(|entry| {
                let ts = entry.value().timestamp;
                ts >= start && ts <= end
            })
            .map(|entry| entry.value().clone())
            .collect();

        announcements.sort_by_key(|a| (a.timestamp, a.id));

        debug!(start, end, count = announcements.len(), "Retrieved by time range");
        Ok(announcements)
    }

    async fn get_by_id(&self, id: u64) -> Result<Option<Announcement>> {
        Ok(self.announcements.get(&id).map(|entry| entry.clone()))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.announcements.len() as u64)
    }

    async fn next_id(&self) -> Result<u64> {
        Ok(self.next_id.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shade_core::types::{Address, PublicKey};

    fn make_test_announcement(view_hint: u64) -> Announcement {
        Announcement::new(
            PublicKey::from_array([0x02; 33]).unwrap(),
            Address::from_array([0x11; 20]),
            view_hint,
        )
    }

    fn tx_hash(n: u8) -> String {
        format!("0x{}", hex_byte(n).repeat(32))
    }

    fn hex_byte(n: u8) -> String {
        format!("{:02x}", n)
    }

    #[tokio::test]
    async fn test_publish_and_get_by_id() {
        let registry = MemoryRegistry::new();

        let id = registry.publish(make_test_announcement(0x42)).await.unwrap();
        assert_eq!(id, 1);

        let retrieved = registry.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(retrieved.view_hint, 0x42);
        assert_eq!(retrieved.id, 1);
    }

    #[tokio::test]
    async fn test_get_by_view_hint() {
        let registry = MemoryRegistry::new();

        registry.publish(make_test_announcement(0x42)).await.unwrap();
        registry.publish(make_test_announcement(0x42)).await.unwrap();
        registry.publish(make_test_announcement(0x00)).await.unwrap();

        assert_eq!(registry.get_by_view_hint(0x42).await.unwrap().len(), 2);
        assert_eq!(registry.get_by_view_hint(0x00).await.unwrap().len(), 1);
        assert!(registry.get_by_view_hint(0xFF).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_wide_view_hints_are_distinct_buckets() {
        let registry = MemoryRegistry::new();

        registry.publish(make_test_announcement(0x0142)).await.unwrap();
        registry.publish(make_test_announcement(0x0242)).await.unwrap();

        assert_eq!(registry.get_by_view_hint(0x0142).await.unwrap().len(), 1);
        assert!(registry.get_by_view_hint(0x42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_by_time_range() {
        let registry = MemoryRegistry::new();

        for (hint, ts) in [(0x01, 100), (0x02, 200), (0x03, 300)] {
            let mut ann = make_test_announcement(hint);
            ann.timestamp = ts;
            registry.publish(ann).await.unwrap();
        }

        let results = registry.get_by_time_range(150, 250).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].view_hint, 0x02);

        let all = registry.get_by_time_range(0, 500).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_count_and_next_id() {
        let registry = MemoryRegistry::new();
        assert_eq!(registry.count().await.unwrap(), 0);
        assert_eq!(registry.next_id().await.unwrap(), 1);

        registry.publish(make_test_announcement(0x01)).await.unwrap();
        registry.publish(make_test_announcement(0x02)).await.unwrap();

        assert_eq!(registry.count().await.unwrap(), 2);
        assert_eq!(registry.next_id().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_stats() {
        let registry = MemoryRegistry::new();

        registry.publish(make_test_announcement(0x42)).await.unwrap();
        registry.publish(make_test_announcement(0x42)).await.unwrap();
        let mut on_chain = make_test_announcement(0x00);
        on_chain.tx_hash = Some(tx_hash(1));
        registry.publish(on_chain).await.unwrap();

        let stats = registry.stats();
        assert_eq!(stats.total_count, 3);
        assert_eq!(stats.view_hint_distribution[&0x42], 2);
        assert_eq!(stats.view_hint_distribution[&0x00], 1);
        assert_eq!(stats.on_chain_count, 1);
        assert_eq!(stats.distinct_view_hints(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_tx_hash_rejected() {
        let registry = MemoryRegistry::new();

        let mut first = make_test_announcement(0x01);
        first.tx_hash = Some(tx_hash(0xab));
        registry.publish(first).await.unwrap();

        let mut second = make_test_announcement(0x02);
        second.tx_hash = Some(tx_hash(0xab).to_uppercase().replacen("0X", "0x", 1));
        let result = registry.publish(second).await;

        assert!(matches!(result, Err(ShadeError::DuplicateAnnouncement(_))));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_announcement_rejected() {
        let registry = MemoryRegistry::new();

        let invalid = Announcement::new(
            PublicKey::from_array([0x02; 33]).unwrap(),
            Address::zero(),
            0x00,
        );
        let result = registry.publish(invalid).await;

        assert!(matches!(result, Err(ShadeError::InvalidAnnouncement(_))));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let registry = MemoryRegistry::new();
        registry.publish(make_test_announcement(0x01)).await.unwrap();
        registry.publish(make_test_announcement(0x02)).await.unwrap();

        registry.clear();

        assert!(registry.is_empty());
        assert_eq!(registry.stats().total_count, 0);
        assert_eq!(registry.publish(make_test_announcement(0x03)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_import_export() {
        let registry1 = MemoryRegistry::new();
        registry1.publish(make_test_announcement(0x01)).await.unwrap();
        registry1.publish(make_test_announcement(0x02)).await.unwrap();

        let json = registry1.export_json().unwrap();

        let registry2 = MemoryRegistry::new();
        assert_eq!(registry2.import_json(&json).unwrap(), 2);
        assert_eq!(registry2.all_announcements(), registry1.all_announcements());
        assert_eq!(registry2.next_id().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_import_reassigns_taken_ids() {
        let registry = MemoryRegistry::new();
        registry.publish(make_test_announcement(0x01)).await.unwrap();

        let mut clash = make_test_announcement(0x02);
        clash.id = 1;
        registry.import(vec![clash]).unwrap();

        let ids: Vec<u64> = registry.all_announcements().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_import_rejects_max_id() {
        let registry = MemoryRegistry::new();
        let mut ann = make_test_announcement(0x01);
        ann.id = u64::MAX;

        assert!(matches!(
            registry.import(vec![ann]),
            Err(ShadeError::InvalidAnnouncement(_))
        ));
        assert!(registry.is_empty());
        assert_eq!(registry.next_id().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_import_invalid_json() {
        let registry = MemoryRegistry::new();
        assert!(matches!(
            registry.import_json("not json"),
            Err(ShadeError::JsonError(_))
        ));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("announcements.json");

        let registry = MemoryRegistry::new();
        registry.publish(make_test_announcement(0x07)).await.unwrap();
        registry.save_to_file(&path).await.unwrap();
        assert!(!path.with_extension("tmp").exists());

        let loaded = MemoryRegistry::load_from_file(&path).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get_by_view_hint(0x07).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = MemoryRegistry::load_from_file(dir.path().join("none.json"))
            .await
            .unwrap();
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn test_load_corrupt_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, b"invalid data").await.unwrap();

        let result = MemoryRegistry::load_from_file(&path).await;
        assert!(matches!(result, Err(ShadeError::RegistryError(_))));
    }

    #[tokio::test]
    async fn test_concurrent_publish() {
        use std::sync::Arc;
        use tokio::task::JoinSet;

        let registry = Arc::new(MemoryRegistry::new());
        let mut tasks = JoinSet::new();

        for i in 0..100u64 {
            let reg = registry.clone();
            tasks.spawn(async move { reg.publish(make_test_announcement(i)).await.unwrap() });
        }

        let mut ids = Vec::new();
        while let Some(result) = tasks.join_next().await {
            ids.push(result.unwrap());
        }
        ids.sort_unstable();

        assert_eq!(registry.len(), 100);
        assert_eq!(ids, (1..=100).collect::<Vec<u64>>());
    }
}
