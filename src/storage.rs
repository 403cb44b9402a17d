//! Durable key-value storage and the bounded request history

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::constants::HISTORY_KEY;
use crate::error::StorageResult;
use crate::models::{HistoryItem, HttpMethod};

/// Opaque string store the history is persisted through
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// One `<key>.json` file per key inside a directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Ensure the directory exists
    fn ensure_dir(&self) -> StorageResult<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.ensure_dir()?;
        // write-then-rename so a crash never leaves a half-written file
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(tmp, path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// Process-local store for tests and embedders that do not want files on disk
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

/// Newest-first log of past dispatches, capped at `limit` entries.
///
/// Entries are never edited in place: only prepended, truncated from the
/// tail, or cleared wholesale.
#[derive(Clone, Debug)]
pub struct HistoryStore {
    items: VecDeque<HistoryItem>,
    limit: usize,
    last_id: u64,
}

impl HistoryStore {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        HistoryStore {
            items: VecDeque::with_capacity(limit),
            limit,
            last_id: 0,
        }
    }

    pub fn from_items(items: Vec<HistoryItem>, limit: usize) -> Self {
        let mut store = HistoryStore::new(limit);
        store.last_id = items
            .iter()
            .filter_map(|i| i.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        store.items = items.into_iter().take(store.limit).collect();
        store
    }

    /// Rehydrate from the store. A missing or corrupt value yields an empty history.
    pub fn load(store: &dyn KeyValueStore, limit: usize) -> Self {
        let raw = match store.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return HistoryStore::new(limit),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read history, starting empty");
                return HistoryStore::new(limit);
            }
        };

        match serde_json::from_str::<Vec<HistoryItem>>(&raw) {
            Ok(items) => {
                tracing::debug!(count = items.len(), "Loaded history");
                HistoryStore::from_items(items, limit)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse history, starting empty");
                HistoryStore::new(limit)
            }
        }
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> StorageResult<()> {
        let json = serde_json::to_string(&self.items)?;
        store.set(HISTORY_KEY, &json)
    }

    /// Insert at the front, dropping the oldest entries past the limit
    pub fn prepend(&mut self, item: HistoryItem) {
        tracing::debug!(id = %item.id, url = %item.url, status = item.status, "History entry added");
        self.items.push_front(item);
        self.items.truncate(self.limit);
    }

    /// Build an entry stamped with the current time and prepend it
    pub fn record(&mut self, method: HttpMethod, url: &str, status: u16) -> HistoryItem {
        self.stamp(method, url, status, false)
    }

    /// Status-0 entry for a request that was loaded but not sent
    pub fn record_pending(&mut self, method: HttpMethod, url: &str) -> HistoryItem {
        self.stamp(method, url, 0, true)
    }

    fn stamp(&mut self, method: HttpMethod, url: &str, status: u16, pending: bool) -> HistoryItem {
        let now = chrono::Utc::now();
        let item = HistoryItem {
            id: self.next_id(now.timestamp_millis()),
            method,
            url: url.to_string(),
            timestamp_iso: now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            status,
            pending,
        };
        self.prepend(item.clone());
        item
    }

    pub fn clear(&mut self) {
        tracing::debug!(count = self.items.len(), "History cleared");
        self.items.clear();
    }

    /// Get history item by index (0 = most recent)
    pub fn get(&self, index: usize) -> Option<&HistoryItem> {
        self.items.get(index)
    }

    pub fn items(&self) -> impl Iterator<Item = &HistoryItem> {
        self.items.iter()
    }

    pub fn to_vec(&self) -> Vec<HistoryItem> {
        self.items.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Millisecond id, bumped past the previous one when the clock has not moved
    fn next_id(&mut self, now_ms: i64) -> String {
        let now = u64::try_from(now_ms).unwrap_or(0);
        let id = now.max(self.last_id.saturating_add(1));
        self.last_id = id;
        id.to_string()
    }
}
