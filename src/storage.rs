use crate::errors::{TrackerError, TrackerResult};
use serde::{Serialize, de::DeserializeOwned};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

pub const HABITS_KEY: &str = "h_habits";
pub const LOGS_KEY: &str = "h_logs";
pub const SLEEP_KEY: &str = "h_sleep";

/// Opaque string-keyed get/set store the tracker persists into.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> TrackerResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> TrackerResult<()>;
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> TrackerResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| TrackerError::Storage {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> TrackerResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(TrackerError::Storage {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> TrackerResult<()> {
        fs::write(self.path_for(key), value).map_err(|source| TrackerError::Storage {
            key: key.to_string(),
            source,
        })
    }
}

/// In-memory store. Clones share the same entries, so a caller can keep a
/// handle and inspect what was written after handing one to the tracker.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryEntries>>,
}

#[derive(Debug, Default)]
struct MemoryEntries {
    values: BTreeMap<String, String>,
    writes: BTreeMap<String, usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls seen for `key`.
    pub fn writes(&self, key: &str) -> usize {
        self.entries().writes.get(key).copied().unwrap_or(0)
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, MemoryEntries> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> TrackerResult<Option<String>> {
        Ok(self.entries().values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> TrackerResult<()> {
        let mut entries = self.entries();
        entries.values.insert(key.to_string(), value.to_string());
        *entries.writes.entry(key.to_string()).or_default() += 1;
        Ok(())
    }
}

/// Reads and decodes `key`. `Ok(None)` when nothing is stored.
pub fn load_collection<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> TrackerResult<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| TrackerError::CorruptState {
            key: key.to_string(),
            source,
        })
}

/// Rewrites the whole collection under `key`.
pub fn persist_collection<T: Serialize + ?Sized>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> TrackerResult<()> {
    let payload = serde_json::to_string(value).map_err(|source| TrackerError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn unique_dir() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "habit_year_store_{}_{}",
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn file_store_round_trips_values() {
        let dir = unique_dir();
        let mut store = FileStore::open(&dir).unwrap();
        assert_eq!(store.get(SLEEP_KEY).unwrap(), None);

        store.set(SLEEP_KEY, r#"{"2026-06-01":7.5}"#).unwrap();
        assert_eq!(
            store.get(SLEEP_KEY).unwrap().as_deref(),
            Some(r#"{"2026-06-01":7.5}"#)
        );
        assert!(dir.join("h_sleep.json").exists());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn load_collection_distinguishes_missing_and_corrupt() {
        let mut store = MemoryStore::new();
        let missing: Option<BTreeMap<String, f64>> = load_collection(&store, SLEEP_KEY).unwrap();
        assert!(missing.is_none());

        store.set(SLEEP_KEY, "not json").unwrap();
        let corrupt = load_collection::<BTreeMap<String, f64>>(&store, SLEEP_KEY);
        assert!(matches!(corrupt, Err(TrackerError::CorruptState { .. })));
    }

    #[test]
    fn persist_collection_overwrites_and_counts_writes() {
        let mut store = MemoryStore::new();
        let handle = store.clone();
        let mut sleep = BTreeMap::new();
        sleep.insert("2026-01-02".to_string(), 6.0);
        persist_collection(&mut store, SLEEP_KEY, &sleep).unwrap();
        sleep.insert("2026-01-03".to_string(), 7.0);
        persist_collection(&mut store, SLEEP_KEY, &sleep).unwrap();

        assert_eq!(handle.writes(SLEEP_KEY), 2);
        assert_eq!(handle.writes(HABITS_KEY), 0);
        let loaded: BTreeMap<String, f64> = load_collection(&handle, SLEEP_KEY).unwrap().unwrap();
        assert_eq!(loaded, sleep);
    }
}
