//! Result cache for read statements.
//!
//! Entries are keyed by the normalised statement text and expire at a fixed unix
//! timestamp computed when they are written. The gate performs no locking: two
//! processes sharing a directory may observe each other's partially expired entries.

use crate::error::ChainResult;
use crate::row::Row;
use crate::value::Value;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Representation-independent payload of a cached result set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CachedRows {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl CachedRows {
    pub fn from_rows(rows: &[Row]) -> Self {
        let columns = rows
            .first()
            .map(|r| r.columns().to_vec())
            .unwrap_or_default();
        Self {
            columns,
            rows: rows.iter().map(|r| r.values().to_vec()).collect(),
        }
    }

    pub fn into_rows(self) -> Vec<Row> {
        let columns: Arc<[String]> = self.columns.into();
        self.rows
            .into_iter()
            .map(|values| Row::new(Arc::clone(&columns), values))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A stored entry: the payload plus its expiry (unix seconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: CachedRows,
    pub expires_at: i64,
}

impl CacheEntry {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at < now
    }
}

/// Persistent key/value store behind the cache gate.
pub trait CacheStore {
    fn load(&self, key: &str) -> ChainResult<Option<CacheEntry>>;
    fn store(&self, key: &str, entry: &CacheEntry) -> ChainResult<()>;
    fn remove(&self, key: &str) -> ChainResult<()>;
}

impl<S: CacheStore + ?Sized> CacheStore for Arc<S> {
    fn load(&self, key: &str) -> ChainResult<Option<CacheEntry>> {
        (**self).load(key)
    }

    fn store(&self, key: &str, entry: &CacheEntry) -> ChainResult<()> {
        (**self).store(key, entry)
    }

    fn remove(&self, key: &str) -> ChainResult<()> {
        (**self).remove(key)
    }
}

/// One JSON file per statement under a directory.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    dir: PathBuf,
}

impl FileCacheStore {
    /// Use `dir`, creating it if missing.
    pub fn new(dir: impl Into<PathBuf>) -> ChainResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<blake3 hex of key>.cache`
    pub fn path_for(&self, key: &str) -> PathBuf {
        let digest = blake3::hash(key.as_bytes());
        self.dir.join(format!("{}.cache", digest.to_hex()))
    }
}

impl CacheStore for FileCacheStore {
    fn load(&self, key: &str) -> ChainResult<Option<CacheEntry>> {
        let raw = match fs::read(self.path_for(key)) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_slice(&raw)?))
    }

    fn store(&self, key: &str, entry: &CacheEntry) -> ChainResult<()> {
        let raw = serde_json::to_vec(entry)?;
        fs::write(self.path_for(key), raw)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> ChainResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Cache gate with a fixed time-to-live.
pub struct ResultCache<S: CacheStore> {
    store: S,
    ttl: Duration,
}

impl<S: CacheStore> ResultCache<S> {
    pub fn new(store: S, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fresh entry for `sql`, if any. Expired entries are removed and reported as a miss.
    pub fn try_get(&self, sql: &str) -> ChainResult<Option<CachedRows>> {
        self.try_get_at(sql, Utc::now().timestamp())
    }

    /// [`try_get`](Self::try_get) against an explicit clock (unix seconds).
    pub fn try_get_at(&self, sql: &str, now: i64) -> ChainResult<Option<CachedRows>> {
        match self.store.load(sql)? {
            Some(entry) if entry.is_expired(now) => {
                tracing::trace!(target: "sqlchain.cache", expires_at = entry.expires_at, "cache entry expired");
                self.store.remove(sql)?;
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.data)),
            None => Ok(None),
        }
    }

    /// Store `rows` under `sql`, expiring `ttl` from now.
    pub fn put(&self, sql: &str, rows: CachedRows) -> ChainResult<()> {
        self.put_at(sql, rows, Utc::now().timestamp())
    }

    pub fn put_at(&self, sql: &str, rows: CachedRows, now: i64) -> ChainResult<()> {
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let entry = CacheEntry {
            data: rows,
            expires_at: now.saturating_add(ttl),
        };
        self.store.store(sql, &entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> CachedRows {
        CachedRows {
            columns: vec!["id".into(), "name".into()],
            rows: vec![
                vec![Value::Int(1), Value::Text("a".into())],
                vec![Value::Int(2), Value::Null],
            ],
        }
    }

    #[test]
    fn round_trip_within_ttl() {
        let dir = tempdir().unwrap();
        let cache = ResultCache::new(FileCacheStore::new(dir.path()).unwrap(), Duration::from_secs(60));
        cache.put_at("SELECT * FROM t", sample(), 1_000).unwrap();
        assert_eq!(cache.try_get_at("SELECT * FROM t", 1_030).unwrap(), Some(sample()));
        assert_eq!(cache.try_get_at("SELECT * FROM t", 1_060).unwrap(), Some(sample()));
    }

    #[test]
    fn expired_entry_is_removed() {
        let dir = tempdir().unwrap();
        let store = FileCacheStore::new(dir.path()).unwrap();
        let path = store.path_for("SELECT 1");
        let cache = ResultCache::new(store, Duration::from_secs(10));

        cache.put_at("SELECT 1", sample(), 1_000).unwrap();
        assert!(path.exists());
        assert_eq!(cache.try_get_at("SELECT 1", 1_011).unwrap(), None);
        assert!(!path.exists());
    }

    #[test]
    fn keys_are_exact_text() {
        let dir = tempdir().unwrap();
        let cache = ResultCache::new(FileCacheStore::new(dir.path()).unwrap(), Duration::from_secs(60));
        cache.put("SELECT * FROM t", sample()).unwrap();
        assert!(cache.try_get("select * from t").unwrap().is_none());
        assert!(cache.try_get("SELECT * FROM t").unwrap().is_some());
    }

    #[test]
    fn file_name_is_blake3_hex() {
        let dir = tempdir().unwrap();
        let store = FileCacheStore::new(dir.path().join("nested")).unwrap();
        assert!(store.dir().is_dir());
        let name = store.path_for("SELECT 1");
        let file = name.file_name().unwrap().to_str().unwrap();
        assert!(file.ends_with(".cache"));
        assert_eq!(file.len(), 64 + ".cache".len());
    }

    #[test]
    fn rows_convert_both_ways() {
        let rows = sample().into_rows();
        assert_eq!(rows[1].value("name"), Some(&Value::Null));
        assert_eq!(CachedRows::from_rows(&rows), sample());
        assert!(CachedRows::from_rows(&[]).is_empty());
    }
}
