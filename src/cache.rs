//! Query result cache.
//!
//! Every view issues several store queries in sequence, and most of them are
//! identical from one visitor to the next. This module lets the bridge reuse a
//! successful result for a fixed time instead of asking the store again.
//!
//! # Design
//!
//! [`CachedStore`] wraps any [`ContentStore`] and is itself a store, so the
//! resolver never knows whether it is talking to the network or the cache.
//! Only successful results are stored: an error is returned to the caller and
//! the next request asks the store again.
//!
//! ## Cache keys
//!
//! A key is the SHA-256 of everything that determines a result:
//!
//! - the **cache generation** token,
//! - the query text,
//! - the serialized parameters (object keys are sorted, so equal params
//!   always serialize identically),
//! - the store identity (project id, dataset, API version).
//!
//! ## Invalidation
//!
//! Entries expire after the TTL (900 s by default). To drop everything at once
//! the operator bumps the generation. Because the generation is part of every
//! key, a bump makes all existing entries unreachable in O(1); nothing has to
//! be enumerated or deleted, and the orphans age out on their own.
//!
//! ## Storage
//!
//! [`FileCache`] keeps one JSON file per entry plus a `generation` file in the
//! cache directory, so several bridge processes on one host share results.
//! [`MemoryCache`] keeps the same data in a map and is what tests use.
//! Entries are immutable once written; two writers racing on one key write the
//! same value.

use crate::client::{ContentStore, Params, QueryError};
use crate::config::StoreIdentity;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Prefix of every cache key.
const KEY_PREFIX: &str = "pmsb_";

/// Name of the generation token file within the cache directory.
const GENERATION_FILENAME: &str = "generation";

/// Generation used before the operator has ever bumped it.
pub const INITIAL_GENERATION: &str = "1";

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A stored query result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub value: Value,
    /// Unix seconds after which the entry is ignored.
    pub expires_at: u64,
}

impl CacheEntry {
    pub fn is_live(&self, now: u64) -> bool {
        now < self.expires_at
    }
}

/// Key/value storage with expiry plus the shared generation token.
pub trait CacheBackend {
    /// Live value for `key`, `None` when missing or expired.
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: &Value, ttl: Duration);
    fn exists(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
    /// Current generation token.
    fn generation(&self) -> String;
    /// Advance the generation, invalidating every existing key.
    fn bump_generation(&self) -> Result<String, CacheError>;
}

/// Compute the cache key for one query.
pub fn cache_key(generation: &str, query: &str, params: &Params, store: &StoreIdentity) -> String {
    let params_json = Value::Object(params.clone()).to_string();
    let mut hasher = Sha256::new();
    for part in [
        generation,
        query,
        params_json.as_str(),
        store.project_id.as_str(),
        store.dataset.as_str(),
        store.api_version.as_str(),
    ] {
        hasher.update(part.as_bytes());
        hasher.update(b"|");
    }
    format!("{KEY_PREFIX}{:x}", hasher.finalize())
}

/// Next token after `current`: the current unix time, or `current + 1` when
/// the clock has not moved past it. Tokens only ever increase.
pub fn next_generation(current: &str, now: u64) -> String {
    let prev = current.trim().parse::<u64>().unwrap_or(0);
    now.max(prev + 1).to_string()
}

pub(crate) fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// =============================================================================
// Backends
// =============================================================================

/// In-process cache.
#[derive(Debug)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    generation: Mutex<String>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            generation: Mutex::new(INITIAL_GENERATION.to_string()),
        }
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, live or not.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheBackend for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(key)
            .filter(|entry| entry.is_live(now_unix()))
            .map(|entry| entry.value.clone())
    }

    fn set(&self, key: &str, value: &Value, ttl: Duration) {
        let entry = CacheEntry {
            key: key.to_string(),
            value: value.clone(),
            expires_at: now_unix() + ttl.as_secs(),
        };
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), entry);
    }

    fn generation(&self) -> String {
        self.generation
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn bump_generation(&self) -> Result<String, CacheError> {
        let mut generation = self.generation.lock().unwrap_or_else(|e| e.into_inner());
        *generation = next_generation(&generation, now_unix());
        Ok(generation.clone())
    }
}

/// Directory-backed cache shared between processes.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

/// Snapshot of a cache directory for the `cache-status` command.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CacheStatus {
    pub generation: String,
    pub live: usize,
    pub expired: usize,
}

impl FileCache {
    /// Open (and create if needed) a cache directory.
    pub fn open(dir: &Path) -> Result<Self, CacheError> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn generation_path(&self) -> PathBuf {
        self.dir.join(GENERATION_FILENAME)
    }

    fn read_entry(path: &Path) -> Option<CacheEntry> {
        let content = std::fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn entry_files(&self) -> Result<Vec<PathBuf>, CacheError> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_entry = path.extension().is_some_and(|e| e == "json")
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(KEY_PREFIX));
            if is_entry {
                files.push(path);
            }
        }
        Ok(files)
    }

    /// Count live and expired entries.
    pub fn status(&self) -> Result<CacheStatus, CacheError> {
        let now = now_unix();
        let mut status = CacheStatus {
            generation: self.generation(),
            ..CacheStatus::default()
        };
        for path in self.entry_files()? {
            match Self::read_entry(&path) {
                Some(entry) if entry.is_live(now) => status.live += 1,
                _ => status.expired += 1,
            }
        }
        Ok(status)
    }

    /// Delete expired or unreadable entry files. Returns how many were removed.
    pub fn purge_expired(&self) -> Result<usize, CacheError> {
        let now = now_unix();
        let mut removed = 0;
        for path in self.entry_files()? {
            let live = Self::read_entry(&path).is_some_and(|e| e.is_live(now));
            if !live {
                std::fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

impl CacheBackend for FileCache {
    fn get(&self, key: &str) -> Option<Value> {
        let entry = Self::read_entry(&self.entry_path(key))?;
        (entry.key == key && entry.is_live(now_unix())).then_some(entry.value)
    }

    fn set(&self, key: &str, value: &Value, ttl: Duration) {
        let entry = CacheEntry {
            key: key.to_string(),
            value: value.clone(),
            expires_at: now_unix() + ttl.as_secs(),
        };
        let written = serde_json::to_string(&entry)
            .map_err(CacheError::from)
            .and_then(|json| std::fs::write(self.entry_path(key), json).map_err(CacheError::from));
        if let Err(e) = written {
            // A failed write only costs a future miss.
            tracing::warn!(error = %e, key = %short_key(key), "failed to store cache entry");
        }
    }

    fn generation(&self) -> String {
        std::fs::read_to_string(self.generation_path())
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| INITIAL_GENERATION.to_string())
    }

    fn bump_generation(&self) -> Result<String, CacheError> {
        let next = next_generation(&self.generation(), now_unix());
        std::fs::write(self.generation_path(), &next)?;
        Ok(next)
    }
}

// =============================================================================
// Caching store
// =============================================================================

/// Summary of cache performance for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
    /// Store calls that failed and were therefore not cached.
    pub errors: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn error(&mut self) {
        self.errors += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses + self.errors
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors > 0 {
            write!(
                f,
                "{} cached, {} fetched, {} failed ({} total)",
                self.hits,
                self.misses,
                self.errors,
                self.total()
            )
        } else if self.hits > 0 {
            write!(
                f,
                "{} cached, {} fetched ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} fetched", self.misses)
        }
    }
}

/// A [`ContentStore`] that answers from a [`CacheBackend`] when it can.
pub struct CachedStore<S, B> {
    inner: S,
    backend: B,
    identity: StoreIdentity,
    ttl: Duration,
    stats: Mutex<CacheStats>,
}

impl<S: ContentStore, B: CacheBackend> CachedStore<S, B> {
    pub fn new(inner: S, backend: B, identity: StoreIdentity, ttl: Duration) -> Self {
        Self {
            inner,
            backend,
            identity,
            ttl,
            stats: Mutex::new(CacheStats::default()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, f: impl FnOnce(&mut CacheStats)) {
        f(&mut self.stats.lock().unwrap_or_else(|e| e.into_inner()));
    }
}

impl<S: ContentStore, B: CacheBackend> ContentStore for CachedStore<S, B> {
    fn query(&self, query: &str, params: &Params) -> Result<Value, QueryError> {
        let key = cache_key(&self.backend.generation(), query, params, &self.identity);

        if let Some(value) = self.backend.get(&key) {
            tracing::debug!(key = %short_key(&key), "cache hit");
            self.record(CacheStats::hit);
            return Ok(value);
        }

        match self.inner.query(query, params) {
            Ok(value) => {
                self.backend.set(&key, &value, self.ttl);
                tracing::debug!(key = %short_key(&key), "cache miss (stored)");
                self.record(CacheStats::miss);
                Ok(value)
            }
            Err(e) => {
                self.record(CacheStats::error);
                Err(e)
            }
        }
    }
}

fn short_key(key: &str) -> &str {
    &key[..key.len().min(40)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{CountingStore, identity, params};
    use serde_json::json;
    use tempfile::TempDir;

    const TTL: Duration = Duration::from_secs(900);

    // =========================================================================
    // Keys
    // =========================================================================

    #[test]
    fn cache_key_deterministic() {
        let p = params(&[("lang", json!("en"))]);
        let a = cache_key("1", "*[_type==\"theme\"]", &p, &identity());
        let b = cache_key("1", "*[_type==\"theme\"]", &p, &identity());
        assert_eq!(a, b);
        assert!(a.starts_with(KEY_PREFIX));
        assert_eq!(a.len(), KEY_PREFIX.len() + 64);
    }

    #[test]
    fn cache_key_varies_with_each_input() {
        let p = params(&[("lang", json!("en"))]);
        let base = cache_key("1", "q", &p, &identity());

        assert_ne!(base, cache_key("2", "q", &p, &identity()));
        assert_ne!(base, cache_key("1", "q2", &p, &identity()));
        assert_ne!(
            base,
            cache_key("1", "q", &params(&[("lang", json!("ka"))]), &identity())
        );
        let mut other = identity();
        other.dataset = "staging".into();
        assert_ne!(base, cache_key("1", "q", &p, &other));
    }

    #[test]
    fn cache_key_ignores_param_insertion_order() {
        let a = params(&[("lang", json!("en")), ("slug", json!("x"))]);
        let b = params(&[("slug", json!("x")), ("lang", json!("en"))]);
        assert_eq!(
            cache_key("1", "q", &a, &identity()),
            cache_key("1", "q", &b, &identity())
        );
    }

    #[test]
    fn next_generation_is_monotonic() {
        assert_eq!(next_generation("1", 1_700_000_000), "1700000000");
        assert_eq!(next_generation("1700000000", 1_700_000_000), "1700000001");
        assert_eq!(next_generation("garbage", 5), "5");
    }

    // =========================================================================
    // Backends
    // =========================================================================

    #[test]
    fn memory_cache_roundtrip_and_expiry() {
        let cache = MemoryCache::new();
        cache.set("k", &json!({"a": 1}), TTL);
        assert_eq!(cache.get("k"), Some(json!({"a": 1})));
        assert!(cache.exists("k"));

        cache.set("gone", &json!(1), Duration::ZERO);
        assert_eq!(cache.get("gone"), None);
        assert!(!cache.exists("missing"));
    }

    #[test]
    fn memory_cache_bump_changes_generation() {
        let cache = MemoryCache::new();
        assert_eq!(cache.generation(), INITIAL_GENERATION);
        let bumped = cache.bump_generation().unwrap();
        assert_ne!(bumped, INITIAL_GENERATION);
        assert_eq!(cache.generation(), bumped);
    }

    #[test]
    fn file_cache_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::open(tmp.path()).unwrap();
        cache.set("pmsb_abc", &json!([1, 2, 3]), TTL);
        assert_eq!(cache.get("pmsb_abc"), Some(json!([1, 2, 3])));

        // A second handle on the same directory sees the entry
        let again = FileCache::open(tmp.path()).unwrap();
        assert_eq!(again.get("pmsb_abc"), Some(json!([1, 2, 3])));
    }

    #[test]
    fn file_cache_generation_persists() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::open(tmp.path()).unwrap();
        assert_eq!(cache.generation(), INITIAL_GENERATION);
        let bumped = cache.bump_generation().unwrap();
        assert_eq!(FileCache::open(tmp.path()).unwrap().generation(), bumped);
    }

    #[test]
    fn file_cache_corrupt_entry_is_miss() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::open(tmp.path()).unwrap();
        std::fs::write(tmp.path().join("pmsb_bad.json"), "not json").unwrap();
        assert_eq!(cache.get("pmsb_bad"), None);
    }

    #[test]
    fn file_cache_status_and_purge() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::open(tmp.path()).unwrap();
        cache.set("pmsb_live", &json!(1), TTL);
        cache.set("pmsb_dead", &json!(2), Duration::ZERO);
        std::fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

        let status = cache.status().unwrap();
        assert_eq!(status.live, 1);
        assert_eq!(status.expired, 1);

        assert_eq!(cache.purge_expired().unwrap(), 1);
        assert_eq!(cache.status().unwrap().expired, 0);
        assert!(tmp.path().join("notes.txt").exists());
    }

    // =========================================================================
    // CachedStore
    // =========================================================================

    #[test]
    fn second_identical_call_is_served_from_cache() {
        let inner = CountingStore::returning(json!([{"_id": "t1"}]));
        let store = CachedStore::new(&inner, MemoryCache::new(), identity(), TTL);
        let p = params(&[("lang", json!("en"))]);

        let first = store.query("q", &p).unwrap();
        let second = store.query("q", &p).unwrap();

        assert_eq!(first, second);
        assert_eq!(inner.calls(), 1);
        assert_eq!(store.stats(), CacheStats { hits: 1, misses: 1, errors: 0 });
    }

    #[test]
    fn different_params_miss() {
        let inner = CountingStore::returning(json!(null));
        let store = CachedStore::new(&inner, MemoryCache::new(), identity(), TTL);
        store.query("q", &params(&[("lang", json!("en"))])).unwrap();
        store.query("q", &params(&[("lang", json!("ka"))])).unwrap();
        assert_eq!(inner.calls(), 2);
    }

    #[test]
    fn bump_invalidates_previous_entries() {
        let inner = CountingStore::returning(json!(1));
        let store = CachedStore::new(&inner, MemoryCache::new(), identity(), TTL);
        let p = Params::new();

        store.query("q", &p).unwrap();
        store.backend().bump_generation().unwrap();
        store.query("q", &p).unwrap();
        store.query("q", &p).unwrap();

        assert_eq!(inner.calls(), 2);
    }

    #[test]
    fn errors_are_not_cached() {
        let inner = CountingStore::failing();
        let store = CachedStore::new(&inner, MemoryCache::new(), identity(), TTL);
        let p = Params::new();

        assert!(store.query("q", &p).is_err());
        assert!(store.query("q", &p).is_err());

        assert_eq!(inner.calls(), 2);
        assert!(store.backend().is_empty());
        assert_eq!(store.stats().errors, 2);
    }

    #[test]
    fn cache_stats_display() {
        let s = CacheStats { hits: 5, misses: 2, errors: 0 };
        assert_eq!(s.to_string(), "5 cached, 2 fetched (7 total)");
        let s = CacheStats { hits: 0, misses: 3, errors: 0 };
        assert_eq!(s.to_string(), "3 fetched");
        let s = CacheStats { hits: 1, misses: 1, errors: 1 };
        assert_eq!(s.to_string(), "1 cached, 1 fetched, 1 failed (3 total)");
    }
}
