//! On-disk cache of fetched result pages.
//!
//! Bodies are stored in a single JSON file keyed by URL, each entry stamped
//! with the time it was fetched. Entries older than the configured
//! time-to-live are treated as missing.

use crate::error::{PubcountError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default cache file: `<cache dir>/pubcount/responses.json`
pub fn default_cache_path() -> Result<PathBuf> {
    dirs::cache_dir()
        .map(|p| p.join("pubcount").join("responses.json"))
        .ok_or_else(|| PubcountError::Config("Cannot determine cache directory".to_string()))
}

/// A cached response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedResponse {
    pub body: String,
    pub fetched_at: DateTime<Utc>,
}

/// URL-keyed response cache persisted as JSON
pub struct ResponseCache {
    path: PathBuf,
    ttl: Duration,
    entries: HashMap<String, CachedResponse>,
}

impl ResponseCache {
    /// Open the cache at `path`, loading any existing entries.
    ///
    /// A missing or unreadable file starts an empty cache.
    pub fn open(path: PathBuf, ttl: Duration) -> Self {
        let entries = load_entries(&path);
        Self { path, ttl, entries }
    }

    /// Get the cache file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a fresh body for `url`
    pub fn get(&self, url: &str) -> Option<&str> {
        self.get_at(url, Utc::now())
    }

    fn get_at(&self, url: &str, now: DateTime<Utc>) -> Option<&str> {
        let entry = self.entries.get(url)?;
        if now - entry.fetched_at > self.ttl {
            debug!(url, fetched_at = %entry.fetched_at, "Cache entry expired");
            return None;
        }
        Some(entry.body.as_str())
    }

    /// Store a body fetched now
    pub fn insert(&mut self, url: &str, body: &str) {
        self.entries.insert(
            url.to_string(),
            CachedResponse {
                body: body.to_string(),
                fetched_at: Utc::now(),
            },
        );
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&mut self) -> usize {
        let now = Utc::now();
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, e| now - e.fetched_at <= ttl);
        before - self.entries.len()
    }

    /// Write all entries to the cache file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string(&self.entries)?;
        std::fs::write(&self.path, content)?;
        debug!(entries = self.entries.len(), path = ?self.path, "Saved response cache");
        Ok(())
    }

    /// Remove the cache file and all entries
    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            info!("Cleared response cache at {:?}", self.path);
        }
        Ok(())
    }
}

fn load_entries(path: &Path) -> HashMap<String, CachedResponse> {
    if !path.exists() {
        debug!("Cache file not found: {:?}", path);
        return HashMap::new();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<HashMap<String, CachedResponse>>(&content) {
            Ok(entries) => {
                info!("Loaded {} cached responses from {:?}", entries.len(), path);
                entries
            }
            Err(e) => {
                warn!("Failed to parse response cache: {}", e);
                HashMap::new()
            }
        },
        Err(e) => {
            warn!("Failed to read response cache: {}", e);
            HashMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_missing_file() {
        let cache = ResponseCache::open(PathBuf::from("/nonexistent/path.json"), Duration::days(1));
        assert!(cache.is_empty());
        assert!(cache.get("https://arxiv.org").is_none());
    }

    #[test]
    fn test_save_and_reload() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nested").join("responses.json");

        let mut cache = ResponseCache::open(path.clone(), Duration::days(1));
        cache.insert("https://arxiv.org/search", "<html>body</html>");
        cache.save()?;

        let reloaded = ResponseCache::open(path, Duration::days(1));
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.get("https://arxiv.org/search"), Some("<html>body</html>"));
        Ok(())
    }

    #[test]
    fn test_expired_entries_are_misses() {
        let mut cache = ResponseCache::open(PathBuf::from("/nonexistent/path.json"), Duration::days(1));
        cache.insert("https://www.base-search.net", "body");

        let later = Utc::now() + Duration::hours(25);
        assert!(cache.get_at("https://www.base-search.net", later).is_none());
        assert!(cache.get_at("https://www.base-search.net", Utc::now()).is_some());
    }

    #[test]
    fn test_purge_and_clear() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("responses.json");

        let mut cache = ResponseCache::open(path.clone(), Duration::zero());
        cache.insert("https://a.example", "a");
        cache.save()?;
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert_eq!(cache.purge_expired(), 1);

        cache.clear()?;
        assert!(!path.exists());
        Ok(())
    }
}
