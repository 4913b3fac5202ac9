//! File-backed cache entries with explicit expiry

use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A cached table plus the time window it is valid for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub rows: Vec<T>,
}

impl<T> CacheEntry<T> {
    pub fn new(rows: Vec<T>, ttl: Duration, now: DateTime<Utc>) -> Self {
        let expires_at = now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { fetched_at: now, expires_at, rows }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Directory of named JSON cache entries
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Read an entry; a missing or unreadable entry is a cache miss
    pub async fn read<T: DeserializeOwned>(&self, name: &str) -> Result<Option<CacheEntry<T>>> {
        let path = self.path(name);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Cache miss for {}", name);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&raw) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                warn!("Ignoring corrupt cache entry {:?}: {}", path, e);
                Ok(None)
            }
        }
    }

    /// Write an entry through a temp file so readers never see a partial file
    pub async fn write<T: Serialize>(&self, name: &str, entry: &CacheEntry<T>) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path(name);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec(entry)?;
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!("Cached {} rows as {:?}", entry.rows.len(), path);
        Ok(())
    }
}
