//! On-disk snapshot cache, one expiring JSON file per source.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{RateRecord, SourceId, SourceSnapshot};

/// Default snapshot time-to-live.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Whether a read may be served from cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Read from the cache if a fresh entry is present; otherwise fetch
    /// from the upstream and write the result back. (Default)
    #[default]
    Use,
    /// Always fetch from the upstream, still writing the result back.
    Refresh,
}

/// Persisted shape: `{"timestamp": epoch-seconds, "rates": [...]}`.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    timestamp: u64,
    rates: Vec<RateRecord>,
}

/// Cloneable handle over the per-source cache directory.
///
/// Each source owns exactly one `<CODE>.json` file; concurrent writers for
/// different sources touch disjoint paths. Reads never error: a missing,
/// malformed, or stale entry is simply a miss.
#[derive(Debug, Clone)]
pub struct RateCache {
    dir: Arc<PathBuf>,
    ttl: Duration,
}

impl RateCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: Arc::new(dir.into()),
            ttl,
        }
    }

    pub fn with_default_ttl(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, DEFAULT_CACHE_TTL)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn entry_path(&self, source: SourceId) -> PathBuf {
        self.dir.join(format!("{}.json", source.code()))
    }

    /// Cached snapshot for the source, iff the entry exists, parses, and is
    /// younger than the TTL. Any failure along the way is a miss.
    pub async fn read(&self, source: SourceId) -> Option<SourceSnapshot> {
        let path = self.entry_path(source);
        let raw = tokio::fs::read_to_string(&path).await.ok()?;

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(error) => {
                debug!(source = source.code(), error = %error, "discarding malformed cache entry");
                return None;
            }
        };

        let age = epoch_seconds().saturating_sub(entry.timestamp);
        if age >= self.ttl.as_secs() {
            debug!(source = source.code(), age_secs = age, "cache entry is stale");
            return None;
        }

        Some(SourceSnapshot::new(entry.rates))
    }

    /// Persist the snapshot under the source's key, replacing any prior
    /// entry. The write lands in a temp file first so readers never observe
    /// a half-written entry.
    pub async fn write(&self, source: SourceId, snapshot: &SourceSnapshot) -> std::io::Result<()> {
        tokio::fs::create_dir_all(self.dir.as_ref()).await?;

        let entry = CacheEntry {
            timestamp: epoch_seconds(),
            rates: snapshot.records().to_vec(),
        };
        let body = serde_json::to_string(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        let path = self.entry_path(source);
        let staging = path.with_extension("json.tmp");
        tokio::fs::write(&staging, body).await?;
        tokio::fs::rename(&staging, &path).await
    }
}

fn epoch_seconds() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Currency;

    fn sample_snapshot() -> SourceSnapshot {
        SourceSnapshot::new(vec![RateRecord {
            currency: Currency::Usd,
            transfer_buying_rate: Some(7.105),
            transfer_selling_rate: Some(7.1334),
            notes_buying_rate: Some(7.0466),
            notes_selling_rate: Some(7.1334),
        }])
    }

    /// Write an entry file with a doctored timestamp.
    async fn plant_entry(cache: &RateCache, source: SourceId, timestamp: u64) {
        let entry = CacheEntry {
            timestamp,
            rates: sample_snapshot().records().to_vec(),
        };
        tokio::fs::create_dir_all(cache.dir.as_ref())
            .await
            .expect("cache dir should be creatable");
        tokio::fs::write(
            cache.entry_path(source),
            serde_json::to_string(&entry).expect("entry should serialize"),
        )
        .await
        .expect("entry should be writable");
    }

    #[tokio::test]
    async fn missing_entry_is_a_miss() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = RateCache::with_default_ttl(dir.path());

        assert!(cache.read(SourceId::Icbc).await.is_none());
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = RateCache::with_default_ttl(dir.path());
        let snapshot = sample_snapshot();

        cache
            .write(SourceId::Boc, &snapshot)
            .await
            .expect("write should succeed");

        let cached = cache.read(SourceId::Boc).await.expect("entry is fresh");
        assert_eq!(cached, snapshot);
    }

    #[tokio::test]
    async fn entries_are_keyed_per_source() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = RateCache::with_default_ttl(dir.path());

        cache
            .write(SourceId::Ccb, &sample_snapshot())
            .await
            .expect("write should succeed");

        assert!(cache.read(SourceId::Ccb).await.is_some());
        assert!(cache.read(SourceId::Spdb).await.is_none());
    }

    #[tokio::test]
    async fn entry_just_inside_ttl_is_a_hit() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = RateCache::with_default_ttl(dir.path());
        let ttl = cache.ttl().as_secs();

        plant_entry(&cache, SourceId::Cib, epoch_seconds() - ttl + 1).await;

        assert!(cache.read(SourceId::Cib).await.is_some());
    }

    #[tokio::test]
    async fn entry_just_past_ttl_is_a_miss() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = RateCache::with_default_ttl(dir.path());
        let ttl = cache.ttl().as_secs();

        plant_entry(&cache, SourceId::Cib, epoch_seconds() - ttl - 1).await;

        assert!(cache.read(SourceId::Cib).await.is_none());
    }

    #[tokio::test]
    async fn malformed_entry_is_a_miss() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = RateCache::with_default_ttl(dir.path());

        tokio::fs::write(cache.entry_path(SourceId::Hsbc), "not json at all")
            .await
            .expect("file should be writable");

        assert!(cache.read(SourceId::Hsbc).await.is_none());
    }
}
