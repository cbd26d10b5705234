//! Cache-or-fetch orchestration across all configured sources.

use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use time::macros::format_description;
use time::OffsetDateTime;
use tracing::warn;

use crate::adapters::{
    AggregatorAdapter, PreferentialAdapter, RateSource, RemittanceAdapter,
};
use crate::cache::DEFAULT_CACHE_TTL;
use crate::http_client::{HttpClient, NoopHttpClient, ReqwestHttpClient};
use crate::{CacheMode, Currency, CurrencyComparisonRow, RateCache, SourceId, SourceSnapshot};

/// Multi-source rate engine.
///
/// Cheap to clone; all clones share the adapter registry, the cache handle,
/// and the advisory last-update cell. Every configured source is registered
/// at build time, so lookups by [`SourceId`] cannot miss.
#[derive(Clone)]
pub struct RateEngine {
    adapters: Arc<BTreeMap<SourceId, Arc<dyn RateSource>>>,
    cache: RateCache,
    last_update: Arc<Mutex<Option<OffsetDateTime>>>,
}

impl RateEngine {
    /// Snapshot for one source.
    ///
    /// With [`CacheMode::Use`], a fresh cache entry short-circuits the
    /// fetch entirely. Otherwise the adapter fetches live (caching as a
    /// side effect); a failed fetch is logged and degrades to the empty
    /// snapshot rather than surfacing an error.
    pub async fn get_rates(&self, source: SourceId, mode: CacheMode) -> SourceSnapshot {
        if mode == CacheMode::Use {
            if let Some(snapshot) = self.cache.read(source).await {
                return snapshot;
            }
        }

        self.stamp_last_update();

        let adapter = self
            .adapters
            .get(&source)
            .expect("every SourceId is registered at build time");

        match adapter.fetch().await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(
                    source = source.code(),
                    code = error.code(),
                    error = %error,
                    "source fetch failed, serving empty snapshot"
                );
                SourceSnapshot::empty()
            }
        }
    }

    /// Snapshots for every configured source, fetched concurrently.
    ///
    /// One task per source, all launched before any is awaited; the join is
    /// a barrier over all of them regardless of individual outcome. A
    /// source that fails (or whose task panics) contributes an empty
    /// snapshot without delaying or failing the rest.
    pub async fn get_all_rates(&self, mode: CacheMode) -> BTreeMap<SourceId, SourceSnapshot> {
        let handles: Vec<_> = SourceId::ALL
            .into_iter()
            .map(|source| {
                let engine = self.clone();
                (
                    source,
                    tokio::spawn(async move { engine.get_rates(source, mode).await }),
                )
            })
            .collect();

        let mut results = BTreeMap::new();
        for (source, handle) in handles {
            let snapshot = match handle.await {
                Ok(snapshot) => snapshot,
                Err(error) => {
                    warn!(source = source.code(), error = %error, "source fetch task aborted");
                    SourceSnapshot::empty()
                }
            };
            results.insert(source, snapshot);
        }
        results
    }

    /// Cross-source comparison for one currency, plus the advisory
    /// last-update stamp.
    ///
    /// Fans out the same concurrent per-source fetch as [`get_all_rates`]
    /// (upstreams quote all currencies per call), then projects one row per
    /// source in fixed registry order — completion order never affects row
    /// order. A source without a usable quotation yields a null row, never
    /// a missing one.
    ///
    /// [`get_all_rates`]: RateEngine::get_all_rates
    pub async fn get_currency_rates(
        &self,
        currency: Currency,
        mode: CacheMode,
    ) -> (Vec<CurrencyComparisonRow>, Option<String>) {
        let snapshots = self.get_all_rates(mode).await;

        let rows = SourceId::ALL
            .into_iter()
            .map(|source| {
                snapshots
                    .get(&source)
                    .and_then(|snapshot| snapshot.record_for(currency))
                    .map(|record| CurrencyComparisonRow {
                        source,
                        transfer_buying_rate: record.transfer_buying_rate,
                        transfer_selling_rate: record.transfer_selling_rate,
                    })
                    .unwrap_or_else(|| CurrencyComparisonRow::unavailable(source))
            })
            .collect();

        (rows, self.last_update())
    }

    /// Force-refresh every source and its cache entry, discarding the
    /// snapshots.
    pub async fn reload_rates(&self) {
        let _ = self.get_all_rates(CacheMode::Refresh).await;
    }

    /// Human-readable minute-precision timestamp of the most recent live
    /// fetch dispatch, if any happened in this engine's lifetime.
    pub fn last_update(&self) -> Option<String> {
        let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
        self.last_update
            .lock()
            .expect("last-update cell should not be poisoned")
            .map(|stamp| {
                stamp
                    .format(&format)
                    .unwrap_or_else(|_| String::from("<unformattable>"))
            })
    }

    fn stamp_last_update(&self) {
        let mut cell = self
            .last_update
            .lock()
            .expect("last-update cell should not be poisoned");
        *cell = Some(OffsetDateTime::now_utc());
    }
}

/// Builder wiring the full source registry onto one transport and cache.
///
/// # Environment variables
///
/// | Variable | Fallback | Meaning |
/// |----------|----------|---------|
/// | `RATEWATCH_APP_CODE` | `SHOWAPI_APP_CODE` | Aggregator credential |
/// | `RATEWATCH_CACHE_DIR` | - | Cache directory (default `rate-cache`) |
/// | `RATEWATCH_CACHE_TTL_SECS` | - | Snapshot TTL (default 3600) |
pub struct RateEngineBuilder {
    http_client: Arc<dyn HttpClient>,
    app_code: String,
    cache_dir: PathBuf,
    cache_ttl: Duration,
}

impl Default for RateEngineBuilder {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            app_code: String::new(),
            cache_dir: PathBuf::from("rate-cache"),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl RateEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder configured from the environment, with a real HTTP client.
    pub fn from_env() -> Self {
        let mut builder = Self::new().with_http_client(Arc::new(ReqwestHttpClient::new()));

        if let Ok(app_code) = env::var("RATEWATCH_APP_CODE")
            .or_else(|_| env::var("SHOWAPI_APP_CODE"))
        {
            builder = builder.with_app_code(app_code);
        }
        if let Ok(dir) = env::var("RATEWATCH_CACHE_DIR") {
            builder = builder.with_cache_dir(dir);
        }
        if let Some(ttl) = env::var("RATEWATCH_CACHE_TTL_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
        {
            builder = builder.with_cache_ttl(Duration::from_secs(ttl));
        }

        builder
    }

    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = http_client;
        self
    }

    pub fn with_app_code(mut self, app_code: impl Into<String>) -> Self {
        self.app_code = app_code.into();
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn build(self) -> RateEngine {
        let cache = RateCache::new(self.cache_dir, self.cache_ttl);

        let mut adapters: BTreeMap<SourceId, Arc<dyn RateSource>> = BTreeMap::new();
        for source in SourceId::ALL {
            let adapter: Arc<dyn RateSource> = match source {
                SourceId::Hsbc => Arc::new(RemittanceAdapter::new(
                    self.http_client.clone(),
                    cache.clone(),
                )),
                SourceId::CibHyrs => Arc::new(PreferentialAdapter::new(
                    source,
                    AggregatorAdapter::new(
                        SourceId::Cib,
                        self.http_client.clone(),
                        self.app_code.clone(),
                        cache.clone(),
                    ),
                    cache.clone(),
                )),
                _ => Arc::new(AggregatorAdapter::new(
                    source,
                    self.http_client.clone(),
                    self.app_code.clone(),
                    cache.clone(),
                )),
            };
            adapters.insert(source, adapter);
        }

        RateEngine {
            adapters: Arc::new(adapters),
            cache,
            last_update: Arc::new(Mutex::new(None)),
        }
    }
}
