//! # Ratewatch Core
//!
//! Multi-source CNY foreign-exchange rate acquisition and caching engine.
//!
//! ## Overview
//!
//! Twelve bank sources publish CNY quotations for a fixed set of
//! currencies: ten through one shared aggregator API, one through its own
//! remittance endpoint, and one synthetic preferential tier derived from a
//! base bank's published spread. This crate fetches them concurrently,
//! normalizes every upstream shape into one canonical record schema,
//! caches each source's snapshot on disk with a TTL, and builds
//! cross-source comparison views per currency.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Per-source fetch strategies behind the [`RateSource`] trait |
//! | [`cache`] | Expiring per-source on-disk snapshot cache |
//! | [`domain`] | Canonical domain types (currency, records, snapshots) |
//! | [`engine`] | Cache-or-fetch orchestration and concurrent fan-out |
//! | [`error`] | Contract-violation error types |
//! | [`http_client`] | HTTP transport seam |
//! | [`normalize`] | Pure upstream-payload transforms |
//! | [`source`] | The static source registry |
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use ratewatch_core::{CacheMode, Currency, RateEngineBuilder};
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = RateEngineBuilder::from_env().build();
//!     let (rows, last_update) = engine
//!         .get_currency_rates(Currency::Usd, CacheMode::Use)
//!         .await;
//!
//!     for row in rows {
//!         println!("{}: {:?}", row.source, row.transfer_buying_rate);
//!     }
//!     println!("last update: {last_update:?}");
//! }
//! ```
//!
//! ## Failure model
//!
//! A source that cannot be fetched — network failure, non-success status,
//! unparseable payload — degrades to an all-null snapshot for that source
//! only, after being logged. Aggregated views always contain one entry per
//! configured source; callers are never handed a partial shape. Unknown
//! currency or source strings are contract violations rejected at the
//! parsing boundary with [`ValidationError`].

pub mod adapters;
pub mod cache;
pub mod domain;
pub mod engine;
pub mod error;
pub mod http_client;
pub mod normalize;
pub mod source;

pub use adapters::{
    AggregatorAdapter, PreferentialAdapter, RateSource, RemittanceAdapter, SourceError,
    SourceErrorKind,
};
pub use cache::{CacheMode, RateCache, DEFAULT_CACHE_TTL};
pub use domain::{round4, Currency, CurrencyComparisonRow, RateRecord, SourceSnapshot};
pub use engine::{RateEngine, RateEngineBuilder};
pub use error::ValidationError;
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient,
};
pub use source::SourceId;
