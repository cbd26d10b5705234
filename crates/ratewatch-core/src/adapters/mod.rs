//! Per-source fetch strategies.
//!
//! Each adapter knows how to call exactly one upstream and produce a
//! normalized [`SourceSnapshot`], writing the result through to the cache
//! under its own source identifier. Failures surface as [`SourceError`]
//! from `fetch`; degrading a failed source to an empty snapshot is the
//! engine's decision, so callers can still tell "no data" from "never
//! tried".

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use tracing::warn;

use crate::{RateCache, SourceId, SourceSnapshot};

mod aggregator;
mod preferential;
mod remittance;

pub use aggregator::AggregatorAdapter;
pub use preferential::PreferentialAdapter;
pub use remittance::RemittanceAdapter;

/// Fetch-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Network failure or non-success upstream status.
    Unavailable,
    /// Upstream responded but the payload did not parse.
    MalformedPayload,
}

/// Structured per-source fetch failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn malformed_payload(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::MalformedPayload,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::MalformedPayload => "source.malformed_payload",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Source adapter contract.
///
/// Implementations must be `Send + Sync`; one adapter instance serves the
/// whole engine lifetime and is shared across concurrent fan-outs.
pub trait RateSource: Send + Sync {
    /// The identifier this adapter caches and reports under.
    fn id(&self) -> SourceId;

    /// Fetch one fresh snapshot from the upstream.
    fn fetch<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<SourceSnapshot, SourceError>> + Send + 'a>>;
}

/// Write-through shared by the adapters. A failed cache write degrades
/// performance, not availability, so it is logged and swallowed here.
async fn store_snapshot(cache: &RateCache, source: SourceId, snapshot: &SourceSnapshot) {
    if let Err(error) = cache.write(source, snapshot).await {
        warn!(source = source.code(), error = %error, "failed to write snapshot cache entry");
    }
}
