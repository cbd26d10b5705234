use std::future::Future;
use std::pin::Pin;

use crate::adapters::{store_snapshot, AggregatorAdapter, RateSource, SourceError};
use crate::{normalize, RateCache, SourceId, SourceSnapshot};

/// Synthetic preferential-tier source.
///
/// Owns the aggregator adapter for its base bank: a fetch goes through the
/// base (refreshing the base's cache entry on the way, as the upstream
/// behaves), blends the published spread into the preferential quotes, and
/// caches the result under its own identifier.
#[derive(Clone)]
pub struct PreferentialAdapter {
    source: SourceId,
    base: AggregatorAdapter,
    cache: RateCache,
}

impl PreferentialAdapter {
    pub fn new(source: SourceId, base: AggregatorAdapter, cache: RateCache) -> Self {
        Self {
            source,
            base,
            cache,
        }
    }

    /// Identifier of the base source this tier derives from.
    pub fn base_id(&self) -> SourceId {
        self.base.id()
    }

    async fn fetch_snapshot(&self) -> Result<SourceSnapshot, SourceError> {
        let base_snapshot = self.base.fetch().await?;
        let derived = normalize::derive_preferential(&base_snapshot);
        store_snapshot(&self.cache, self.source, &derived).await;
        Ok(derived)
    }
}

impl RateSource for PreferentialAdapter {
    fn id(&self) -> SourceId {
        self.source
    }

    fn fetch<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<SourceSnapshot, SourceError>> + Send + 'a>> {
        Box::pin(self.fetch_snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse};
    use crate::Currency;
    use std::sync::Arc;

    #[derive(Debug)]
    struct FixedHttpClient {
        body: &'static str,
    }

    impl HttpClient for FixedHttpClient {
        fn execute<'a>(
            &'a self,
            _request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            let body = self.body;
            Box::pin(async move { Ok(HttpResponse::ok_json(body)) })
        }
    }

    const BASE_PAYLOAD: &str = r#"{
        "showapi_res_body": {
            "codeList": [
                {"code": "USD", "hui_in": "700", "hui_out": "710", "chao_in": "700", "chao_out": "710"}
            ]
        }
    }"#;

    #[tokio::test]
    async fn fetch_derives_from_the_base_and_caches_both() {
        let client = Arc::new(FixedHttpClient { body: BASE_PAYLOAD });
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = RateCache::with_default_ttl(dir.path());
        let base =
            AggregatorAdapter::new(SourceId::Cib, client, "app-code", cache.clone());
        let adapter = PreferentialAdapter::new(SourceId::CibHyrs, base, cache.clone());

        assert_eq!(adapter.base_id(), SourceId::Cib);

        let derived = adapter.fetch().await.expect("fetch should succeed");
        let usd = derived.record_for(Currency::Usd).expect("USD derived");
        assert_eq!(usd.transfer_buying_rate, Some(7.025));
        assert_eq!(usd.transfer_selling_rate, Some(7.075));

        // Both the derived tier and its base end up cached.
        assert_eq!(
            cache.read(SourceId::CibHyrs).await.expect("derived cached"),
            derived
        );
        let base_cached = cache.read(SourceId::Cib).await.expect("base cached");
        assert_eq!(
            base_cached
                .record_for(Currency::Usd)
                .expect("USD in base")
                .transfer_buying_rate,
            Some(7.0)
        );
    }
}
