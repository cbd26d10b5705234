//! Engine behavior: cache short-circuiting, fixed view ordering, and the
//! advisory last-update stamp.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ratewatch_core::{
    CacheMode, Currency, HttpClient, HttpError, HttpRequest, HttpResponse, RateEngine,
    RateEngineBuilder, SourceId,
};

const AGGREGATOR_PAYLOAD: &str = r#"{
    "showapi_res_body": {
        "codeList": [
            {"code": "USD", "hui_in": "710.5", "hui_out": "713.34", "chao_in": "704.66", "chao_out": "713.34"},
            {"code": "EUR", "hui_in": "770.12", "hui_out": "775.43", "chao_in": "765.0", "chao_out": "775.43"}
        ]
    }
}"#;

const REMITTANCE_PAYLOAD: &str = r#"{
    "data": {
        "counterForRepeatingBlock": [
            {"exchangeRateCurrency": "USD", "transferBuyingRate": "6.8", "transferSellingRate": "6.75", "notesBuyingRate": "6.9", "notesSellingRate": "6.7"},
            {"exchangeRateCurrency": "EUR", "transferBuyingRate": "6.2", "transferSellingRate": "6.15", "notesBuyingRate": "6.3", "notesSellingRate": "6.1"}
        ]
    }
}"#;

/// Counts upstream calls and optionally slows down selected sources.
struct CountingHttpClient {
    requests: AtomicUsize,
    slow_url_fragment: Option<&'static str>,
    delay: Duration,
}

impl CountingHttpClient {
    fn new() -> Self {
        Self {
            requests: AtomicUsize::new(0),
            slow_url_fragment: None,
            delay: Duration::ZERO,
        }
    }

    fn slow_for(fragment: &'static str, delay: Duration) -> Self {
        Self {
            requests: AtomicUsize::new(0),
            slow_url_fragment: Some(fragment),
            delay,
        }
    }

    fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl HttpClient for CountingHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let slow = self
            .slow_url_fragment
            .is_some_and(|fragment| request.url.contains(fragment));
        let delay = self.delay;
        let body = if request.url.contains("bankCode=") {
            AGGREGATOR_PAYLOAD
        } else {
            REMITTANCE_PAYLOAD
        };

        Box::pin(async move {
            if slow {
                tokio::time::sleep(delay).await;
            }
            Ok(HttpResponse::ok_json(body))
        })
    }
}

fn engine_with(client: Arc<CountingHttpClient>, cache_dir: &std::path::Path) -> RateEngine {
    RateEngineBuilder::new()
        .with_http_client(client)
        .with_app_code("test-code")
        .with_cache_dir(cache_dir)
        .build()
}

#[tokio::test]
async fn cache_hit_skips_the_fetcher() {
    let client = Arc::new(CountingHttpClient::new());
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_with(client.clone(), dir.path());

    let fetched = engine.get_rates(SourceId::Icbc, CacheMode::Refresh).await;
    assert_eq!(client.request_count(), 1);

    let cached = engine.get_rates(SourceId::Icbc, CacheMode::Use).await;
    assert_eq!(client.request_count(), 1, "cache hit must not call upstream");
    assert_eq!(cached, fetched);
}

#[tokio::test]
async fn refresh_always_calls_upstream() {
    let client = Arc::new(CountingHttpClient::new());
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_with(client.clone(), dir.path());

    engine.get_rates(SourceId::Boc, CacheMode::Refresh).await;
    engine.get_rates(SourceId::Boc, CacheMode::Refresh).await;

    assert_eq!(client.request_count(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn rows_follow_registry_order_despite_slow_sources() {
    // The very first registry member answers last; row order must not care.
    let client = Arc::new(CountingHttpClient::slow_for(
        "bankCode=ICBC",
        Duration::from_millis(150),
    ));
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_with(client, dir.path());

    let (rows, _) = engine
        .get_currency_rates(Currency::Usd, CacheMode::Refresh)
        .await;

    let order: Vec<SourceId> = rows.iter().map(|row| row.source).collect();
    assert_eq!(order, SourceId::ALL.to_vec());
    assert_eq!(rows.len(), SourceId::ALL.len());

    // Every source produced a quotation for USD in this scenario.
    assert!(rows.iter().all(|row| row.transfer_buying_rate.is_some()));
}

#[tokio::test]
async fn last_update_is_stamped_by_live_fetches() {
    let client = Arc::new(CountingHttpClient::new());
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_with(client, dir.path());

    assert_eq!(engine.last_update(), None);

    let (_, last_update) = engine
        .get_currency_rates(Currency::Eur, CacheMode::Refresh)
        .await;

    let stamp = last_update.expect("live fetch must stamp last-update");
    assert_eq!(stamp.len(), "2024-01-01 08:00".len());
}

#[tokio::test]
async fn reload_populates_the_cache_for_every_source() {
    let client = Arc::new(CountingHttpClient::new());
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_with(client.clone(), dir.path());

    engine.reload_rates().await;
    let after_reload = client.request_count();

    // Every subsequent cached read is served without another upstream call.
    for source in SourceId::ALL {
        engine.get_rates(source, CacheMode::Use).await;
    }
    assert_eq!(client.request_count(), after_reload);
}

#[tokio::test]
async fn derived_source_blends_its_base_quotation() {
    let client = Arc::new(CountingHttpClient::new());
    let dir = tempfile::tempdir().expect("tempdir");
    let engine = engine_with(client, dir.path());

    let snapshot = engine.get_rates(SourceId::CibHyrs, CacheMode::Refresh).await;
    let usd = snapshot.record_for(Currency::Usd).expect("USD derived");

    // Base quotes 7.105 / 7.1334; the preferential tier narrows the spread.
    assert_eq!(usd.transfer_buying_rate, Some(7.1121));
    assert_eq!(usd.transfer_selling_rate, Some(7.1263));
}
