use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::adapters::{store_snapshot, RateSource, SourceError};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest};
use crate::normalize::{self, AggregatorRate};
use crate::{RateCache, SourceId, SourceSnapshot};

pub(crate) const DEFAULT_AGGREGATOR_BASE: &str = "https://ali-waihui.showapi.com";

/// Shared-aggregator adapter: one authenticated call per bank, selected by
/// the upstream `bankCode` parameter.
#[derive(Clone)]
pub struct AggregatorAdapter {
    source: SourceId,
    http_client: Arc<dyn HttpClient>,
    app_code: String,
    base_url: String,
    cache: RateCache,
}

impl AggregatorAdapter {
    pub fn new(
        source: SourceId,
        http_client: Arc<dyn HttpClient>,
        app_code: impl Into<String>,
        cache: RateCache,
    ) -> Self {
        Self {
            source,
            http_client,
            app_code: app_code.into(),
            base_url: String::from(DEFAULT_AGGREGATOR_BASE),
            cache,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_snapshot(&self) -> Result<SourceSnapshot, SourceError> {
        let url = format!(
            "{}/bank10?bankCode={}",
            self.base_url,
            urlencoding::encode(self.source.code())
        );
        let request =
            HttpRequest::get(url).with_auth(&HttpAuth::AppCode(self.app_code.clone()));

        let response = self.http_client.execute(request).await.map_err(|error| {
            SourceError::unavailable(format!(
                "aggregator transport error for {}: {}",
                self.source.code(),
                error.message()
            ))
        })?;

        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "aggregator returned status {} for {}",
                response.status,
                self.source.code()
            )));
        }

        let envelope: AggregatorEnvelope =
            serde_json::from_str(&response.body).map_err(|error| {
                SourceError::malformed_payload(format!(
                    "aggregator payload for {} did not parse: {error}",
                    self.source.code()
                ))
            })?;

        let snapshot = normalize::from_aggregator(&envelope.body.code_list);
        store_snapshot(&self.cache, self.source, &snapshot).await;
        Ok(snapshot)
    }
}

impl RateSource for AggregatorAdapter {
    fn id(&self) -> SourceId {
        self.source
    }

    fn fetch<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<SourceSnapshot, SourceError>> + Send + 'a>> {
        Box::pin(self.fetch_snapshot())
    }
}

#[derive(Debug, Deserialize)]
struct AggregatorEnvelope {
    #[serde(rename = "showapi_res_body")]
    body: AggregatorBody,
}

#[derive(Debug, Deserialize)]
struct AggregatorBody {
    #[serde(rename = "codeList", default)]
    code_list: Vec<AggregatorRate>,
}
