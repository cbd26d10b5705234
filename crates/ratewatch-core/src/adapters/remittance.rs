use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::adapters::{store_snapshot, RateSource, SourceError};
use crate::http_client::{HttpClient, HttpRequest};
use crate::normalize::{self, RemittanceRate};
use crate::{RateCache, SourceId, SourceSnapshot};

pub(crate) const DEFAULT_REMITTANCE_URL: &str = "https://www.services.cn-banking.hsbc.com.cn/mobile/channel/digital-proxy/cnyTransfer/ratesInfo/remittanceRate";

/// Bespoke adapter for the one bank that publishes its own remittance-rate
/// endpoint. Anonymous access; quotes arrive as foreign-units-per-CNY and
/// are inverted during normalization.
#[derive(Clone)]
pub struct RemittanceAdapter {
    http_client: Arc<dyn HttpClient>,
    url: String,
    cache: RateCache,
}

impl RemittanceAdapter {
    pub fn new(http_client: Arc<dyn HttpClient>, cache: RateCache) -> Self {
        Self {
            http_client,
            url: String::from(DEFAULT_REMITTANCE_URL),
            cache,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    async fn fetch_snapshot(&self) -> Result<SourceSnapshot, SourceError> {
        let request = HttpRequest::get(format!("{}?locale=en_CN", self.url))
            .with_header("content-type", "application/json");

        let response = self.http_client.execute(request).await.map_err(|error| {
            SourceError::unavailable(format!(
                "remittance transport error: {}",
                error.message()
            ))
        })?;

        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "remittance endpoint returned status {}",
                response.status
            )));
        }

        let envelope: RemittanceEnvelope =
            serde_json::from_str(&response.body).map_err(|error| {
                SourceError::malformed_payload(format!(
                    "remittance payload did not parse: {error}"
                ))
            })?;

        let snapshot = normalize::from_remittance(&envelope.data.rows);
        store_snapshot(&self.cache, SourceId::Hsbc, &snapshot).await;
        Ok(snapshot)
    }
}

impl RateSource for RemittanceAdapter {
    fn id(&self) -> SourceId {
        SourceId::Hsbc
    }

    fn fetch<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<SourceSnapshot, SourceError>> + Send + 'a>> {
        Box::pin(self.fetch_snapshot())
    }
}

#[derive(Debug, Deserialize)]
struct RemittanceEnvelope {
    data: RemittanceData,
}

#[derive(Debug, Deserialize)]
struct RemittanceData {
    #[serde(rename = "counterForRepeatingBlock", default)]
    rows: Vec<RemittanceRate>,
}
