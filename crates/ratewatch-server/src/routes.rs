use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use ratewatch_core::{CacheMode, Currency, CurrencyComparisonRow, RateEngine};

use crate::error::ApiError;

/// One bank's row in the served comparison view, with the source id
/// replaced by its display name.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BankRow {
    pub bank: &'static str,
    pub transfer_buying_rate: Option<f64>,
    pub transfer_selling_rate: Option<f64>,
}

/// Payload of `GET /api/rates/{currency}`.
#[derive(Debug, Serialize, PartialEq)]
pub struct RatesResponse {
    pub rates: Vec<BankRow>,
    pub last_update: Option<String>,
}

pub fn build_rates_response(
    rows: Vec<CurrencyComparisonRow>,
    last_update: Option<String>,
) -> RatesResponse {
    let rates = rows
        .into_iter()
        .map(|row| BankRow {
            bank: row.source.display_name(),
            transfer_buying_rate: row.transfer_buying_rate,
            transfer_selling_rate: row.transfer_selling_rate,
        })
        .collect();

    RatesResponse { rates, last_update }
}

async fn currency_rates(
    State(engine): State<RateEngine>,
    Path(currency): Path<String>,
) -> Result<Json<RatesResponse>, ApiError> {
    let currency: Currency = currency.parse()?;
    let (rows, last_update) = engine.get_currency_rates(currency, CacheMode::Use).await;
    Ok(Json(build_rates_response(rows, last_update)))
}

async fn reload(State(engine): State<RateEngine>) -> Json<serde_json::Value> {
    engine.reload_rates().await;
    Json(serde_json::json!({ "message": "rates reloaded" }))
}

/// API routes plus the static comparison UI as the fallback service.
pub fn app_router(engine: RateEngine, static_dir: &str) -> Router {
    Router::new()
        .route("/api/rates/:currency", get(currency_rates))
        .route("/api/reload", get(reload))
        .layer(CorsLayer::permissive())
        .with_state(engine)
        .fallback_service(ServeDir::new(static_dir))
}
