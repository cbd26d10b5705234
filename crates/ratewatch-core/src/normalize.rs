//! Pure transforms from upstream payload shapes into canonical snapshots.
//!
//! Every function here is free of I/O and shared state: given the same
//! input rows, the same snapshot comes out. Rows quoting currencies outside
//! the required set are dropped, each surviving field is coerced and
//! rescaled independently, and the result is ordered ascending by currency
//! code.

use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;

use crate::{round4, Currency, RateRecord, SourceSnapshot};

/// Raw aggregator row. The upstream quotes CNY per 100 foreign units in
/// loosely-typed fields (numbers or numeric strings).
#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorRate {
    pub code: String,
    #[serde(default)]
    pub hui_in: Option<Value>,
    #[serde(default)]
    pub hui_out: Option<Value>,
    #[serde(default)]
    pub chao_in: Option<Value>,
    #[serde(default)]
    pub chao_out: Option<Value>,
}

/// Raw remittance-endpoint row. The upstream quotes foreign units per CNY.
#[derive(Debug, Clone, Deserialize)]
pub struct RemittanceRate {
    #[serde(rename = "exchangeRateCurrency")]
    pub currency: String,
    #[serde(rename = "transferBuyingRate", default)]
    pub transfer_buying_rate: Option<Value>,
    #[serde(rename = "transferSellingRate", default)]
    pub transfer_selling_rate: Option<Value>,
    #[serde(rename = "notesBuyingRate", default)]
    pub notes_buying_rate: Option<Value>,
    #[serde(rename = "notesSellingRate", default)]
    pub notes_selling_rate: Option<Value>,
}

/// Coerce a loosely-typed upstream field to a finite number.
///
/// Numbers pass through, numeric strings parse, everything else (missing
/// fields, placeholder text, non-finite values) becomes `None`. One bad
/// field never invalidates the other fields of its row.
pub fn coerce_rate(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => f64::from_str(text.trim()).ok(),
        _ => None,
    }?;

    parsed.is_finite().then_some(parsed)
}

/// Normalize a shared-aggregator payload: canonical rate = value / 100.
pub fn from_aggregator(rows: &[AggregatorRate]) -> SourceSnapshot {
    let records = rows
        .iter()
        .filter_map(|row| {
            let currency = Currency::from_str(&row.code).ok()?;
            Some(RateRecord {
                currency,
                transfer_buying_rate: scale_percent(coerce_rate(row.hui_in.as_ref())),
                transfer_selling_rate: scale_percent(coerce_rate(row.hui_out.as_ref())),
                notes_buying_rate: scale_percent(coerce_rate(row.chao_in.as_ref())),
                notes_selling_rate: scale_percent(coerce_rate(row.chao_out.as_ref())),
            })
        })
        .collect();

    SourceSnapshot::new(records)
}

/// Normalize a remittance payload: canonical rate = 1 / value.
pub fn from_remittance(rows: &[RemittanceRate]) -> SourceSnapshot {
    let records = rows
        .iter()
        .filter_map(|row| {
            let currency = Currency::from_str(&row.currency).ok()?;
            Some(RateRecord {
                currency,
                transfer_buying_rate: reciprocal(coerce_rate(row.transfer_buying_rate.as_ref())),
                transfer_selling_rate: reciprocal(coerce_rate(row.transfer_selling_rate.as_ref())),
                notes_buying_rate: reciprocal(coerce_rate(row.notes_buying_rate.as_ref())),
                notes_selling_rate: reciprocal(coerce_rate(row.notes_selling_rate.as_ref())),
            })
        })
        .collect();

    SourceSnapshot::new(records)
}

/// Derive the preferential tier from a base source's published spread.
///
/// buying' = (3·buying + selling) / 4 and selling' = (buying + 3·selling) / 4,
/// independently for the transfer and notes pairs. A pair with either side
/// missing derives to null for both blended fields of that pair.
pub fn derive_preferential(base: &SourceSnapshot) -> SourceSnapshot {
    let records = base
        .records()
        .iter()
        .map(|record| {
            let (transfer_buying, transfer_selling) =
                blend(record.transfer_buying_rate, record.transfer_selling_rate);
            let (notes_buying, notes_selling) =
                blend(record.notes_buying_rate, record.notes_selling_rate);

            RateRecord {
                currency: record.currency,
                transfer_buying_rate: transfer_buying,
                transfer_selling_rate: transfer_selling,
                notes_buying_rate: notes_buying,
                notes_selling_rate: notes_selling,
            }
        })
        .collect();

    SourceSnapshot::new(records)
}

fn scale_percent(value: Option<f64>) -> Option<f64> {
    value.map(|v| round4(v / 100.0))
}

fn reciprocal(value: Option<f64>) -> Option<f64> {
    let v = value?;
    let inverted = 1.0 / v;
    inverted.is_finite().then(|| round4(inverted))
}

fn blend(buying: Option<f64>, selling: Option<f64>) -> (Option<f64>, Option<f64>) {
    match (buying, selling) {
        (Some(b), Some(s)) => (
            Some(round4((3.0 * b + s) / 4.0)),
            Some(round4((b + 3.0 * s) / 4.0)),
        ),
        _ => (None, None),
    }
}
