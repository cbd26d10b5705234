use serde::{Deserialize, Serialize};

use crate::{Currency, SourceId};

/// Round a quotation to the canonical 4 fractional digits.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// One currency's quotation from one source at one point in time.
///
/// The four rate fields are independently present-or-null; a field the
/// upstream omitted or that failed numeric coercion is `None` without
/// affecting its siblings. Buying below selling is expected but never
/// enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRecord {
    pub currency: Currency,
    pub transfer_buying_rate: Option<f64>,
    pub transfer_selling_rate: Option<f64>,
    pub notes_buying_rate: Option<f64>,
    pub notes_selling_rate: Option<f64>,
}

impl RateRecord {
    /// Record with all four rate fields null.
    pub const fn unavailable(currency: Currency) -> Self {
        Self {
            currency,
            transfer_buying_rate: None,
            transfer_selling_rate: None,
            notes_buying_rate: None,
            notes_selling_rate: None,
        }
    }
}

/// The full set of rate records for one source at one fetch.
///
/// Immutable after construction and always ordered ascending by currency
/// code; the next fetch supersedes rather than mutates a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SourceSnapshot {
    records: Vec<RateRecord>,
}

impl SourceSnapshot {
    /// Build a snapshot, sorting the records ascending by currency code.
    pub fn new(mut records: Vec<RateRecord>) -> Self {
        records.sort_by(|a, b| a.currency.code().cmp(b.currency.code()));
        Self { records }
    }

    /// Snapshot standing in for an unavailable source: one all-null record
    /// per quoted currency.
    pub fn empty() -> Self {
        Self::new(
            Currency::ALL
                .into_iter()
                .map(RateRecord::unavailable)
                .collect(),
        )
    }

    pub fn records(&self) -> &[RateRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<RateRecord> {
        self.records
    }

    /// First record quoting the given currency, if any.
    pub fn record_for(&self, currency: Currency) -> Option<&RateRecord> {
        self.records.iter().find(|record| record.currency == currency)
    }

    /// True when every rate field of every record is null.
    pub fn is_unavailable(&self) -> bool {
        self.records.iter().all(|record| {
            record.transfer_buying_rate.is_none()
                && record.transfer_selling_rate.is_none()
                && record.notes_buying_rate.is_none()
                && record.notes_selling_rate.is_none()
        })
    }
}

/// One source's transfer rates for a single requested currency.
///
/// Notes rates are intentionally excluded from the comparison view. The
/// core reports source identifiers; display-name mapping happens at the
/// HTTP/CLI edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyComparisonRow {
    pub source: SourceId,
    pub transfer_buying_rate: Option<f64>,
    pub transfer_selling_rate: Option<f64>,
}

impl CurrencyComparisonRow {
    /// Row for a source that produced no usable quotation.
    pub const fn unavailable(source: SourceId) -> Self {
        Self {
            source,
            transfer_buying_rate: None,
            transfer_selling_rate: None,
        }
    }
}
