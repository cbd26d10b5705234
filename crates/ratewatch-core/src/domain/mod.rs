//! Canonical domain types: the quoted-currency set, per-source rate
//! records, ordered snapshots, and the cross-source comparison row.

mod currency;
mod rate;

pub use currency::Currency;
pub use rate::{round4, CurrencyComparisonRow, RateRecord, SourceSnapshot};
