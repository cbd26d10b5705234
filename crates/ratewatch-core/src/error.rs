use thiserror::Error;

/// Validation and contract errors exposed by `ratewatch-core`.
///
/// These signal programming or caller errors at the public boundaries
/// (an unknown currency code in a URL, an unknown source identifier on the
/// command line), never operational upstream conditions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unknown currency '{value}', expected one of USD, HKD, JPY, GBP, EUR, AUD, CAD, SGD")]
    UnknownCurrency { value: String },

    #[error("unknown source '{value}'")]
    UnknownSource { value: String },
}
