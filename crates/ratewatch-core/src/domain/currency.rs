use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// One of the fixed set of quoted currencies.
///
/// Every snapshot is filtered to this set; an empty snapshot carries one
/// all-null record per member. Snapshot ordering is by code, not by
/// declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Hkd,
    Jpy,
    Gbp,
    Eur,
    Aud,
    Cad,
    Sgd,
}

impl Currency {
    pub const ALL: [Self; 8] = [
        Self::Usd,
        Self::Hkd,
        Self::Jpy,
        Self::Gbp,
        Self::Eur,
        Self::Aud,
        Self::Cad,
        Self::Sgd,
    ];

    /// ISO-style 3-letter code.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Hkd => "HKD",
            Self::Jpy => "JPY",
            Self::Gbp => "GBP",
            Self::Eur => "EUR",
            Self::Aud => "AUD",
            Self::Cad => "CAD",
            Self::Sgd => "SGD",
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "HKD" => Ok(Self::Hkd),
            "JPY" => Ok(Self::Jpy),
            "GBP" => Ok(Self::Gbp),
            "EUR" => Ok(Self::Eur),
            "AUD" => Ok(Self::Aud),
            "CAD" => Ok(Self::Cad),
            "SGD" => Ok(Self::Sgd),
            other => Err(ValidationError::UnknownCurrency {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        let parsed = Currency::from_str(" usd ").expect("currency should parse");
        assert_eq!(parsed, Currency::Usd);
    }

    #[test]
    fn rejects_unknown_code() {
        let err = Currency::from_str("CNY").expect_err("must fail");
        assert!(matches!(err, ValidationError::UnknownCurrency { .. }));
    }

    #[test]
    fn serializes_as_code() {
        let json = serde_json::to_string(&Currency::Sgd).expect("must serialize");
        assert_eq!(json, "\"SGD\"");
    }
}
