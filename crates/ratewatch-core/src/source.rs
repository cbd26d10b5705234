use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Stable identifiers for the configured rate sources.
///
/// This enum is the source registry: `ALL` fixes the display order used by
/// every aggregated view, `code()` is the durable identifier (and, for
/// aggregator-backed banks, the upstream `bankCode` parameter), and
/// `display_name()` carries the human-readable bank name applied at the
/// HTTP/CLI edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SourceId {
    #[serde(rename = "ICBC")]
    Icbc,
    #[serde(rename = "BOC")]
    Boc,
    #[serde(rename = "ABCHINA")]
    Abchina,
    #[serde(rename = "BANKCOMM")]
    Bankcomm,
    #[serde(rename = "CCB")]
    Ccb,
    #[serde(rename = "CMBCHINA")]
    Cmbchina,
    #[serde(rename = "CEBBANK")]
    Cebbank,
    #[serde(rename = "SPDB")]
    Spdb,
    #[serde(rename = "CIB")]
    Cib,
    #[serde(rename = "CIB_HYRS")]
    CibHyrs,
    #[serde(rename = "ECITIC")]
    Ecitic,
    #[serde(rename = "HSBC")]
    Hsbc,
}

impl SourceId {
    pub const ALL: [Self; 12] = [
        Self::Icbc,
        Self::Boc,
        Self::Abchina,
        Self::Bankcomm,
        Self::Ccb,
        Self::Cmbchina,
        Self::Cebbank,
        Self::Spdb,
        Self::Cib,
        Self::CibHyrs,
        Self::Ecitic,
        Self::Hsbc,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            Self::Icbc => "ICBC",
            Self::Boc => "BOC",
            Self::Abchina => "ABCHINA",
            Self::Bankcomm => "BANKCOMM",
            Self::Ccb => "CCB",
            Self::Cmbchina => "CMBCHINA",
            Self::Cebbank => "CEBBANK",
            Self::Spdb => "SPDB",
            Self::Cib => "CIB",
            Self::CibHyrs => "CIB_HYRS",
            Self::Ecitic => "ECITIC",
            Self::Hsbc => "HSBC",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Icbc => "工商银行",
            Self::Boc => "中国银行",
            Self::Abchina => "农业银行",
            Self::Bankcomm => "交通银行",
            Self::Ccb => "建设银行",
            Self::Cmbchina => "招商银行",
            Self::Cebbank => "光大银行",
            Self::Spdb => "浦发银行",
            Self::Cib => "兴业银行",
            Self::CibHyrs => "兴业银行（寰宇优惠）",
            Self::Ecitic => "中信银行",
            Self::Hsbc => "汇丰银行",
        }
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for SourceId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|source| source.code() == normalized)
            .ok_or(ValidationError::UnknownSource { value: normalized })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_code() {
        for source in SourceId::ALL {
            let parsed = SourceId::from_str(source.code()).expect("code should parse");
            assert_eq!(parsed, source);
        }
    }

    #[test]
    fn rejects_unknown_source() {
        let err = SourceId::from_str("CITIBANK").expect_err("must fail");
        assert!(matches!(err, ValidationError::UnknownSource { .. }));
    }

    #[test]
    fn serializes_as_code() {
        let json = serde_json::to_string(&SourceId::CibHyrs).expect("must serialize");
        assert_eq!(json, "\"CIB_HYRS\"");
    }
}
