use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Look-back window for the per-instrument price chart.
/// The string form is the path segment the backend expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[default]
    #[serde(rename = "1day")]
    OneDay,
    #[serde(rename = "1week")]
    OneWeek,
    #[serde(rename = "1month")]
    OneMonth,
    #[serde(rename = "3month")]
    ThreeMonth,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "1year")]
    OneYear,
    #[serde(rename = "max")]
    Max,
}

impl Interval {
    pub const ALL: [Interval; 7] = [
        Interval::OneDay,
        Interval::OneWeek,
        Interval::OneMonth,
        Interval::ThreeMonth,
        Interval::YearToDate,
        Interval::OneYear,
        Interval::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneDay => "1day",
            Interval::OneWeek => "1week",
            Interval::OneMonth => "1month",
            Interval::ThreeMonth => "3month",
            Interval::YearToDate => "ytd",
            Interval::OneYear => "1year",
            Interval::Max => "max",
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Interval {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .into_iter()
            .find(|i| i.as_str() == s.trim())
            .ok_or_else(|| CoreError::ValidationError(format!("Unknown interval '{s}'")))
    }
}

/// Latest traded price for a symbol (`/price/{symbol}/`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: Decimal,
}

/// One OHLCV bar of the per-instrument time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    #[serde(with = "backend_datetime")]
    pub time: NaiveDateTime,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// Envelope of `/time_series/{symbol}/{interval}/`.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeSeriesResponse {
    pub symbol: String,
    pub time_series: Vec<Candle>,
}

/// A single autocomplete hit. Field names follow the upstream symbol-search
/// payload that the backend passes through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMatch {
    #[serde(rename = "1. symbol")]
    pub symbol: String,
    #[serde(rename = "2. name")]
    pub name: String,
    #[serde(rename = "3. type", default)]
    pub instrument_type: Option<String>,
    #[serde(rename = "4. region", default)]
    pub region: Option<String>,
    #[serde(rename = "8. currency", default)]
    pub currency: Option<String>,
    #[serde(rename = "9. matchScore", default)]
    pub match_score: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "bestMatches", default)]
    pub best_matches: Vec<SearchMatch>,
}

/// Descriptive metadata for the info dialog. Missing fields arrive as "N/A".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    #[serde(default = "not_available")]
    pub name: String,
    #[serde(default = "not_available")]
    pub sector: String,
    #[serde(default = "not_available")]
    pub industry: String,
    #[serde(default = "not_available")]
    pub website: String,
    #[serde(default = "not_available")]
    pub description: String,
}

impl CompanyInfo {
    /// The backend substitutes "N/A" when the upstream lookup is empty.
    #[must_use]
    pub fn has_description(&self) -> bool {
        let d = self.description.trim();
        !d.is_empty() && d != "N/A"
    }
}

fn not_available() -> String {
    "N/A".to_string()
}

/// `YYYY-MM-DD HH:MM:SS` timestamps as emitted by the time-series endpoint.
/// ISO `T`-separated values are accepted on input as well.
mod backend_datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}
