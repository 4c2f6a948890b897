use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One calendar day of the portfolio history (`/portfolio-daily`).
///
/// The backend writes each held instrument as a sibling key of the record
/// (`{"date": ..., "portfolio_value": ..., "AAPL": {...}}`), so everything
/// that is not one of the three fixed fields lands in `per_instrument`.
/// The set of instruments varies from one record to the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummaryRecord {
    pub date: NaiveDate,
    pub portfolio_value: Decimal,
    pub daily_profit_loss: Decimal,
    #[serde(flatten)]
    pub per_instrument: BTreeMap<String, InstrumentSnapshot>,
}

/// Position of one instrument at the end of a day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstrumentSnapshot {
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub average_price: Option<Decimal>,
    #[serde(default)]
    pub total_price: Option<Decimal>,
}

impl DailySummaryRecord {
    pub fn new(date: NaiveDate, portfolio_value: Decimal, daily_profit_loss: Decimal) -> Self {
        Self {
            date,
            portfolio_value,
            daily_profit_loss,
            per_instrument: BTreeMap::new(),
        }
    }

    /// Builder-style helper: attach an instrument's total price for this day.
    #[must_use]
    pub fn with_instrument(mut self, symbol: impl Into<String>, total_price: Decimal) -> Self {
        self.per_instrument.insert(
            symbol.into(),
            InstrumentSnapshot {
                total_price: Some(total_price),
                ..InstrumentSnapshot::default()
            },
        );
        self
    }

    /// Total price of `symbol` on this day. `None` when the instrument has no
    /// entry or the entry carries no price; a zero price is returned as zero.
    #[must_use]
    pub fn total_price(&self, symbol: &str) -> Option<Decimal> {
        self.per_instrument.get(symbol).and_then(|s| s.total_price)
    }
}

/// Envelope of `/portfolio-daily`.
#[derive(Debug, Clone, Deserialize)]
pub struct DailySummaryResponse {
    pub daily_summary: Vec<DailySummaryRecord>,
}
