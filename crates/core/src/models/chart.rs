use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single `(date, value)` data point for a line chart.
///
/// Generated by the core; the frontend only renders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

/// One date of the per-instrument chart.
///
/// `prices` holds an entry for every instrument in the table's key set:
/// `None` means "no data on this date", which is not the same as a zero price.
/// Serialized flat (`{"date": ..., "AAPL": 120.5, "MSFT": null}`), which is
/// the row shape charting libraries expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentPriceRow {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub prices: BTreeMap<String, Option<Decimal>>,
}

impl InstrumentPriceRow {
    /// Price cell for `symbol`; the outer `None` means the symbol is not part
    /// of the table at all.
    #[must_use]
    pub fn cell(&self, symbol: &str) -> Option<Option<Decimal>> {
        self.prices.get(symbol).copied()
    }
}

/// Dense per-instrument price table: every row carries the same key set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstrumentPriceTable {
    /// Union of instrument keys across the batch, sorted.
    pub instruments: Vec<String>,
    pub rows: Vec<InstrumentPriceRow>,
}

/// The three chart projections derived from one batch of daily summaries,
/// all ordered by date ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioCharts {
    pub profit_loss: Vec<SeriesPoint>,
    pub portfolio_value: Vec<SeriesPoint>,
    pub instrument_prices: InstrumentPriceTable,
}

impl PortfolioCharts {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profit_loss.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.profit_loss.len()
    }
}
