use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::models::chart::{InstrumentPriceRow, InstrumentPriceTable, PortfolioCharts, SeriesPoint};
use crate::models::summary::DailySummaryRecord;

/// Turns raw `/portfolio-daily` records into chart-ready projections.
///
/// The core computes all the numbers; the frontend only renders.
/// Charts produced:
/// - Daily profit/loss
/// - Daily portfolio value
/// - Per-instrument total price, one dense row per date
pub struct ChartService;

impl ChartService {
    pub fn new() -> Self {
        Self
    }

    /// Normalize a batch of daily summaries.
    ///
    /// 1. Sort by date ascending (source order is not trusted)
    /// 2. Collapse duplicate dates, keeping the last record seen for a date
    /// 3. Collect the union of instrument keys over the whole batch
    /// 4. Emit one row per date with a cell for every key in the union
    ///
    /// A missing price becomes `None`; a zero price stays zero. Values are
    /// passed through unrounded.
    pub fn normalize(&self, records: &[DailySummaryRecord]) -> PortfolioCharts {
        let sorted = Self::sorted_unique(records);

        let instruments: BTreeSet<&str> = sorted
            .iter()
            .flat_map(|r| r.per_instrument.keys().map(String::as_str))
            .collect();

        let mut charts = PortfolioCharts {
            instrument_prices: InstrumentPriceTable {
                instruments: instruments.iter().map(|s| s.to_string()).collect(),
                rows: Vec::with_capacity(sorted.len()),
            },
            ..PortfolioCharts::default()
        };

        for record in &sorted {
            charts.profit_loss.push(SeriesPoint {
                date: record.date,
                value: record.daily_profit_loss,
            });
            charts.portfolio_value.push(SeriesPoint {
                date: record.date,
                value: record.portfolio_value,
            });
            charts.instrument_prices.rows.push(InstrumentPriceRow {
                date: record.date,
                prices: instruments
                    .iter()
                    .map(|symbol| (symbol.to_string(), record.total_price(symbol)))
                    .collect(),
            });
        }

        debug!(
            dates = sorted.len(),
            instruments = charts.instrument_prices.instruments.len(),
            "normalized daily summaries"
        );
        charts
    }

    fn sorted_unique(records: &[DailySummaryRecord]) -> Vec<&DailySummaryRecord> {
        let mut sorted: Vec<&DailySummaryRecord> = records.iter().collect();
        // Stable: records sharing a date keep their source order.
        sorted.sort_by_key(|r| r.date);

        let mut unique: Vec<&DailySummaryRecord> = Vec::with_capacity(sorted.len());
        for record in sorted {
            match unique.last_mut() {
                Some(prev) if prev.date == record.date => {
                    warn!(date = %record.date, "duplicate date in daily summaries, keeping the later record");
                    *prev = record;
                }
                _ => unique.push(record),
            }
        }
        unique
    }
}

impl Default for ChartService {
    fn default() -> Self {
        Self::new()
    }
}
