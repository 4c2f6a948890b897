use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Position performance for one symbol (`/profit_loss_percentage/{symbol}/`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitLossSummary {
    pub symbol: String,
    pub net_quantity: i64,
    pub current_price: Decimal,
    pub average_buy_price: Decimal,
    pub profit_loss_percentage: Decimal,
    pub market_value: Decimal,
    pub total_return: Decimal,
}

/// Moving-average crossover signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskSignal {
    Buy,
    Sell,
    Hold,
    /// Stand-in used when no assessment could be obtained.
    #[serde(other)]
    Unavailable,
}

impl std::fmt::Display for RiskSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskSignal::Buy => write!(f, "Buy"),
            RiskSignal::Sell => write!(f, "Sell"),
            RiskSignal::Hold => write!(f, "Hold"),
            RiskSignal::Unavailable => write!(f, "No recommendation available"),
        }
    }
}

/// MA-based risk assessment (`/risk/?symbol=`), also the payload behind the
/// cached recommendation lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub symbol: String,
    #[serde(default)]
    pub latest_close: Option<Decimal>,
    #[serde(rename = "MA20", default)]
    pub ma20: Option<Decimal>,
    #[serde(rename = "MA50", default)]
    pub ma50: Option<Decimal>,
    pub recommendation: RiskSignal,
}

impl RiskAssessment {
    /// Placeholder substituted when the lookup for `symbol` fails.
    pub fn unavailable(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            latest_close: None,
            ma20: None,
            ma50: None,
            recommendation: RiskSignal::Unavailable,
        }
    }
}

/// Current annualized volatility (`/check-volatility/{symbol}`).
///
/// The backend sends a preformatted percentage string such as `"23.41%"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityReading {
    pub current_volatility: String,
}

impl VolatilityReading {
    /// Numeric percentage, or `None` if the backend sent something unparsable
    /// (e.g. `"nan%"` on a day without intraday bars).
    #[must_use]
    pub fn percentage(&self) -> Option<Decimal> {
        let trimmed = self.current_volatility.trim().trim_end_matches('%').trim();
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .ok()
    }
}

/// Allocation of the whole portfolio (`/portfolio_diversity/`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiversityReport {
    #[serde(default)]
    pub username: Option<String>,
    pub total_portfolio_value: Decimal,
    pub portfolio: Vec<DiversityEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiversityEntry {
    pub symbol: String,
    pub name: String,
    pub net_quantity: i64,
    pub current_price: Decimal,
    pub current_value: Decimal,
    pub diversity_percentage: Decimal,
}

impl DiversityReport {
    /// Share of the portfolio held in `symbol`, or `None` when not held.
    #[must_use]
    pub fn share_of(&self, symbol: &str) -> Option<Decimal> {
        self.portfolio
            .iter()
            .find(|e| e.symbol == symbol)
            .map(|e| e.diversity_percentage)
    }
}
