use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

use super::analytics::{ProfitLossSummary, RiskAssessment, VolatilityReading};
use super::instrument::{Candle, Interval};

/// One independently loadable slice of the analytics view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Facet {
    TimeSeries,
    ProfitLoss,
    Risk,
    Volatility,
    Diversity,
}

impl Facet {
    pub const ALL: [Facet; 5] = [
        Facet::TimeSeries,
        Facet::ProfitLoss,
        Facet::Risk,
        Facet::Volatility,
        Facet::Diversity,
    ];
}

impl std::fmt::Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Facet::TimeSeries => write!(f, "time series"),
            Facet::ProfitLoss => write!(f, "profit/loss"),
            Facet::Risk => write!(f, "risk assessment"),
            Facet::Volatility => write!(f, "volatility"),
            Facet::Diversity => write!(f, "diversity"),
        }
    }
}

/// Load state of a single facet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum FacetState<T> {
    #[default]
    NotRequested,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> FacetState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FacetState::Loading)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, FacetState::Loaded(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FacetState::Failed(_))
    }

    /// Loaded or failed: no answer is outstanding.
    pub fn is_settled(&self) -> bool {
        self.is_loaded() || self.is_failed()
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            FacetState::Loaded(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FacetState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    fn kind(&self) -> SlotKind {
        match self {
            FacetState::NotRequested => SlotKind::Idle,
            FacetState::Loading => SlotKind::Loading,
            FacetState::Loaded(_) => SlotKind::Loaded,
            FacetState::Failed(_) => SlotKind::Failed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotKind {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Aggregate status of an `AnalyticsViewState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewStatus {
    Idle,
    Loading,
    Ready,
    PartiallyFailed,
}

/// Everything the analytics page shows for the selected instrument.
///
/// Each facet transitions on its own; a failed facet never blocks the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsViewState {
    pub symbol: String,
    /// Display name carried along from search results or deep links.
    pub display_name: Option<String>,
    pub interval: Interval,
    pub time_series: FacetState<Vec<Candle>>,
    pub profit_loss: FacetState<ProfitLossSummary>,
    pub risk: FacetState<RiskAssessment>,
    pub volatility: FacetState<VolatilityReading>,
    /// Share of the portfolio held in `symbol`; `Loaded(None)` when not held.
    pub diversity: FacetState<Option<Decimal>>,
}

impl AnalyticsViewState {
    pub fn new(symbol: impl Into<String>, interval: Interval) -> Self {
        Self {
            symbol: symbol.into(),
            display_name: None,
            interval,
            time_series: FacetState::NotRequested,
            profit_loss: FacetState::NotRequested,
            risk: FacetState::NotRequested,
            volatility: FacetState::NotRequested,
            diversity: FacetState::NotRequested,
        }
    }

    pub fn status(&self) -> ViewStatus {
        let kinds = self.slot_kinds();
        if kinds.iter().any(|(_, k)| *k == SlotKind::Loading) {
            ViewStatus::Loading
        } else if kinds.iter().all(|(_, k)| *k == SlotKind::Idle) {
            ViewStatus::Idle
        } else if kinds.iter().any(|(_, k)| *k == SlotKind::Failed) {
            ViewStatus::PartiallyFailed
        } else {
            ViewStatus::Ready
        }
    }

    /// Facets currently in the `Failed` state, in display order.
    pub fn failed_facets(&self) -> Vec<Facet> {
        self.slot_kinds()
            .into_iter()
            .filter(|(_, k)| *k == SlotKind::Failed)
            .map(|(f, _)| f)
            .collect()
    }

    /// `Err(PartialDataUnavailable)` listing the failed facets, if any.
    pub fn check_complete(&self) -> Result<(), CoreError> {
        let failed = self.failed_facets();
        if failed.is_empty() {
            Ok(())
        } else {
            Err(CoreError::PartialDataUnavailable { failed })
        }
    }

    pub(crate) fn mark_loading(&mut self, facet: Facet) {
        match facet {
            Facet::TimeSeries => self.time_series = FacetState::Loading,
            Facet::ProfitLoss => self.profit_loss = FacetState::Loading,
            Facet::Risk => self.risk = FacetState::Loading,
            Facet::Volatility => self.volatility = FacetState::Loading,
            Facet::Diversity => self.diversity = FacetState::Loading,
        }
    }

    pub(crate) fn mark_failed(&mut self, facet: Facet, reason: String) {
        match facet {
            Facet::TimeSeries => self.time_series = FacetState::Failed(reason),
            Facet::ProfitLoss => self.profit_loss = FacetState::Failed(reason),
            Facet::Risk => self.risk = FacetState::Failed(reason),
            Facet::Volatility => self.volatility = FacetState::Failed(reason),
            Facet::Diversity => self.diversity = FacetState::Failed(reason),
        }
    }

    fn slot_kinds(&self) -> [(Facet, SlotKind); 5] {
        [
            (Facet::TimeSeries, self.time_series.kind()),
            (Facet::ProfitLoss, self.profit_loss.kind()),
            (Facet::Risk, self.risk.kind()),
            (Facet::Volatility, self.volatility.kind()),
            (Facet::Diversity, self.diversity.kind()),
        ]
    }
}
