use futures::future::join_all;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::errors::CoreError;
use crate::gateway::traits::DashboardApi;
use crate::models::analytics::{ProfitLossSummary, RiskAssessment, VolatilityReading};
use crate::models::facet::{AnalyticsViewState, Facet, FacetState};
use crate::models::instrument::{Candle, Interval};
use crate::models::trade::validate_symbol;

/// Drives the five analytics facets for the selected instrument.
///
/// Selecting a symbol starts every facet at once and each completion only
/// touches its own slot, so one failing endpoint leaves the rest of the view
/// intact. Every request is issued against a ticket carrying the selection
/// generation plus a per-facet sequence number; a response whose ticket is no
/// longer current (the symbol changed, or the same facet was re-issued) is
/// dropped on arrival.
///
/// Cloning yields another handle to the same selection.
#[derive(Clone)]
pub struct AnalyticsOrchestrator {
    api: Arc<dyn DashboardApi>,
    default_interval: Interval,
    state: Arc<Mutex<SelectionState>>,
}

#[derive(Default)]
struct SelectionState {
    /// Bumped on every new selection and on reset.
    generation: u64,
    next_seq: u64,
    view: Option<AnalyticsViewState>,
    /// Sequence number of the newest outstanding request per facet.
    in_flight: HashMap<Facet, u64>,
}

#[derive(Debug, Clone)]
struct Ticket {
    generation: u64,
    seq: u64,
    facet: Facet,
    symbol: String,
    interval: Interval,
}

enum FacetPayload {
    TimeSeries(Vec<Candle>),
    ProfitLoss(ProfitLossSummary),
    Risk(RiskAssessment),
    Volatility(VolatilityReading),
    Diversity(Option<Decimal>),
}

impl AnalyticsOrchestrator {
    pub fn new(api: Arc<dyn DashboardApi>, default_interval: Interval) -> Self {
        Self {
            api,
            default_interval,
            state: Arc::new(Mutex::new(SelectionState::default())),
        }
    }

    /// Select `symbol` and load all facets concurrently.
    ///
    /// Returns the view once every facet has settled. Facet failures are
    /// recorded in the view, not returned. Errors: a missing session (nothing
    /// is requested), an empty symbol, `Superseded` when another selection
    /// replaced this one before it settled, and `NoSelection` after a reset.
    pub async fn select_symbol(&self, symbol: &str) -> Result<AnalyticsViewState, CoreError> {
        self.select_symbol_named(symbol, None).await
    }

    /// Like `select_symbol`, carrying a display name (from search results or a
    /// deep link) into the view.
    pub async fn select_symbol_named(
        &self,
        symbol: &str,
        display_name: Option<String>,
    ) -> Result<AnalyticsViewState, CoreError> {
        self.api.ensure_session()?;
        let symbol = validate_symbol(symbol.to_string())?;

        let (generation, tickets) = {
            let mut state = self.lock();
            state.generation += 1;
            state.in_flight.clear();
            let mut view = AnalyticsViewState::new(symbol.clone(), self.default_interval);
            view.display_name = display_name;
            state.view = Some(view);
            info!(%symbol, generation = state.generation, "instrument selected");
            let tickets = Facet::ALL
                .iter()
                .filter_map(|facet| state.issue(*facet))
                .collect::<Vec<_>>();
            (state.generation, tickets)
        };

        self.run(tickets).await;
        self.settled_view(generation, None)
    }

    /// Switch the time-series interval. Only the time-series facet is
    /// re-fetched; every other facet keeps its current state.
    ///
    /// Fails with `Superseded` if the symbol or the interval changed again
    /// before this request settled.
    pub async fn set_interval(&self, interval: Interval) -> Result<AnalyticsViewState, CoreError> {
        self.api.ensure_session()?;
        let (generation, ticket) = {
            let mut state = self.lock();
            let view = state.view.as_mut().ok_or(CoreError::NoSelection)?;
            view.interval = interval;
            debug!(symbol = %view.symbol, %interval, "interval changed");
            (state.generation, state.issue(Facet::TimeSeries))
        };

        self.run(ticket.into_iter().collect()).await;
        self.settled_view(generation, Some(interval))
    }

    /// Re-fetch the time series for the current symbol and interval.
    pub async fn refresh_time_series(&self) -> Result<AnalyticsViewState, CoreError> {
        let generation = self.reissue(&[Facet::TimeSeries]).await?;
        self.settled_view(generation, None)
    }

    /// Re-issue the given facets for the current selection. Facets not listed
    /// are left untouched.
    pub async fn refresh(&self, facets: &[Facet]) -> Result<(), CoreError> {
        self.reissue(facets).await.map(|_| ())
    }

    /// Issue and await `facets`, returning the generation they belong to.
    async fn reissue(&self, facets: &[Facet]) -> Result<u64, CoreError> {
        self.api.ensure_session()?;
        let (generation, tickets) = {
            let mut state = self.lock();
            if state.view.is_none() {
                return Err(CoreError::NoSelection);
            }
            let tickets = facets
                .iter()
                .filter_map(|facet| state.issue(*facet))
                .collect::<Vec<_>>();
            (state.generation, tickets)
        };

        self.run(tickets).await;
        Ok(generation)
    }

    /// The view belonging to the request issued at `generation` (and
    /// `interval`, when given). A newer selection or interval wins.
    fn settled_view(
        &self,
        generation: u64,
        interval: Option<Interval>,
    ) -> Result<AnalyticsViewState, CoreError> {
        let state = self.lock();
        let view = state.view.as_ref().ok_or(CoreError::NoSelection)?;
        let replaced = state.generation != generation
            || interval.is_some_and(|requested| requested != view.interval);
        if replaced {
            debug!(generation, current = state.generation, "request superseded");
            return Err(CoreError::Superseded);
        }
        Ok(view.clone())
    }

    /// Snapshot of the current view, if a symbol is selected.
    pub fn view(&self) -> Option<AnalyticsViewState> {
        self.lock().view.clone()
    }

    pub fn selected_symbol(&self) -> Option<String> {
        self.lock().view.as_ref().map(|v| v.symbol.clone())
    }

    pub fn default_interval(&self) -> Interval {
        self.default_interval
    }

    /// Drop the selection. Responses still in flight are discarded on arrival.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.view = None;
        state.in_flight.clear();
        debug!(generation = state.generation, "selection cleared");
    }

    async fn run(&self, tickets: Vec<Ticket>) {
        let mut pending = Vec::with_capacity(tickets.len());
        for ticket in tickets {
            pending.push(self.fetch_and_complete(ticket));
        }
        join_all(pending).await;
    }

    async fn fetch_and_complete(&self, ticket: Ticket) {
        let result = self.fetch(&ticket).await;
        self.complete(ticket, result);
    }

    async fn fetch(&self, ticket: &Ticket) -> Result<FacetPayload, CoreError> {
        let symbol = ticket.symbol.as_str();
        match ticket.facet {
            Facet::TimeSeries => {
                let mut candles = self.api.time_series(symbol, ticket.interval).await?;
                candles.sort_by_key(|c| c.time);
                Ok(FacetPayload::TimeSeries(candles))
            }
            Facet::ProfitLoss => self
                .api
                .profit_loss(symbol)
                .await
                .map(FacetPayload::ProfitLoss),
            Facet::Risk => self
                .api
                .risk_assessment(symbol)
                .await
                .map(FacetPayload::Risk),
            Facet::Volatility => self
                .api
                .volatility(symbol)
                .await
                .map(FacetPayload::Volatility),
            Facet::Diversity => {
                let report = self.api.portfolio_diversity().await?;
                Ok(FacetPayload::Diversity(report.share_of(symbol)))
            }
        }
    }

    fn complete(&self, ticket: Ticket, result: Result<FacetPayload, CoreError>) {
        let mut state = self.lock();
        let current = state.generation == ticket.generation
            && state.in_flight.get(&ticket.facet) == Some(&ticket.seq);
        if !current {
            debug!(
                symbol = %ticket.symbol,
                facet = %ticket.facet,
                generation = ticket.generation,
                "discarding stale facet result"
            );
            return;
        }
        state.in_flight.remove(&ticket.facet);

        let Some(view) = state.view.as_mut() else {
            return;
        };
        match result {
            Ok(payload) => store(view, payload),
            Err(e) => {
                warn!(symbol = %ticket.symbol, facet = %ticket.facet, error = %e, "facet failed");
                view.mark_failed(ticket.facet, e.to_string());
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, SelectionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SelectionState {
    /// Mark `facet` loading and hand out the ticket its response must match.
    fn issue(&mut self, facet: Facet) -> Option<Ticket> {
        let view = self.view.as_mut()?;
        view.mark_loading(facet);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight.insert(facet, seq);
        Some(Ticket {
            generation: self.generation,
            seq,
            facet,
            symbol: view.symbol.clone(),
            interval: view.interval,
        })
    }
}

fn store(view: &mut AnalyticsViewState, payload: FacetPayload) {
    match payload {
        FacetPayload::TimeSeries(candles) => view.time_series = FacetState::Loaded(candles),
        FacetPayload::ProfitLoss(summary) => view.profit_loss = FacetState::Loaded(summary),
        FacetPayload::Risk(assessment) => view.risk = FacetState::Loaded(assessment),
        FacetPayload::Volatility(reading) => view.volatility = FacetState::Loaded(reading),
        FacetPayload::Diversity(share) => view.diversity = FacetState::Loaded(share),
    }
}

impl std::fmt::Debug for AnalyticsOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsOrchestrator")
            .field("default_interval", &self.default_interval)
            .field("selected", &self.selected_symbol())
            .finish()
    }
}
