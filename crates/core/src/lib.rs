pub mod cache;
pub mod errors;
pub mod gateway;
pub mod models;
pub mod services;

use std::sync::Arc;
use tracing::info;

use cache::memo::Lookup;
use errors::CoreError;
use gateway::{http::HttpGateway, session::SessionToken, traits::DashboardApi};
use models::{
    alert::AlertRow,
    analytics::RiskAssessment,
    chart::PortfolioCharts,
    facet::AnalyticsViewState,
    instrument::{CompanyInfo, Interval, Quote, SearchMatch},
    settings::Settings,
    trade::{HoldingsReport, PreferenceConfirmation, TradeConfirmation},
};
use services::{
    alert_service::{recommendation_cache, AlertService, RecommendationCache},
    analytics_orchestrator::AnalyticsOrchestrator,
    chart_service::ChartService,
    mutation_service::MutationService,
};

/// Main entry point for the dashboard core.
/// Owns the session token, the recommendation cache and the current
/// instrument selection, and wires the services to one backend.
#[must_use]
pub struct PortfolioDashboard {
    settings: Settings,
    token: SessionToken,
    api: Arc<dyn DashboardApi>,
    recommendations: Arc<RecommendationCache>,
    orchestrator: AnalyticsOrchestrator,
    mutation_service: MutationService,
    alert_service: AlertService,
    chart_service: ChartService,
}

impl std::fmt::Debug for PortfolioDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioDashboard")
            .field("api_base_url", &self.settings.api_base_url)
            .field("signed_in", &self.token.is_present())
            .field("selected", &self.orchestrator.selected_symbol())
            .field("cached_recommendations", &self.recommendations.len())
            .finish()
    }
}

impl PortfolioDashboard {
    /// Dashboard talking to the REST backend named in `settings`.
    /// Starts signed out.
    pub fn new(settings: Settings) -> Result<Self, CoreError> {
        let token = SessionToken::new();
        let api = Arc::new(HttpGateway::new(&settings, token.clone())?);
        Ok(Self::with_api(settings, api, token))
    }

    /// Dashboard over any `DashboardApi` implementation. `token` should be
    /// the handle the implementation reads its credentials from.
    pub fn with_api(settings: Settings, api: Arc<dyn DashboardApi>, token: SessionToken) -> Self {
        let recommendations = Arc::new(recommendation_cache(
            settings.recommendation_namespace.clone(),
        ));
        let orchestrator = AnalyticsOrchestrator::new(Arc::clone(&api), settings.default_interval);
        let mutation_service = MutationService::new(Arc::clone(&api), orchestrator.clone());
        let alert_service = AlertService::new(Arc::clone(&api), Arc::clone(&recommendations));
        Self {
            settings,
            token,
            api,
            recommendations,
            orchestrator,
            mutation_service,
            alert_service,
            chart_service: ChartService::new(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ── Session ─────────────────────────────────────────────────────

    pub fn sign_in(&self, token: impl Into<String>) -> Result<(), CoreError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(CoreError::ValidationError("Session token must not be empty".into()));
        }
        self.token.set(token);
        info!("session started");
        Ok(())
    }

    /// End the session: forget the token, the cached recommendations and the
    /// current selection.
    pub fn sign_out(&self) {
        self.token.clear();
        self.recommendations.clear();
        self.orchestrator.reset();
        info!("session ended");
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.token.is_present()
    }

    // ── Analytics ───────────────────────────────────────────────────

    pub async fn select_symbol(&self, symbol: &str) -> Result<AnalyticsViewState, CoreError> {
        self.orchestrator.select_symbol(symbol).await
    }

    /// Select from a URL query string such as `symbol=AAPL&name=Apple%20Inc.`
    /// (a leading `?` is allowed). `name` is optional.
    pub async fn select_from_query(&self, query: &str) -> Result<AnalyticsViewState, CoreError> {
        let mut symbol = None;
        let mut name = None;
        for (key, value) in url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            match &*key {
                "symbol" => symbol = Some(value.into_owned()),
                "name" if !value.trim().is_empty() => name = Some(value.into_owned()),
                _ => {}
            }
        }
        let symbol = symbol.ok_or_else(|| {
            CoreError::ValidationError(format!("Query '{query}' carries no symbol parameter"))
        })?;
        self.orchestrator.select_symbol_named(&symbol, name).await
    }

    pub async fn set_interval(&self, interval: Interval) -> Result<AnalyticsViewState, CoreError> {
        self.orchestrator.set_interval(interval).await
    }

    pub async fn refresh_time_series(&self) -> Result<AnalyticsViewState, CoreError> {
        self.orchestrator.refresh_time_series().await
    }

    /// Snapshot of the analytics view for the selected symbol.
    #[must_use]
    pub fn view(&self) -> Option<AnalyticsViewState> {
        self.orchestrator.view()
    }

    #[must_use]
    pub fn orchestrator(&self) -> &AnalyticsOrchestrator {
        &self.orchestrator
    }

    // ── Mutations ───────────────────────────────────────────────────

    pub async fn buy(
        &self,
        symbol: &str,
        name: &str,
        quantity: u32,
    ) -> Result<TradeConfirmation, CoreError> {
        self.mutation_service.buy(symbol, name, quantity).await
    }

    pub async fn sell(&self, symbol: &str, quantity: u32) -> Result<TradeConfirmation, CoreError> {
        self.mutation_service.sell(symbol, quantity).await
    }

    pub async fn set_volatility_preference(
        &self,
        symbol: &str,
        threshold: f64,
    ) -> Result<PreferenceConfirmation, CoreError> {
        self.mutation_service
            .set_volatility_preference(symbol, threshold)
            .await
    }

    // ── Alerts & Recommendations ────────────────────────────────────

    pub async fn alert_table(&self) -> Result<Vec<AlertRow>, CoreError> {
        self.alert_service.load_table().await
    }

    pub async fn recommendation(&self, symbol: &str) -> Lookup<RiskAssessment> {
        self.alert_service.recommendation(symbol).await
    }

    pub fn invalidate_recommendation(&self, symbol: &str) -> bool {
        self.alert_service.invalidate(symbol)
    }

    // ── Lookups & Charts ────────────────────────────────────────────

    pub async fn latest_price(&self, symbol: &str) -> Result<Quote, CoreError> {
        self.api.latest_price(symbol.trim()).await
    }

    /// Autocomplete. A blank ticker returns no matches without a request.
    pub async fn search(&self, ticker: &str) -> Result<Vec<SearchMatch>, CoreError> {
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return Ok(Vec::new());
        }
        self.api.search(ticker).await
    }

    pub async fn company_info(&self, symbol: &str) -> Result<CompanyInfo, CoreError> {
        self.api.company_info(symbol.trim()).await
    }

    pub async fn holdings(&self) -> Result<HoldingsReport, CoreError> {
        self.api.holdings().await
    }

    /// Fetch the daily portfolio history and normalize it for charting.
    pub async fn portfolio_charts(&self) -> Result<PortfolioCharts, CoreError> {
        let records = self.api.daily_summaries().await?;
        Ok(self.chart_service.normalize(&records))
    }
}
