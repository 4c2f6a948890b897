use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::alert::VolatilityAlert;
use crate::models::analytics::{
    DiversityReport, ProfitLossSummary, RiskAssessment, VolatilityReading,
};
use crate::models::instrument::{Candle, CompanyInfo, Interval, Quote, SearchMatch};
use crate::models::summary::DailySummaryRecord;
use crate::models::trade::{
    HoldingsReport, PreferenceConfirmation, PurchaseOrder, SaleOrder, TradeConfirmation,
    VolatilityPreferenceUpdate,
};

/// Typed access to the dashboard backend.
///
/// `HttpGateway` is the production implementation; the services only ever
/// see this trait, so tests swap in an in-memory backend.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Fails with `AuthenticationMissing` when no session token is present.
    /// Callers check this before starting a batch of requests.
    fn ensure_session(&self) -> Result<(), CoreError> {
        Ok(())
    }

    /// `GET /price/{symbol}/`
    async fn latest_price(&self, symbol: &str) -> Result<Quote, CoreError>;

    /// `GET /portfolio-daily`
    async fn daily_summaries(&self) -> Result<Vec<DailySummaryRecord>, CoreError>;

    /// `POST /purchase/`
    async fn buy(&self, order: &PurchaseOrder) -> Result<TradeConfirmation, CoreError>;

    /// `POST /sell/`
    async fn sell(&self, order: &SaleOrder) -> Result<TradeConfirmation, CoreError>;

    /// `GET /search/?ticker=`
    async fn search(&self, ticker: &str) -> Result<Vec<SearchMatch>, CoreError>;

    /// `GET /get-company-info/{symbol}/`
    async fn company_info(&self, symbol: &str) -> Result<CompanyInfo, CoreError>;

    /// `GET /alerts/`
    async fn alerts(&self) -> Result<Vec<VolatilityAlert>, CoreError>;

    /// `GET /risk?symbol=`, the recommendation payload behind the alert table.
    async fn recommendation(&self, symbol: &str) -> Result<RiskAssessment, CoreError>;

    /// `GET /time_series/{symbol}/{interval}/`
    async fn time_series(&self, symbol: &str, interval: Interval)
        -> Result<Vec<Candle>, CoreError>;

    /// `GET /user-holding/`
    async fn holdings(&self) -> Result<HoldingsReport, CoreError>;

    /// `GET /profit_loss_percentage/{symbol}/`
    async fn profit_loss(&self, symbol: &str) -> Result<ProfitLossSummary, CoreError>;

    /// `GET /portfolio_diversity/`
    async fn portfolio_diversity(&self) -> Result<DiversityReport, CoreError>;

    /// `GET /risk/?symbol=`
    async fn risk_assessment(&self, symbol: &str) -> Result<RiskAssessment, CoreError>;

    /// `POST /user-preferences/`
    async fn set_volatility_preference(
        &self,
        update: &VolatilityPreferenceUpdate,
    ) -> Result<PreferenceConfirmation, CoreError>;

    /// `GET /check-volatility/{symbol}`
    async fn volatility(&self, symbol: &str) -> Result<VolatilityReading, CoreError>;
}
