use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::errors::CoreError;
use crate::models::alert::VolatilityAlert;
use crate::models::analytics::{
    DiversityReport, ProfitLossSummary, RiskAssessment, VolatilityReading,
};
use crate::models::instrument::{
    Candle, CompanyInfo, Interval, Quote, SearchMatch, SearchResponse, TimeSeriesResponse,
};
use crate::models::settings::Settings;
use crate::models::summary::{DailySummaryRecord, DailySummaryResponse};
use crate::models::trade::{
    HoldingsReport, PreferenceConfirmation, PurchaseOrder, SaleOrder, TradeConfirmation,
    VolatilityPreferenceUpdate,
};

use super::session::SessionToken;
use super::traits::DashboardApi;

/// Longest backend error body echoed into a `CoreError::Api` message.
const MAX_ERROR_BODY: usize = 200;

/// reqwest-backed client for the dashboard REST API.
///
/// - Every request carries `Authorization: Token <token>`.
/// - Without a token, requests fail with `AuthenticationMissing` before
///   anything is sent.
/// - Non-2xx answers become `CoreError::Api` carrying the backend's
///   `error`/`message` text.
///
/// Symbols travel as single percent-encoded path segments, so `BRK/B` or
/// `A#B` can never address another instrument's resource.
pub struct HttpGateway {
    client: Client,
    base_url: String,
    root: Url,
    token: SessionToken,
}

impl HttpGateway {
    pub fn new(settings: &Settings, token: SessionToken) -> Result<Self, CoreError> {
        settings.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        let base_url = settings.api_base_url.trim().trim_end_matches('/').to_string();
        let root = Url::parse(&base_url)
            .map_err(|e| CoreError::ValidationError(format!("api_base_url '{base_url}': {e}")))?;
        if root.cannot_be_a_base() {
            return Err(CoreError::ValidationError(format!(
                "api_base_url '{base_url}' cannot carry a path"
            )));
        }
        Ok(Self {
            client,
            base_url,
            root,
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorization(&self) -> Result<String, CoreError> {
        self.token
            .get()
            .map(|t| format!("Token {t}"))
            .ok_or(CoreError::AuthenticationMissing)
    }

    /// Append `segments` to the base URL, percent-encoding each one. An empty
    /// last segment yields the trailing slash some routes require.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.root.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<T, CoreError> {
        let auth = self.authorization()?;
        let url = self.endpoint(segments);
        let path = url.path().to_string();
        debug!(method = "GET", %path, "backend request");
        let resp = self
            .client
            .get(url)
            .query(query)
            .header(AUTHORIZATION, auth)
            .send()
            .await?;
        Self::decode(&path, resp).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, CoreError> {
        let auth = self.authorization()?;
        let url = self.endpoint(segments);
        let path = url.path().to_string();
        debug!(method = "POST", %path, "backend request");
        let resp = self
            .client
            .post(url)
            .header(AUTHORIZATION, auth)
            .json(body)
            .send()
            .await?;
        Self::decode(&path, resp).await
    }

    async fn decode<T: DeserializeOwned>(path: &str, resp: Response) -> Result<T, CoreError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            warn!(path, status = status.as_u16(), %message, "backend rejected request");
            return Err(CoreError::Api {
                status: status.as_u16(),
                message,
            });
        }
        resp.json::<T>()
            .await
            .map_err(|e| CoreError::Deserialization(format!("Unexpected payload from {path}: {e}")))
    }
}

/// Pull a human-readable message out of an error body: the `error` or
/// `message` field of a JSON object, else the (truncated) raw text.
fn error_message(body: &str) -> Option<String> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["error", "message", "detail"] {
            if let Some(text) = value.get(field).and_then(|v| v.as_str()) {
                return Some(text.to_string());
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(MAX_ERROR_BODY).collect())
    }
}

#[async_trait]
impl DashboardApi for HttpGateway {
    fn ensure_session(&self) -> Result<(), CoreError> {
        self.authorization().map(|_| ())
    }

    async fn latest_price(&self, symbol: &str) -> Result<Quote, CoreError> {
        self.get_json(&["price", symbol, ""], &[]).await
    }

    async fn daily_summaries(&self) -> Result<Vec<DailySummaryRecord>, CoreError> {
        let resp: DailySummaryResponse = self.get_json(&["portfolio-daily"], &[]).await?;
        Ok(resp.daily_summary)
    }

    async fn buy(&self, order: &PurchaseOrder) -> Result<TradeConfirmation, CoreError> {
        self.post_json(&["purchase", ""], order).await
    }

    async fn sell(&self, order: &SaleOrder) -> Result<TradeConfirmation, CoreError> {
        self.post_json(&["sell", ""], order).await
    }

    async fn search(&self, ticker: &str) -> Result<Vec<SearchMatch>, CoreError> {
        let resp: SearchResponse = self.get_json(&["search", ""], &[("ticker", ticker)]).await?;
        Ok(resp.best_matches)
    }

    async fn company_info(&self, symbol: &str) -> Result<CompanyInfo, CoreError> {
        self.get_json(&["get-company-info", symbol, ""], &[]).await
    }

    async fn alerts(&self) -> Result<Vec<VolatilityAlert>, CoreError> {
        self.get_json(&["alerts", ""], &[]).await
    }

    async fn recommendation(&self, symbol: &str) -> Result<RiskAssessment, CoreError> {
        self.get_json(&["risk"], &[("symbol", symbol)]).await
    }

    async fn time_series(
        &self,
        symbol: &str,
        interval: Interval,
    ) -> Result<Vec<Candle>, CoreError> {
        let segments = ["time_series", symbol, interval.as_str(), ""];
        let resp: TimeSeriesResponse = self.get_json(&segments, &[]).await?;
        Ok(resp.time_series)
    }

    async fn holdings(&self) -> Result<HoldingsReport, CoreError> {
        self.get_json(&["user-holding", ""], &[]).await
    }

    async fn profit_loss(&self, symbol: &str) -> Result<ProfitLossSummary, CoreError> {
        self.get_json(&["profit_loss_percentage", symbol, ""], &[])
            .await
    }

    async fn portfolio_diversity(&self) -> Result<DiversityReport, CoreError> {
        self.get_json(&["portfolio_diversity", ""], &[]).await
    }

    async fn risk_assessment(&self, symbol: &str) -> Result<RiskAssessment, CoreError> {
        self.get_json(&["risk", ""], &[("symbol", symbol)]).await
    }

    async fn set_volatility_preference(
        &self,
        update: &VolatilityPreferenceUpdate,
    ) -> Result<PreferenceConfirmation, CoreError> {
        self.post_json(&["user-preferences", ""], update).await
    }

    async fn volatility(&self, symbol: &str) -> Result<VolatilityReading, CoreError> {
        self.get_json(&["check-volatility", symbol], &[]).await
    }
}
