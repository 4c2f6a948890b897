// ═══════════════════════════════════════════════════════════════════
// Shared test helpers: in-memory DashboardApi with call recording
// ═══════════════════════════════════════════════════════════════════

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

use portfolio_dashboard_core::errors::CoreError;
use portfolio_dashboard_core::gateway::session::SessionToken;
use portfolio_dashboard_core::gateway::traits::DashboardApi;
use portfolio_dashboard_core::models::alert::VolatilityAlert;
use portfolio_dashboard_core::models::analytics::{
    DiversityEntry, DiversityReport, ProfitLossSummary, RiskAssessment, RiskSignal,
    VolatilityReading,
};
use portfolio_dashboard_core::models::instrument::{
    Candle, CompanyInfo, Interval, Quote, SearchMatch,
};
use portfolio_dashboard_core::models::summary::DailySummaryRecord;
use portfolio_dashboard_core::models::trade::{
    HoldingsReport, PreferenceConfirmation, PurchaseOrder, SaleOrder, TradeConfirmation,
    TransactionType, VolatilityPreference, VolatilityPreferenceUpdate,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn datetime(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
}

/// Deterministic per-symbol price so tests can tell instruments apart.
pub fn price_for(symbol: &str) -> Decimal {
    match symbol {
        "AAPL" => Decimal::new(18950, 2),
        "MSFT" => Decimal::new(41020, 2),
        "GOOG" => Decimal::new(15275, 2),
        "TSLA" => Decimal::new(24810, 2),
        _ => Decimal::new(100, 0),
    }
}

pub fn candle(time: NaiveDateTime, close: Decimal) -> Candle {
    Candle {
        time,
        open: close,
        high: close,
        low: close,
        close,
        volume: Decimal::new(1000, 0),
    }
}

/// A recorded backend call: endpoint name plus its argument (symbol, etc.).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub endpoint: &'static str,
    pub arg: String,
}

/// In-memory backend.
///
/// - Every call is recorded.
/// - `fail("risk_assessment")` makes that endpoint fail for every symbol;
///   `fail("recommendation:TSLA")` only for one argument.
/// - `close_gate()` makes calls that start afterwards wait until the
///   returned semaphore gets permits.
/// - With `session` set, `ensure_session` follows that token.
#[derive(Default)]
pub struct MockApi {
    calls: Mutex<Vec<Call>>,
    failing: Mutex<HashSet<String>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    session: Option<SessionToken>,
    pub daily: Mutex<Vec<DailySummaryRecord>>,
    pub alert_symbols: Mutex<Vec<String>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(token: SessionToken) -> Self {
        Self {
            session: Some(token),
            ..Self::default()
        }
    }

    pub fn fail(&self, endpoint: &str) {
        self.failing.lock().unwrap().insert(endpoint.to_string());
    }

    pub fn recover(&self, endpoint: &str) {
        self.failing.lock().unwrap().remove(endpoint);
    }

    /// Hold back every call that starts from now on.
    pub fn close_gate(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Stop gating new calls. Calls already waiting stay blocked until the
    /// returned semaphore gets permits.
    pub fn detach_gate(&self) -> Option<Arc<Semaphore>> {
        self.gate.lock().unwrap().take()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, endpoint: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.endpoint == endpoint)
            .count()
    }

    pub fn calls_with(&self, endpoint: &str, arg: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.endpoint == endpoint && c.arg == arg)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Poll until `n` calls have been recorded (or give up after ~1s).
    pub async fn wait_for_calls(&self, n: usize) {
        for _ in 0..200 {
            if self.total_calls() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("expected {n} calls, saw {}", self.total_calls());
    }

    async fn enter(&self, endpoint: &'static str, arg: &str) -> Result<(), CoreError> {
        self.calls.lock().unwrap().push(Call {
            endpoint,
            arg: arg.to_string(),
        });

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await.unwrap();
        }

        let failing = self.failing.lock().unwrap();
        if failing.contains(endpoint) || failing.contains(&format!("{endpoint}:{arg}")) {
            return Err(CoreError::Api {
                status: 500,
                message: format!("{endpoint} unavailable"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DashboardApi for MockApi {
    fn ensure_session(&self) -> Result<(), CoreError> {
        match &self.session {
            Some(token) if !token.is_present() => Err(CoreError::AuthenticationMissing),
            _ => Ok(()),
        }
    }

    async fn latest_price(&self, symbol: &str) -> Result<Quote, CoreError> {
        self.enter("latest_price", symbol).await?;
        Ok(Quote {
            symbol: symbol.to_string(),
            price: price_for(symbol),
        })
    }

    async fn daily_summaries(&self) -> Result<Vec<DailySummaryRecord>, CoreError> {
        self.enter("daily_summaries", "").await?;
        Ok(self.daily.lock().unwrap().clone())
    }

    async fn buy(&self, order: &PurchaseOrder) -> Result<TradeConfirmation, CoreError> {
        self.enter("buy", &order.symbol).await?;
        Ok(TradeConfirmation {
            message: "Stock purchased successfully".into(),
            stock_symbol: order.symbol.clone(),
            stock_quantity: order.quantity,
            transaction_type: TransactionType::Buy,
        })
    }

    async fn sell(&self, order: &SaleOrder) -> Result<TradeConfirmation, CoreError> {
        self.enter("sell", &order.symbol).await?;
        Ok(TradeConfirmation {
            message: "Stock sold successfully".into(),
            stock_symbol: order.symbol.clone(),
            stock_quantity: order.quantity,
            transaction_type: TransactionType::Sell,
        })
    }

    async fn search(&self, ticker: &str) -> Result<Vec<SearchMatch>, CoreError> {
        self.enter("search", ticker).await?;
        Ok(vec![SearchMatch {
            symbol: ticker.to_uppercase(),
            name: format!("{} Corp", ticker.to_uppercase()),
            instrument_type: Some("Equity".into()),
            region: Some("United States".into()),
            currency: Some("USD".into()),
            match_score: Some("1.0000".into()),
        }])
    }

    async fn company_info(&self, symbol: &str) -> Result<CompanyInfo, CoreError> {
        self.enter("company_info", symbol).await?;
        Ok(CompanyInfo {
            name: format!("{symbol} Inc."),
            sector: "Technology".into(),
            industry: "Software".into(),
            website: "https://example.com".into(),
            description: "N/A".into(),
        })
    }

    async fn alerts(&self) -> Result<Vec<VolatilityAlert>, CoreError> {
        self.enter("alerts", "").await?;
        let symbols = self.alert_symbols.lock().unwrap().clone();
        Ok(symbols
            .into_iter()
            .enumerate()
            .map(|(i, symbol)| VolatilityAlert {
                id: i as i64 + 1,
                message: format!("Volatility for {symbol} exceeded threshold"),
                symbol,
                created_at: Utc::now(),
                is_read: false,
                volatility_threshold: Some(0.2),
                alert_triggered: Some(true),
            })
            .collect())
    }

    async fn recommendation(&self, symbol: &str) -> Result<RiskAssessment, CoreError> {
        self.enter("recommendation", symbol).await?;
        Ok(assessment(symbol))
    }

    async fn time_series(
        &self,
        symbol: &str,
        interval: Interval,
    ) -> Result<Vec<Candle>, CoreError> {
        self.enter("time_series", &format!("{symbol}:{interval}")).await?;
        let close = price_for(symbol);
        // Deliberately out of order.
        Ok(vec![
            candle(datetime(2024, 3, 2, 16), close + Decimal::ONE),
            candle(datetime(2024, 3, 1, 16), close),
        ])
    }

    async fn holdings(&self) -> Result<HoldingsReport, CoreError> {
        self.enter("holdings", "").await?;
        Ok(HoldingsReport {
            username: Some("tester".into()),
            transactions: vec![],
        })
    }

    async fn profit_loss(&self, symbol: &str) -> Result<ProfitLossSummary, CoreError> {
        self.enter("profit_loss", symbol).await?;
        let price = price_for(symbol);
        Ok(ProfitLossSummary {
            symbol: symbol.to_string(),
            net_quantity: 10,
            current_price: price,
            average_buy_price: price - Decimal::TEN,
            profit_loss_percentage: Decimal::new(525, 2),
            market_value: price * Decimal::TEN,
            total_return: Decimal::new(100, 0),
        })
    }

    async fn portfolio_diversity(&self) -> Result<DiversityReport, CoreError> {
        self.enter("portfolio_diversity", "").await?;
        let entry = |symbol: &str, share: i64| DiversityEntry {
            symbol: symbol.to_string(),
            name: format!("{symbol} Inc."),
            net_quantity: 10,
            current_price: price_for(symbol),
            current_value: price_for(symbol) * Decimal::TEN,
            diversity_percentage: Decimal::new(share, 0),
        };
        Ok(DiversityReport {
            username: Some("tester".into()),
            total_portfolio_value: Decimal::new(10000, 0),
            portfolio: vec![entry("AAPL", 60), entry("MSFT", 30), entry("GOOG", 10)],
        })
    }

    async fn risk_assessment(&self, symbol: &str) -> Result<RiskAssessment, CoreError> {
        self.enter("risk_assessment", symbol).await?;
        Ok(assessment(symbol))
    }

    async fn set_volatility_preference(
        &self,
        update: &VolatilityPreferenceUpdate,
    ) -> Result<PreferenceConfirmation, CoreError> {
        self.enter("set_volatility_preference", &update.symbol).await?;
        Ok(PreferenceConfirmation {
            message: "Preference saved".into(),
            preference: VolatilityPreference {
                symbol: update.symbol.clone(),
                volatility_threshold: update.volatility_threshold,
                alert_triggered: false,
            },
        })
    }

    async fn volatility(&self, symbol: &str) -> Result<VolatilityReading, CoreError> {
        self.enter("volatility", symbol).await?;
        Ok(VolatilityReading {
            current_volatility: "23.41%".into(),
        })
    }
}

pub fn assessment(symbol: &str) -> RiskAssessment {
    RiskAssessment {
        symbol: symbol.to_string(),
        latest_close: Some(price_for(symbol)),
        ma20: Some(price_for(symbol) - Decimal::ONE),
        ma50: Some(price_for(symbol) - Decimal::TWO),
        recommendation: RiskSignal::Buy,
    }
}
