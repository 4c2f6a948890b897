use std::sync::Arc;
use tracing::debug;

use crate::cache::memo::{Lookup, MemoCache};
use crate::errors::CoreError;
use crate::gateway::traits::DashboardApi;
use crate::models::alert::AlertRow;
use crate::models::analytics::RiskAssessment;

/// Recommendation cache keyed by symbol.
pub type RecommendationCache = MemoCache<String, RiskAssessment>;

/// Builds a recommendation cache whose placeholder is
/// `RiskAssessment::unavailable`.
pub fn recommendation_cache(namespace: impl Into<String>) -> RecommendationCache {
    MemoCache::new(namespace, |symbol: &String| RiskAssessment::unavailable(symbol.as_str()))
}

/// The alert table: volatility alerts, each with the recommendation for its
/// symbol.
pub struct AlertService {
    api: Arc<dyn DashboardApi>,
    recommendations: Arc<RecommendationCache>,
}

impl AlertService {
    pub fn new(api: Arc<dyn DashboardApi>, recommendations: Arc<RecommendationCache>) -> Self {
        Self {
            api,
            recommendations,
        }
    }

    /// Fetch the alerts, then resolve one recommendation per distinct symbol
    /// through the cache. A symbol appearing on many rows costs one request,
    /// and symbols already cached cost none.
    ///
    /// Only a failure of the alert fetch itself is returned; a failed
    /// recommendation degrades that row's column.
    pub async fn load_table(&self) -> Result<Vec<AlertRow>, CoreError> {
        self.api.ensure_session()?;
        let alerts = self.api.alerts().await?;

        let api = Arc::clone(&self.api);
        let lookups = self
            .recommendations
            .resolve_many(alerts.iter().map(|a| a.symbol.clone()), move |symbol: String| {
                let api = Arc::clone(&api);
                async move { api.recommendation(&symbol).await }
            })
            .await;
        debug!(rows = alerts.len(), symbols = lookups.len(), "alert table resolved");

        Ok(alerts
            .into_iter()
            .map(|alert| {
                let recommendation = lookups.get(&alert.symbol).cloned().unwrap_or_else(|| {
                    Lookup::Degraded {
                        placeholder: RiskAssessment::unavailable(alert.symbol.as_str()),
                        key: alert.symbol.clone(),
                        reason: "recommendation not resolved".into(),
                    }
                });
                AlertRow {
                    alert,
                    recommendation,
                }
            })
            .collect())
    }

    /// Cached recommendation for one symbol.
    pub async fn recommendation(&self, symbol: &str) -> Lookup<RiskAssessment> {
        let api = Arc::clone(&self.api);
        self.recommendations
            .resolve(symbol.to_string(), move |symbol: String| async move {
                api.recommendation(&symbol).await
            })
            .await
    }

    /// Forget the cached recommendation for `symbol`.
    pub fn invalidate(&self, symbol: &str) -> bool {
        self.recommendations.invalidate(&symbol.to_string())
    }
}
