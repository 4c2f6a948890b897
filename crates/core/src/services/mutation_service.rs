use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::errors::CoreError;
use crate::gateway::traits::DashboardApi;
use crate::models::facet::Facet;
use crate::models::trade::{
    PreferenceConfirmation, PurchaseOrder, SaleOrder, TradeConfirmation,
    VolatilityPreferenceUpdate,
};
use crate::services::analytics_orchestrator::AnalyticsOrchestrator;

/// Facets that depend on position size. Time series and risk do not.
const POSITION_FACETS: [Facet; 2] = [Facet::ProfitLoss, Facet::Diversity];

/// Buy, sell and volatility-preference updates.
///
/// Each mutation is one request. No holdings are updated locally: on
/// success the affected analytics facets are re-fetched from the backend;
/// on failure the error is returned and nothing is refreshed.
pub struct MutationService {
    api: Arc<dyn DashboardApi>,
    orchestrator: AnalyticsOrchestrator,
}

impl MutationService {
    pub fn new(api: Arc<dyn DashboardApi>, orchestrator: AnalyticsOrchestrator) -> Self {
        Self { api, orchestrator }
    }

    pub async fn buy(
        &self,
        symbol: &str,
        name: &str,
        quantity: u32,
    ) -> Result<TradeConfirmation, CoreError> {
        let order = PurchaseOrder::new(symbol, name, quantity)?;
        let confirmation = self.api.buy(&order).await.map_err(|e| {
            warn!(symbol = %order.symbol, quantity, error = %e, "purchase rejected, refresh skipped");
            e
        })?;
        info!(symbol = %order.symbol, quantity, "purchase confirmed");

        self.cascade(&POSITION_FACETS).await;
        Ok(confirmation)
    }

    pub async fn sell(&self, symbol: &str, quantity: u32) -> Result<TradeConfirmation, CoreError> {
        let order = SaleOrder::new(symbol, quantity)?;
        let confirmation = self.api.sell(&order).await.map_err(|e| {
            warn!(symbol = %order.symbol, quantity, error = %e, "sale rejected, refresh skipped");
            e
        })?;
        info!(symbol = %order.symbol, quantity, "sale confirmed");

        self.cascade(&POSITION_FACETS).await;
        Ok(confirmation)
    }

    /// Store the alert threshold for `symbol`. If that symbol is the one
    /// being viewed, its volatility facet is refreshed along with the
    /// position facets.
    pub async fn set_volatility_preference(
        &self,
        symbol: &str,
        threshold: f64,
    ) -> Result<PreferenceConfirmation, CoreError> {
        let update = VolatilityPreferenceUpdate::new(symbol, threshold)?;
        let confirmation = self
            .api
            .set_volatility_preference(&update)
            .await
            .map_err(|e| {
                warn!(symbol = %update.symbol, threshold, error = %e, "preference update rejected, refresh skipped");
                e
            })?;
        info!(symbol = %update.symbol, threshold, "volatility preference saved");

        let mut facets = POSITION_FACETS.to_vec();
        if self.orchestrator.selected_symbol().as_deref() == Some(update.symbol.as_str()) {
            facets.push(Facet::Volatility);
        }
        self.cascade(&facets).await;
        Ok(confirmation)
    }

    /// The mutation already succeeded, so refresh problems are logged
    /// rather than returned; facet failures show up in the view.
    async fn cascade(&self, facets: &[Facet]) {
        if self.orchestrator.selected_symbol().is_none() {
            debug!("no instrument selected, nothing to refresh");
            return;
        }
        if let Err(e) = self.orchestrator.refresh(facets).await {
            warn!(error = %e, "refresh after mutation did not run");
        }
    }
}
