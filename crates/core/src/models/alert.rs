use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::memo::Lookup;

use super::analytics::RiskAssessment;

/// A volatility alert merged with the user's threshold for that symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityAlert {
    pub id: i64,
    pub symbol: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub volatility_threshold: Option<f64>,
    #[serde(default)]
    pub alert_triggered: Option<bool>,
}

/// An alert-table row: the alert plus the recommendation for its symbol.
#[derive(Debug, Clone)]
pub struct AlertRow {
    pub alert: VolatilityAlert,
    pub recommendation: Lookup<RiskAssessment>,
}

impl AlertRow {
    /// Text for the recommendation column.
    pub fn recommendation_label(&self) -> String {
        self.recommendation.value().recommendation.to_string()
    }
}
