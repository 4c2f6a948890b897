use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

use super::instrument::Interval;

/// Runtime configuration of a dashboard session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root of the backend REST API, e.g. `http://localhost:8000/api`.
    pub api_base_url: String,

    /// Per-request timeout for the HTTP gateway. A timeout surfaces as a
    /// failed facet, never as a panic.
    pub request_timeout_secs: u64,

    /// Interval used for the time-series facet when a symbol is selected.
    pub default_interval: Interval,

    /// Label of the recommendation cache, used in log output.
    pub recommendation_namespace: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            request_timeout_secs: 5,
            default_interval: Interval::OneDay,
            recommendation_namespace: "recommendation-by-symbol".to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CoreError::ValidationError(format!(
                "api_base_url '{url}' must be an http(s) URL"
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::ValidationError(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
