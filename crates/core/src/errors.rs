use thiserror::Error;

use crate::models::facet::Facet;

/// Unified error type for the entire portfolio-dashboard-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session ─────────────────────────────────────────────────────
    #[error("Not signed in — no session token available")]
    AuthenticationMissing,

    // ── API / Network ───────────────────────────────────────────────
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("No instrument selected")]
    NoSelection,

    #[error("Request superseded by a newer selection")]
    Superseded,

    #[error("Analytics partially unavailable: {} failed", format_facets(.failed))]
    PartialDataUnavailable { failed: Vec<Facet> },

    #[error("Lookup for {key} degraded: {reason}")]
    DegradedLookup { key: String, reason: String },
}

impl CoreError {
    /// Transport failures and non-2xx answers alike. These are the errors a
    /// single facet recovers from locally.
    #[must_use]
    pub fn is_network_failure(&self) -> bool {
        matches!(self, CoreError::Network(_) | CoreError::Api { .. })
    }
}

fn format_facets(facets: &[Facet]) -> String {
    facets
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Drop query strings from the echoed URL; search terms and symbols
        // travel there and do not belong in logs.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
