// ═══════════════════════════════════════════════════════════════════
// Error Tests: CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use portfolio_dashboard_core::errors::CoreError;
use portfolio_dashboard_core::models::facet::Facet;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn authentication_missing() {
        assert_eq!(
            CoreError::AuthenticationMissing.to_string(),
            "Not signed in — no session token available"
        );
    }

    #[test]
    fn network() {
        let err = CoreError::Network("connection refused".into());
        assert_eq!(err.to_string(), "Network error: connection refused");
    }

    #[test]
    fn api() {
        let err = CoreError::Api {
            status: 422,
            message: "Quantity must be positive".into(),
        };
        assert_eq!(err.to_string(), "API error (HTTP 422): Quantity must be positive");
    }

    #[test]
    fn deserialization() {
        let err = CoreError::Deserialization("missing field `price`".into());
        assert_eq!(err.to_string(), "Deserialization error: missing field `price`");
    }

    #[test]
    fn validation() {
        let err = CoreError::ValidationError("Quantity must be a positive whole number".into());
        assert_eq!(
            err.to_string(),
            "Validation failed: Quantity must be a positive whole number"
        );
    }

    #[test]
    fn no_selection() {
        assert_eq!(CoreError::NoSelection.to_string(), "No instrument selected");
    }

    #[test]
    fn superseded() {
        assert_eq!(
            CoreError::Superseded.to_string(),
            "Request superseded by a newer selection"
        );
    }

    #[test]
    fn partial_data_lists_facets() {
        let err = CoreError::PartialDataUnavailable {
            failed: vec![Facet::Risk, Facet::Volatility],
        };
        assert_eq!(
            err.to_string(),
            "Analytics partially unavailable: risk assessment, volatility failed"
        );
    }

    #[test]
    fn degraded_lookup() {
        let err = CoreError::DegradedLookup {
            key: "TSLA".into(),
            reason: "API error (HTTP 500): boom".into(),
        };
        assert_eq!(
            err.to_string(),
            "Lookup for TSLA degraded: API error (HTTP 500): boom"
        );
    }
}

// ── Classification ──────────────────────────────────────────────────

mod classification {
    use super::*;

    #[test]
    fn network_and_api_are_network_failures() {
        assert!(CoreError::Network("x".into()).is_network_failure());
        assert!(CoreError::Api {
            status: 500,
            message: "x".into()
        }
        .is_network_failure());
    }

    #[test]
    fn other_variants_are_not() {
        assert!(!CoreError::AuthenticationMissing.is_network_failure());
        assert!(!CoreError::NoSelection.is_network_failure());
        assert!(!CoreError::Superseded.is_network_failure());
        assert!(!CoreError::Deserialization("x".into()).is_network_failure());
        assert!(!CoreError::ValidationError("x".into()).is_network_failure());
    }
}

// ── From impls ──────────────────────────────────────────────────────

mod from_impls {
    use super::*;

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn question_mark_converts_serde_error() {
        fn parse() -> Result<serde_json::Value, CoreError> {
            Ok(serde_json::from_str("[1, 2")?)
        }
        assert!(matches!(parse(), Err(CoreError::Deserialization(_))));
    }
}

// ── Error is std::error::Error ──────────────────────────────────────

mod std_error {
    use super::*;

    #[test]
    fn implements_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(CoreError::NoSelection);
        assert_eq!(err.to_string(), "No instrument selected");
    }

    #[test]
    fn is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CoreError>();
    }
}
