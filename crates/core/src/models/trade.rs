use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Body of `POST /purchase/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub symbol: String,
    pub name: String,
    pub quantity: u32,
}

/// Body of `POST /sell/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleOrder {
    pub symbol: String,
    pub quantity: u32,
}

impl PurchaseOrder {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        quantity: u32,
    ) -> Result<Self, CoreError> {
        let symbol = validate_symbol(symbol.into())?;
        validate_quantity(quantity)?;
        Ok(Self {
            symbol,
            name: name.into(),
            quantity,
        })
    }
}

impl SaleOrder {
    pub fn new(symbol: impl Into<String>, quantity: u32) -> Result<Self, CoreError> {
        let symbol = validate_symbol(symbol.into())?;
        validate_quantity(quantity)?;
        Ok(Self { symbol, quantity })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Buy,
    Sell,
}

/// Backend acknowledgement of a buy or sell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeConfirmation {
    pub message: String,
    pub stock_symbol: String,
    pub stock_quantity: u32,
    pub transaction_type: TransactionType,
}

/// Body of `POST /user-preferences/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityPreferenceUpdate {
    pub symbol: String,
    pub volatility_threshold: f64,
}

impl VolatilityPreferenceUpdate {
    /// `threshold` must be a finite value in `[0, 1]`.
    pub fn new(symbol: impl Into<String>, threshold: f64) -> Result<Self, CoreError> {
        let symbol = validate_symbol(symbol.into())?;
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(CoreError::ValidationError(format!(
                "Volatility threshold {threshold} must be between 0 and 1"
            )));
        }
        Ok(Self {
            symbol,
            volatility_threshold: threshold,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityPreference {
    pub symbol: String,
    pub volatility_threshold: f64,
    #[serde(default)]
    pub alert_triggered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceConfirmation {
    pub message: String,
    pub preference: VolatilityPreference,
}

/// Current positions (`/user-holding/`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingsReport {
    #[serde(default)]
    pub username: Option<String>,
    pub transactions: Vec<Holding>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub stock_symbol: String,
    pub stock_name: String,
    pub stock_quantity: u32,
    pub portfolio_value: Decimal,
    #[serde(default)]
    pub stock_price: Option<Decimal>,
}

pub(crate) fn validate_symbol(symbol: String) -> Result<String, CoreError> {
    let trimmed = symbol.trim();
    if trimmed.is_empty() {
        return Err(CoreError::ValidationError(
            "Instrument symbol must not be empty".into(),
        ));
    }
    Ok(trimmed.to_string())
}

fn validate_quantity(quantity: u32) -> Result<(), CoreError> {
    if quantity == 0 {
        return Err(CoreError::ValidationError(
            "Quantity must be a positive whole number".into(),
        ));
    }
    Ok(())
}
