//! Database models for pricing reference data.
//!
//! These models use sqlx's FromRow derive for direct database deserialization.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::calculators::CurrencyRate;

/// Currency from currencies
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Currency {
    pub id: Uuid,
    pub code: String,
    pub conversion_rate_to_inr: Decimal,
}

impl Currency {
    /// Rate view used by the calculator
    pub fn rate(&self) -> CurrencyRate {
        CurrencyRate::new(self.code.clone(), self.conversion_rate_to_inr)
    }
}

/// Metal rate from gold_prices
#[derive(Debug, Clone, FromRow)]
pub struct GoldPrice {
    pub id: Uuid,
    pub base_carat: i32,
    pub price_per_gram: Decimal,
    pub updated_at: DateTime<Utc>,
}

/// MetalType from metal_types
#[derive(Debug, Clone, FromRow)]
pub struct MetalType {
    pub id: Uuid,
    pub name: String,
    pub base_rate_per_gram: Option<Decimal>,
}
