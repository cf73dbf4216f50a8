//! Request DTOs for pricing API endpoints.
//!
//! Every decimal is sent as a JSON string (`"10.5"`); bare JSON numbers are
//! rejected so no value passes through a float.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer};
use uuid::Uuid;

/// Request to price a single item
#[derive(Debug, Deserialize)]
pub struct CalculatePriceRequest {
    #[serde(with = "rust_decimal::serde::str")]
    pub weight_grams: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub carat_value: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub making_charge: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub stone_price: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub labour_charge: Option<Decimal>,
    /// Target currency code; required, no implicit default
    pub currency: String,
    #[serde(default)]
    pub metal_type_id: Option<Uuid>,
    /// Use this rate instead of the current stored one
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub base_rate_per_gram: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub tax_rate: Option<Decimal>,
}

/// Request to price a whole catalog entry
#[derive(Debug, Deserialize)]
pub struct CatalogEntryPricingRequest {
    #[serde(default)]
    pub metal_type_id: Option<Uuid>,
    /// Entry weight, used by carat lines without their own
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub weight_grams: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub base_rate_per_gram: Option<Decimal>,
    pub carats: Vec<CaratLineRequest>,
}

/// A carat line in the catalog entry request
#[derive(Debug, Deserialize)]
pub struct CaratLineRequest {
    #[serde(with = "rust_decimal::serde::str")]
    pub carat_value: Decimal,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub weight_grams: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub making_charge: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub stone_price: Option<Decimal>,
    pub prices: Vec<PriceRowRequest>,
}

/// A currency price row of a carat line
#[derive(Debug, Deserialize)]
pub struct PriceRowRequest {
    pub currency: String,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub labour_charge: Option<Decimal>,
}

/// Request to summarize a product across its carats
#[derive(Debug, Deserialize)]
pub struct CaratSummaryRequest {
    #[serde(with = "rust_decimal::serde::str")]
    pub weight_grams: Decimal,
    /// Absent means pure metal only; an empty list yields no rows
    #[serde(default, deserialize_with = "str_decimal_list")]
    pub carat_values: Option<Vec<Decimal>>,
    #[serde(default)]
    pub metal_type_id: Option<Uuid>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub base_rate_per_gram: Option<Decimal>,
}

/// Query parameters for the carat rate table
#[derive(Debug, Default, Deserialize)]
pub struct CaratRatesQuery {
    #[serde(default)]
    pub metal_type_id: Option<Uuid>,
    /// Comma-separated carat grades, e.g. `24,22,20`
    #[serde(default)]
    pub carats: Option<String>,
}

/// Optional list of decimal strings, e.g. `["22", "18"]`
fn str_decimal_list<'de, D>(deserializer: D) -> Result<Option<Vec<Decimal>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<String>> = Option::deserialize(deserializer)?;
    raw.map(|values| {
        values
            .iter()
            .map(|value| Decimal::from_str(value.trim()).map_err(de::Error::custom))
            .collect()
    })
    .transpose()
}
