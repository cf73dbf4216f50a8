//! Response DTOs for pricing API endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::calculators::{CaratRate, CaratSummary, PriceBreakdown, Purity, PuritySource};
use super::services::{CaratLinePricing, CaratSummaryResult};

/// Money value for JSON responses
#[derive(Debug, Clone, Serialize)]
pub struct MoneyResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: String,
}

fn money(amount: Decimal, currency: &str) -> MoneyResponse {
    MoneyResponse {
        amount,
        currency: currency.to_string(),
    }
}

/// Itemized price, base-currency lines plus converted totals
#[derive(Debug, Serialize)]
pub struct PriceBreakdownResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub carat_value: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub purity_factor: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub purity_percentage: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub weight_grams: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub conversion_factor: Decimal,
    pub base_rate_per_gram: MoneyResponse,
    pub gold_value: MoneyResponse,
    pub making_charge: MoneyResponse,
    pub stone_price: MoneyResponse,
    pub labour_charge: MoneyResponse,
    pub total_excl_tax: MoneyResponse,
    pub tax: MoneyResponse,
    pub total_incl_tax: MoneyResponse,
    pub total_converted: MoneyResponse,
    pub stone_charge_converted: MoneyResponse,
    pub labour_charge_converted: MoneyResponse,
    pub currency: String,
}

impl From<&PriceBreakdown> for PriceBreakdownResponse {
    fn from(b: &PriceBreakdown) -> Self {
        let base = b.base_currency.as_str();
        let target = b.currency.as_str();
        Self {
            carat_value: b.carat_value,
            purity_factor: b.purity_factor,
            purity_percentage: b.purity_percentage,
            weight_grams: b.weight_grams,
            conversion_factor: b.conversion_factor,
            base_rate_per_gram: money(b.base_rate_per_gram, base),
            gold_value: money(b.gold_value, base),
            making_charge: money(b.making_charge, base),
            stone_price: money(b.stone_price, base),
            labour_charge: money(b.labour_charge, base),
            total_excl_tax: money(b.total_excl_tax, base),
            tax: money(b.tax, base),
            total_incl_tax: money(b.total_incl_tax, base),
            total_converted: money(b.total_converted, target),
            stone_charge_converted: money(b.stone_charge_converted, target),
            labour_charge_converted: money(b.labour_charge_converted, target),
            currency: b.currency.clone(),
        }
    }
}

/// Response for single item pricing
#[derive(Debug, Serialize)]
pub struct CalculatePriceResponse {
    pub breakdown: PriceBreakdownResponse,
    pub quoted_at: DateTime<Utc>,
}

/// One priced carat line of a catalog entry
#[derive(Debug, Serialize)]
pub struct CaratLinePricingResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub carat_value: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub weight_grams: Decimal,
    pub prices: Vec<PriceBreakdownResponse>,
}

impl From<&CaratLinePricing> for CaratLinePricingResponse {
    fn from(line: &CaratLinePricing) -> Self {
        Self {
            carat_value: line.carat_value,
            weight_grams: line.weight_grams,
            prices: line.prices.iter().map(PriceBreakdownResponse::from).collect(),
        }
    }
}

/// Response for catalog entry pricing
#[derive(Debug, Serialize)]
pub struct CatalogEntryPricingResponse {
    pub carats: Vec<CaratLinePricingResponse>,
    pub quoted_at: DateTime<Utc>,
}

/// One carat of a product summary
#[derive(Debug, Serialize)]
pub struct CaratSummaryLineResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub carat_value: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub purity_factor: Decimal,
    pub gold_value: MoneyResponse,
    pub total_excl_tax: MoneyResponse,
    pub tax: MoneyResponse,
    pub total: MoneyResponse,
}

impl CaratSummaryLineResponse {
    fn new(summary: &CaratSummary, currency: &str) -> Self {
        Self {
            carat_value: summary.carat_value,
            purity_factor: summary.purity_factor,
            gold_value: money(summary.gold_value, currency),
            total_excl_tax: money(summary.total_excl_tax, currency),
            tax: money(summary.tax, currency),
            total: money(summary.total, currency),
        }
    }
}

/// Response for a product carat summary
#[derive(Debug, Serialize)]
pub struct CaratSummaryResponse {
    pub base_rate_per_gram: MoneyResponse,
    #[serde(with = "rust_decimal::serde::str")]
    pub tax_rate: Decimal,
    pub carats: Vec<CaratSummaryLineResponse>,
    pub quoted_at: DateTime<Utc>,
}

impl CaratSummaryResponse {
    pub fn new(result: &CaratSummaryResult, quoted_at: DateTime<Utc>) -> Self {
        Self {
            base_rate_per_gram: money(result.base_rate_per_gram, &result.currency),
            tax_rate: result.tax_rate,
            carats: result
                .carats
                .iter()
                .map(|c| CaratSummaryLineResponse::new(c, &result.currency))
                .collect(),
            quoted_at,
        }
    }
}

/// Price per gram at one carat
#[derive(Debug, Serialize)]
pub struct CaratRateResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub carat_value: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub purity_factor: Decimal,
    pub price_per_gram: MoneyResponse,
}

/// Response for the carat rate table
#[derive(Debug, Serialize)]
pub struct CaratRatesResponse {
    pub base_rate_per_gram: MoneyResponse,
    pub rates: Vec<CaratRateResponse>,
    pub quoted_at: DateTime<Utc>,
}

impl CaratRatesResponse {
    pub fn new(base_rate: Decimal, rates: &[CaratRate], currency: &str, quoted_at: DateTime<Utc>) -> Self {
        Self {
            base_rate_per_gram: money(base_rate, currency),
            rates: rates
                .iter()
                .map(|r| CaratRateResponse {
                    carat_value: r.carat_value,
                    purity_factor: r.purity_factor,
                    price_per_gram: money(r.price_per_gram, currency),
                })
                .collect(),
            quoted_at,
        }
    }
}

/// Response for a purity lookup
#[derive(Debug, Serialize)]
pub struct PurityResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub carat_value: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub purity_factor: Decimal,
    pub source: &'static str,
}

impl PurityResponse {
    pub fn new(carat_value: Decimal, purity: Purity) -> Self {
        Self {
            carat_value,
            purity_factor: purity.factor,
            source: match purity.source {
                PuritySource::Tabulated => "tabulated",
                PuritySource::Linear => "linear",
                PuritySource::OutOfRange => "out_of_range",
            },
        }
    }
}

/// Generic pricing error response
#[derive(Debug, Serialize)]
pub struct PricingErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
