//! Pricing service functions with reference-data access.
//!
//! These functions validate caller input, pull the base rate and currencies
//! from a [`PricingContext`], and hand the assembled inputs to the pure
//! calculators. Nothing here caches the base rate.

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, warn};
use uuid::Uuid;

use super::calculators::{
    calculate_price, derive_carat_rates, purity_for, summarize_carats, CaratRate, CaratSummary,
    CurrencyRate, PriceBreakdown, PricingInput, PuritySource, PURE_CARAT,
};
use super::context::PricingContext;
use super::requests::{
    CalculatePriceRequest, CaratSummaryRequest, CatalogEntryPricingRequest,
};

/// Largest accepted weight, in grams
pub const MAX_WEIGHT_GRAMS: Decimal = dec!(1000000);

/// Largest accepted rate or flat charge
pub const MAX_AMOUNT: Decimal = dec!(1000000000);

/// Bounds for a non-zero conversion rate (zero means "reference unit")
pub const MIN_CONVERSION_RATE: Decimal = dec!(0.000001);
pub const MAX_CONVERSION_RATE: Decimal = dec!(1000000);

/// Pricing calculation error types
#[derive(Debug, Clone, thiserror::Error)]
pub enum PricingError {
    #[error("Invalid numeric input for {field}: {reason}")]
    InvalidNumericInput { field: String, reason: String },

    #[error("Unknown currency: {code}")]
    UnknownCurrency { code: String },

    #[error("No base metal rate available (metal type: {metal_type_id:?})")]
    MissingBaseRate { metal_type_id: Option<Uuid> },

    #[error("Reference data unavailable: {0}")]
    ReferenceData(String),
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> PricingError {
    PricingError::InvalidNumericInput {
        field: field.into(),
        reason: reason.into(),
    }
}

fn check_range(field: &str, value: Decimal, max: Decimal) -> Result<(), PricingError> {
    if value < Decimal::ZERO {
        return Err(invalid(field, format!("{} must not be negative", value)));
    }
    if value > max {
        return Err(invalid(field, format!("{} exceeds the maximum of {}", value, max)));
    }
    Ok(())
}

fn check_optional(field: &str, value: Option<Decimal>, max: Decimal) -> Result<(), PricingError> {
    value.map_or(Ok(()), |v| check_range(field, v, max))
}

fn check_carat(field: &str, carat_value: Decimal) -> Result<(), PricingError> {
    if carat_value <= Decimal::ZERO || carat_value > PURE_CARAT {
        return Err(invalid(
            field,
            format!("carat {} is outside (0, {}]", carat_value, PURE_CARAT),
        ));
    }
    Ok(())
}

fn check_currency(field: &str, currency: Option<&CurrencyRate>) -> Result<(), PricingError> {
    let Some(currency) = currency else {
        return Ok(());
    };
    let rate = currency.conversion_rate_to_inr;
    if rate.is_zero() {
        return Ok(());
    }
    if rate < MIN_CONVERSION_RATE || rate > MAX_CONVERSION_RATE {
        return Err(invalid(
            field,
            format!("conversion rate {} for {} is out of range", rate, currency.code),
        ));
    }
    Ok(())
}

/// Validate a fully assembled input before it reaches the calculator.
///
/// Everything that passes here is safe from Decimal overflow in
/// [`calculate_price`].
pub fn validate_input(input: &PricingInput) -> Result<(), PricingError> {
    check_range("weight_grams", input.weight_grams, MAX_WEIGHT_GRAMS)?;
    check_carat("carat_value", input.carat_value)?;
    check_range("base_rate_per_gram", input.base_rate_per_gram, MAX_AMOUNT)?;
    check_optional("making_charge", input.making_charge, MAX_AMOUNT)?;
    check_optional("stone_price", input.stone_price, MAX_AMOUNT)?;
    check_optional("labour_charge", input.labour_charge, MAX_AMOUNT)?;
    check_range("tax_rate", input.tax_rate, Decimal::ONE)?;
    check_currency("target_currency", input.target_currency.as_ref())?;
    check_currency("base_currency", input.base_currency.as_ref())?;
    Ok(())
}

/// Warn when a carat grade is not in the purity table. Returns whether it
/// warned.
///
/// Untabulated grades usually mean the catalog has drifted from the
/// hallmark set.
fn note_carat_drift(carat_value: Decimal) -> bool {
    let purity = purity_for(carat_value);
    let drifted = purity.source == PuritySource::Linear;
    if drifted {
        warn!(
            carat = %carat_value,
            purity = %purity.factor,
            "Carat grade not in purity table, using linear approximation"
        );
    }
    drifted
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Look up the currency a price should be shown in.
pub async fn resolve_target_currency<C: PricingContext + Sync>(
    ctx: &C,
    code: &str,
) -> Result<CurrencyRate, PricingError> {
    let code = normalize_code(code);
    if code.is_empty() {
        return Err(PricingError::UnknownCurrency { code });
    }

    ctx.currency(&code)
        .await?
        .map(|c| c.rate())
        .ok_or(PricingError::UnknownCurrency { code })
}

/// Look up the currency rates and charges are denominated in.
///
/// A base currency missing from the table is the reference unit.
pub async fn resolve_base_currency<C: PricingContext + Sync>(
    ctx: &C,
    code: &str,
) -> Result<CurrencyRate, PricingError> {
    let code = normalize_code(code);
    match ctx.currency(&code).await? {
        Some(currency) => Ok(currency.rate()),
        None => {
            debug!("Base currency {} not in currency table, treating as reference unit", code);
            Ok(CurrencyRate::new(code, Decimal::ONE))
        }
    }
}

async fn resolve_base_rate<C: PricingContext + Sync>(
    ctx: &C,
    override_rate: Option<Decimal>,
    metal_type_id: Option<Uuid>,
) -> Result<Decimal, PricingError> {
    match override_rate {
        Some(rate) => Ok(rate),
        None => ctx.base_rate(metal_type_id).await,
    }
}

/// Price a single item.
///
/// Request fields are checked before any reference data is read.
pub async fn calculate_item_price<C: PricingContext + Sync>(
    ctx: &C,
    base_currency_code: &str,
    request: &CalculatePriceRequest,
) -> Result<PriceBreakdown, PricingError> {
    let mut input = PricingInput {
        weight_grams: request.weight_grams,
        carat_value: request.carat_value,
        base_rate_per_gram: request.base_rate_per_gram.unwrap_or_default(),
        making_charge: request.making_charge,
        stone_price: request.stone_price,
        labour_charge: request.labour_charge,
        target_currency: None,
        base_currency: None,
        tax_rate: request.tax_rate.unwrap_or_default(),
    };
    validate_input(&input)?;

    input.base_rate_per_gram =
        resolve_base_rate(ctx, request.base_rate_per_gram, request.metal_type_id).await?;
    input.base_currency = Some(resolve_base_currency(ctx, base_currency_code).await?);
    input.target_currency = Some(resolve_target_currency(ctx, &request.currency).await?);
    validate_input(&input)?;

    note_carat_drift(input.carat_value);
    Ok(calculate_price(&input))
}

/// Priced carat line of a catalog entry
#[derive(Debug, Clone)]
pub struct CaratLinePricing {
    pub carat_value: Decimal,
    pub weight_grams: Decimal,
    pub prices: Vec<PriceBreakdown>,
}

/// Price every carat line and currency row of a catalog entry.
///
/// The base rate and base currency are read once for the whole entry.
pub async fn price_catalog_entry<C: PricingContext + Sync>(
    ctx: &C,
    base_currency_code: &str,
    request: &CatalogEntryPricingRequest,
) -> Result<Vec<CaratLinePricing>, PricingError> {
    check_optional("weight_grams", request.weight_grams, MAX_WEIGHT_GRAMS)?;
    for (i, line) in request.carats.iter().enumerate() {
        check_carat(&format!("carats[{}].carat_value", i), line.carat_value)?;
        check_optional(&format!("carats[{}].weight_grams", i), line.weight_grams, MAX_WEIGHT_GRAMS)?;
        check_optional(&format!("carats[{}].making_charge", i), line.making_charge, MAX_AMOUNT)?;
        check_optional(&format!("carats[{}].stone_price", i), line.stone_price, MAX_AMOUNT)?;
        for (j, row) in line.prices.iter().enumerate() {
            check_optional(
                &format!("carats[{}].prices[{}].labour_charge", i, j),
                row.labour_charge,
                MAX_AMOUNT,
            )?;
        }
    }

    if request.carats.is_empty() {
        return Ok(Vec::new());
    }

    let base_rate = resolve_base_rate(ctx, request.base_rate_per_gram, request.metal_type_id).await?;
    let base_currency = resolve_base_currency(ctx, base_currency_code).await?;
    let mut targets: HashMap<String, CurrencyRate> = HashMap::new();

    let mut lines = Vec::with_capacity(request.carats.len());
    for line in &request.carats {
        let weight_grams = line
            .weight_grams
            .or(request.weight_grams)
            .unwrap_or_default();
        note_carat_drift(line.carat_value);

        let mut prices = Vec::with_capacity(line.prices.len());
        for row in &line.prices {
            let code = normalize_code(&row.currency);
            let target = match targets.get(&code) {
                Some(rate) => rate.clone(),
                None => {
                    let rate = resolve_target_currency(ctx, &code).await?;
                    targets.insert(code, rate.clone());
                    rate
                }
            };

            let input = PricingInput {
                weight_grams,
                carat_value: line.carat_value,
                base_rate_per_gram: base_rate,
                making_charge: line.making_charge,
                stone_price: line.stone_price,
                labour_charge: row.labour_charge,
                target_currency: Some(target),
                base_currency: Some(base_currency.clone()),
                tax_rate: Decimal::ZERO,
            };
            validate_input(&input)?;
            prices.push(calculate_price(&input));
        }

        lines.push(CaratLinePricing {
            carat_value: line.carat_value,
            weight_grams,
            prices,
        });
    }

    Ok(lines)
}

/// Result of a product carat summary
#[derive(Debug, Clone)]
pub struct CaratSummaryResult {
    pub base_rate_per_gram: Decimal,
    pub tax_rate: Decimal,
    pub currency: String,
    pub carats: Vec<CaratSummary>,
}

/// Summarize a product at each of its carats, with tax.
///
/// `tax_rate` comes from configuration; this is the only path that taxes by
/// default.
pub async fn summarize_product<C: PricingContext + Sync>(
    ctx: &C,
    base_currency_code: &str,
    tax_rate: Decimal,
    request: &CaratSummaryRequest,
) -> Result<CaratSummaryResult, PricingError> {
    check_range("weight_grams", request.weight_grams, MAX_WEIGHT_GRAMS)?;
    check_optional("base_rate_per_gram", request.base_rate_per_gram, MAX_AMOUNT)?;
    check_range("tax_rate", tax_rate, Decimal::ONE)?;
    let carat_values = request.carat_values.as_deref();
    for (i, carat) in carat_values.unwrap_or_default().iter().enumerate() {
        // zero is accepted here and read as 24
        if !carat.is_zero() {
            check_carat(&format!("carat_values[{}]", i), *carat)?;
        }
    }

    let base_rate = resolve_base_rate(ctx, request.base_rate_per_gram, request.metal_type_id).await?;
    check_range("base_rate_per_gram", base_rate, MAX_AMOUNT)?;
    for carat in carat_values.unwrap_or_default() {
        note_carat_drift(*carat);
    }

    Ok(CaratSummaryResult {
        base_rate_per_gram: base_rate,
        tax_rate,
        currency: normalize_code(base_currency_code),
        carats: summarize_carats(request.weight_grams, base_rate, carat_values, tax_rate),
    })
}

/// Per-carat rates derived from the current base rate.
pub async fn carat_rate_table<C: PricingContext + Sync>(
    ctx: &C,
    metal_type_id: Option<Uuid>,
    carat_values: &[Decimal],
) -> Result<(Decimal, Vec<CaratRate>), PricingError> {
    for (i, carat) in carat_values.iter().enumerate() {
        check_carat(&format!("carats[{}]", i), *carat)?;
    }

    let base_rate = ctx.base_rate(metal_type_id).await?;
    check_range("base_rate_per_gram", base_rate, MAX_AMOUNT)?;

    Ok((base_rate, derive_carat_rates(base_rate, carat_values)))
}
