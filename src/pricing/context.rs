//! Reference data providers for pricing.
//!
//! All access to the base metal rate and the currency table goes through
//! [`PricingContext`], so services never reach for a fallback literal.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::cache::AppCache;
use crate::error::AppError;

use super::models::Currency;
use super::queries;
use super::services::PricingError;

/// Source of the reference data a price calculation needs.
pub trait PricingContext {
    /// Current 24-carat-equivalent rate per gram, in the base currency.
    ///
    /// `metal_type_id` selects the metal type's own rate when no current
    /// gold price exists.
    fn base_rate(
        &self,
        metal_type_id: Option<Uuid>,
    ) -> impl Future<Output = Result<Decimal, PricingError>> + Send;

    /// Currency by upper-case code, `None` if the table has no such code.
    fn currency(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<Option<Currency>, PricingError>> + Send;
}

fn reference_data(err: AppError) -> PricingError {
    error!("Reference data lookup failed: {}", err);
    PricingError::ReferenceData(err.to_string())
}

/// Postgres-backed context. Currencies go through the app cache; the base
/// rate is read fresh on every call.
#[derive(Clone, Copy)]
pub struct DbContext<'a> {
    pool: &'a PgPool,
    cache: &'a AppCache,
}

impl<'a> DbContext<'a> {
    pub fn new(pool: &'a PgPool, cache: &'a AppCache) -> Self {
        Self { pool, cache }
    }
}

impl PricingContext for DbContext<'_> {
    async fn base_rate(&self, metal_type_id: Option<Uuid>) -> Result<Decimal, PricingError> {
        let gold_price = queries::find_base_gold_price(self.pool)
            .await
            .map_err(reference_data)?
            .filter(|price| price.price_per_gram > Decimal::ZERO);

        if let Some(price) = gold_price {
            debug!(
                price_per_gram = %price.price_per_gram,
                updated_at = %price.updated_at,
                "Using current 24kt gold price"
            );
            return Ok(price.price_per_gram);
        }

        if let Some(id) = metal_type_id {
            let metal_type = queries::find_metal_type(self.pool, id)
                .await
                .map_err(reference_data)?;

            if let Some((name, rate)) = metal_type.and_then(|m| {
                m.base_rate_per_gram
                    .filter(|rate| *rate > Decimal::ZERO)
                    .map(|rate| (m.name, rate))
            }) {
                warn!(
                    metal_type = %name,
                    "No 24kt gold price stored, using metal type base rate"
                );
                return Ok(rate);
            }
        }

        Err(PricingError::MissingBaseRate { metal_type_id })
    }

    async fn currency(&self, code: &str) -> Result<Option<Currency>, PricingError> {
        let key = code.trim().to_uppercase();

        if let Some(cached) = self.cache.currencies.get(&key).await {
            debug!("Cache HIT for currency: {}", key);
            return Ok(Some((*cached).clone()));
        }

        debug!("Cache MISS for currency: {}", key);
        let currency = queries::find_currency_by_code(self.pool, &key)
            .await
            .map_err(reference_data)?;

        if let Some(found) = &currency {
            self.cache
                .currencies
                .insert(key, Arc::new(found.clone()))
                .await;
        }

        Ok(currency)
    }
}

/// In-memory context with fixed reference data.
#[derive(Debug, Clone, Default)]
pub struct StaticContext {
    base_rate: Option<Decimal>,
    metal_rates: HashMap<Uuid, Decimal>,
    currencies: HashMap<String, Currency>,
}

impl StaticContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_rate(mut self, rate: Decimal) -> Self {
        self.base_rate = Some(rate);
        self
    }

    pub fn with_metal_rate(mut self, metal_type_id: Uuid, rate: Decimal) -> Self {
        self.metal_rates.insert(metal_type_id, rate);
        self
    }

    pub fn with_currency(mut self, code: &str, conversion_rate_to_inr: Decimal) -> Self {
        let code = code.trim().to_uppercase();
        self.currencies.insert(
            code.clone(),
            Currency {
                id: Uuid::new_v4(),
                code,
                conversion_rate_to_inr,
            },
        );
        self
    }
}

impl PricingContext for StaticContext {
    async fn base_rate(&self, metal_type_id: Option<Uuid>) -> Result<Decimal, PricingError> {
        self.base_rate
            .filter(|rate| *rate > Decimal::ZERO)
            .or_else(|| {
                metal_type_id
                    .and_then(|id| self.metal_rates.get(&id).copied())
                    .filter(|rate| *rate > Decimal::ZERO)
            })
            .ok_or(PricingError::MissingBaseRate { metal_type_id })
    }

    async fn currency(&self, code: &str) -> Result<Option<Currency>, PricingError> {
        Ok(self.currencies.get(&code.trim().to_uppercase()).cloned())
    }
}
