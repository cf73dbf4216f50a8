//! Database queries for pricing reference data.
//!
//! Read-only: rates and currencies are maintained by the admin panel.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

use super::models::{Currency, GoldPrice, MetalType};

/// Carat grade the stored base rate refers to
const BASE_CARAT: i32 = 24;

// A zero row written by the admin panel must not hide older usable prices.
const BASE_GOLD_PRICE_SQL: &str = r#"
    SELECT id, base_carat, price_per_gram, updated_at
    FROM gold_prices
    WHERE base_carat = $1 AND price_per_gram > 0
    ORDER BY updated_at DESC
    LIMIT 1
"#;

/// Latest positive 24-carat gold price
pub async fn find_base_gold_price(pool: &PgPool) -> Result<Option<GoldPrice>, AppError> {
    let price = sqlx::query_as::<_, GoldPrice>(BASE_GOLD_PRICE_SQL)
        .bind(BASE_CARAT)
        .fetch_optional(pool)
        .await?;

    Ok(price)
}

/// Find a metal type by id
pub async fn find_metal_type(pool: &PgPool, metal_type_id: Uuid) -> Result<Option<MetalType>, AppError> {
    let metal_type = sqlx::query_as::<_, MetalType>(
        r#"
        SELECT id, name, base_rate_per_gram
        FROM metal_types
        WHERE id = $1
        "#,
    )
    .bind(metal_type_id)
    .fetch_optional(pool)
    .await?;

    Ok(metal_type)
}

/// Find a currency by code (case-insensitive)
pub async fn find_currency_by_code(pool: &PgPool, code: &str) -> Result<Option<Currency>, AppError> {
    let currency = sqlx::query_as::<_, Currency>(
        r#"
        SELECT id, UPPER(code) AS code, conversion_rate_to_inr
        FROM currencies
        WHERE UPPER(code) = UPPER($1)
        LIMIT 1
        "#,
    )
    .bind(code)
    .fetch_optional(pool)
    .await?;

    Ok(currency)
}

/// Get all currencies (for cache warming)
pub async fn get_all_currencies(pool: &PgPool) -> Result<Vec<Currency>, AppError> {
    let currencies = sqlx::query_as::<_, Currency>(
        r#"
        SELECT id, UPPER(code) AS code, conversion_rate_to_inr
        FROM currencies
        ORDER BY code
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(currencies)
}
