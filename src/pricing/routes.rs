//! Pricing route handlers

use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use rust_decimal::Decimal;

use crate::error::Result;
use crate::AppState;

use super::calculators::purity_for;
use super::context::DbContext;
use super::requests::{
    CalculatePriceRequest, CaratRatesQuery, CaratSummaryRequest, CatalogEntryPricingRequest,
};
use super::responses::{
    CalculatePriceResponse, CaratLinePricingResponse, CaratRatesResponse, CaratSummaryResponse,
    CatalogEntryPricingResponse, PurityResponse,
};
use super::services::{self, PricingError};

/// Pricing API routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/pricing/calculate", post(calculate))
        .route("/api/pricing/catalog-entry", post(catalog_entry))
        .route("/api/pricing/carat-summary", post(carat_summary))
        .route("/api/pricing/carat-rates", get(carat_rates))
        .route("/api/pricing/purity/:carat", get(purity))
}

fn parse_carat(field: &str, raw: &str) -> std::result::Result<Decimal, PricingError> {
    Decimal::from_str(raw.trim()).map_err(|e| PricingError::InvalidNumericInput {
        field: field.to_string(),
        reason: format!("{:?} is not a number: {}", raw, e),
    })
}

/// Price a single item
pub async fn calculate(
    State(state): State<AppState>,
    Json(request): Json<CalculatePriceRequest>,
) -> Result<Json<CalculatePriceResponse>> {
    let ctx = DbContext::new(&state.db, &state.cache);
    let breakdown =
        services::calculate_item_price(&ctx, &state.config.base_currency, &request).await?;

    Ok(Json(CalculatePriceResponse {
        breakdown: (&breakdown).into(),
        quoted_at: Utc::now(),
    }))
}

/// Price every carat/currency row of a catalog entry
pub async fn catalog_entry(
    State(state): State<AppState>,
    Json(request): Json<CatalogEntryPricingRequest>,
) -> Result<Json<CatalogEntryPricingResponse>> {
    let ctx = DbContext::new(&state.db, &state.cache);
    let lines = services::price_catalog_entry(&ctx, &state.config.base_currency, &request).await?;

    Ok(Json(CatalogEntryPricingResponse {
        carats: lines.iter().map(CaratLinePricingResponse::from).collect(),
        quoted_at: Utc::now(),
    }))
}

/// Product summary per carat, with GST
pub async fn carat_summary(
    State(state): State<AppState>,
    Json(request): Json<CaratSummaryRequest>,
) -> Result<Json<CaratSummaryResponse>> {
    let ctx = DbContext::new(&state.db, &state.cache);
    let summary = services::summarize_product(
        &ctx,
        &state.config.base_currency,
        state.config.gst_rate,
        &request,
    )
    .await?;

    Ok(Json(CaratSummaryResponse::new(&summary, Utc::now())))
}

/// Per-carat price per gram from the current base rate
pub async fn carat_rates(
    State(state): State<AppState>,
    Query(query): Query<CaratRatesQuery>,
) -> Result<Json<CaratRatesResponse>> {
    let carats = match query.carats.as_deref() {
        Some(list) => list
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(|part| parse_carat("carats", part))
            .collect::<std::result::Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    let ctx = DbContext::new(&state.db, &state.cache);
    let (base_rate, rates) = services::carat_rate_table(&ctx, query.metal_type_id, &carats).await?;

    Ok(Json(CaratRatesResponse::new(
        base_rate,
        &rates,
        &state.config.base_currency,
        Utc::now(),
    )))
}

/// Purity factor for a carat grade
pub async fn purity(Path(carat): Path<String>) -> Result<Json<PurityResponse>> {
    let carat_value = parse_carat("carat", &carat)?;
    Ok(Json(PurityResponse::new(carat_value, purity_for(carat_value))))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::cache::AppCache;
    use crate::config::Config;

    use super::*;

    // The pool never connects: every request below is answered before
    // reference data is read.
    fn test_app() -> Router {
        let config = Config::from_vars(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost/mishco_test".to_string()),
            _ => None,
        })
        .unwrap();
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();

        crate::app(AppState {
            db,
            cache: AppCache::default(),
            config: Arc::new(config),
        })
    }

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = test_app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_purity_tabulated_grade() {
        let request = Request::get("/api/pricing/purity/22").body(Body::empty()).unwrap();
        let (status, json) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["purity_factor"], "0.916");
        assert_eq!(json["source"], "tabulated");
    }

    #[tokio::test]
    async fn test_purity_out_of_range_grade() {
        let request = Request::get("/api/pricing/purity/30").body(Body::empty()).unwrap();
        let (status, json) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["purity_factor"], "1");
        assert_eq!(json["source"], "out_of_range");
    }

    #[tokio::test]
    async fn test_purity_rejects_non_numeric_carat() {
        let request = Request::get("/api/pricing/purity/gold").body(Body::empty()).unwrap();
        let (status, json) = send(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error_type"], "invalid_numeric_input");
        assert_eq!(json["details"]["field"], "carat");
    }

    #[tokio::test]
    async fn test_calculate_rejects_negative_weight() {
        let request = post_json(
            "/api/pricing/calculate",
            serde_json::json!({
                "weight_grams": "-1",
                "carat_value": "22",
                "currency": "USD"
            }),
        );
        let (status, json) = send(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error_type"], "invalid_numeric_input");
        assert_eq!(json["details"]["field"], "weight_grams");
    }

    #[tokio::test]
    async fn test_calculate_requires_currency() {
        let request = post_json(
            "/api/pricing/calculate",
            serde_json::json!({
                "weight_grams": "10",
                "carat_value": "22"
            }),
        );
        let (status, _) = send(request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_carat_summary_rejects_carat_above_pure() {
        let request = post_json(
            "/api/pricing/carat-summary",
            serde_json::json!({
                "weight_grams": "10",
                "carat_values": ["22", "30"]
            }),
        );
        let (status, json) = send(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["details"]["field"], "carat_values[1]");
    }

    #[tokio::test]
    async fn test_carat_rates_rejects_bad_carat_list() {
        let request = Request::get("/api/pricing/carat-rates?carats=24,abc")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["details"]["field"], "carats");
    }
}
