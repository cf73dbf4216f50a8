//! Mishco jewelry pricing service.
//!
//! Axum API over the pricing engine in [`pricing`], backed by Postgres
//! reference data (gold prices, currencies, metal types).

pub mod cache;
pub mod config;
pub mod error;
pub mod pricing;

use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::cache::AppCache;
use crate::config::Config;

/// Shared state for request handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
    pub config: Arc<Config>,
}

/// Build the application router with middleware
pub fn app(state: AppState) -> Router {
    pricing::router()
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        // the admin panel calls the API straight from the browser
        .layer(CorsLayer::permissive())
        .with_state(state)
}
