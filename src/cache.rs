//! In-memory caching using moka
//!
//! Holds the currency table, which the admin panel edits rarely. The base
//! metal rate changes through the day and is never cached.

use moka::future::Cache;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::pricing::models::Currency;
use crate::pricing::queries;

/// Default TTL for cached currencies
pub const DEFAULT_CURRENCY_TTL: Duration = Duration::from_secs(10 * 60);

/// Application cache holding reference data
#[derive(Clone)]
pub struct AppCache {
    /// Currencies (upper-case code -> Currency)
    pub currencies: Cache<String, Arc<Currency>>,
}

impl AppCache {
    /// Create a new cache instance with the given currency TTL
    pub fn new(currency_ttl: Duration) -> Self {
        Self {
            currencies: Cache::builder()
                .max_capacity(256)
                .time_to_live(currency_ttl)
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            currencies_size: self.currencies.entry_count(),
        }
    }

    /// Invalidate all caches
    pub fn invalidate_all(&self) {
        self.currencies.invalidate_all();
        info!("All caches invalidated");
    }

    /// Invalidate a single currency by code
    pub async fn invalidate_currency(&self, code: &str) {
        self.currencies.invalidate(&code.trim().to_uppercase()).await;
        info!("Cache invalidated for currency: {}", code);
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY_TTL)
    }
}

/// Cache statistics for monitoring
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub currencies_size: u64,
}

/// Start background cache warmer
///
/// Loads the currency table on startup and refreshes it every `period`,
/// normally the currency TTL so entries are replaced before they expire.
pub async fn start_cache_warmer(cache: AppCache, db: PgPool, period: Duration) {
    let mut interval = interval(period);
    loop {
        // first tick completes immediately
        interval.tick().await;
        warm_cache(&cache, &db).await;
    }
}

async fn warm_cache(cache: &AppCache, db: &PgPool) {
    match queries::get_all_currencies(db).await {
        Ok(currencies) => {
            let count = currencies.len();
            refresh_currencies(cache, currencies).await;
            debug!("Currency cache refreshed with {} entries", count);
        }
        Err(e) => warn!("Failed to warm currency cache: {}", e),
    }
}

/// Upsert the given currencies; entries missing from the table age out by TTL
async fn refresh_currencies(cache: &AppCache, currencies: Vec<Currency>) {
    for currency in currencies {
        cache
            .currencies
            .insert(currency.code.trim().to_uppercase(), Arc::new(currency))
            .await;
    }
}
