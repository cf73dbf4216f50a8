//! Service configuration from environment variables

use std::env;
use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, ensure, Context};
use rust_decimal::Decimal;
use tracing::info;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub database_max_connections: u32,
    /// Currency rates and flat charges are denominated in
    pub base_currency: String,
    /// Tax fraction for the per-carat summary (0.03 = 3% GST)
    pub gst_rate: Decimal,
    pub currency_cache_ttl: Duration,
}

impl Config {
    /// Load from the process environment (after `.env`, if any)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load through an arbitrary lookup, e.g. a fixed map in tests
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;

        let base_currency = try_load::<String>(&lookup, "BASE_CURRENCY", "INR")?
            .trim()
            .to_uppercase();
        ensure!(!base_currency.is_empty(), "BASE_CURRENCY must not be empty");

        let gst_rate: Decimal = try_load(&lookup, "GST_RATE", "0.03")?;
        ensure!(
            gst_rate >= Decimal::ZERO && gst_rate <= Decimal::ONE,
            "GST_RATE must be a fraction between 0 and 1, got {}",
            gst_rate
        );

        let cache_ttl_secs: u64 = try_load(&lookup, "CURRENCY_CACHE_TTL_SECS", "600")?;
        ensure!(cache_ttl_secs > 0, "CURRENCY_CACHE_TTL_SECS must be positive");

        Ok(Self {
            database_url,
            host: try_load(&lookup, "HOST", "0.0.0.0")?,
            port: try_load(&lookup, "PORT", "8080")?,
            database_max_connections: try_load(&lookup, "DATABASE_MAX_CONNECTIONS", "5")?,
            base_currency,
            gst_rate,
            currency_cache_ttl: Duration::from_secs(cache_ttl_secs),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> anyhow::Result<T>
where
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.trim()
        .parse()
        .map_err(|e| anyhow!("Invalid {key} value {raw:?}: {e}"))
}
