//! Pricing engine module for the jewelry catalog.
//!
//! Prices items from weight, carat purity and the current base metal rate,
//! plus flat charges, currency conversion and an optional tax line. The admin
//! panel calls this over HTTP/JSON whenever a catalog price has to be shown
//! or saved.

pub mod calculators;
pub mod context;
pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::{calculate_price, resolve_purity, round_money, PriceBreakdown, PricingInput};
pub use context::{DbContext, PricingContext, StaticContext};
pub use routes::router;
pub use services::PricingError;
