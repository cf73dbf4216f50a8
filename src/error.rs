//! Error handling for the application

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::pricing::responses::PricingErrorResponse;
use crate::pricing::PricingError;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Pricing(#[from] PricingError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Pricing(PricingError::InvalidNumericInput { .. }) => StatusCode::BAD_REQUEST,
            AppError::Pricing(PricingError::UnknownCurrency { .. }) => StatusCode::NOT_FOUND,
            AppError::Pricing(PricingError::MissingBaseRate { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Pricing(PricingError::ReferenceData(_)) | AppError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            AppError::Pricing(PricingError::InvalidNumericInput { .. }) => "invalid_numeric_input",
            AppError::Pricing(PricingError::UnknownCurrency { .. }) => "unknown_currency",
            AppError::Pricing(PricingError::MissingBaseRate { .. }) => "missing_base_rate",
            AppError::Pricing(PricingError::ReferenceData(_)) => "reference_data",
            AppError::Database(_) => "database",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Database error".to_string()
            }
            AppError::Pricing(e @ PricingError::ReferenceData(_)) => {
                tracing::error!("Pricing error: {}", e);
                "Reference data unavailable".to_string()
            }
            AppError::Pricing(e) => {
                tracing::debug!("Rejected pricing request: {}", e);
                e.to_string()
            }
        };

        let details = match &self {
            AppError::Pricing(PricingError::InvalidNumericInput { field, .. }) => {
                Some(serde_json::json!({ "field": field }))
            }
            AppError::Pricing(PricingError::UnknownCurrency { code }) => {
                Some(serde_json::json!({ "currency": code }))
            }
            _ => None,
        };

        let body = PricingErrorResponse {
            error_type: self.error_type().to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
