//! HTTP error mapping.
//!
//! Component failures stay typed until this boundary, where each kind maps
//! to one status. Validation errors are returned fully itemized; registry
//! and broker failures are logged with context and collapsed to a generic
//! message so internal topology does not leak to callers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use event_gateway_broker::BrokerError;
use event_gateway_schema::{SchemaError, ValidationError};

/// Error type for gateway endpoints.
#[derive(Debug)]
pub enum ApiError {
    /// Registry or validator-compilation failure.
    Schema(SchemaError),
    /// Broker failure; the event was validated but not delivered.
    Broker(BrokerError),
    /// The payload violated its subject's schema.
    Validation(Vec<ValidationError>),
}

impl From<SchemaError> for ApiError {
    fn from(err: SchemaError) -> Self {
        ApiError::Schema(err)
    }
}

impl From<BrokerError> for ApiError {
    fn from(err: BrokerError) -> Self {
        ApiError::Broker(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                let body = json!({
                    "message": "Schema validation failed",
                    "errors": errors,
                });
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
            ApiError::Schema(SchemaError::SchemaNotFound(subject)) => {
                let body = json!({
                    "message": format!("No schema found for subject '{subject}'"),
                });
                (StatusCode::NOT_FOUND, Json(body)).into_response()
            }
            ApiError::Schema(err) => {
                tracing::error!(error = %err, "schema registry failure");
                let body = json!({ "message": "Schema registry unavailable" });
                (StatusCode::BAD_GATEWAY, Json(body)).into_response()
            }
            ApiError::Broker(err) => {
                tracing::error!(error = %err, "broker failure");
                let body = json!({ "message": "Event could not be delivered to the broker" });
                (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
            }
        }
    }
}
