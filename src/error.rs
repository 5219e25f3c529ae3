use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use tracing::error;

use crate::catalog::{CatalogLoadError, LookupError};
use crate::pricing::EstimateError;
use crate::vehicles::VehicleError;

/// Message shown to clients whenever the catalog cannot be served
const CATALOG_UNAVAILABLE_MESSAGE: &str = "Service temporarily unavailable";

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Configuration error
    ConfigError(String),
    /// Category or service that does not resolve, or an unpriceable selection
    InvalidSelection { field: Option<&'static str>, message: String },
    /// Malformed or out-of-range request input
    InvalidInput { field: Option<&'static str>, message: String },
    /// Resource addressed by the URL does not exist
    NotFound(String),
    /// No catalog could be loaded; the detail is logged, never returned
    CatalogUnavailable(String),
    /// Upstream API error
    UpstreamError(String),
    /// Internal server error
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::InvalidSelection { message, .. } => write!(f, "Invalid selection: {}", message),
            Self::InvalidInput { message, .. } => write!(f, "Invalid input: {}", message),
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::CatalogUnavailable(msg) => write!(f, "Catalog unavailable: {}", msg),
            Self::UpstreamError(msg) => write!(f, "Upstream error: {}", msg),
            Self::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidSelection { .. } => StatusCode::BAD_REQUEST,
            Self::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::CatalogUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::UpstreamError(_) => StatusCode::BAD_GATEWAY,
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        crate::metrics::record_error(error_type_name(&self));

        let (error_message, field) = match &self {
            Self::CatalogUnavailable(detail) => {
                error!("Catalog unavailable: {}", detail);
                (CATALOG_UNAVAILABLE_MESSAGE.to_string(), None)
            }
            Self::InvalidSelection { field, message } | Self::InvalidInput { field, message } => {
                (message.clone(), *field)
            }
            Self::ConfigError(msg)
            | Self::NotFound(msg)
            | Self::UpstreamError(msg)
            | Self::InternalError(msg) => (msg.clone(), None),
        };

        let mut error_body = json!({
            "message": error_message,
            "type": error_type_name(&self),
        });
        if let Some(field) = field {
            error_body["field"] = json!(field);
        }

        (status, Json(json!({ "error": error_body }))).into_response()
    }
}

fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::ConfigError(_) => "config_error",
        AppError::InvalidSelection { .. } => "invalid_selection",
        AppError::InvalidInput { .. } => "invalid_input",
        AppError::NotFound(_) => "not_found",
        AppError::CatalogUnavailable(_) => "service_unavailable",
        AppError::UpstreamError(_) => "upstream_error",
        AppError::InternalError(_) => "internal_error",
    }
}

impl From<CatalogLoadError> for AppError {
    fn from(err: CatalogLoadError) -> Self {
        Self::CatalogUnavailable(err.to_string())
    }
}

impl From<LookupError> for AppError {
    fn from(err: LookupError) -> Self {
        Self::InvalidSelection {
            field: Some(err.field()),
            message: err.to_string(),
        }
    }
}

impl From<EstimateError> for AppError {
    fn from(err: EstimateError) -> Self {
        let message = err.to_string();
        match err {
            EstimateError::InvalidInput { field, .. } => Self::InvalidInput {
                field: Some(field),
                message,
            },
            EstimateError::InvalidSelection(_) => Self::InvalidSelection {
                field: None,
                message,
            },
            EstimateError::Lookup(lookup) => lookup.into(),
        }
    }
}

impl From<VehicleError> for AppError {
    fn from(err: VehicleError) -> Self {
        match err {
            VehicleError::UnknownMake(_) => Self::NotFound(err.to_string()),
            VehicleError::Upstream(_) => Self::UpstreamError(err.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidInput {
            field: None,
            message: rejection.body_text(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}
