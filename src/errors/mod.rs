use std::io::Error as IoError;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub mod config;
pub mod service;
pub mod sink;
pub mod store;
pub mod validation;

pub use config::ConfigError;
pub use service::ServiceError;
pub use sink::SinkError;
pub use store::StoreError;
pub use validation::{RowError, RowErrorKind};

#[derive(Debug, Error)]
pub enum AppError {
    // Service-level domain errors
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Validation error: {} row(s) rejected", .0.len())]
    BatchRejected(Vec<RowError>),
    #[error("Not found error: {0}")]
    NotFound(String),
    #[error("Gone error: {0}")]
    Gone(String),
    #[error("Internal error: {0}")]
    Internal(String),
    // Infrastructure/system errors
    #[error("Server error: {0}")]
    Server(#[from] IoError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Logger error: {0}")]
    Logger(String),
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Rejected(rows) => AppError::BatchRejected(rows),
            ServiceError::Validation(msg) => AppError::Validation(msg),
            ServiceError::Store(e) => e.into(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(flatten_validation_errors(&errors))
    }
}

/// Flatten field errors into a single string
pub fn flatten_validation_errors(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let reasons = errs
                .iter()
                .map(|e| e.message.clone().unwrap_or_else(|| "invalid".into()))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}: {}", field, reasons)
        })
        .collect::<Vec<_>>()
        .join("; ")
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BatchRejected(_) => StatusCode::BAD_REQUEST,
            AppError::Gone(_) => StatusCode::GONE,
            AppError::Internal(_)
            | AppError::Server(_)
            | AppError::Config(_)
            | AppError::Logger(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_string = self.to_string();
        let (error_type, message) = error_string
            .split_once(":")
            .map(|(t, m)| (t.trim(), m.trim()))
            .unwrap_or(("Error", "An error occurred"));

        let error_message = if message.is_empty() {
            "An error occurred"
        } else {
            message
        };

        // "Not found error" -> "NOT_FOUND"
        let error_type = error_type
            .trim_end_matches(" error")
            .replace(' ', "_")
            .to_uppercase();

        let code = self.status_code().as_u16();
        let mut body = json!({
            "type": error_type,
            "message": error_message,
            "status_code": code,
        });

        if let AppError::BatchRejected(rows) = self {
            body["errors"] = json!(rows);
        }

        HttpResponse::build(self.status_code()).json(body)
    }
}
