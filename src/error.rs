// Error types for the catalog, the durable store, the session and the HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::CarId;

/// Message shown in place of the catalog when the listing fetch fails.
pub const FETCH_FAILURE_MESSAGE: &str = "Failed to fetch car data. Please try again later.";

// Failures at the listing source boundary. All of them end the session in the error state.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("listing source unreachable: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("listing source returned an error status: {0}")]
    Status(#[source] reqwest::Error),
    #[error("listing source returned an undecodable body: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("listing source did not return an array (got {found})")]
    NotAnArray { found: &'static str },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store payload could not be encoded: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no car with id {0} in the catalog or wishlist")]
    UnknownCar(CarId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

// Application error type returned by the HTTP handlers
#[derive(Debug)]
pub enum AppError {
    InternalServerError(anyhow::Error),
    NotFound(String),
    Unavailable(String), // Catalog still loading or failed
}

// Implement conversion from anyhow::Error for easier error propagation
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::InternalServerError(error)
    }
}

impl From<SessionError> for AppError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::UnknownCar(id) => AppError::NotFound(format!("Car {} not found", id)),
            SessionError::Store(e) => AppError::InternalServerError(anyhow::Error::new(e)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(e) => {
                // Log the detailed error here
                tracing::error!("Internal server error: {:?}", e);
                // Don't expose internal details to the client
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
            AppError::NotFound(message) => {
                tracing::debug!("Not found: {}", message);
                (StatusCode::NOT_FOUND, message)
            }
            AppError::Unavailable(message) => (StatusCode::SERVICE_UNAVAILABLE, message),
        };

        (status, error_message).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
