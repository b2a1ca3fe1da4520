use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Message shown to players whenever the generation backend is the problem.
/// Raw backend diagnostics are logged, never surfaced.
pub const GENERATION_BUSY_MESSAGE: &str =
    "The model is currently overloaded. Please try again in a few moments.";

pub const HINT_UNAVAILABLE_MESSAGE: &str = "Could not fetch a hint.";

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("The model is currently overloaded. Please try again in a few moments.")]
    GenerationFailure,

    #[error("The model is currently overloaded. Please try again in a few moments.")]
    ImageResolutionFailure,

    #[error("Please start a new session: {0}")]
    SessionDataUnavailable(String),

    #[error("Could not fetch a hint.")]
    HintUnavailable,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::GenerationFailure => "GENERATION_FAILURE",
            AppError::ImageResolutionFailure => "IMAGE_RESOLUTION_FAILURE",
            AppError::SessionDataUnavailable(_) => "SESSION_DATA_UNAVAILABLE",
            AppError::HintUnavailable => "HINT_UNAVAILABLE",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::GenerationFailure => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ImageResolutionFailure => StatusCode::SERVICE_UNAVAILABLE,
            AppError::SessionDataUnavailable(_) => StatusCode::GONE,
            AppError::HintUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            code: self.error_code().to_string(),
        })
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
