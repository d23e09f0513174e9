use actix_web::{http::StatusCode, HttpResponse};
use consultation_booking_api_structs::ErrorResponse;
use std::fmt::Debug;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Invalid data provided: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized request: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),
    #[error("The time slot is being booked by someone else right now, please retry: {0}")]
    LockBusy(String),
    #[error("Internal server error")]
    Internal { correlation_id: String },
}

impl BookingError {
    /// Logs the underlying failure under a fresh correlation id, which is
    /// the only detail handed back to the caller
    pub fn internal(source: impl Debug) -> Self {
        let correlation_id = uuid::Uuid::new_v4().to_string();
        error!(correlation_id = %correlation_id, "Internal error: {:?}", source);
        Self::Internal { correlation_id }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::Conflict(_) => "conflict",
            Self::InvalidTransition(_) => "invalid_transition",
            Self::LockBusy(_) => "lock_busy",
            Self::Internal { .. } => "internal_error",
        }
    }
}

impl actix_web::error::ResponseError for BookingError {
    fn status_code(&self) -> StatusCode {
        match *self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) | Self::InvalidTransition(_) | Self::LockBusy(_) => {
                StatusCode::CONFLICT
            }
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let correlation_id = match self {
            Self::Internal { correlation_id } => Some(correlation_id.clone()),
            _ => None,
        };
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            success: false,
            message: self.to_string(),
            error: self.code().to_string(),
            correlation_id,
        })
    }
}
