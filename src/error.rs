use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::entities::SweepstakeStatus;

pub type AppResult<T> = Result<T, AppError>;

/// Sweepstake entry / draw / lifecycle rejections.
///
/// Every variant is detected before any write, or leaves the store untouched
/// because the surrounding transaction is dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SweepstakeError {
    #[error("Sign in to enter this sweepstake")]
    AuthenticationRequired,

    #[error("Insufficient points: {required} required, {available} available")]
    InsufficientPoints { required: i64, available: i64 },

    #[error("This sweepstake has not started yet")]
    SweepstakeNotStarted,

    #[error("This sweepstake has already ended")]
    SweepstakeEnded,

    #[error("{}", entry_status_message(.0))]
    InvalidStatusForEntry(SweepstakeStatus),

    #[error("This sweepstake has reached its participant limit")]
    SweepstakeFull,

    #[error("You have already entered this sweepstake")]
    AlreadyEntered,

    #[error("No participants to draw from")]
    NoParticipants,

    #[error("Winners have already been drawn for this sweepstake")]
    AlreadyDrawn,

    #[error("Winners can only be drawn after the sweepstake has ended")]
    SweepstakeNotEnded,

    #[error("Cannot draw a sweepstake that is {0}")]
    InvalidStatusForDraw(SweepstakeStatus),

    #[error("Cannot move sweepstake from {from} to {to}")]
    InvalidTransition {
        from: SweepstakeStatus,
        to: SweepstakeStatus,
    },

    #[error("The sweepstake was modified concurrently, please retry")]
    ConcurrencyConflict,
}

fn entry_status_message(status: &SweepstakeStatus) -> &'static str {
    match status {
        SweepstakeStatus::Upcoming => "This sweepstake is not open for entries yet",
        SweepstakeStatus::Active => "This sweepstake is open",
        SweepstakeStatus::Ended => "This sweepstake is closed for entries",
        SweepstakeStatus::DrawingComplete => "Winners have already been drawn for this sweepstake",
        SweepstakeStatus::Cancelled => "This sweepstake has been cancelled",
    }
}

impl SweepstakeError {
    /// Stable machine-readable code returned to clients
    pub fn code(&self) -> &'static str {
        match self {
            SweepstakeError::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            SweepstakeError::InsufficientPoints { .. } => "INSUFFICIENT_POINTS",
            SweepstakeError::SweepstakeNotStarted => "SWEEPSTAKE_NOT_STARTED",
            SweepstakeError::SweepstakeEnded => "SWEEPSTAKE_ENDED",
            SweepstakeError::InvalidStatusForEntry(_) => "INVALID_STATUS_FOR_ENTRY",
            SweepstakeError::SweepstakeFull => "SWEEPSTAKE_FULL",
            SweepstakeError::AlreadyEntered => "ALREADY_ENTERED",
            SweepstakeError::NoParticipants => "NO_PARTICIPANTS",
            SweepstakeError::AlreadyDrawn => "ALREADY_DRAWN",
            SweepstakeError::SweepstakeNotEnded => "SWEEPSTAKE_NOT_ENDED",
            SweepstakeError::InvalidStatusForDraw(_) => "INVALID_STATUS_FOR_DRAW",
            SweepstakeError::InvalidTransition { .. } => "INVALID_TRANSITION",
            SweepstakeError::ConcurrencyConflict => "CONCURRENCY_CONFLICT",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            SweepstakeError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            SweepstakeError::AlreadyEntered
            | SweepstakeError::AlreadyDrawn
            | SweepstakeError::ConcurrencyConflict => StatusCode::CONFLICT,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Insufficient points: balance {balance}, change {delta}")]
    InsufficientFunds { balance: i64, delta: i64 },

    #[error(transparent)]
    Sweepstake(#[from] SweepstakeError),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl AppError {
    /// HTTP status, error code and client-facing message. Logs on the way out.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                (StatusCode::UNAUTHORIZED, "AUTH_ERROR", msg.clone())
            }
            AppError::JwtError(err) => {
                log::warn!("JWT error: {err}");
                (
                    StatusCode::UNAUTHORIZED,
                    "AUTH_ERROR",
                    "Invalid or expired token".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Forbidden => {
                log::warn!("Forbidden access");
                (StatusCode::FORBIDDEN, "FORBIDDEN", "Forbidden".to_string())
            }
            AppError::InsufficientFunds { .. } => {
                log::warn!("{self}");
                (
                    StatusCode::BAD_REQUEST,
                    "INSUFFICIENT_FUNDS",
                    self.to_string(),
                )
            }
            AppError::Sweepstake(err) => {
                log::warn!("Sweepstake rejected: {err}");
                (err.status_code(), err.code(), err.to_string())
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error".to_string(),
                )
            }
            _ => {
                log::error!("Internal error: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InsufficientFunds { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::AuthError(_) | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Sweepstake(err) => err.status_code(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code, message) = self.parts();

        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}
