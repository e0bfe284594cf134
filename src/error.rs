use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::SeatId;

/// Ошибки хранилища мест.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Одно из выбранных мест перестало быть свободным до коммита.
    #[error("seat status changed before commit: expected {expected} empty seats, {updated} updated")]
    Conflict { expected: usize, updated: usize },

    #[error("seat row {id} is corrupt: {reason}")]
    CorruptRow { id: SeatId, reason: String },
}

/// Ошибки распределения мест.
#[derive(Debug, Error)]
pub enum AllocationError {
    #[error("requested {requested} seats, at most {max} can be reserved at once")]
    RequestTooLarge { requested: u32, max: u32 },

    #[error("number of seats to reserve must be at least 1")]
    InvalidCount,

    #[error("not enough available seats: requested {requested}, available {available}")]
    InsufficientSeats { requested: u32, available: usize },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Ошибка HTTP-слоя: статус + сообщение + машиночитаемый код.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, code: "BAD_REQUEST", message: message.into() }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR",
            message: "Internal Server Error".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Conflict { .. } => Self {
                status: StatusCode::CONFLICT,
                code: "SEATS_CHANGED",
                message: "Seats were taken concurrently, please retry".to_string(),
            },
            other => {
                // детали только в лог, клиенту - общий ответ
                tracing::error!("storage failure: {:?}", other);
                Self::internal()
            }
        }
    }
}

impl From<AllocationError> for ApiError {
    fn from(err: AllocationError) -> Self {
        match err {
            AllocationError::RequestTooLarge { .. } => Self {
                status: StatusCode::BAD_REQUEST,
                code: "REQUEST_TOO_LARGE",
                message: err.to_string(),
            },
            AllocationError::InvalidCount => Self {
                status: StatusCode::BAD_REQUEST,
                code: "INVALID_COUNT",
                message: err.to_string(),
            },
            AllocationError::InsufficientSeats { .. } => Self {
                status: StatusCode::CONFLICT,
                code: "INSUFFICIENT_SEATS",
                message: "Not enough available seats.".to_string(),
            },
            AllocationError::Storage(e) => e.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "message": self.message,
                "code": self.code,
            })),
        )
            .into_response()
    }
}
