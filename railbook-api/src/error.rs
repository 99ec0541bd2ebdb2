use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use railbook_core::{AllocationError, BookingError};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    AuthenticationError(String),
    #[error("{0}")]
    AuthorizationError(String),
    #[error(transparent)]
    Booking(#[from] BookingError),
}

fn booking_status(err: &BookingError) -> StatusCode {
    match err {
        BookingError::Allocation(AllocationError::SectionNotFound(_))
        | BookingError::BookingNotFound(_) => StatusCode::NOT_FOUND,
        BookingError::Allocation(AllocationError::InvalidSeat { .. })
        | BookingError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        BookingError::Allocation(AllocationError::SeatTaken { .. })
        | BookingError::Allocation(AllocationError::SectionFull { .. })
        | BookingError::DuplicateBookingId(_) => StatusCode::CONFLICT,
        BookingError::Generation(_) | BookingError::SeatLost { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Booking(err) if err.is_infrastructure() => {
                tracing::error!("Booking engine failure: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
            AppError::Booking(err) => (booking_status(&err), err.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
