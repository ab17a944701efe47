use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use musafir_catalog::CatalogError;
use musafir_core::BookingError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    Booking(BookingError),
    Catalog(CatalogError),
    Internal(String),
}

impl AppError {
    /// Boxed errors from the catalog repository carry a typed
    /// `CatalogError` when the failure is the caller's.
    pub fn from_storage(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        match err.downcast::<CatalogError>() {
            Ok(catalog) => AppError::Catalog(*catalog),
            Err(other) => AppError::Internal(other.to_string()),
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError::Booking(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Booking(err) => match &err {
                BookingError::InvalidDateRange(_)
                | BookingError::OutOfBoundsInterval { .. }
                | BookingError::InvalidQuantity(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                BookingError::RoomTypeNotFound(_) | BookingError::ReservationNotFound(_) => {
                    (StatusCode::NOT_FOUND, err.to_string())
                }
                BookingError::InsufficientAvailability { .. }
                | BookingError::AlreadyTerminal { .. }
                | BookingError::NotYetCheckedOut { .. } => (StatusCode::CONFLICT, err.to_string()),
                BookingError::TransactionFailed(msg) => {
                    tracing::error!("Reservation transaction failed: {}", msg);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal Server Error".to_string(),
                    )
                }
            },
            AppError::Catalog(err) => match &err {
                CatalogError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
                CatalogError::InvalidRoomType(_) => (StatusCode::BAD_REQUEST, err.to_string()),
            },
            AppError::Internal(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
