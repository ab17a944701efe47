pub mod identity;

use chrono::NaiveDate;
use uuid::Uuid;

/// Every failure the booking engine can signal. The web layer maps these
/// onto user-facing responses; none of them is fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Stay {stay_start}..{stay_end} falls outside the tour span {tour_start}..{tour_end}")]
    OutOfBoundsInterval {
        stay_start: NaiveDate,
        stay_end: NaiveDate,
        tour_start: NaiveDate,
        tour_end: NaiveDate,
    },

    #[error("Insufficient availability: requested {requested}, available {available}")]
    InsufficientAvailability {
        requested: i32,
        available: i32,
    },

    #[error("Invalid room quantity: {0}")]
    InvalidQuantity(i32),

    #[error("Room type not found: {0}")]
    RoomTypeNotFound(Uuid),

    #[error("Reservation not found: {0}")]
    ReservationNotFound(Uuid),

    #[error("Reservation is already {status}")]
    AlreadyTerminal {
        status: String,
    },

    #[error("Reservation cannot be completed before checkout on {check_out}")]
    NotYetCheckedOut {
        check_out: NaiveDate,
    },

    /// Transient infrastructure failure (lock wait timeout, lost
    /// connection). Safe to retry with the same parameters; no partial
    /// state is left behind.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),
}

pub type BookingResult<T> = Result<T, BookingError>;
