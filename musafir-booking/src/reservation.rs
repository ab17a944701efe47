use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use musafir_core::{BookingError, BookingResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stay::StayInterval;

/// A claim on N units of a room type for a half-open date range. Created
/// only by the reservation transaction; mutated only via status
/// transitions, never by direct quantity edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub room_type_id: Uuid,
    pub property_id: Uuid,
    pub guest_id: Uuid,
    pub quantity: i32,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub nights: i64,
    pub guests_count: i32,
    pub total_amount: Decimal,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn stay(&self) -> StayInterval {
        StayInterval::assume_valid(self.check_in, self.check_out)
    }

    /// Confirmed -> Cancelled. Allowed any time before checkout; frees
    /// capacity immediately because availability derives from live overlap
    /// queries.
    pub fn cancel(&mut self, today: NaiveDate) -> BookingResult<()> {
        match self.status {
            ReservationStatus::Confirmed if today < self.check_out => {
                self.status = ReservationStatus::Cancelled;
                self.updated_at = Utc::now();
                Ok(())
            }
            // The stay already ran its course; treat it as settled.
            ReservationStatus::Confirmed => Err(BookingError::AlreadyTerminal {
                status: ReservationStatus::Completed.to_string(),
            }),
            status => Err(BookingError::AlreadyTerminal {
                status: status.to_string(),
            }),
        }
    }

    /// Confirmed -> Completed. Allowed only at/after checkout; purely
    /// informational and never affects capacity math.
    pub fn complete(&mut self, today: NaiveDate) -> BookingResult<()> {
        match self.status {
            ReservationStatus::Confirmed if today >= self.check_out => {
                self.status = ReservationStatus::Completed;
                self.updated_at = Utc::now();
                Ok(())
            }
            ReservationStatus::Confirmed => Err(BookingError::NotYetCheckedOut {
                check_out: self.check_out,
            }),
            status => Err(BookingError::AlreadyTerminal {
                status: status.to_string(),
            }),
        }
    }
}

/// Only `Confirmed` counts against stock. There is no path out of a
/// terminal state; re-booking requires a new reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(ReservationStatus::Confirmed),
            "cancelled" => Ok(ReservationStatus::Cancelled),
            "completed" => Ok(ReservationStatus::Completed),
            other => Err(format!("unknown reservation status: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn reservation() -> Reservation {
        let now = Utc::now();
        Reservation {
            id: Uuid::new_v4(),
            room_type_id: Uuid::new_v4(),
            property_id: Uuid::new_v4(),
            guest_id: Uuid::new_v4(),
            quantity: 1,
            check_in: date(2026, 3, 1),
            check_out: date(2026, 3, 3),
            nights: 2,
            guests_count: 2,
            total_amount: Decimal::new(900000, 2),
            status: ReservationStatus::Confirmed,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_cancel_before_checkout() {
        let mut res = reservation();
        res.cancel(date(2026, 3, 2)).unwrap();
        assert_eq!(res.status, ReservationStatus::Cancelled);
    }

    #[test]
    fn test_cancel_after_checkout_rejected() {
        let mut res = reservation();
        let err = res.cancel(date(2026, 3, 3)).unwrap_err();
        assert!(matches!(err, BookingError::AlreadyTerminal { .. }));
        assert_eq!(res.status, ReservationStatus::Confirmed);
    }

    #[test]
    fn test_terminal_states_stay_terminal() {
        let mut res = reservation();
        res.cancel(date(2026, 3, 1)).unwrap();
        assert!(res.cancel(date(2026, 3, 1)).is_err());
        assert!(res.complete(date(2026, 3, 5)).is_err());
    }

    #[test]
    fn test_complete_only_after_checkout() {
        let mut res = reservation();
        let err = res.complete(date(2026, 3, 2)).unwrap_err();
        assert!(matches!(err, BookingError::NotYetCheckedOut { .. }));

        res.complete(date(2026, 3, 3)).unwrap();
        assert_eq!(res.status, ReservationStatus::Completed);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            ReservationStatus::Confirmed,
            ReservationStatus::Cancelled,
            ReservationStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<ReservationStatus>().unwrap(), status);
        }
        assert!("expired".parse::<ReservationStatus>().is_err());
    }
}
