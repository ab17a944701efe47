use uuid::Uuid;

use crate::reservation::{Reservation, ReservationStatus};
use crate::stay::StayInterval;

/// Sum of confirmed quantities on the room type whose ranges overlap the
/// interval. O(reservations on the room type); no caching at this scale.
pub fn overlapping_quantity<'a, I>(reservations: I, room_type_id: Uuid, stay: &StayInterval) -> i32
where
    I: IntoIterator<Item = &'a Reservation>,
{
    reservations
        .into_iter()
        .filter(|r| r.room_type_id == room_type_id)
        .filter(|r| r.status == ReservationStatus::Confirmed)
        .filter(|r| r.stay().overlaps(stay))
        .map(|r| r.quantity)
        .sum()
}

/// Free units given the advertised baseline. Never negative.
pub fn free_units(baseline: i32, overlapping: i32) -> i32 {
    (baseline - overlapping).max(0)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate, Utc};
    use rust_decimal::Decimal;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn confirmed(
        room_type_id: Uuid,
        quantity: i32,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Reservation {
        let now: DateTime<Utc> = Utc::now();
        Reservation {
            id: Uuid::new_v4(),
            room_type_id,
            property_id: Uuid::new_v4(),
            guest_id: Uuid::new_v4(),
            quantity,
            check_in,
            check_out,
            nights: (check_out - check_in).num_days(),
            guests_count: quantity,
            total_amount: Decimal::ZERO,
            status: ReservationStatus::Confirmed,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_only_confirmed_overlaps_count() {
        let room = Uuid::new_v4();
        let mut cancelled = confirmed(room, 2, date(2026, 6, 1), date(2026, 6, 5));
        cancelled.status = ReservationStatus::Cancelled;
        let rows = vec![
            confirmed(room, 2, date(2026, 6, 1), date(2026, 6, 5)),
            cancelled,
            confirmed(Uuid::new_v4(), 3, date(2026, 6, 1), date(2026, 6, 5)),
        ];

        let stay = StayInterval::new(date(2026, 6, 3), date(2026, 6, 6)).unwrap();
        assert_eq!(overlapping_quantity(&rows, room, &stay), 2);
    }

    #[test]
    fn test_boundary_dates_are_free() {
        let room = Uuid::new_v4();
        let rows = vec![confirmed(room, 1, date(2026, 1, 10), date(2026, 1, 12))];

        let back_to_back = StayInterval::new(date(2026, 1, 12), date(2026, 1, 14)).unwrap();
        assert_eq!(overlapping_quantity(&rows, room, &back_to_back), 0);

        let straddling = StayInterval::new(date(2026, 1, 11), date(2026, 1, 13)).unwrap();
        assert_eq!(overlapping_quantity(&rows, room, &straddling), 1);
    }

    #[test]
    fn test_free_units_floor_at_zero() {
        assert_eq!(free_units(3, 2), 1);
        assert_eq!(free_units(2, 5), 0);
        assert_eq!(free_units(0, 0), 0);
    }
}
