use chrono::{Duration, NaiveDate};
use musafir_core::{BookingError, BookingResult};
use serde::{Deserialize, Serialize};

/// A validated half-open stay range `[check_in, check_out)`. The check-out
/// day is not occupied, so back-to-back stays on a boundary date never
/// collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayInterval {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayInterval {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> BookingResult<Self> {
        if check_out <= check_in {
            return Err(BookingError::InvalidDateRange(format!(
                "check-out {} must be after check-in {}",
                check_out, check_in
            )));
        }
        Ok(Self { check_in, check_out })
    }

    /// Parse `YYYY-MM-DD` date strings as submitted by the booking form.
    pub fn parse(check_in: &str, check_out: &str) -> BookingResult<Self> {
        Self::new(parse_calendar_date(check_in)?, parse_calendar_date(check_out)?)
    }

    /// Reservation rows are validated at insert; rebuilding their interval
    /// cannot fail.
    pub(crate) fn assume_valid(check_in: NaiveDate, check_out: NaiveDate) -> Self {
        Self { check_in, check_out }
    }

    pub fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    pub fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Always >= 1 by construction.
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Half-open overlap test. Strictly `<` on both sides: a stay ending
    /// on a date does not contend with one starting that date.
    pub fn overlaps(&self, other: &StayInterval) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.check_in <= date && date < self.check_out
    }

    /// Smallest interval covering both.
    pub fn envelope(&self, other: &StayInterval) -> StayInterval {
        StayInterval {
            check_in: self.check_in.min(other.check_in),
            check_out: self.check_out.max(other.check_out),
        }
    }
}

/// Parse one `YYYY-MM-DD` calendar date.
pub fn parse_calendar_date(raw: &str) -> BookingResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| BookingError::InvalidDateRange(format!("unparseable date: {:?}", raw)))
}

/// Overall span of a tour; bounds any linked hotel stay.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TourSpan {
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl TourSpan {
    /// Guests check out the morning after the final tour day.
    fn checkout_bound(&self) -> NaiveDate {
        self.end_date.unwrap_or(self.start_date) + Duration::days(1)
    }

    /// Stay used when the tour has no stored stay plan for the hotel.
    pub fn default_stay(&self) -> BookingResult<StayInterval> {
        StayInterval::new(self.start_date, self.checkout_bound())
    }
}

/// A stored stay-plan row linking a tour to a hotel for specific dates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StayPlan {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub notes: Option<String>,
}

/// Resolve the stay for a tour-linked booking: the stored plan when one
/// exists, otherwise the tour's own dates.
pub fn resolve_tour_stay(tour: &TourSpan, plan: Option<&StayPlan>) -> BookingResult<StayInterval> {
    match plan {
        Some(plan) => {
            let stay = StayInterval::new(plan.check_in, plan.check_out)?;
            let bound = tour.checkout_bound();
            if stay.check_in() < tour.start_date || stay.check_out() > bound {
                return Err(BookingError::OutOfBoundsInterval {
                    stay_start: stay.check_in(),
                    stay_end: stay.check_out(),
                    tour_start: tour.start_date,
                    tour_end: bound,
                });
            }
            Ok(stay)
        }
        None => tour.default_stay(),
    }
}

/// Envelope of a hotel's stay-plan rows (min check-in, max check-out).
/// Rows with inverted or missing ranges are skipped, matching how stored
/// plans are tolerated elsewhere in the platform.
pub fn stay_envelope(plans: &[StayPlan]) -> Option<StayInterval> {
    plans
        .iter()
        .filter_map(|p| StayInterval::new(p.check_in, p.check_out).ok())
        .reduce(|acc, stay| acc.envelope(&stay))
}
