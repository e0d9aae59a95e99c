//! Booking model definitions

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Booking lifecycle status.
///
/// `Pending` is the only initial state. `Confirmed` and `Cancelled` are
/// terminal: once reached, no actor may change the status again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether a booking in this status consumes room inventory.
    /// Cancelled bookings release their units.
    pub fn holds_inventory(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Cancelled)
    }

    /// The only legal transitions are pending -> confirmed and
    /// pending -> cancelled.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        matches!(self, Self::Pending) && next.is_terminal()
    }
}

impl Default for BookingStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate stay: the half-open date interval `[check_in, check_out)`.
///
/// Half-open means a booking ending on a day and another starting on that
/// same day never conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StayRange {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl StayRange {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Self {
        Self {
            check_in,
            check_out,
        }
    }

    /// Number of nights in the interval. Zero or negative for degenerate
    /// ranges; booking creation rejects those, price previews clamp to 1.
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Enumerate the calendar days of the stay. An empty or inverted range
    /// falls back to the single night starting at `check_in`.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = if self.check_out > self.check_in {
            self.check_out
        } else {
            self.check_in
                .checked_add_days(Days::new(1))
                .unwrap_or(self.check_in)
        };
        self.check_in.iter_days().take_while(move |day| *day < end)
    }

    pub fn validate(&self) -> Result<()> {
        if self.check_out <= self.check_in {
            return Err(Error::InvalidDateRange {
                check_in: self.check_in,
                check_out: self.check_out,
            });
        }
        Ok(())
    }
}

/// Contact details captured from the guest at booking time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// A reservation of one unit of a room type for a stay.
///
/// `hotel_name`, `hotel_owner_email` and `room_name` are snapshots taken at
/// creation time: renaming the hotel later must not rewrite booking history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub hotel_id: Uuid,
    pub hotel_name: String,
    pub hotel_owner_email: String,
    pub room_id: Uuid,
    pub room_name: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub total_price: f64,
    pub guest_name: String,
    pub guest_email: String,
    pub guest_phone: String,
    pub booked_at: DateTime<Utc>,
    pub status: BookingStatus,
    /// Payment receipt recorded when the booking was confirmed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_id: Option<Uuid>,
}

impl Booking {
    /// The stay interval of this booking.
    pub fn stay(&self) -> StayRange {
        StayRange::new(self.check_in, self.check_out)
    }

    /// Whether the booking occupies a unit on the given calendar day.
    /// Checkout day is excluded.
    pub fn covers(&self, day: NaiveDate) -> bool {
        day >= self.check_in && day < self.check_out
    }
}

/// Input to booking creation.
///
/// `booking_id` makes retries idempotent: a second submission carrying the id
/// of an already-created booking returns that booking instead of reserving a
/// second unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<Uuid>,
    pub hotel_id: Uuid,
    pub room_id: Uuid,
    pub stay: StayRange,
    pub guests: u32,
    pub guest: GuestDetails,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_only_pending_transitions() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::Pending));
        for terminal in [BookingStatus::Confirmed, BookingStatus::Cancelled] {
            assert!(!terminal.can_transition_to(BookingStatus::Pending));
            assert!(!terminal.can_transition_to(BookingStatus::Confirmed));
            assert!(!terminal.can_transition_to(BookingStatus::Cancelled));
        }
    }

    #[test]
    fn test_cancelled_releases_inventory() {
        assert!(BookingStatus::Pending.holds_inventory());
        assert!(BookingStatus::Confirmed.holds_inventory());
        assert!(!BookingStatus::Cancelled.holds_inventory());
    }

    #[test]
    fn test_stay_day_enumeration() {
        let stay = StayRange::new(date(2025, 6, 1), date(2025, 6, 4));
        let days: Vec<NaiveDate> = stay.days().collect();
        assert_eq!(
            days,
            vec![date(2025, 6, 1), date(2025, 6, 2), date(2025, 6, 3)]
        );
    }

    #[test]
    fn test_empty_stay_falls_back_to_one_night() {
        let stay = StayRange::new(date(2025, 6, 1), date(2025, 6, 1));
        let days: Vec<NaiveDate> = stay.days().collect();
        assert_eq!(days, vec![date(2025, 6, 1)]);
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let stay = StayRange::new(date(2025, 6, 4), date(2025, 6, 1));
        assert!(matches!(
            stay.validate(),
            Err(crate::Error::InvalidDateRange { .. })
        ));
        assert!(StayRange::new(date(2025, 6, 1), date(2025, 6, 2))
            .validate()
            .is_ok());
    }
}
