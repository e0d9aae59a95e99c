//! Room availability calculator
//!
//! Availability over a stay window is quantity minus *peak* concurrent usage,
//! not the sum of overlapping bookings: a guest needs the same physical unit
//! on every night of the stay, so one saturated day blocks the whole window.

use serde::Serialize;
use uuid::Uuid;

use crate::hotel::{Hotel, RoomType};

use super::model::{Booking, StayRange};

/// Remaining inventory for one room type over a candidate stay.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomAvailability {
    pub room_id: Uuid,
    pub room_name: String,
    pub quantity: u32,
    pub available: u32,
}

/// Highest number of bookings of `room_id` holding inventory on any single
/// day of the stay. Cancelled bookings are ignored; interval overlap is
/// half-open on both sides.
pub fn peak_usage(room_id: Uuid, stay: &StayRange, bookings: &[Booking]) -> u32 {
    stay.days()
        .map(|day| {
            bookings
                .iter()
                .filter(|b| b.room_id == room_id && b.status.holds_inventory() && b.covers(day))
                .count() as u32
        })
        .max()
        .unwrap_or(0)
}

/// Units of `room` still bookable for the stay. Zero means the type must be
/// excluded from selection for that date range.
pub fn available_count(room: &RoomType, stay: &StayRange, bookings: &[Booking]) -> u32 {
    room.quantity.saturating_sub(peak_usage(room.id, stay, bookings))
}

/// Per-room-type availability for a whole hotel. Recomputed whenever the
/// candidate date range changes.
pub fn hotel_availability(
    hotel: &Hotel,
    stay: &StayRange,
    bookings: &[Booking],
) -> Vec<RoomAvailability> {
    hotel
        .room_types
        .iter()
        .map(|room| RoomAvailability {
            room_id: room.id,
            room_name: room.name.clone(),
            quantity: room.quantity,
            available: available_count(room, stay, bookings),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use crate::booking::BookingStatus;

    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn booking(room_id: Uuid, check_in: NaiveDate, check_out: NaiveDate) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            hotel_id: Uuid::new_v4(),
            hotel_name: "H".to_string(),
            hotel_owner_email: "owner@example.com".to_string(),
            room_id,
            room_name: "R".to_string(),
            check_in,
            check_out,
            guests: 2,
            total_price: 100.0,
            guest_name: "Guest".to_string(),
            guest_email: "guest@example.com".to_string(),
            guest_phone: "555-0100".to_string(),
            booked_at: Utc::now(),
            status: BookingStatus::Pending,
            receipt_id: None,
        }
    }

    #[test]
    fn test_availability_drops_as_bookings_accumulate() {
        let room = RoomType::new("Standard", 100.0, 2, 3);
        let stay = StayRange::new(date(1), date(4));
        let mut bookings = Vec::new();

        for expected in [3, 2, 1, 0] {
            assert_eq!(available_count(&room, &stay, &bookings), expected);
            bookings.push(booking(room.id, date(1), date(4)));
        }

        // Saturated beyond quantity stays at zero rather than underflowing
        assert_eq!(available_count(&room, &stay, &bookings), 0);
    }

    #[test]
    fn test_cancellation_restores_availability() {
        let room = RoomType::new("Standard", 100.0, 2, 1);
        let stay = StayRange::new(date(1), date(3));
        let mut bookings = vec![booking(room.id, date(1), date(3))];

        assert_eq!(available_count(&room, &stay, &bookings), 0);
        bookings[0].status = BookingStatus::Cancelled;
        assert_eq!(available_count(&room, &stay, &bookings), 1);
    }

    #[test]
    fn test_peak_not_sum() {
        // Two bookings on distinct single days of a 3-night stay: no day has
        // more than one overlapping booking, so the peak is 1, not 2.
        let room = RoomType::new("Standard", 100.0, 2, 2);
        let stay = StayRange::new(date(1), date(4));
        let bookings = vec![
            booking(room.id, date(1), date(2)),
            booking(room.id, date(3), date(4)),
        ];

        assert_eq!(peak_usage(room.id, &stay, &bookings), 1);
        assert_eq!(available_count(&room, &stay, &bookings), 1);
    }

    #[test]
    fn test_half_open_intervals_do_not_conflict() {
        // [Jan 1, Jan 3) ends the day [Jan 3, Jan 5) begins.
        let room = RoomType::new("Standard", 100.0, 2, 1);
        let existing = vec![booking(room.id, date(1), date(3))];
        let request = StayRange::new(date(3), date(5));

        assert_eq!(peak_usage(room.id, &request, &existing), 0);
        assert_eq!(available_count(&room, &request, &existing), 1);
    }

    #[test]
    fn test_zero_quantity_is_always_unavailable() {
        let mut room = RoomType::new("Phantom", 100.0, 2, 1);
        room.quantity = 0;
        let stay = StayRange::new(date(1), date(2));
        assert_eq!(available_count(&room, &stay, &[]), 0);
    }

    #[test]
    fn test_other_rooms_do_not_count() {
        let room = RoomType::new("Standard", 100.0, 2, 1);
        let other = RoomType::new("Suite", 200.0, 4, 1);
        let stay = StayRange::new(date(1), date(3));
        let bookings = vec![booking(other.id, date(1), date(3))];

        assert_eq!(available_count(&room, &stay, &bookings), 1);
    }

    #[test]
    fn test_hotel_availability_covers_every_room_type() {
        let hotel = Hotel::new(
            "Lakeside",
            "owner@example.com",
            crate::hotel::Location::new("Oslo", "Norway"),
        )
        .with_room_type(RoomType::new("Standard", 100.0, 2, 2))
        .with_room_type(RoomType::new("Suite", 200.0, 4, 1));

        let stay = StayRange::new(date(1), date(3));
        let bookings = vec![booking(hotel.room_types[0].id, date(2), date(3))];

        let counts = hotel_availability(&hotel, &stay, &bookings);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].available, 1);
        assert_eq!(counts[1].available, 1);
        assert_eq!(counts[0].quantity, 2);
    }
}
