//! Nightly pricing calculator
//!
//! Price is per room per night, independent of guest count up to the room's
//! capacity. Previews of a degenerate range quote a single night; actually
//! booking such a range is rejected upstream with InvalidDateRange.

use serde::Serialize;
use uuid::Uuid;

use crate::hotel::RoomType;

use super::model::StayRange;

/// A computed price for one room over one stay.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub room_id: Uuid,
    pub nights: u32,
    pub price_per_night: f64,
    pub total: f64,
}

/// Nights to charge for a quote: at least one, even for a same-day or
/// inverted range.
pub fn nights_for_quote(stay: &StayRange) -> u32 {
    stay.nights().max(1) as u32
}

/// Quote `room` for `stay`: `nights * price`.
pub fn quote(room: &RoomType, stay: &StayRange) -> PriceQuote {
    let nights = nights_for_quote(stay);
    PriceQuote {
        room_id: room.id,
        nights,
        price_per_night: room.price,
        total: nights as f64 * room.price,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_price_is_nights_times_rate() {
        let room = RoomType::new("Standard", 100.0, 2, 1);
        for n in 1..=7u32 {
            let stay = StayRange::new(date(1), date(1 + n));
            let result = quote(&room, &stay);
            assert_eq!(result.nights, n);
            assert_eq!(result.total, n as f64 * 100.0);
        }
    }

    #[test]
    fn test_guest_count_never_multiplies_price() {
        // The quote is a function of room and stay only; there is no guest
        // parameter to multiply by.
        let room = RoomType::new("Family", 80.0, 6, 1);
        let stay = StayRange::new(date(1), date(3));
        assert_eq!(quote(&room, &stay).total, 160.0);
    }

    #[test]
    fn test_degenerate_range_quotes_one_night() {
        let room = RoomType::new("Standard", 100.0, 2, 1);
        let same_day = StayRange::new(date(5), date(5));
        let inverted = StayRange::new(date(5), date(2));

        assert_eq!(quote(&room, &same_day).total, 100.0);
        assert_eq!(quote(&room, &inverted).nights, 1);
    }
}
