//! Error types for the core library
//!
//! Every variant below is terminal for the user action that raised it;
//! nothing here is retried automatically.

use chrono::NaiveDate;
use thiserror::Error;

use crate::booking::BookingStatus;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Hotel not found: {0}")]
    HotelNotFound(String),

    #[error("Room type not found: {0}")]
    RoomNotFound(String),

    #[error("Booking not found: {0}")]
    BookingNotFound(String),

    #[error("Not allowed: {0}")]
    AuthorizationDenied(String),

    #[error("Check-out must be after check-in (got {check_in} to {check_out})")]
    InvalidDateRange {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("Guest count {requested} exceeds the room capacity of {max_guests}")]
    GuestCountExceeded { requested: u32, max_guests: u32 },

    #[error("No '{room}' rooms left for the requested dates")]
    RoomUnavailable { room: String },

    #[error("Booking is {from}, status can no longer change to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),
}
