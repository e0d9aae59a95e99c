//! Marketplace repository trait
//!
//! Defines the storage interface for hotels and bookings. Every mutating
//! operation takes the acting identity so authorization is enforced at the
//! same layer that owns the data.

use async_trait::async_trait;
use uuid::Uuid;

use crate::booking::{Booking, BookingRequest, BookingStatus, PriceQuote, RoomAvailability, StayRange};
use crate::hotel::Hotel;
use crate::user::Actor;
use crate::Result;

#[async_trait]
pub trait MarketplaceRepository: Send + Sync {
    /// All listed hotels
    async fn list_hotels(&self) -> Result<Vec<Hotel>>;

    /// Get a hotel by ID
    async fn get_hotel(&self, id: Uuid) -> Result<Option<Hotel>>;

    /// Create or update a listing. Owners may only touch their own hotels;
    /// admins may touch any. Listing invariants are validated and the
    /// display price recomputed.
    async fn upsert_hotel(&self, actor: &Actor, hotel: Hotel) -> Result<Hotel>;

    /// Delete a listing (admin only). Cascades to every booking that
    /// references the hotel.
    async fn delete_hotel(&self, actor: &Actor, id: Uuid) -> Result<bool>;

    /// Every booking on the marketplace, for the admin dashboard
    async fn list_bookings(&self, actor: &Actor) -> Result<Vec<Booking>>;

    /// Bookings for one hotel, visible to its owner or an admin
    async fn list_bookings_for_hotel(&self, actor: &Actor, hotel_id: Uuid) -> Result<Vec<Booking>>;

    /// Bookings across all hotels owned by `owner_email`, newest first
    async fn list_bookings_for_owner(&self, owner_email: &str) -> Result<Vec<Booking>>;

    /// Bookings placed by a guest, newest first
    async fn list_bookings_for_guest(&self, guest_email: &str) -> Result<Vec<Booking>>;

    /// Get a booking by ID
    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>>;

    /// Place a booking. Validates role, date range, guest count and
    /// availability; the availability check and the insert happen under one
    /// write lock so a racing request cannot oversell the room.
    async fn create_booking(&self, actor: &Actor, request: BookingRequest) -> Result<Booking>;

    /// Move a pending booking to confirmed or cancelled. Only the hotel's
    /// owner or an admin may call this; terminal bookings never change.
    async fn update_booking_status(
        &self,
        actor: &Actor,
        booking_id: Uuid,
        status: BookingStatus,
        receipt_id: Option<Uuid>,
    ) -> Result<Booking>;

    /// Remaining inventory per room type for a candidate stay
    async fn room_availability(&self, hotel_id: Uuid, stay: StayRange) -> Result<Vec<RoomAvailability>>;

    /// Price preview for one room over a stay (degenerate ranges quote one night)
    async fn quote(&self, hotel_id: Uuid, room_id: Uuid, stay: StayRange) -> Result<PriceQuote>;

    /// Realized revenue for an owner: confirmed bookings only
    async fn confirmed_revenue(&self, owner_email: &str) -> Result<f64>;
}
