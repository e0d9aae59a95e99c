//! File-backed marketplace storage
//!
//! Hotels and bookings live in one JSON document guarded by one RwLock, so
//! cascade deletion and the check-then-act booking sequence are atomic with
//! respect to every other marketplace operation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::booking::{
    available_count, hotel_availability, quote, Booking, BookingRequest, BookingStatus, PriceQuote,
    RoomAvailability, StayRange,
};
use crate::hotel::Hotel;
use crate::user::Actor;
use crate::{Error, Result};

use super::repository::MarketplaceRepository;

#[derive(Debug, Default)]
struct MarketState {
    hotels: HashMap<Uuid, Hotel>,
    bookings: HashMap<Uuid, Booking>,
}

/// On-disk form of the marketplace: the two collections as flat arrays.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredMarketState {
    registered_hotels: Vec<Hotel>,
    hotel_bookings: Vec<Booking>,
}

impl From<StoredMarketState> for MarketState {
    fn from(value: StoredMarketState) -> Self {
        Self {
            hotels: value
                .registered_hotels
                .into_iter()
                .map(|item| (item.id, item))
                .collect(),
            bookings: value
                .hotel_bookings
                .into_iter()
                .map(|item| (item.id, item))
                .collect(),
        }
    }
}

impl From<&MarketState> for StoredMarketState {
    fn from(value: &MarketState) -> Self {
        Self {
            registered_hotels: value.hotels.values().cloned().collect(),
            hotel_bookings: value.bookings.values().cloned().collect(),
        }
    }
}

/// Thread-safe marketplace store with file persistence
pub struct FileMarketStore {
    state: Arc<RwLock<MarketState>>,
    file_path: PathBuf,
}

impl FileMarketStore {
    /// Create a new FileMarketStore backed by the given file.
    ///
    /// A missing file starts an empty marketplace. An unreadable file also
    /// starts empty, with a logged warning, so one corrupt write does not
    /// brick the whole application.
    pub async fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = load_state(&path).await?;
        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            file_path: path,
        })
    }
}

#[async_trait]
impl MarketplaceRepository for FileMarketStore {
    async fn list_hotels(&self) -> Result<Vec<Hotel>> {
        let state = self.state.read().await;
        let mut hotels: Vec<Hotel> = state.hotels.values().cloned().collect();
        hotels.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(hotels)
    }

    async fn get_hotel(&self, id: Uuid) -> Result<Option<Hotel>> {
        let state = self.state.read().await;
        Ok(state.hotels.get(&id).cloned())
    }

    async fn upsert_hotel(&self, actor: &Actor, mut hotel: Hotel) -> Result<Hotel> {
        if !actor.role.can_list_hotels() {
            return Err(Error::AuthorizationDenied(
                "Only property owners can manage listings".to_string(),
            ));
        }
        if hotel.owner_email.trim().is_empty() {
            hotel.owner_email = actor.email.clone();
        }
        if !actor.is_admin() && !hotel.is_owned_by(&actor.email) {
            return Err(Error::AuthorizationDenied(
                "A listing must belong to the account that creates it".to_string(),
            ));
        }
        hotel.validate()?;
        hotel.normalize();

        let mut state = self.state.write().await;
        if let Some(existing) = state.hotels.get(&hotel.id) {
            if !actor.is_admin() && !existing.is_owned_by(&actor.email) {
                return Err(Error::AuthorizationDenied(
                    "Only the listing's owner or an admin can edit it".to_string(),
                ));
            }
        }
        state.hotels.insert(hotel.id, hotel.clone());
        persist_state(&self.file_path, &state).await?;
        Ok(hotel)
    }

    async fn delete_hotel(&self, actor: &Actor, id: Uuid) -> Result<bool> {
        if !actor.is_admin() {
            return Err(Error::AuthorizationDenied(
                "Only an admin can delete listings".to_string(),
            ));
        }

        let mut state = self.state.write().await;
        let removed = state.hotels.remove(&id).is_some();
        if removed {
            // Cascade: bookings referencing the hotel go with it
            state.bookings.retain(|_, booking| booking.hotel_id != id);
            persist_state(&self.file_path, &state).await?;
        }
        Ok(removed)
    }

    async fn list_bookings(&self, actor: &Actor) -> Result<Vec<Booking>> {
        if !actor.is_admin() {
            return Err(Error::AuthorizationDenied(
                "Only an admin can list every booking".to_string(),
            ));
        }
        let state = self.state.read().await;
        let mut bookings: Vec<Booking> = state.bookings.values().cloned().collect();
        bookings.sort_by(|a, b| b.booked_at.cmp(&a.booked_at));
        Ok(bookings)
    }

    async fn list_bookings_for_hotel(&self, actor: &Actor, hotel_id: Uuid) -> Result<Vec<Booking>> {
        let state = self.state.read().await;
        let hotel = state
            .hotels
            .get(&hotel_id)
            .ok_or_else(|| Error::HotelNotFound(hotel_id.to_string()))?;
        if !actor.is_admin() && !hotel.is_owned_by(&actor.email) {
            return Err(Error::AuthorizationDenied(
                "Only the hotel's owner or an admin can view its bookings".to_string(),
            ));
        }
        let mut bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|b| b.hotel_id == hotel_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.booked_at.cmp(&a.booked_at));
        Ok(bookings)
    }

    async fn list_bookings_for_owner(&self, owner_email: &str) -> Result<Vec<Booking>> {
        let state = self.state.read().await;
        let mut bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|b| b.hotel_owner_email.eq_ignore_ascii_case(owner_email))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.booked_at.cmp(&a.booked_at));
        Ok(bookings)
    }

    async fn list_bookings_for_guest(&self, guest_email: &str) -> Result<Vec<Booking>> {
        let state = self.state.read().await;
        let mut bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|b| b.guest_email.eq_ignore_ascii_case(guest_email))
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.booked_at.cmp(&a.booked_at));
        Ok(bookings)
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>> {
        let state = self.state.read().await;
        Ok(state.bookings.get(&id).cloned())
    }

    async fn create_booking(&self, actor: &Actor, request: BookingRequest) -> Result<Booking> {
        if !actor.role.can_book() {
            return Err(Error::AuthorizationDenied(
                "Only guest accounts can place bookings".to_string(),
            ));
        }

        // Everything from the availability check to the insert runs under
        // this write lock; a racing request cannot invalidate the count.
        let mut state = self.state.write().await;

        if let Some(id) = request.booking_id {
            // Idempotent retry: an id we already accepted returns the
            // stored booking instead of reserving a second unit.
            if let Some(existing) = state.bookings.get(&id) {
                return Ok(existing.clone());
            }
        }

        let hotel = state
            .hotels
            .get(&request.hotel_id)
            .ok_or_else(|| Error::HotelNotFound(request.hotel_id.to_string()))?;
        let room = hotel
            .room_type(request.room_id)
            .ok_or_else(|| Error::RoomNotFound(request.room_id.to_string()))?;

        request.stay.validate()?;
        if request.guests < 1 || request.guests > room.max_guests {
            return Err(Error::GuestCountExceeded {
                requested: request.guests,
                max_guests: room.max_guests,
            });
        }

        let hotel_bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|b| b.hotel_id == request.hotel_id)
            .cloned()
            .collect();
        if available_count(room, &request.stay, &hotel_bookings) == 0 {
            return Err(Error::RoomUnavailable {
                room: room.name.clone(),
            });
        }

        let price = quote(room, &request.stay);
        let booking = Booking {
            id: request.booking_id.unwrap_or_else(Uuid::new_v4),
            hotel_id: hotel.id,
            hotel_name: hotel.name.clone(),
            hotel_owner_email: hotel.owner_email.clone(),
            room_id: room.id,
            room_name: room.name.clone(),
            check_in: request.stay.check_in,
            check_out: request.stay.check_out,
            guests: request.guests,
            total_price: price.total,
            guest_name: request.guest.name,
            guest_email: request.guest.email,
            guest_phone: request.guest.phone,
            booked_at: Utc::now(),
            status: BookingStatus::Pending,
            receipt_id: None,
        };
        state.bookings.insert(booking.id, booking.clone());
        persist_state(&self.file_path, &state).await?;
        Ok(booking)
    }

    async fn update_booking_status(
        &self,
        actor: &Actor,
        booking_id: Uuid,
        status: BookingStatus,
        receipt_id: Option<Uuid>,
    ) -> Result<Booking> {
        let mut state = self.state.write().await;
        let booking = state
            .bookings
            .get_mut(&booking_id)
            .ok_or_else(|| Error::BookingNotFound(booking_id.to_string()))?;

        if !actor.is_admin() && !booking.hotel_owner_email.eq_ignore_ascii_case(&actor.email) {
            return Err(Error::AuthorizationDenied(
                "Only the hotel's owner or an admin can update a booking".to_string(),
            ));
        }
        if !booking.status.can_transition_to(status) {
            return Err(Error::InvalidTransition {
                from: booking.status,
                to: status,
            });
        }

        booking.status = status;
        if status == BookingStatus::Confirmed {
            booking.receipt_id = receipt_id;
        }
        let updated = booking.clone();
        persist_state(&self.file_path, &state).await?;
        Ok(updated)
    }

    async fn room_availability(
        &self,
        hotel_id: Uuid,
        stay: StayRange,
    ) -> Result<Vec<RoomAvailability>> {
        let state = self.state.read().await;
        let hotel = state
            .hotels
            .get(&hotel_id)
            .ok_or_else(|| Error::HotelNotFound(hotel_id.to_string()))?;
        let hotel_bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|b| b.hotel_id == hotel_id)
            .cloned()
            .collect();
        Ok(hotel_availability(hotel, &stay, &hotel_bookings))
    }

    async fn quote(&self, hotel_id: Uuid, room_id: Uuid, stay: StayRange) -> Result<PriceQuote> {
        let state = self.state.read().await;
        let hotel = state
            .hotels
            .get(&hotel_id)
            .ok_or_else(|| Error::HotelNotFound(hotel_id.to_string()))?;
        let room = hotel
            .room_type(room_id)
            .ok_or_else(|| Error::RoomNotFound(room_id.to_string()))?;
        Ok(quote(room, &stay))
    }

    async fn confirmed_revenue(&self, owner_email: &str) -> Result<f64> {
        let state = self.state.read().await;
        Ok(state
            .bookings
            .values()
            .filter(|b| {
                b.status == BookingStatus::Confirmed
                    && b.hotel_owner_email.eq_ignore_ascii_case(owner_email)
            })
            .map(|b| b.total_price)
            .sum())
    }
}

async fn load_state(path: &Path) -> Result<MarketState> {
    if !path.exists() {
        return Ok(MarketState::default());
    }
    let content = tokio::fs::read_to_string(path).await?;
    if content.trim().is_empty() {
        return Ok(MarketState::default());
    }
    match serde_json::from_str::<StoredMarketState>(&content) {
        Ok(stored) => Ok(stored.into()),
        Err(err) => {
            tracing::warn!(
                "Unreadable marketplace state at {:?}, starting empty: {}",
                path,
                err
            );
            Ok(MarketState::default())
        }
    }
}

async fn persist_state(path: &Path, state: &MarketState) -> Result<()> {
    let content = serde_json::to_string_pretty(&StoredMarketState::from(state))?;

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    tokio::fs::write(path, content).await?;
    Ok(())
}
