//! Hotel API endpoints
//!
//! Browsing (list, detail, availability, quote) is public; listing management
//! requires an owner or admin session.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use hc_core::booking::{PriceQuote, RoomAvailability, StayRange};
use hc_core::hotel::{Amenity, Hotel, Location, RoomType};
use hc_core::marketplace::MarketplaceRepository;

use crate::auth::resolve_session;
use crate::routes::{auth_error, core_error, route_error, RouteError};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomTypeRequest {
    /// Present when editing: keeps the room id stable so existing bookings
    /// still reference it
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub beds: Option<u32>,
    pub max_guests: u32,
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelRequest {
    pub name: String,
    pub location: Location,
    #[serde(default)]
    pub owner_email: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    /// Indicative nightly price, used while no rooms are listed
    #[serde(default)]
    pub price_per_night: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amenities: Vec<Amenity>,
    #[serde(default)]
    pub room_types: Vec<RoomTypeRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListHotelsQuery {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub min_rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StayQuery {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteQuery {
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

fn room_from_request(req: RoomTypeRequest) -> RoomType {
    RoomType {
        id: req.id.unwrap_or_else(Uuid::new_v4),
        name: req.name,
        description: req.description,
        price: req.price,
        beds: req.beds.unwrap_or(1),
        max_guests: req.max_guests,
        quantity: req.quantity,
        image: req.image.unwrap_or_default(),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/hotels - Browse listings, optionally filtered
async fn list_hotels(
    State(state): State<AppState>,
    Query(query): Query<ListHotelsQuery>,
) -> Result<Json<Vec<Hotel>>, RouteError> {
    let hotels = state.market().list_hotels().await.map_err(core_error)?;

    let filtered = hotels
        .into_iter()
        .filter(|hotel| match query.city.as_deref() {
            Some(city) => hotel
                .location
                .city
                .to_lowercase()
                .contains(&city.to_lowercase()),
            None => true,
        })
        .filter(|hotel| match query.max_price {
            Some(max) => hotel.price_per_night <= max,
            None => true,
        })
        .filter(|hotel| match query.min_rating {
            Some(min) => hotel.rating >= min,
            None => true,
        })
        .collect();

    Ok(Json(filtered))
}

/// POST /api/hotels - Create a listing (owner/admin)
async fn create_hotel(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<HotelRequest>,
) -> Result<(StatusCode, Json<Hotel>), RouteError> {
    let session = resolve_session(state.auth(), &headers)
        .await
        .map_err(auth_error)?;

    let mut hotel = Hotel::new(
        req.name,
        req.owner_email.unwrap_or_default(),
        req.location,
    );
    hotel.images = req.images;
    hotel.rating = req.rating.unwrap_or(0.0);
    hotel.price_per_night = req.price_per_night.unwrap_or(0.0);
    hotel.description = req.description.unwrap_or_default();
    hotel.amenities = req.amenities;
    hotel.room_types = req.room_types.into_iter().map(room_from_request).collect();

    let created = state
        .market()
        .upsert_hotel(&session.actor(), hotel)
        .await
        .map_err(core_error)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/hotels/{id} - Listing detail
async fn get_hotel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Hotel>, RouteError> {
    let hotel = state.market().get_hotel(id).await.map_err(core_error)?;
    match hotel {
        Some(hotel) => Ok(Json(hotel)),
        None => Err(route_error(
            StatusCode::NOT_FOUND,
            format!("Hotel {} not found", id),
        )),
    }
}

/// PUT /api/hotels/{id} - Replace a listing's content (owner/admin)
async fn update_hotel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<HotelRequest>,
) -> Result<Json<Hotel>, RouteError> {
    let session = resolve_session(state.auth(), &headers)
        .await
        .map_err(auth_error)?;

    let existing = state
        .market()
        .get_hotel(id)
        .await
        .map_err(core_error)?
        .ok_or_else(|| route_error(StatusCode::NOT_FOUND, format!("Hotel {} not found", id)))?;

    // Ownership travels with the listing, not with the edit payload
    let hotel = Hotel {
        id: existing.id,
        name: req.name,
        owner_email: existing.owner_email,
        location: req.location,
        images: req.images,
        rating: req.rating.unwrap_or(existing.rating),
        price_per_night: req.price_per_night.unwrap_or(existing.price_per_night),
        description: req.description.unwrap_or(existing.description),
        amenities: req.amenities,
        room_types: req.room_types.into_iter().map(room_from_request).collect(),
    };

    let updated = state
        .market()
        .upsert_hotel(&session.actor(), hotel)
        .await
        .map_err(core_error)?;
    Ok(Json(updated))
}

/// DELETE /api/hotels/{id} - Remove a listing and its bookings (admin)
async fn delete_hotel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, RouteError> {
    let session = resolve_session(state.auth(), &headers)
        .await
        .map_err(auth_error)?;
    let deleted = state
        .market()
        .delete_hotel(&session.actor(), id)
        .await
        .map_err(core_error)?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(route_error(
            StatusCode::NOT_FOUND,
            format!("Hotel {} not found", id),
        ))
    }
}

/// GET /api/hotels/{id}/availability - Remaining units per room type
async fn room_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<StayQuery>,
) -> Result<Json<Vec<RoomAvailability>>, RouteError> {
    let stay = StayRange::new(query.check_in, query.check_out);
    let counts = state
        .market()
        .room_availability(id, stay)
        .await
        .map_err(core_error)?;
    Ok(Json(counts))
}

/// GET /api/hotels/{id}/quote - Price preview for one room over a stay
async fn quote(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<PriceQuote>, RouteError> {
    let stay = StayRange::new(query.check_in, query.check_out);
    let preview = state
        .market()
        .quote(id, query.room_id, stay)
        .await
        .map_err(core_error)?;
    Ok(Json(preview))
}

// ============================================================================
// Router
// ============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/hotels", get(list_hotels).post(create_hotel))
        .route(
            "/api/hotels/{id}",
            get(get_hotel).put(update_hotel).delete(delete_hotel),
        )
        .route("/api/hotels/{id}/availability", get(room_availability))
        .route("/api/hotels/{id}/quote", get(quote))
}
