//! Booking API endpoints
//!
//! Guests create bookings; the hotel's owner (or an admin) settles them.
//! Confirmation charges the payment gateway first: a failed charge leaves the
//! booking pending.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use hc_core::booking::{Booking, BookingRequest, BookingStatus, GuestDetails, StayRange};
use hc_core::marketplace::MarketplaceRepository;
use hc_core::payment::{PaymentError, PaymentGateway, PaymentMethod};
use hc_core::user::{Actor, Role};

use crate::auth::resolve_session;
use crate::routes::{auth_error, core_error, route_error, RouteError};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    /// Client-generated id; resubmitting it returns the original booking
    #[serde(default)]
    pub booking_id: Option<Uuid>,
    pub hotel_id: Uuid,
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    /// Defaults to the session's full name
    #[serde(default)]
    pub guest_name: Option<String>,
    pub guest_phone: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingsQuery {
    #[serde(default)]
    pub hotel_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
    #[serde(default)]
    pub payment: Option<PaymentMethod>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDashboardResponse {
    pub total_bookings: usize,
    pub confirmed_revenue: f64,
}

#[derive(Debug, Error)]
pub enum StatusUpdateError {
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error(transparent)]
    Market(#[from] hc_core::Error),
}

/// Settle a status change: authorize, charge on confirmation, then commit.
/// The marketplace store re-validates under its write lock, so a stale
/// snapshot here can reject but never corrupt.
pub(crate) async fn settle_status_change(
    market: &dyn MarketplaceRepository,
    payments: &dyn PaymentGateway,
    actor: &Actor,
    booking_id: Uuid,
    status: BookingStatus,
    method: PaymentMethod,
) -> Result<Booking, StatusUpdateError> {
    let booking = market
        .get_booking(booking_id)
        .await?
        .ok_or_else(|| hc_core::Error::BookingNotFound(booking_id.to_string()))?;

    if !actor.is_admin() && !booking.hotel_owner_email.eq_ignore_ascii_case(&actor.email) {
        return Err(hc_core::Error::AuthorizationDenied(
            "Only the hotel's owner or an admin can update a booking".to_string(),
        )
        .into());
    }
    if !booking.status.can_transition_to(status) {
        return Err(hc_core::Error::InvalidTransition {
            from: booking.status,
            to: status,
        }
        .into());
    }

    let receipt = if status == BookingStatus::Confirmed {
        Some(payments.charge(booking.total_price, &method).await?)
    } else {
        None
    };

    let updated = market
        .update_booking_status(actor, booking_id, status, receipt.map(|r| r.id))
        .await?;
    Ok(updated)
}

fn status_update_error(err: StatusUpdateError) -> RouteError {
    match err {
        StatusUpdateError::Payment(PaymentError::Declined(reason)) => route_error(
            StatusCode::PAYMENT_REQUIRED,
            format!("payment declined: {}", reason),
        ),
        StatusUpdateError::Payment(PaymentError::GatewayUnavailable(reason)) => route_error(
            StatusCode::BAD_GATEWAY,
            format!("payment gateway unavailable: {}", reason),
        ),
        StatusUpdateError::Market(err) => core_error(err),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/bookings - Place a booking (guests only)
async fn create_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), RouteError> {
    let session = resolve_session(state.auth(), &headers)
        .await
        .map_err(auth_error)?;

    let request = BookingRequest {
        booking_id: req.booking_id,
        hotel_id: req.hotel_id,
        room_id: req.room_id,
        stay: StayRange::new(req.check_in, req.check_out),
        guests: req.guests,
        guest: GuestDetails {
            name: req.guest_name.unwrap_or_else(|| session.user.full_name.clone()),
            email: session.user.email.clone(),
            phone: req.guest_phone,
        },
    };

    let booking = state
        .market()
        .create_booking(&session.actor(), request)
        .await
        .map_err(core_error)?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /api/bookings - Bookings for one hotel (owner/admin), or all (admin)
async fn list_bookings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<Booking>>, RouteError> {
    let session = resolve_session(state.auth(), &headers)
        .await
        .map_err(auth_error)?;
    let actor = session.actor();

    let bookings = match query.hotel_id {
        Some(hotel_id) => state
            .market()
            .list_bookings_for_hotel(&actor, hotel_id)
            .await
            .map_err(core_error)?,
        None => state
            .market()
            .list_bookings(&actor)
            .await
            .map_err(core_error)?,
    };
    Ok(Json(bookings))
}

/// GET /api/bookings/mine - The caller's side of the ledger: placed bookings
/// for guests, received bookings for owners, everything for admins
async fn my_bookings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Booking>>, RouteError> {
    let session = resolve_session(state.auth(), &headers)
        .await
        .map_err(auth_error)?;
    let actor = session.actor();

    let bookings = match actor.role {
        Role::Booker => state
            .market()
            .list_bookings_for_guest(&actor.email)
            .await
            .map_err(core_error)?,
        Role::Owner => state
            .market()
            .list_bookings_for_owner(&actor.email)
            .await
            .map_err(core_error)?,
        Role::Admin => state
            .market()
            .list_bookings(&actor)
            .await
            .map_err(core_error)?,
    };
    Ok(Json(bookings))
}

/// PATCH /api/bookings/{id}/status - Confirm or cancel a pending booking
async fn update_booking_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(req): Json<UpdateBookingStatusRequest>,
) -> Result<Json<Booking>, RouteError> {
    let session = resolve_session(state.auth(), &headers)
        .await
        .map_err(auth_error)?;

    let booking = settle_status_change(
        state.market(),
        state.payments(),
        &session.actor(),
        id,
        req.status,
        req.payment.unwrap_or_default(),
    )
    .await
    .map_err(status_update_error)?;
    Ok(Json(booking))
}

/// GET /api/owner/dashboard - Booking count and realized revenue
async fn owner_dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<OwnerDashboardResponse>, RouteError> {
    let session = resolve_session(state.auth(), &headers)
        .await
        .map_err(auth_error)?;
    if session.user.role == Role::Booker {
        return Err(route_error(
            StatusCode::FORBIDDEN,
            "Only property owners have a dashboard",
        ));
    }

    let bookings = state
        .market()
        .list_bookings_for_owner(&session.user.email)
        .await
        .map_err(core_error)?;
    let confirmed_revenue = state
        .market()
        .confirmed_revenue(&session.user.email)
        .await
        .map_err(core_error)?;

    Ok(Json(OwnerDashboardResponse {
        total_bookings: bookings.len(),
        confirmed_revenue,
    }))
}

// ============================================================================
// Router
// ============================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/bookings", post(create_booking).get(list_bookings))
        .route("/api/bookings/mine", get(my_bookings))
        .route("/api/bookings/{id}/status", patch(update_booking_status))
        .route("/api/owner/dashboard", get(owner_dashboard))
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use hc_core::hotel::{Hotel, Location, RoomType};
    use hc_core::marketplace::FileMarketStore;
    use hc_core::payment::{AutoApproveGateway, Receipt};
    use tempfile::TempDir;

    use super::*;

    struct DecliningGateway;

    #[async_trait]
    impl PaymentGateway for DecliningGateway {
        async fn charge(
            &self,
            _amount: f64,
            _method: &PaymentMethod,
        ) -> Result<Receipt, PaymentError> {
            Err(PaymentError::Declined("insufficient funds".to_string()))
        }
    }

    async fn pending_booking() -> (FileMarketStore, Booking, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let market = FileMarketStore::new(temp_dir.path().join("market.json"))
            .await
            .unwrap();
        let owner = Actor::new("owner@example.com", Role::Owner);
        let hotel = Hotel::new("Lakeside", "owner@example.com", Location::new("Oslo", "Norway"))
            .with_room_type(RoomType::new("Standard", 100.0, 2, 1));
        let hotel = market.upsert_hotel(&owner, hotel).await.unwrap();

        let guest = Actor::new("ada@example.com", Role::Booker);
        let booking = market
            .create_booking(
                &guest,
                BookingRequest {
                    booking_id: None,
                    hotel_id: hotel.id,
                    room_id: hotel.room_types[0].id,
                    stay: StayRange::new(
                        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                        NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
                    ),
                    guests: 2,
                    guest: GuestDetails {
                        name: "Ada Guest".to_string(),
                        email: "ada@example.com".to_string(),
                        phone: "555-0100".to_string(),
                    },
                },
            )
            .await
            .unwrap();
        (market, booking, temp_dir)
    }

    #[tokio::test]
    async fn test_confirmation_records_a_receipt() {
        let (market, booking, _temp) = pending_booking().await;
        let owner = Actor::new("owner@example.com", Role::Owner);

        let confirmed = settle_status_change(
            &market,
            &AutoApproveGateway,
            &owner,
            booking.id,
            BookingStatus::Confirmed,
            PaymentMethod::default(),
        )
        .await
        .unwrap();

        assert_eq!(confirmed.status, BookingStatus::Confirmed);
        assert!(confirmed.receipt_id.is_some());
    }

    #[tokio::test]
    async fn test_declined_payment_leaves_booking_pending() {
        let (market, booking, _temp) = pending_booking().await;
        let owner = Actor::new("owner@example.com", Role::Owner);

        let result = settle_status_change(
            &market,
            &DecliningGateway,
            &owner,
            booking.id,
            BookingStatus::Confirmed,
            PaymentMethod::default(),
        )
        .await;
        assert!(matches!(
            result,
            Err(StatusUpdateError::Payment(PaymentError::Declined(_)))
        ));

        let unchanged = market.get_booking(booking.id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, BookingStatus::Pending);
        assert!(unchanged.receipt_id.is_none());
    }

    #[tokio::test]
    async fn test_cancellation_never_charges() {
        let (market, booking, _temp) = pending_booking().await;
        let owner = Actor::new("owner@example.com", Role::Owner);

        // The declining gateway would fail any charge; cancelling succeeds
        // because no charge is attempted.
        let cancelled = settle_status_change(
            &market,
            &DecliningGateway,
            &owner,
            booking.id,
            BookingStatus::Cancelled,
            PaymentMethod::default(),
        )
        .await
        .unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_guests_cannot_settle_their_own_booking() {
        let (market, booking, _temp) = pending_booking().await;
        let guest = Actor::new("ada@example.com", Role::Booker);

        let result = settle_status_change(
            &market,
            &AutoApproveGateway,
            &guest,
            booking.id,
            BookingStatus::Confirmed,
            PaymentMethod::default(),
        )
        .await;
        assert!(matches!(
            result,
            Err(StatusUpdateError::Market(
                hc_core::Error::AuthorizationDenied(_)
            ))
        ));
    }
}
