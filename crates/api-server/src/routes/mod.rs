//! Route handlers

pub mod auth;
pub mod bookings;
pub mod health;
pub mod hotels;
pub mod users;

use axum::{http::StatusCode, Json};
use serde::Serialize;

use crate::auth::AuthError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type RouteError = (StatusCode, Json<ErrorResponse>);

pub fn route_error(status: StatusCode, error: impl Into<String>) -> RouteError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// Map registry/session failures onto HTTP statuses.
pub fn auth_error(err: AuthError) -> RouteError {
    let status = match &err {
        AuthError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AuthError::AuthenticationRequired(_) => StatusCode::UNAUTHORIZED,
        AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
        AuthError::DuplicateEmail(_) => StatusCode::CONFLICT,
        AuthError::NotFound(_) => StatusCode::NOT_FOUND,
        AuthError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    route_error(status, err.to_string())
}

/// Map marketplace failures onto HTTP statuses.
pub fn core_error(err: hc_core::Error) -> RouteError {
    use hc_core::Error;
    let status = match &err {
        Error::HotelNotFound(_) | Error::RoomNotFound(_) | Error::BookingNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        Error::AuthorizationDenied(_) => StatusCode::FORBIDDEN,
        Error::InvalidDateRange { .. }
        | Error::GuestCountExceeded { .. }
        | Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::RoomUnavailable { .. } | Error::InvalidTransition { .. } => StatusCode::CONFLICT,
        Error::Io(_) | Error::Serialization(_) | Error::Storage(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    route_error(status, err.to_string())
}
