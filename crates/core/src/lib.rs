//! Core library for Hotel Connector
//!
//! This crate contains the booking domain, including:
//! - Hotel and room inventory
//! - Availability and pricing calculators
//! - Booking lifecycle and the marketplace repository
//! - Payment gateway abstraction

pub mod booking;
pub mod error;
pub mod hotel;
pub mod marketplace;
pub mod payment;
pub mod user;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
