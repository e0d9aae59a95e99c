//! Hotel module
//!
//! A Hotel is a property listed by an owner. Room inventory is embedded:
//! RoomTypes belong to exactly one Hotel and are not addressable on their own.

mod model;

pub use model::*;
