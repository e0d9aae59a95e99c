//! Hotel and room inventory model definitions

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Maximum number of gallery images a listing may carry.
pub const MAX_HOTEL_IMAGES: usize = 3;

/// Amenity tags a hotel can advertise. Closed vocabulary; listings pick a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Amenity {
    Wifi,
    Pool,
    Parking,
    AirConditioning,
    Restaurant,
    Gym,
    Spa,
    PetFriendly,
    Bar,
    Tv,
    Kitchen,
    Washer,
    Dryer,
    Heating,
    BeachAccess,
    Fireplace,
    LakeView,
    BoatTours,
    DesertSafari,
}

/// Where a hotel is. City and country are required; the rest is display data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub city: String,
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl Location {
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
            address: None,
            lat: None,
            lng: None,
        }
    }
}

/// A category of room within a hotel.
///
/// `quantity` is the total number of physical units of this type; the
/// availability calculator subtracts peak concurrent usage from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomType {
    /// Unique room type identifier (referenced by bookings)
    pub id: Uuid,

    /// Display name (e.g., "Deluxe King")
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Per-night price for the whole room, independent of occupancy
    pub price: f64,

    /// Number of beds in one unit
    pub beds: u32,

    /// Maximum guests one unit sleeps
    pub max_guests: u32,

    /// Total physical units of this type in the hotel
    pub quantity: u32,

    /// Image URL or embedded data
    pub image: String,
}

impl RoomType {
    /// Create a room type with the required fields
    pub fn new(name: impl Into<String>, price: f64, max_guests: u32, quantity: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            price,
            beds: 1,
            max_guests,
            quantity,
            image: String::new(),
        }
    }

    /// Set the number of beds
    pub fn with_beds(mut self, beds: u32) -> Self {
        self.beds = beds;
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the image
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput(
                "Room type name cannot be empty".to_string(),
            ));
        }
        if self.price <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "Room type '{}' must have a positive price",
                self.name
            )));
        }
        if self.beds < 1 || self.max_guests < 1 || self.quantity < 1 {
            return Err(Error::InvalidInput(format!(
                "Room type '{}' needs at least one bed, guest slot and unit",
                self.name
            )));
        }
        Ok(())
    }
}

/// A property listed on the marketplace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    /// Unique hotel identifier
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email of the owning user. Weak reference: looked up by value,
    /// never enforced against the user registry.
    pub owner_email: String,

    pub location: Location,

    /// Gallery images, at most [`MAX_HOTEL_IMAGES`]
    pub images: Vec<String>,

    /// Guest rating, 0.0 to 5.0
    pub rating: f64,

    /// Display price: minimum room price when rooms exist, otherwise the
    /// owner-supplied indicative price. Recomputed by [`Hotel::normalize`].
    pub price_per_night: f64,

    pub description: String,

    pub amenities: Vec<Amenity>,

    pub room_types: Vec<RoomType>,
}

impl Hotel {
    /// Create a new listing with the required fields
    pub fn new(name: impl Into<String>, owner_email: impl Into<String>, location: Location) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            owner_email: owner_email.into(),
            location,
            images: Vec::new(),
            rating: 0.0,
            price_per_night: 0.0,
            description: String::new(),
            amenities: Vec::new(),
            room_types: Vec::new(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the rating
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    /// Set the indicative nightly price (used while no rooms are listed)
    pub fn with_price_per_night(mut self, price: f64) -> Self {
        self.price_per_night = price;
        self
    }

    /// Set the amenity tags
    pub fn with_amenities(mut self, amenities: Vec<Amenity>) -> Self {
        self.amenities = amenities;
        self
    }

    /// Add a room type
    pub fn with_room_type(mut self, room: RoomType) -> Self {
        self.room_types.push(room);
        self
    }

    /// Look up an embedded room type by id
    pub fn room_type(&self, room_id: Uuid) -> Option<&RoomType> {
        self.room_types.iter().find(|room| room.id == room_id)
    }

    /// True when `email` owns this listing. Emails compare case-insensitively.
    pub fn is_owned_by(&self, email: &str) -> bool {
        self.owner_email.eq_ignore_ascii_case(email)
    }

    /// Re-establish the display-price invariant: `price_per_night` equals the
    /// minimum room price whenever rooms exist. With no rooms, the
    /// owner-supplied indicative value is left alone.
    pub fn normalize(&mut self) {
        let min_room_price = self
            .room_types
            .iter()
            .map(|room| room.price)
            .fold(f64::INFINITY, f64::min);
        if min_room_price.is_finite() {
            self.price_per_night = min_room_price;
        }
    }

    /// Check listing invariants. Called before the store accepts an upsert.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput("Hotel name cannot be empty".to_string()));
        }
        if self.owner_email.trim().is_empty() {
            return Err(Error::InvalidInput(
                "Hotel must have an owner email".to_string(),
            ));
        }
        if self.location.city.trim().is_empty() || self.location.country.trim().is_empty() {
            return Err(Error::InvalidInput(
                "Hotel location needs a city and a country".to_string(),
            ));
        }
        if self.images.len() > MAX_HOTEL_IMAGES {
            return Err(Error::InvalidInput(format!(
                "A listing carries at most {} images",
                MAX_HOTEL_IMAGES
            )));
        }
        if !(0.0..=5.0).contains(&self.rating) {
            return Err(Error::InvalidInput(
                "Rating must be between 0 and 5".to_string(),
            ));
        }
        for room in &self.room_types {
            room.validate()?;
        }
        Ok(())
    }
}
