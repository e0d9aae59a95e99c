//! Marketplace module
//!
//! The repository interface over hotels and bookings, and its file-backed
//! implementation.

mod file_store;
mod repository;

pub use file_store::FileMarketStore;
pub use repository::MarketplaceRepository;
