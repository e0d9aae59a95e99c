//! User module
//!
//! Registry records and the authorization view (`Actor`) the repository
//! checks marketplace operations against.

mod model;

pub use model::*;
