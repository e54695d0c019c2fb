//! Domain types and pure logic for the event board.
//!
//! Everything here is free of database and HTTP concerns. External services
//! (event persistence, object storage, geocoding, identity) are reached
//! through the traits defined in the individual modules so that the API
//! crate and tests can plug in their own implementations.

pub mod category;
pub mod error;
pub mod geo;
pub mod listing;
pub mod map;
pub mod schedule;
pub mod search;
pub mod session;
pub mod slug;
pub mod status;
pub mod submission;
pub mod types;
pub mod upload;
