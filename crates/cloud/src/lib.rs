//! Adapters for the hosted services behind the event board.
//!
//! - [`geocoding`]: Mapbox places API behind [`eventboard_core::geo::Geocoder`].
//! - [`storage`]: S3-compatible bucket behind [`eventboard_core::upload::ImageStore`].
//! - [`identity`]: GoTrue-style identity REST API, plus a client-side
//!   [`eventboard_core::session::IdentityProvider`] built on it.

pub mod geocoding;
pub mod identity;
pub mod storage;
