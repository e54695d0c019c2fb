//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Listing filters (`?category=&q=&when=&columns=&width=`).
///
/// `columns` wins over `width` when both are given; with neither the
/// listing is laid out in the widest layout.
#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    pub category: Option<String>,
    pub q: Option<String>,
    pub when: Option<String>,
    pub columns: Option<usize>,
    pub width: Option<u32>,
}

/// Moderation queue filter (`?status=`), defaulting to pending.
#[derive(Debug, Deserialize)]
pub struct StatusParams {
    pub status: Option<String>,
}

/// Address lookup (`?q=`).
#[derive(Debug, Deserialize)]
pub struct GeocodeParams {
    #[serde(default)]
    pub q: String,
}
