//! Mapbox places geocoding client.

use async_trait::async_trait;
use eventboard_core::geo::{AddressSuggestion, Coordinates, GeocodeError, Geocoder, MAX_SUGGESTIONS};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://api.mapbox.com";
pub const DEFAULT_COUNTRY: &str = "us";

/// Feature types requested from the places endpoint.
const FEATURE_TYPES: &str = "address,place,poi";

/// HTTP client for the Mapbox forward-geocoding endpoint.
pub struct MapboxGeocoder {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    id: String,
    place_name: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    /// `[longitude, latitude]`.
    coordinates: Vec<f64>,
}

impl MapboxGeocoder {
    pub fn new(base_url: String, access_token: String, country: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, access_token, country)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: String,
        access_token: String,
        country: String,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
            country,
        }
    }

    fn places_url(&self, query: &str) -> String {
        format!(
            "{}/geocoding/v5/mapbox.places/{}.json",
            self.base_url,
            urlencoding::encode(query)
        )
    }

    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GeocodeError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GeocodeError::Service {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

fn into_suggestions(response: PlacesResponse) -> Vec<AddressSuggestion> {
    response
        .features
        .into_iter()
        .filter_map(|f| match f.geometry.coordinates.as_slice() {
            [longitude, latitude, ..] => Some(AddressSuggestion {
                id: f.id,
                address: f.place_name,
                coordinates: Coordinates::new(*longitude, *latitude),
            }),
            _ => None,
        })
        .collect()
}

#[async_trait]
impl Geocoder for MapboxGeocoder {
    async fn suggest(&self, query: &str) -> Result<Vec<AddressSuggestion>, GeocodeError> {
        let limit = MAX_SUGGESTIONS.to_string();
        let response = self
            .client
            .get(self.places_url(query))
            .query(&[
                ("access_token", self.access_token.as_str()),
                ("country", self.country.as_str()),
                ("types", FEATURE_TYPES),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| GeocodeError::Transport(e.to_string()))?;

        let response = Self::ensure_success(response).await?;
        let places: PlacesResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::Decode(e.to_string()))?;

        Ok(into_suggestions(places))
    }
}
