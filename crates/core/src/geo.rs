//! Coordinates, address suggestions, and the debounced address lookup.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Queries shorter than this never reach the geocoding service.
pub const MIN_QUERY_LEN: usize = 3;

/// Maximum number of suggestions requested and returned.
pub const MAX_SUGGESTIONS: usize = 5;

/// Quiet period after the last keystroke before a lookup fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// A longitude/latitude pair in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinates {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Build from two nullable columns. Both must be present.
    pub fn from_parts(longitude: Option<f64>, latitude: Option<f64>) -> Option<Self> {
        Some(Self::new(longitude?, latitude?))
    }

    pub fn is_valid(&self) -> bool {
        (-180.0..=180.0).contains(&self.longitude) && (-90.0..=90.0).contains(&self.latitude)
    }
}

/// One candidate address returned by the geocoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressSuggestion {
    pub id: String,
    pub address: String,
    pub coordinates: Coordinates,
}

/// The location fields a selected suggestion fills into the form.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedAddress {
    pub location: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Geocoding request failed: {0}")]
    Transport(String),

    #[error("Geocoding service error ({status}): {body}")]
    Service { status: u16, body: String },

    #[error("Unexpected geocoding response: {0}")]
    Decode(String),
}

/// Text query to ranked address candidates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Candidates in the service's own relevance order.
    async fn suggest(&self, query: &str) -> Result<Vec<AddressSuggestion>, GeocodeError>;
}

/// Look up address suggestions for a partial address.
///
/// Short queries return nothing without calling the service. Service
/// failures are logged and also return nothing, since the user can always
/// fall back to typing the address by hand.
pub async fn lookup_addresses<G>(geocoder: &G, query: &str) -> Vec<AddressSuggestion>
where
    G: Geocoder + ?Sized,
{
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }

    match geocoder.suggest(query).await {
        Ok(mut suggestions) => {
            suggestions.truncate(MAX_SUGGESTIONS);
            suggestions
        }
        Err(e) => {
            tracing::warn!(error = %e, query, "Address lookup failed");
            Vec::new()
        }
    }
}

/// Debounced address lookup for an address input field.
///
/// Every call to [`input`](Self::input) cancels the pending lookup and
/// restarts the timer, so the geocoder is only called once typing pauses.
/// Results are published on a watch channel.
pub struct AddressLookup {
    geocoder: Arc<dyn Geocoder>,
    delay: Duration,
    pending: Mutex<Option<CancellationToken>>,
    suggestions: Arc<watch::Sender<Vec<AddressSuggestion>>>,
}

impl AddressLookup {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self::with_delay(geocoder, DEFAULT_DEBOUNCE)
    }

    pub fn with_delay(geocoder: Arc<dyn Geocoder>, delay: Duration) -> Self {
        let (tx, _) = watch::channel(Vec::new());
        Self {
            geocoder,
            delay,
            pending: Mutex::new(None),
            suggestions: Arc::new(tx),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<AddressSuggestion>> {
        self.suggestions.subscribe()
    }

    /// Handle a keystroke. Must be called from within a tokio runtime.
    pub fn input(&self, query: &str) {
        self.cancel_pending();

        if query.trim().chars().count() < MIN_QUERY_LEN {
            self.suggestions.send_replace(Vec::new());
            return;
        }

        let token = CancellationToken::new();
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());

        let geocoder = Arc::clone(&self.geocoder);
        let suggestions = Arc::clone(&self.suggestions);
        let delay = self.delay;
        let query = query.to_string();

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }

            let results = lookup_addresses(geocoder.as_ref(), &query).await;
            if !token.is_cancelled() {
                suggestions.send_replace(results);
            }
        });
    }

    /// Accept a suggestion: clears the list and returns the form values.
    pub fn select(&self, suggestion: &AddressSuggestion) -> SelectedAddress {
        self.cancel_pending();
        self.suggestions.send_replace(Vec::new());
        SelectedAddress {
            location: suggestion.address.clone(),
            coordinates: suggestion.coordinates,
        }
    }

    /// Drop any lookup that has not fired yet.
    pub fn cancel_pending(&self) {
        if let Some(token) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            token.cancel();
        }
    }
}

impl Drop for AddressLookup {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
