use std::sync::Arc;

use eventboard_cloud::identity::IdentityClient;
use eventboard_core::geo::Geocoder;
use eventboard_core::upload::ImageStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: eventboard_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Address suggestions for the submission form.
    pub geocoder: Arc<dyn Geocoder>,
    /// Bucket that event images are uploaded to.
    pub images: Arc<dyn ImageStore>,
    /// Hosted identity service, for the auth proxy routes.
    pub identity: Arc<IdentityClient>,
}
