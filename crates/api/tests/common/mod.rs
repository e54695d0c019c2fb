#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use eventboard_api::auth::jwt::{issue_token, JwtConfig};
use eventboard_api::config::{GeocodingConfig, IdentityConfig, ServerConfig};
use eventboard_api::router::build_app_router;
use eventboard_api::state::AppState;
use eventboard_cloud::identity::IdentityClient;
use eventboard_cloud::storage::StorageSettings;
use eventboard_core::geo::{AddressSuggestion, Coordinates, GeocodeError, Geocoder};
use eventboard_core::session::ROLE_MODERATOR;
use eventboard_core::upload::{ImageStore, UploadError};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret";
pub const BUCKET_URL: &str = "https://storage.test/event-images";

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Geocoder that answers every query with the same suggestions.
#[derive(Default)]
pub struct FakeGeocoder {
    pub suggestions: Vec<AddressSuggestion>,
    pub fail: bool,
    pub queries: Mutex<Vec<String>>,
}

impl FakeGeocoder {
    pub fn with_results(count: usize) -> Self {
        let suggestions = (0..count)
            .map(|i| AddressSuggestion {
                id: format!("address.{i}"),
                address: format!("{i} Main St, Los Angeles, California"),
                coordinates: Coordinates::new(-118.24 + i as f64 * 0.01, 34.05),
            })
            .collect();
        Self {
            suggestions,
            ..Default::default()
        }
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn suggest(&self, query: &str) -> Result<Vec<AddressSuggestion>, GeocodeError> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.fail {
            return Err(GeocodeError::Service {
                status: 500,
                body: "boom".into(),
            });
        }
        Ok(self.suggestions.clone())
    }
}

/// Image store that records uploads in memory.
#[derive(Default)]
pub struct FakeImageStore {
    pub fail: bool,
    pub uploads: Mutex<Vec<(String, usize, String)>>,
}

#[async_trait]
impl ImageStore for FakeImageStore {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, UploadError> {
        if self.fail {
            return Err(UploadError::Storage("bucket unavailable".into()));
        }
        self.uploads
            .lock()
            .unwrap()
            .push((key.to_string(), bytes.len(), content_type.to_string()));
        Ok(format!("{BUCKET_URL}/{key}"))
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
///
/// The identity URL points at `identity_url`; tests that never reach the
/// identity service pass an unroutable address.
pub fn test_config(identity_url: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        app_url: "http://localhost:5173".to_string(),
        identity: IdentityConfig {
            url: identity_url.to_string(),
            anon_key: "anon-key".to_string(),
        },
        jwt: JwtConfig::new(JWT_SECRET),
        geocoding: GeocodingConfig {
            api_key: "test-token".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            country: "us".to_string(),
        },
        storage: StorageSettings {
            endpoint: None,
            region: "us-east-1".to_string(),
            bucket: "event-images".to_string(),
            public_base_url: "https://storage.test".to_string(),
            access_key_id: None,
            secret_access_key: None,
        },
    }
}

/// Services plugged into the test app.
pub struct TestServices {
    pub geocoder: Arc<FakeGeocoder>,
    pub images: Arc<FakeImageStore>,
    pub identity_url: String,
}

impl Default for TestServices {
    fn default() -> Self {
        Self {
            geocoder: Arc::new(FakeGeocoder::default()),
            images: Arc::new(FakeImageStore::default()),
            identity_url: "http://127.0.0.1:9".to_string(),
        }
    }
}

/// Build the full application router (same middleware stack as `main.rs`)
/// with fake external services.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, TestServices::default())
}

pub fn build_test_app_with(pool: PgPool, services: TestServices) -> Router {
    let config = test_config(&services.identity_url);
    let identity = IdentityClient::new(
        config.identity.url.clone(),
        config.identity.anon_key.clone(),
    );

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        geocoder: services.geocoder,
        images: services.images,
        identity: Arc::new(identity),
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// A valid access token for a fresh regular user.
pub fn user_token() -> (Uuid, String) {
    let user_id = Uuid::new_v4();
    let token = issue_token(
        user_id,
        Some("user@test.com"),
        None,
        3600,
        &JwtConfig::new(JWT_SECRET),
    )
    .unwrap();
    (user_id, token)
}

/// A valid access token carrying the moderator role.
pub fn moderator_token() -> String {
    issue_token(
        Uuid::new_v4(),
        Some("mod@test.com"),
        Some(ROLE_MODERATOR),
        3600,
        &JwtConfig::new(JWT_SECRET),
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

// ---------------------------------------------------------------------------
// Multipart
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "eventboard-test-boundary";

/// An attached file part.
pub struct FilePart<'a> {
    pub filename: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

pub fn multipart_body(fields: &[(&str, &str)], image: Option<FilePart<'_>>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(file) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                file.filename, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(
    app: Router,
    uri: &str,
    token: Option<&str>,
    body: Vec<u8>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    app.oneshot(builder.body(Body::from(body)).unwrap())
        .await
        .unwrap()
}
