use eventboard_cloud::geocoding::{DEFAULT_BASE_URL, DEFAULT_COUNTRY};
use eventboard_cloud::storage::{StorageSettings, DEFAULT_BUCKET, DEFAULT_REGION};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Public URL of the web client; password reset links land here.
    pub app_url: String,
    /// Hosted identity service.
    pub identity: IdentityConfig,
    /// Verification of identity-issued access tokens.
    pub jwt: JwtConfig,
    pub geocoding: GeocodingConfig,
    pub storage: StorageSettings,
}

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone)]
pub struct GeocodingConfig {
    pub api_key: String,
    pub base_url: String,
    pub country: String,
}

fn required(name: &str) -> String {
    let value = std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set in the environment"));
    assert!(!value.trim().is_empty(), "{name} must not be empty");
    value
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                | Required | Default                  |
    /// |------------------------|----------|--------------------------|
    /// | `HOST`                 | no       | `0.0.0.0`                |
    /// | `PORT`                 | no       | `3000`                   |
    /// | `CORS_ORIGINS`         | no       | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS` | no       | `30`                     |
    /// | `APP_URL`              | no       | `http://localhost:5173`  |
    /// | `IDENTITY_URL`         | **yes**  | --                       |
    /// | `IDENTITY_ANON_KEY`    | **yes**  | --                       |
    /// | `IDENTITY_JWT_SECRET`  | **yes**  | --                       |
    /// | `GEOCODING_API_KEY`    | **yes**  | --                       |
    /// | `GEOCODING_BASE_URL`   | no       | `https://api.mapbox.com` |
    /// | `GEOCODING_COUNTRY`    | no       | `us`                     |
    /// | `STORAGE_PUBLIC_URL`   | **yes**  | --                       |
    /// | `STORAGE_ENDPOINT`     | no       | AWS                      |
    /// | `STORAGE_REGION`       | no       | `us-east-1`              |
    /// | `STORAGE_BUCKET`       | no       | `event-images`           |
    /// | `STORAGE_ACCESS_KEY_ID` / `STORAGE_SECRET_ACCESS_KEY` | no | AWS default chain |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing or a value does not parse.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let app_url = std::env::var("APP_URL")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .trim_end_matches('/')
            .to_string();

        let identity = IdentityConfig {
            url: required("IDENTITY_URL"),
            anon_key: required("IDENTITY_ANON_KEY"),
        };

        let jwt = JwtConfig::new(required("IDENTITY_JWT_SECRET"));

        let geocoding = GeocodingConfig {
            api_key: required("GEOCODING_API_KEY"),
            base_url: optional("GEOCODING_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            country: optional("GEOCODING_COUNTRY").unwrap_or_else(|| DEFAULT_COUNTRY.into()),
        };

        let storage = StorageSettings {
            endpoint: optional("STORAGE_ENDPOINT"),
            region: optional("STORAGE_REGION").unwrap_or_else(|| DEFAULT_REGION.into()),
            bucket: optional("STORAGE_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.into()),
            public_base_url: required("STORAGE_PUBLIC_URL"),
            access_key_id: optional("STORAGE_ACCESS_KEY_ID"),
            secret_access_key: optional("STORAGE_SECRET_ACCESS_KEY"),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            app_url,
            identity,
            jwt,
            geocoding,
            storage,
        }
    }

    /// Where password reset emails send the user.
    pub fn password_reset_redirect(&self) -> String {
        format!("{}/update-password", self.app_url)
    }
}
