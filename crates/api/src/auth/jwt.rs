//! Verification of access tokens issued by the hosted identity service.
//!
//! The identity service signs HS256 JWTs with a project secret and the
//! `authenticated` audience. The API never mints tokens for real users;
//! [`issue_token`] exists for local tooling and tests.

use eventboard_core::session::ROLE_MODERATOR;
use eventboard_core::types::UserId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Audience claim carried by every signed-in user's token.
pub const AUDIENCE: &str = "authenticated";

/// JWT claims embedded in identity access tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct IdentityClaims {
    /// Subject -- the identity service's user id.
    pub sub: UserId,
    #[serde(default)]
    pub email: Option<String>,
    /// Database role of the token (always `authenticated` for users).
    #[serde(default)]
    pub role: Option<String>,
    /// Server-controlled metadata; `role` here grants application rights.
    #[serde(default)]
    pub app_metadata: serde_json::Value,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    pub aud: String,
}

impl IdentityClaims {
    /// Application role from `app_metadata.role`.
    pub fn app_role(&self) -> Option<&str> {
        self.app_metadata.get("role").and_then(|r| r.as_str())
    }

    pub fn is_moderator(&self) -> bool {
        self.app_role() == Some(ROLE_MODERATOR)
    }
}

/// Secret shared with the identity service.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

/// Validate and decode an access token.
///
/// Checks the signature, expiration and audience.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<IdentityClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default(); // HS256, validates exp
    validation.set_audience(&[AUDIENCE]);

    let token_data = decode::<IdentityClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}

/// Sign a token shaped like the identity service's.
pub fn issue_token(
    user_id: UserId,
    email: Option<&str>,
    app_role: Option<&str>,
    ttl_secs: i64,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let app_metadata = match app_role {
        Some(role) => serde_json::json!({ "role": role }),
        None => serde_json::json!({}),
    };
    let claims = IdentityClaims {
        sub: user_id,
        email: email.map(str::to_string),
        role: Some(AUDIENCE.to_string()),
        app_metadata,
        exp: chrono::Utc::now().timestamp() + ttl_secs,
        aud: AUDIENCE.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn config() -> JwtConfig {
        JwtConfig::new("test-secret-that-is-long-enough")
    }

    #[test]
    fn issued_token_validates() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, Some("a@b.test"), None, 3600, &config()).unwrap();

        let claims = validate_token(&token, &config()).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email.as_deref(), Some("a@b.test"));
        assert!(!claims.is_moderator());
    }

    #[test]
    fn moderator_role_comes_from_app_metadata() {
        let token =
            issue_token(Uuid::new_v4(), None, Some(ROLE_MODERATOR), 3600, &config()).unwrap();
        let claims = validate_token(&token, &config()).unwrap();
        assert!(claims.is_moderator());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(Uuid::new_v4(), None, None, 3600, &config()).unwrap();
        assert!(validate_token(&token, &JwtConfig::new("other-secret")).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Past the default 60s leeway.
        let token = issue_token(Uuid::new_v4(), None, None, -300, &config()).unwrap();
        assert!(validate_token(&token, &config()).is_err());
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let claims = IdentityClaims {
            sub: Uuid::new_v4(),
            email: None,
            role: Some("anon".into()),
            app_metadata: serde_json::json!({}),
            exp: chrono::Utc::now().timestamp() + 3600,
            aud: "anon".into(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config().secret.as_bytes()),
        )
        .unwrap();
        assert!(validate_token(&token, &config()).is_err());
    }
}
