use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

/// Claims carried by identity-provider session tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Account id
    pub sub: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl SessionClaims {
    pub fn new(account_id: Uuid, email: Option<String>, audience: Option<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: account_id,
            email,
            aud: audience,
            exp,
            iat: now.timestamp(),
        }
    }
}

/// Verified identity behind a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub account_id: Uuid,
    pub email: Option<String>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Session secret not configured")]
    InvalidSecret,

    #[error("Invalid session token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Token generation error: {0}")]
    TokenGeneration(String),
}

/// Verifies session tokens issued by the identity provider
pub struct SessionVerifier {
    secret: String,
    audience: Option<String>,
    expiry_hours: u64,
}

impl SessionVerifier {
    pub fn new(config: &SecurityConfig) -> Self {
        if config.jwt_secret.is_empty() {
            tracing::warn!("SECURITY_JWT_SECRET is empty; every request will be treated as unauthenticated");
        }
        Self {
            secret: config.jwt_secret.clone(),
            audience: config.jwt_audience.clone(),
            expiry_hours: config.jwt_expiry_hours,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Session, AuthError> {
        if self.secret.is_empty() {
            return Err(AuthError::InvalidSecret);
        }

        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let mut validation = Validation::default();
        match &self.audience {
            Some(aud) => {
                validation.set_audience(&[aud]);
                validation.set_required_spec_claims(&["exp", "aud"]);
            }
            None => validation.validate_aud = false,
        }

        let token_data = decode::<SessionClaims>(token, &decoding_key, &validation)?;

        Ok(Session {
            account_id: token_data.claims.sub,
            email: token_data.claims.email,
        })
    }

    /// Mint a token the way the identity provider would. Used by the
    /// development CLI and the test suite.
    pub fn issue(&self, account_id: Uuid, email: Option<String>) -> Result<String, AuthError> {
        if self.secret.is_empty() {
            return Err(AuthError::InvalidSecret);
        }

        let claims = SessionClaims::new(account_id, email, self.audience.clone(), self.expiry_hours);
        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());

        encode(&Header::default(), &claims, &encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }
}

/// Pull the session token from `Authorization: Bearer` or, for page
/// navigations, from the session cookie
pub fn extract_session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let token = value
            .to_str()
            .ok()
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty());
        // A malformed Authorization header is not rescued by the cookie
        return token.map(str::to_string);
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|t| !t.is_empty())
}
