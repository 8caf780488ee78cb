//! Session tokens
//!
//! A session is an HS256 JWT stored in an HttpOnly cookie. It names the user
//! and nothing else; the role is looked up on every request.

use axum_extra::extract::cookie::{Cookie, SameSite};
use bookmarket_core::{SessionConfig, UserId};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

pub const SESSION_COOKIE: &str = "bookmarket_session";

/// Session token claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session token creation failed")]
    Creation,
    #[error("Invalid session token")]
    Invalid,
    #[error("Session expired")]
    Expired,
}

/// Session signing and verification keys
struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Issues and verifies session tokens
#[derive(Clone)]
pub struct SessionManager {
    keys: Arc<Keys>,
    ttl: Duration,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    pub fn new(config: &SessionConfig) -> Self {
        let secret = config.secret.as_bytes();
        Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret),
                decoding: DecodingKey::from_secret(secret),
            }),
            // Out-of-range lifetimes saturate here and fail in `issue`
            ttl: Duration::try_hours(config.ttl_hours).unwrap_or(Duration::MAX),
        }
    }

    /// Issue a token for a signed-in user
    pub fn issue(&self, user_id: UserId) -> Result<String, SessionError> {
        let now = Utc::now();
        let expires = now.checked_add_signed(self.ttl).ok_or_else(|| {
            warn!("Session lifetime {} is out of range", self.ttl);
            SessionError::Creation
        })?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };
        self.encode(&claims)
    }

    fn encode(&self, claims: &Claims) -> Result<String, SessionError> {
        encode(&Header::default(), claims, &self.keys.encoding).map_err(|e| {
            warn!("Failed to encode session token: {}", e);
            SessionError::Creation
        })
    }

    /// Verify a token and return the user it names
    pub fn verify(&self, token: &str) -> Result<UserId, SessionError> {
        let data = decode::<Claims>(token, &self.keys.decoding, &Validation::default()).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => SessionError::Expired,
                _ => SessionError::Invalid,
            },
        )?;

        data.claims
            .sub
            .parse::<UserId>()
            .map_err(|_| SessionError::Invalid)
    }

    /// Session cookie for a token. The cookie lasts for the browser session;
    /// the token's own expiry bounds how long it is accepted.
    pub fn cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build()
    }

    /// Cookie that, removed from a request jar, ends the session
    pub fn removal_cookie() -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE).path("/").build()
    }
}
