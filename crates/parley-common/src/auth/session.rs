//! Session tokens
//!
//! The HTTP login flow (outside this repository) establishes a session and
//! hands the client a signed token. The gateway trusts the token's user id
//! without re-validating credentials; validation here is signature + expiry
//! only, using the `jsonwebtoken` crate.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use parley_core::Snowflake;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl SessionClaims {
    /// Get the user ID as a Snowflake
    ///
    /// # Errors
    /// Returns an error if the subject cannot be parsed as a Snowflake
    pub fn user_id(&self) -> Result<Snowflake, AppError> {
        self.sub
            .parse::<i64>()
            .map(Snowflake::new)
            .map_err(|_| AppError::InvalidToken)
    }

    /// Check if the token is expired
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Encodes and validates session tokens
#[derive(Clone)]
pub struct SessionTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_seconds: i64,
}

impl SessionTokens {
    /// Create a token service with the given secret and expiry
    #[must_use]
    pub fn new(secret: &str, expiry_seconds: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_seconds,
        }
    }

    /// Issue a session token for a user
    ///
    /// Production tokens come from the login service; this exists for tests
    /// and local tooling, which share the secret.
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn issue(&self, user_id: Snowflake) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.expiry_seconds)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to encode session token")))
    }

    /// Validate a session token and return its claims
    ///
    /// # Errors
    /// Returns `InvalidToken` for bad signatures or malformed tokens and
    /// `TokenExpired` for expired ones.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, AppError> {
        let token = token.strip_prefix("Bearer ").unwrap_or(token);

        decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            })
    }
}

impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens")
            .field("expiry_seconds", &self.expiry_seconds)
            .finish()
    }
}
