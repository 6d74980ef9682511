//! JWT token management

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Email of the subject at issue time
    pub email: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// JWT manager for token generation and validation
///
/// Built once at startup from the process-wide secret and shared read-only
/// behind an `Arc`.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry: Duration,
}

impl JwtManager {
    /// Create a new JWT manager
    ///
    /// An empty secret, or a validity window that is not positive or does
    /// not fit in a timestamp, is a misconfiguration and is refused.
    pub fn new(secret: &str, token_expiry_hours: i64) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::SigningKey("JWT secret must not be empty".to_string()));
        }
        if token_expiry_hours <= 0 {
            return Err(AuthError::SigningKey(format!(
                "token expiry must be positive, got {} hours",
                token_expiry_hours
            )));
        }

        let token_expiry = Duration::try_hours(token_expiry_hours)
            .filter(|expiry| Utc::now().checked_add_signed(*expiry).is_some())
            .ok_or_else(|| {
                AuthError::SigningKey(format!(
                    "token expiry of {} hours is out of range",
                    token_expiry_hours
                ))
            })?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_expiry,
        })
    }

    /// Generate a JWT token for a user
    pub fn generate_token(&self, user_id: i64, email: &str) -> Result<String, AuthError> {
        self.generate_token_at(user_id, email, Utc::now())
    }

    /// Generate a JWT token as if issued at `now`
    pub fn generate_token_at(
        &self,
        user_id: i64,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let exp = now.checked_add_signed(self.token_expiry).ok_or_else(|| {
            AuthError::SigningKey("token expiry overflows the issue time".to_string())
        })?;

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        debug!("Generating token for user: {}", user_id);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(AuthError::TokenIssue)
    }

    /// Validate a JWT token and return claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_token_at(token, Utc::now())
    }

    /// Validate a JWT token against an explicit clock
    ///
    /// The token is expired once `now` reaches `exp`; no leeway is granted.
    pub fn validate_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against `now` rather than the wall clock
        validation.validate_exp = false;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            debug!("Token rejected: {}", e);
            AuthError::InvalidToken
        })?;

        if token_data.claims.exp <= now.timestamp() {
            return Err(AuthError::TokenExpired);
        }

        Ok(token_data.claims)
    }
}
