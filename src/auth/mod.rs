use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod password;

pub use password::{hash_password, verify_password};

/// Longest token lifetime accepted from configuration (one year)
pub const MAX_TOKEN_EXPIRY_HOURS: u64 = 24 * 365;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the authenticated account
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(username: impl Into<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let hours = expiry_hours.min(MAX_TOKEN_EXPIRY_HOURS) as i64;
        let exp = (now + Duration::hours(hours)).timestamp();

        Self {
            sub: username.into(),
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,
}

/// Signs and verifies HS256 access tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: u64,
}

impl TokenIssuer {
    pub fn new(secret: &str, expiry_hours: u64) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::InvalidSecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_hours: expiry_hours.min(MAX_TOKEN_EXPIRY_HOURS),
        })
    }

    pub fn expiry_seconds(&self) -> u64 {
        self.expiry_hours * 3600
    }

    /// Issue an access token for `username`.
    pub fn issue(&self, username: &str) -> Result<String, AuthError> {
        let claims = Claims::new(username, self.expiry_hours);
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Verify signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        if token_data.claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidToken("token has no subject".to_string()));
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_verify() {
        let issuer = TokenIssuer::new("secret", 1).unwrap();
        let token = issuer.issue("alice").unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "alice");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let token = TokenIssuer::new("one", 1).unwrap().issue("alice").unwrap();
        let other = TokenIssuer::new("two", 1).unwrap();
        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken(_))));
        assert!(matches!(other.verify("not-a-jwt"), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let issuer = TokenIssuer::new("secret", 1).unwrap();
        let claims = Claims {
            sub: "alice".to_string(),
            exp: Utc::now().timestamp() - 3600,
            iat: Utc::now().timestamp() - 7200,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"secret")).unwrap();
        assert!(matches!(issuer.verify(&token), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn oversized_expiry_is_clamped() {
        let issuer = TokenIssuer::new("secret", u64::MAX).unwrap();
        assert_eq!(issuer.expiry_seconds(), MAX_TOKEN_EXPIRY_HOURS * 3600);

        let claims = issuer.verify(&issuer.issue("alice").unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, (MAX_TOKEN_EXPIRY_HOURS * 3600) as i64);
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(TokenIssuer::new("", 1), Err(AuthError::InvalidSecret)));
    }
}
