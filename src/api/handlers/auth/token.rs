//! HS256 bearer tokens for authenticated API calls.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::utils::now_unix_seconds;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
    #[error("invalid subject: {0}")]
    Subject(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// # Errors
    /// Returns [`TokenError::Subject`] when `sub` is not a UUID.
    pub fn user_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::Subject(self.sub.clone()))
    }
}

pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: i64,
}

impl TokenKeys {
    #[must_use]
    pub fn new(secret: &SecretString, ttl_seconds: i64) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_seconds,
        }
    }

    #[must_use]
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Sign a token for `user_id` valid for the configured TTL.
    ///
    /// # Errors
    /// Returns [`TokenError::Sign`] if encoding fails.
    pub fn issue(&self, user_id: Uuid, role: &str) -> Result<String, TokenError> {
        let iat = now_unix_seconds();
        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            iat,
            exp: iat.saturating_add(self.ttl_seconds),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Sign)
    }

    /// # Errors
    /// Returns [`TokenError::Invalid`] for bad signatures, malformed or expired tokens.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(secret: &str, ttl: i64) -> TokenKeys {
        TokenKeys::new(&SecretString::from(secret.to_string()), ttl)
    }

    #[test]
    fn issued_token_verifies() {
        let keys = keys("test-secret", 3600);
        let user_id = Uuid::new_v4();
        let token = keys.issue(user_id, "user");
        assert!(token.is_ok());
        let Ok(token) = token else { return };

        let claims = keys.verify(&token);
        assert!(claims.is_ok());
        let Ok(claims) = claims else { return };
        assert_eq!(claims.user_id().ok(), Some(user_id));
        assert_eq!(claims.role, "user");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = keys("one", 60).issue(Uuid::new_v4(), "user");
        let Ok(token) = token else {
            panic!("token should sign");
        };
        assert!(matches!(
            keys("two", 60).verify(&token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = keys("test-secret", -10);
        let Ok(token) = keys.issue(Uuid::new_v4(), "user") else {
            panic!("token should sign");
        };
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(keys("s", 60).verify("not.a.token").is_err());
    }
}
