//! Identity-provider session tokens

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::errors::ConsoleError;

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (identity-provider user ID)
    pub sub: String,

    /// Session ID
    #[serde(default)]
    pub sid: Option<String>,

    /// Issued at timestamp
    #[serde(default)]
    pub iat: Option<i64>,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    #[serde(default)]
    pub iss: Option<String>,
}

/// A bearer token passed explicitly to every request
#[derive(Debug, Clone)]
pub struct SessionToken {
    raw: SecretString,

    /// Decoded claims, absent for opaque tokens
    claims: Option<SessionClaims>,
}

impl SessionToken {
    /// Wrap a raw token. JWT claims are decoded when possible.
    ///
    /// The signature is NOT validated here; the backend does that.
    pub fn from_raw(raw: impl Into<String>) -> Result<Self, ConsoleError> {
        let raw = raw.into().trim().to_string();
        if raw.is_empty() {
            return Err(ConsoleError::TokenError("token is empty".to_string()));
        }

        let claims = if raw.split('.').count() == 3 {
            Some(decode_claims(&raw)?)
        } else {
            None
        };

        Ok(Self {
            raw: SecretString::from(raw),
            claims,
        })
    }

    /// Raw token for the Authorization header
    pub fn expose(&self) -> &str {
        self.raw.expose_secret()
    }

    pub fn claims(&self) -> Option<&SessionClaims> {
        self.claims.as_ref()
    }

    /// Identity-provider user ID, when the token carries one
    pub fn subject(&self) -> Option<&str> {
        self.claims.as_ref().map(|c| c.sub.as_str())
    }

    /// Check if the token is expired. Opaque tokens never report expiry.
    pub fn is_expired(&self) -> bool {
        self.expires_within(0)
    }

    /// Check if the token expires within the given number of seconds
    pub fn expires_within(&self, seconds: i64) -> bool {
        let now = Utc::now().timestamp();
        self.claims
            .as_ref()
            .map(|c| c.exp < now + seconds)
            .unwrap_or(false)
    }

    /// Get expiration time
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.claims
            .as_ref()
            .and_then(|c| DateTime::from_timestamp(c.exp, 0))
    }
}

fn decode_claims(raw: &str) -> Result<SessionClaims, ConsoleError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let token_data = decode::<SessionClaims>(raw, &DecodingKey::from_secret(b""), &validation)
        .map_err(|e| ConsoleError::TokenError(format!("Failed to decode token: {}", e)))?;
    Ok(token_data.claims)
}
