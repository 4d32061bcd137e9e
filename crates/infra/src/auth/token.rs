//! Bearer identity tokens: HS256 JWTs carrying a subject and a role.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ROLE_AGENT: &str = "agent";

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("token subject is empty")]
    EmptySubject,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: String,
    exp: i64,
    iat: i64,
}

/// Verified caller identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub role: String,
}

impl Identity {
    pub fn is_agent(&self) -> bool {
        self.role == ROLE_AGENT
    }
}

pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, subject: &str, role: &str, ttl_secs: i64) -> Result<String, TokenError> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(TokenError::EmptySubject);
        }
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            role: role.trim().to_string(),
            exp: now.saturating_add(ttl_secs),
            iat: now,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        if data.claims.sub.trim().is_empty() {
            return Err(TokenError::EmptySubject);
        }
        Ok(Identity {
            subject: data.claims.sub,
            role: data.claims.role,
        })
    }
}
