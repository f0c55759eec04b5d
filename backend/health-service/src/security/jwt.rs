use anyhow::{anyhow, Result};
/// JWT issuing and validation using HS256 with a shared secret.
/// The secret is injected at construction; there is no ambient key state.
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims. Two payload shapes are in circulation: current tokens nest
/// the identifier under a `user` object, older ones carry it top-level.
/// Both fields are optional so a verified token can be inspected for
/// either shape after signature and expiry checks pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
}

/// Where the user identifier was found in a verified payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    /// Current shape: `{"user": {"id": ...}}`
    Nested(Uuid),
    /// Legacy shape: top-level `{"id": ...}`
    TopLevel(Uuid),
}

impl Subject {
    /// Nested shape is tried first; the top-level identifier is the
    /// legacy fallback.
    pub fn from_claims(claims: &Claims) -> Option<Subject> {
        if let Some(id) = claims.user.as_ref().and_then(|u| u.id) {
            return Some(Subject::Nested(id));
        }
        claims.id.map(Subject::TopLevel)
    }

    pub fn user_id(self) -> Uuid {
        match self {
            Subject::Nested(id) | Subject::TopLevel(id) => id,
        }
    }
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_ttl: i64,
}

impl TokenService {
    pub fn from_secret(secret: &str, access_token_ttl: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_ttl,
        }
    }

    /// Generate a new access token carrying the nested identifier shape
    pub fn issue_access_token(&self, user_id: Uuid) -> Result<String> {
        let now = Utc::now();
        let expiry = now + Duration::seconds(self.access_token_ttl);

        let claims = Claims {
            user: Some(UserRef { id: Some(user_id) }),
            id: None,
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| anyhow!("Failed to generate access token: {}", e))
    }

    pub fn access_token_ttl(&self) -> i64 {
        self.access_token_ttl
    }

    /// Validate signature and expiry, and decode the payload
    pub fn decode(&self, token: &str) -> Result<TokenData<Claims>> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| anyhow!("Token validation failed: {}", e))
    }
}
