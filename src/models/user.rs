//! User model, session claims and request context

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// User created on first login through the identity provider
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    /// Subject identifier assigned by the identity provider
    pub provider_id: Option<String>,
    pub name: Option<String>,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Data needed to register a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub provider_id: Option<String>,
    pub name: Option<String>,
    pub email: String,
}

/// JWT claims carried by the session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User email
    pub sub: String,
    pub user_id: i32,
    pub name: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl SessionClaims {
    pub fn for_user(user: &User, lifetime_hours: u64) -> Self {
        let now = Utc::now();
        let lifetime = Duration::hours(i64::try_from(lifetime_hours).unwrap_or(i64::MAX / 3600));
        Self {
            sub: user.email.clone(),
            user_id: user.id,
            name: user.name.clone(),
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
        }
    }

    /// Create a signed JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and verify a JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }
}

/// Authenticated identity of the current request.
///
/// Built by the API extractor from the session token and handed explicitly to
/// every service call that needs to know who is acting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RequestContext {
    pub user_id: i32,
    pub email: String,
    pub name: Option<String>,
}

impl From<SessionClaims> for RequestContext {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.sub,
            name: claims.name,
        }
    }
}
