use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::ApiError;

/// Caller role. Parsed case-insensitively; the canonical form is lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Manager,
    Staff,
    Other(String),
}

impl Role {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "manager" => Role::Manager,
            "staff" => Role::Staff,
            other => Role::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Staff => "staff",
            Role::Other(s) => s,
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub role: Role,
}

/// Resolved identity of the caller for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user: SessionUser,
}

impl Session {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: &str) -> Self {
        Self {
            user: SessionUser {
                id: id.into(),
                name: name.into(),
                role: Role::parse(role),
            },
        }
    }

    pub fn has_role(&self, allowed: &[Role]) -> bool {
        allowed.contains(&self.user.role)
    }

    /// 403 unless the caller's role is in `allowed`.
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if self.has_role(allowed) {
            return Ok(());
        }
        tracing::warn!(
            "Role '{}' of user '{}' not permitted (allowed: {:?})",
            self.user.role.as_str(),
            self.user.id,
            allowed.iter().map(Role::as_str).collect::<Vec<_>>()
        );
        Err(ApiError::forbidden("Insufficient permissions"))
    }
}

/// Resolves an opaque session token to a caller identity.
pub trait SessionStore: Send + Sync {
    fn resolve(&self, token: &str) -> Option<Session>;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Session secret is not configured")]
    InvalidSecret,

    #[error("Session expiry of {0} hours is out of range")]
    InvalidExpiry(u64),

    #[error("Token generation error: {0}")]
    Generation(#[from] jsonwebtoken::errors::Error),
}

/// HS256 signed session tokens.
pub struct JwtSessionStore {
    secret: String,
    expiry_hours: u64,
}

impl JwtSessionStore {
    pub fn new(secret: impl Into<String>, expiry_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            expiry_hours,
        }
    }

    pub fn issue(&self, user_id: &str, name: &str, role: &str) -> Result<String, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::InvalidSecret);
        }

        let now = Utc::now();
        let expires_at = i64::try_from(self.expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(TokenError::InvalidExpiry(self.expiry_hours))?;

        let claims = Claims {
            sub: user_id.to_string(),
            name: name.to_string(),
            role: role.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let key = EncodingKey::from_secret(self.secret.as_bytes());
        Ok(encode(&Header::default(), &claims, &key)?)
    }
}

impl SessionStore for JwtSessionStore {
    fn resolve(&self, token: &str) -> Option<Session> {
        if self.secret.is_empty() {
            tracing::error!("Session secret not configured; rejecting all sessions");
            return None;
        }

        let key = DecodingKey::from_secret(self.secret.as_bytes());
        match decode::<Claims>(token, &key, &Validation::default()) {
            Ok(data) => {
                let claims = data.claims;
                tracing::debug!("Resolved session for user '{}'", claims.sub);
                Some(Session::new(claims.sub, claims.name, &claims.role))
            }
            Err(e) => {
                tracing::debug!("Rejected session token: {}", e);
                None
            }
        }
    }
}
