//! Bearer-token authentication and role checks.
//!
//! Callers present `Authorization: Bearer <jwt>` signed with the shared HS256
//! secret. Handlers receive a [`Caller`] and check the [`Capability`] they need.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::{fmt, time::SystemTime};

use crate::{config::AuthConfig, state::AppState, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Owner,
    Operator,
    Viewer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Owner => "OWNER",
            Self::Operator => "OPERATOR",
            Self::Viewer => "VIEWER",
        })
    }
}

/// What a handler is about to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Read,
    /// Create, update, soft delete and transfer.
    Write,
    /// Permanent delete.
    Purge,
}

impl Role {
    pub fn allows(self, capability: Capability) -> bool {
        match capability {
            Capability::Read => true,
            Capability::Write => matches!(self, Self::Owner | Self::Operator),
            Capability::Purge => self == Self::Owner,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// The authenticated principal of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub subject: String,
    pub role: Role,
}

impl Caller {
    pub fn authorize(&self, capability: Capability) -> Result<()> {
        if self.role.allows(capability) {
            Ok(())
        } else {
            tracing::debug!(subject = %self.subject, role = %self.role, ?capability, "Access denied");
            Err(Error::Forbidden(format!(
                "Role {} is not allowed to perform this operation",
                self.role
            )))
        }
    }
}

#[derive(Clone)]
pub struct AuthManager {
    enabled: bool,
    secret: Vec<u8>,
    issuer: Option<String>,
    leeway_seconds: u64,
}

impl AuthManager {
    pub fn new(config: &AuthConfig) -> Self {
        if !config.enabled {
            tracing::warn!("Authentication disabled; every request runs as OWNER");
        }
        Self {
            enabled: config.enabled,
            secret: config.jwt_secret.as_bytes().to_vec(),
            issuer: config.issuer.clone(),
            leeway_seconds: config.leeway_seconds,
        }
    }

    /// Resolves the caller from request headers.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Caller> {
        if !self.enabled {
            return Ok(Caller {
                subject: "anonymous".to_string(),
                role: Role::Owner,
            });
        }

        let authz = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| Error::Unauthorized("Missing bearer token".to_string()))?;
        let token = authz
            .strip_prefix("Bearer ")
            .or_else(|| authz.strip_prefix("bearer "))
            .ok_or_else(|| Error::Unauthorized("Missing bearer token".to_string()))?;

        let claims = self.validate_jwt(token)?;
        Ok(Caller {
            subject: claims.sub,
            role: claims.role,
        })
    }

    fn validate_jwt(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = self.leeway_seconds;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }

        decode::<Claims>(token, &DecodingKey::from_secret(&self.secret), &validation)
            .map(|data| data.claims)
            .map_err(|e| Error::Unauthorized(format!("Invalid bearer token: {e}")))
    }

    /// Signs a token for `subject`. Used by tests and local tooling; production
    /// tokens come from the identity provider sharing the secret.
    pub fn issue_token(&self, subject: &str, role: Role, ttl_seconds: u64) -> Result<String> {
        let claims = Claims {
            sub: subject.to_string(),
            role,
            exp: now_epoch_seconds().saturating_add(ttl_seconds as usize),
            iss: self.issuer.clone(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| Error::Internal(format!("Failed to sign token: {e}")))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        state.auth.authenticate(&parts.headers)
    }
}

fn now_epoch_seconds() -> usize {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as usize
}
