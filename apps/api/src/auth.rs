//! Caller identity with optional-auth semantics: a missing or rejected bearer
//! token never fails the request, it just makes the caller anonymous.

use std::convert::Infallible;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::{debug, warn};

use crate::ownership::Owner;
use crate::state::AppState;

/// Verifies a bearer token and returns the uid it belongs to.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, token: &str) -> Option<String>;
}

/// Used when no identity backend is configured.
pub struct AnonymousOnly;

#[async_trait]
impl IdentityProvider for AnonymousOnly {
    async fn verify(&self, _token: &str) -> Option<String> {
        None
    }
}

/// Takes the token verbatim as the uid. Local development only.
pub struct TrustedBearer;

#[async_trait]
impl IdentityProvider for TrustedBearer {
    async fn verify(&self, token: &str) -> Option<String> {
        Some(token.to_string())
    }
}

/// The identity behind the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub Owner);

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Ok(Caller(Owner::Anonymous));
        };

        match state.identity.verify(token).await {
            Some(uid) => {
                let owner = Owner::from_uid(uid);
                debug!("Authenticated caller {owner}");
                Ok(Caller(owner))
            }
            None => {
                warn!("Bearer token rejected, continuing as anonymous");
                Ok(Caller(Owner::Anonymous))
            }
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.split(' ').nth(1)?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
