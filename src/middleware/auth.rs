use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

use crate::access::{Actor, AuthenticatedActor};
use crate::error::ApiError;
use crate::types::Role;

/// Signed-in actor injected by the access middleware.
///
/// Handlers take this instead of trusting the classifier blindly: the
/// extractor rejects with 401 when no authenticated actor is present.
#[derive(Debug, Clone)]
pub struct CurrentActor(pub AuthenticatedActor);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Actor>() {
            Some(Actor::Authenticated(actor)) => Ok(CurrentActor(actor.clone())),
            _ => Err(ApiError::unauthorized("Authentication required")),
        }
    }
}

impl CurrentActor {
    /// Handler-level role check, independent of the route table
    pub fn require_role(&self, role: Role) -> Result<&AuthenticatedActor, ApiError> {
        if self.0.role == role {
            Ok(&self.0)
        } else {
            tracing::warn!(
                "Profile {} with role {} refused: {} required",
                self.0.profile_id, self.0.role, role
            );
            Err(ApiError::permission_denied())
        }
    }
}
