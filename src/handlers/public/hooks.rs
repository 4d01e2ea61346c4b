// handlers/public/hooks.rs - POST /api/hooks/identity-created handler
//
// Called by the identity provider right after it creates an account. Creates
// the matching profile with the role chosen on the signup form.

use axum::{body::Bytes, extract::State, http::HeaderMap};

use crate::app::AppState;
use crate::database::models::{NewProfile, Profile};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

pub const HOOK_SECRET_HEADER: &str = "x-hook-secret";

/**
 * POST /api/hooks/identity-created - Create the profile for a new identity
 *
 * Expected Input:
 * ```json
 * {
 *   "account_id": "uuid",              // Required: identity provider account id
 *   "email": "string",                 // Optional
 *   "role": "user" | "business_owner"  // Optional, defaults to "user"
 * }
 * ```
 *
 * The secret is checked before the body is parsed. Idempotent: replaying the
 * hook returns the existing profile with 200 and never changes its role.
 */
pub async fn identity_created(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Profile> {
    verify_hook_secret(&headers, &state.config.security.hook_secret)?;

    let new: NewProfile = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("Invalid identity payload: {}", e)))?;

    if !new.role.assignable_at_signup() {
        tracing::warn!("Signup for account {} requested role {}", new.account_id, new.role);
        return Err(ApiError::invalid_field("role", format!("'{}' cannot be chosen at signup", new.role)));
    }

    let (profile, created) = state.store.create_profile(new).await?;
    if created {
        tracing::info!("Created {} profile for account {}", profile.role, profile.id);
        Ok(ApiResponse::created(profile))
    } else {
        tracing::debug!("Profile for account {} already exists", profile.id);
        Ok(ApiResponse::success(profile))
    }
}

fn verify_hook_secret(headers: &HeaderMap, expected: &str) -> Result<(), ApiError> {
    if expected.is_empty() {
        tracing::error!("SECURITY_HOOK_SECRET is not configured; refusing identity hook");
        return Err(ApiError::unauthorized("Hook secret not accepted"));
    }

    let presented = headers
        .get(HOOK_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if constant_time_eq(presented.as_bytes(), expected.as_bytes()) {
        Ok(())
    } else {
        tracing::warn!("Identity hook called with a bad secret");
        Err(ApiError::unauthorized("Hook secret not accepted"))
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
