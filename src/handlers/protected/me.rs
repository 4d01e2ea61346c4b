// handlers/protected/me.rs - GET/PATCH/DELETE /api/me handlers

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::Value;

use crate::app::AppState;
use crate::database::models::{Profile, ProfileUpdate};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentActor};

const DISPLAY_NAME_MAX: usize = 80;
const BIO_MAX: usize = 500;
const LOCALE_MAX: usize = 35;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub profile: Profile,
    /// Where this account lands after login
    pub landing: &'static str,
}

/// GET /api/me - Current profile and landing path
pub async fn me_get(State(state): State<AppState>, CurrentActor(actor): CurrentActor) -> ApiResult<MeResponse> {
    let profile = state
        .store
        .get_profile(actor.profile_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    Ok(ApiResponse::success(MeResponse {
        profile,
        landing: actor.landing(),
    }))
}

/// PATCH /api/me - Update display metadata.
///
/// The body is read as raw JSON first so a `role` key can be refused with a
/// clear message rather than a generic unknown-field error.
pub async fn me_patch(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(body): Json<Value>,
) -> ApiResult<Profile> {
    if body.get("role").is_some() {
        tracing::warn!("Profile {} attempted to change its role via PATCH /api/me", actor.profile_id);
        return Err(ApiError::invalid_field("role", "role cannot be changed here"));
    }

    let update: ProfileUpdate =
        serde_json::from_value(body).map_err(|e| ApiError::bad_request(format!("Invalid profile update: {}", e)))?;
    validate_profile_update(&update)?;

    let profile = state.store.update_profile(actor.profile_id, update).await?;
    Ok(ApiResponse::success(profile))
}

/// DELETE /api/me - Remove the profile with its claims and ownership links
pub async fn me_delete(State(state): State<AppState>, CurrentActor(actor): CurrentActor) -> ApiResult<()> {
    state.store.delete_profile(actor.profile_id).await?;
    tracing::info!("Deleted profile {}", actor.profile_id);
    Ok(ApiResponse::no_content())
}

fn validate_profile_update(update: &ProfileUpdate) -> Result<(), ApiError> {
    if update.is_empty() {
        return Err(ApiError::bad_request("No fields to update"));
    }

    if let Some(name) = &update.display_name {
        let length = name.trim().chars().count();
        if length == 0 {
            return Err(ApiError::invalid_field("display_name", "must not be blank"));
        }
        if length > DISPLAY_NAME_MAX {
            return Err(ApiError::invalid_field(
                "display_name",
                format!("must be at most {} characters", DISPLAY_NAME_MAX),
            ));
        }
    }

    if let Some(bio) = &update.bio {
        if bio.chars().count() > BIO_MAX {
            return Err(ApiError::invalid_field("bio", format!("must be at most {} characters", BIO_MAX)));
        }
    }

    if let Some(avatar) = &update.avatar_url {
        if !is_http_url(avatar) {
            return Err(ApiError::invalid_field("avatar_url", "must be an http(s) URL"));
        }
    }

    if let Some(locale) = &update.locale {
        let valid = !locale.is_empty()
            && locale.len() <= LOCALE_MAX
            && locale.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ApiError::invalid_field("locale", "must be a language tag such as en-US"));
        }
    }

    Ok(())
}

pub(crate) fn is_http_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}
