use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::{OnboardingProgress, Role};

/// Application-level account record, one per identity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    /// Account id issued by the identity provider
    pub id: Uuid,
    pub email: Option<String>,
    pub role: Role,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub locale: Option<String>,
    pub interests_complete: bool,
    pub subcategories_complete: bool,
    pub deal_breakers_complete: bool,
    pub onboarding_complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn onboarding(&self) -> OnboardingProgress {
        OnboardingProgress {
            interests: self.interests_complete,
            subcategories: self.subcategories_complete,
            deal_breakers: self.deal_breakers_complete,
            complete: self.onboarding_complete,
        }
    }

    pub fn set_onboarding(&mut self, progress: OnboardingProgress) {
        self.interests_complete = progress.interests;
        self.subcategories_complete = progress.subcategories;
        self.deal_breakers_complete = progress.deal_breakers;
        self.onboarding_complete = progress.complete;
    }
}

/// Profile created by the identity provider's post-creation hook
#[derive(Debug, Clone, Deserialize)]
pub struct NewProfile {
    pub account_id: Uuid,
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
}

/// Display metadata a profile owner may change. There is deliberately no
/// `role` field here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub locale: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.avatar_url.is_none() && self.bio.is_none() && self.locale.is_none()
    }

    pub fn apply(&self, profile: &mut Profile) {
        if let Some(v) = &self.display_name {
            profile.display_name = Some(v.clone());
        }
        if let Some(v) = &self.avatar_url {
            profile.avatar_url = Some(v.clone());
        }
        if let Some(v) = &self.bio {
            profile.bio = Some(v.clone());
        }
        if let Some(v) = &self.locale {
            profile.locale = Some(v.clone());
        }
    }
}
