/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Landing surface for personal accounts
pub const PERSONAL_HOME: &str = "/home";
/// Landing surface for business accounts
pub const BUSINESS_HOME: &str = "/my-businesses";
/// Landing surface for administrators
pub const ADMIN_HOME: &str = "/admin";
/// Login page; unauthenticated actors are sent here with a return target
pub const LOGIN_PATH: &str = "/login";

/// Account context of a profile.
///
/// Stored as the `profile_role` Postgres enum. The role is set once at signup
/// and afterwards only through an explicit administrative action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "profile_role", rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    BusinessOwner,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::BusinessOwner, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::BusinessOwner => "business_owner",
            Role::Admin => "admin",
        }
    }

    /// Fixed home surface every redirect for this role lands on
    pub fn home(&self) -> &'static str {
        match self {
            Role::User => PERSONAL_HOME,
            Role::BusinessOwner => BUSINESS_HOME,
            Role::Admin => ADMIN_HOME,
        }
    }

    /// Roles a signup flow may request. Administrators are never self-assigned.
    pub fn assignable_at_signup(&self) -> bool {
        matches!(self, Role::User | Role::BusinessOwner)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "business_owner" => Ok(Role::BusinessOwner),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Onboarding steps for personal accounts, in the order they must be completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnboardingStep {
    Interests,
    Subcategories,
    DealBreakers,
    Complete,
}

impl OnboardingStep {
    pub const ALL: [OnboardingStep; 4] = [
        OnboardingStep::Interests,
        OnboardingStep::Subcategories,
        OnboardingStep::DealBreakers,
        OnboardingStep::Complete,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            OnboardingStep::Interests => "interests",
            OnboardingStep::Subcategories => "subcategories",
            OnboardingStep::DealBreakers => "deal-breakers",
            OnboardingStep::Complete => "complete",
        }
    }

    /// Page that renders this step
    pub fn path(&self) -> &'static str {
        match self {
            OnboardingStep::Interests => "/onboarding/interests",
            OnboardingStep::Subcategories => "/onboarding/subcategories",
            OnboardingStep::DealBreakers => "/onboarding/deal-breakers",
            OnboardingStep::Complete => "/onboarding/complete",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.slug() == slug)
    }

    /// Step rendered by a page path; nested paths under a step belong to it
    pub fn from_path(path: &str) -> Option<Self> {
        let rest = path.strip_prefix("/onboarding/")?;
        let slug = rest.split('/').next().unwrap_or_default();
        Self::from_slug(slug)
    }
}

impl fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Completion flags carried on a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OnboardingProgress {
    pub interests: bool,
    pub subcategories: bool,
    pub deal_breakers: bool,
    pub complete: bool,
}

impl OnboardingProgress {
    pub fn finished() -> Self {
        Self {
            interests: true,
            subcategories: true,
            deal_breakers: true,
            complete: true,
        }
    }

    pub fn is_done(&self, step: OnboardingStep) -> bool {
        match step {
            OnboardingStep::Interests => self.interests,
            OnboardingStep::Subcategories => self.subcategories,
            OnboardingStep::DealBreakers => self.deal_breakers,
            OnboardingStep::Complete => self.complete,
        }
    }

    /// First step not yet completed, or `None` once onboarding is finished
    pub fn next_step(&self) -> Option<OnboardingStep> {
        OnboardingStep::ALL.into_iter().find(|step| !self.is_done(*step))
    }

    pub fn is_complete(&self) -> bool {
        self.next_step().is_none()
    }

    pub fn mark(&mut self, step: OnboardingStep) {
        match step {
            OnboardingStep::Interests => self.interests = true,
            OnboardingStep::Subcategories => self.subcategories = true,
            OnboardingStep::DealBreakers => self.deal_breakers = true,
            OnboardingStep::Complete => self.complete = true,
        }
    }
}
