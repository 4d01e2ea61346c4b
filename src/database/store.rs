use async_trait::async_trait;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{
    Business, BusinessUpdate, Claim, ClaimStatus, NewBusiness, NewClaim, NewProfile, OwnershipLink, Profile,
    ProfileUpdate,
};
use crate::types::{OnboardingStep, Role};

/// Profile table
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, account_id: Uuid) -> Result<Option<Profile>, DatabaseError>;

    /// Create the profile for a new identity. Idempotent: an existing profile
    /// is returned unchanged (its role included) with `false`.
    async fn create_profile(&self, new: NewProfile) -> Result<(Profile, bool), DatabaseError>;

    async fn update_profile(&self, account_id: Uuid, update: ProfileUpdate) -> Result<Profile, DatabaseError>;

    async fn complete_onboarding_step(&self, account_id: Uuid, step: OnboardingStep) -> Result<Profile, DatabaseError>;

    /// Administrative role change; the only path besides signup that sets a role
    async fn set_role(&self, account_id: Uuid, role: Role) -> Result<Profile, DatabaseError>;

    /// Remove the profile with its claims and ownership links
    async fn delete_profile(&self, account_id: Uuid) -> Result<(), DatabaseError>;
}

/// Verified ownership links
#[async_trait]
pub trait OwnershipStore: Send + Sync {
    async fn find_link(&self, profile_id: Uuid, business_id: Uuid) -> Result<Option<OwnershipLink>, DatabaseError>;

    async fn owned_businesses(&self, profile_id: Uuid) -> Result<Vec<Business>, DatabaseError>;

    /// Returns whether a link was removed
    async fn revoke_link(&self, profile_id: Uuid, business_id: Uuid) -> Result<bool, DatabaseError>;
}

/// Claim requests
#[async_trait]
pub trait ClaimStore: Send + Sync {
    /// Conflict when the profile already has a pending claim on the business
    async fn submit_claim(&self, new: NewClaim) -> Result<Claim, DatabaseError>;

    async fn get_claim(&self, claim_id: Uuid) -> Result<Option<Claim>, DatabaseError>;

    async fn claims_for_profile(&self, profile_id: Uuid) -> Result<Vec<Claim>, DatabaseError>;

    async fn list_claims(&self, status: Option<ClaimStatus>) -> Result<Vec<Claim>, DatabaseError>;

    /// Move a pending claim to `outcome`. On approval the ownership link is
    /// written in the same atomic step. Conflict if the claim is no longer
    /// pending when the write lands.
    async fn record_review(&self, claim_id: Uuid, outcome: ClaimStatus, reviewer: Uuid) -> Result<Claim, DatabaseError>;
}

/// Business listings, limited to what owner management touches
#[async_trait]
pub trait BusinessStore: Send + Sync {
    async fn get_business(&self, business_id: Uuid) -> Result<Option<Business>, DatabaseError>;

    async fn create_business(&self, new: NewBusiness) -> Result<Business, DatabaseError>;

    /// Update on behalf of `actor`. The store enforces ownership at row level
    /// and answers `PermissionDenied` when no verified link exists.
    async fn update_business_as(&self, actor: Uuid, business_id: Uuid, update: BusinessUpdate) -> Result<Business, DatabaseError>;

    /// Delete on behalf of `actor`, cascading claims and links
    async fn delete_business_as(&self, actor: Uuid, business_id: Uuid) -> Result<(), DatabaseError>;
}

/// Everything the service needs from persistence
#[async_trait]
pub trait Store: ProfileStore + OwnershipStore + ClaimStore + BusinessStore {
    async fn ping(&self) -> Result<(), DatabaseError>;
}
