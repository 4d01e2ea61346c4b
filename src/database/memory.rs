use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{
    Business, BusinessUpdate, Claim, ClaimStatus, NewBusiness, NewClaim, NewProfile, OwnershipLink, Profile,
    ProfileUpdate,
};
use super::store::{BusinessStore, ClaimStore, OwnershipStore, ProfileStore, Store};
use crate::types::{OnboardingStep, Role};

#[derive(Default)]
struct MemoryState {
    profiles: HashMap<Uuid, Profile>,
    businesses: HashMap<Uuid, Business>,
    claims: HashMap<Uuid, Claim>,
    owners: HashMap<(Uuid, Uuid), OwnershipLink>,
}

/// In-process store for development and tests.
///
/// Every write takes the single state lock, which plays the part of the
/// database's uniqueness constraints and transactions.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: every call fails with `Unavailable` until cleared
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), DatabaseError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DatabaseError::Unavailable("memory store offline".to_string()));
        }
        Ok(())
    }
}

fn profile_not_found() -> DatabaseError {
    DatabaseError::NotFound("Profile not found".to_string())
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, account_id: Uuid) -> Result<Option<Profile>, DatabaseError> {
        self.check_available()?;
        Ok(self.state.read().await.profiles.get(&account_id).cloned())
    }

    async fn create_profile(&self, new: NewProfile) -> Result<(Profile, bool), DatabaseError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        if let Some(existing) = state.profiles.get(&new.account_id) {
            return Ok((existing.clone(), false));
        }
        let now = Utc::now();
        let profile = Profile {
            id: new.account_id,
            email: new.email,
            role: new.role,
            display_name: None,
            avatar_url: None,
            bio: None,
            locale: None,
            interests_complete: false,
            subcategories_complete: false,
            deal_breakers_complete: false,
            onboarding_complete: false,
            created_at: now,
            updated_at: now,
        };
        state.profiles.insert(profile.id, profile.clone());
        Ok((profile, true))
    }

    async fn update_profile(&self, account_id: Uuid, update: ProfileUpdate) -> Result<Profile, DatabaseError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        let profile = state.profiles.get_mut(&account_id).ok_or_else(profile_not_found)?;
        update.apply(profile);
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn complete_onboarding_step(&self, account_id: Uuid, step: OnboardingStep) -> Result<Profile, DatabaseError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        let profile = state.profiles.get_mut(&account_id).ok_or_else(profile_not_found)?;
        let mut progress = profile.onboarding();
        progress.mark(step);
        profile.set_onboarding(progress);
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn set_role(&self, account_id: Uuid, role: Role) -> Result<Profile, DatabaseError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        let profile = state.profiles.get_mut(&account_id).ok_or_else(profile_not_found)?;
        profile.role = role;
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn delete_profile(&self, account_id: Uuid) -> Result<(), DatabaseError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        if state.profiles.remove(&account_id).is_none() {
            return Err(profile_not_found());
        }
        state.claims.retain(|_, claim| claim.profile_id != account_id);
        state.owners.retain(|(profile_id, _), _| *profile_id != account_id);
        for claim in state.claims.values_mut() {
            if claim.reviewed_by == Some(account_id) {
                claim.reviewed_by = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl OwnershipStore for MemoryStore {
    async fn find_link(&self, profile_id: Uuid, business_id: Uuid) -> Result<Option<OwnershipLink>, DatabaseError> {
        self.check_available()?;
        Ok(self.state.read().await.owners.get(&(profile_id, business_id)).cloned())
    }

    async fn owned_businesses(&self, profile_id: Uuid) -> Result<Vec<Business>, DatabaseError> {
        self.check_available()?;
        let state = self.state.read().await;
        let mut businesses: Vec<Business> = state
            .owners
            .keys()
            .filter(|(owner, _)| *owner == profile_id)
            .filter_map(|(_, business_id)| state.businesses.get(business_id).cloned())
            .collect();
        businesses.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(businesses)
    }

    async fn revoke_link(&self, profile_id: Uuid, business_id: Uuid) -> Result<bool, DatabaseError> {
        self.check_available()?;
        Ok(self.state.write().await.owners.remove(&(profile_id, business_id)).is_some())
    }
}

#[async_trait]
impl ClaimStore for MemoryStore {
    async fn submit_claim(&self, new: NewClaim) -> Result<Claim, DatabaseError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        if !state.profiles.contains_key(&new.profile_id) || !state.businesses.contains_key(&new.business_id) {
            return Err(DatabaseError::NotFound("Referenced record does not exist".to_string()));
        }
        let duplicate = state.claims.values().any(|claim| {
            claim.profile_id == new.profile_id
                && claim.business_id == new.business_id
                && claim.status == ClaimStatus::Pending
        });
        if duplicate {
            return Err(DatabaseError::Conflict(
                "A claim for this business is already pending".to_string(),
            ));
        }
        let claim = Claim {
            id: Uuid::new_v4(),
            profile_id: new.profile_id,
            business_id: new.business_id,
            status: ClaimStatus::Pending,
            note: new.note,
            submitted_at: Utc::now(),
            reviewed_at: None,
            reviewed_by: None,
        };
        state.claims.insert(claim.id, claim.clone());
        Ok(claim)
    }

    async fn get_claim(&self, claim_id: Uuid) -> Result<Option<Claim>, DatabaseError> {
        self.check_available()?;
        Ok(self.state.read().await.claims.get(&claim_id).cloned())
    }

    async fn claims_for_profile(&self, profile_id: Uuid) -> Result<Vec<Claim>, DatabaseError> {
        self.check_available()?;
        let state = self.state.read().await;
        let mut claims: Vec<Claim> = state
            .claims
            .values()
            .filter(|claim| claim.profile_id == profile_id)
            .cloned()
            .collect();
        claims.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(claims)
    }

    async fn list_claims(&self, status: Option<ClaimStatus>) -> Result<Vec<Claim>, DatabaseError> {
        self.check_available()?;
        let state = self.state.read().await;
        let mut claims: Vec<Claim> = state
            .claims
            .values()
            .filter(|claim| status.map_or(true, |s| claim.status == s))
            .cloned()
            .collect();
        claims.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at));
        Ok(claims)
    }

    async fn record_review(&self, claim_id: Uuid, outcome: ClaimStatus, reviewer: Uuid) -> Result<Claim, DatabaseError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        let claim = state
            .claims
            .get_mut(&claim_id)
            .ok_or_else(|| DatabaseError::NotFound("Claim not found".to_string()))?;
        if claim.status != ClaimStatus::Pending {
            return Err(DatabaseError::Conflict("Claim is no longer pending".to_string()));
        }
        let now = Utc::now();
        claim.status = outcome;
        claim.reviewed_at = Some(now);
        claim.reviewed_by = Some(reviewer);
        let claim = claim.clone();

        if outcome == ClaimStatus::Approved {
            state
                .owners
                .entry((claim.profile_id, claim.business_id))
                .or_insert_with(|| OwnershipLink {
                    profile_id: claim.profile_id,
                    business_id: claim.business_id,
                    claim_id: Some(claim.id),
                    verified_at: now,
                });
        }
        Ok(claim)
    }
}

#[async_trait]
impl BusinessStore for MemoryStore {
    async fn get_business(&self, business_id: Uuid) -> Result<Option<Business>, DatabaseError> {
        self.check_available()?;
        Ok(self.state.read().await.businesses.get(&business_id).cloned())
    }

    async fn create_business(&self, new: NewBusiness) -> Result<Business, DatabaseError> {
        self.check_available()?;
        let now = Utc::now();
        let business = Business {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            category: new.category,
            address: new.address,
            phone: new.phone,
            website: new.website,
            created_at: now,
            updated_at: now,
        };
        self.state.write().await.businesses.insert(business.id, business.clone());
        Ok(business)
    }

    async fn update_business_as(&self, actor: Uuid, business_id: Uuid, update: BusinessUpdate) -> Result<Business, DatabaseError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        if !state.owners.contains_key(&(actor, business_id)) {
            return Err(DatabaseError::PermissionDenied(format!("update of business {}", business_id)));
        }
        let business = state
            .businesses
            .get_mut(&business_id)
            .ok_or_else(|| DatabaseError::PermissionDenied(format!("update of business {}", business_id)))?;
        update.apply(business);
        business.updated_at = Utc::now();
        Ok(business.clone())
    }

    async fn delete_business_as(&self, actor: Uuid, business_id: Uuid) -> Result<(), DatabaseError> {
        self.check_available()?;
        let mut state = self.state.write().await;
        if !state.owners.contains_key(&(actor, business_id)) || state.businesses.remove(&business_id).is_none() {
            return Err(DatabaseError::PermissionDenied(format!("delete of business {}", business_id)));
        }
        state.claims.retain(|_, claim| claim.business_id != business_id);
        state.owners.retain(|(_, owned), _| *owned != business_id);
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        self.check_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (MemoryStore, Profile, Business) {
        let store = MemoryStore::new();
        let (owner, _) = store
            .create_profile(NewProfile {
                account_id: Uuid::new_v4(),
                email: Some("owner@example.com".into()),
                role: Role::BusinessOwner,
            })
            .await
            .unwrap();
        let business = store.create_business(NewBusiness::named("Taqueria")).await.unwrap();
        (store, owner, business)
    }

    #[tokio::test]
    async fn create_profile_is_idempotent_and_keeps_role() {
        let (store, owner, _) = seeded().await;
        let (again, created) = store
            .create_profile(NewProfile {
                account_id: owner.id,
                email: None,
                role: Role::User,
            })
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(again.role, Role::BusinessOwner);
    }

    #[tokio::test]
    async fn second_pending_claim_conflicts() {
        let (store, owner, business) = seeded().await;
        let new = || NewClaim { profile_id: owner.id, business_id: business.id, note: None };
        store.submit_claim(new()).await.unwrap();
        assert!(matches!(store.submit_claim(new()).await, Err(DatabaseError::Conflict(_))));
    }

    #[tokio::test]
    async fn approval_writes_link_and_review_is_single_shot() {
        let (store, owner, business) = seeded().await;
        let claim = store
            .submit_claim(NewClaim { profile_id: owner.id, business_id: business.id, note: None })
            .await
            .unwrap();
        let reviewer = Uuid::new_v4();

        store.record_review(claim.id, ClaimStatus::Approved, reviewer).await.unwrap();
        assert!(store.find_link(owner.id, business.id).await.unwrap().is_some());

        let again = store.record_review(claim.id, ClaimStatus::Rejected, reviewer).await;
        assert!(matches!(again, Err(DatabaseError::Conflict(_))));
    }

    #[tokio::test]
    async fn mutation_without_link_is_denied_at_row_level() {
        let (store, owner, business) = seeded().await;
        let result = store
            .update_business_as(owner.id, business.id, BusinessUpdate { name: Some("Mine".into()), ..Default::default() })
            .await;
        assert!(matches!(result, Err(DatabaseError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn deleting_profile_cascades() {
        let (store, owner, business) = seeded().await;
        let claim = store
            .submit_claim(NewClaim { profile_id: owner.id, business_id: business.id, note: None })
            .await
            .unwrap();
        store.record_review(claim.id, ClaimStatus::Approved, Uuid::new_v4()).await.unwrap();

        store.delete_profile(owner.id).await.unwrap();
        assert!(store.get_claim(claim.id).await.unwrap().is_none());
        assert!(store.find_link(owner.id, business.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn outage_surfaces_as_unavailable() {
        let (store, owner, _) = seeded().await;
        store.set_unavailable(true);
        assert!(matches!(store.get_profile(owner.id).await, Err(DatabaseError::Unavailable(_))));
        store.set_unavailable(false);
        assert!(store.get_profile(owner.id).await.unwrap().is_some());
    }
}
