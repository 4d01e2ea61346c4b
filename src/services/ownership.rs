use serde::Serialize;
use uuid::Uuid;

use crate::database::models::{Business, Claim, ClaimStatus};
use crate::database::{OwnershipStore, Store};
use crate::error::ApiError;

/// Does `profile_id` control `business_id`?
///
/// Reads the registry on every call. A failed read answers `false`, as does
/// an unknown business.
pub async fn is_owner<S>(store: &S, profile_id: Uuid, business_id: Uuid) -> bool
where
    S: OwnershipStore + ?Sized,
{
    match store.find_link(profile_id, business_id).await {
        Ok(link) => link.is_some(),
        Err(e) => {
            tracing::error!(
                "Ownership lookup failed for profile {} / business {}: {}",
                profile_id, business_id, e
            );
            false
        }
    }
}

pub async fn require_owner<S>(store: &S, profile_id: Uuid, business_id: Uuid) -> Result<(), ApiError>
where
    S: OwnershipStore + ?Sized,
{
    if is_owner(store, profile_id, business_id).await {
        Ok(())
    } else {
        tracing::warn!("Profile {} denied mutation of business {}", profile_id, business_id);
        Err(ApiError::permission_denied())
    }
}

/// What a business account's dashboard shows. A rejected claim and having
/// never claimed anything are different states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardStatus {
    Active,
    Pending,
    Revoked,
    Rejected,
    NoClaims,
}

impl DashboardStatus {
    pub fn derive(owned: &[Business], claims: &[Claim]) -> Self {
        let any = |status: ClaimStatus| claims.iter().any(|claim| claim.status == status);
        if !owned.is_empty() {
            DashboardStatus::Active
        } else if any(ClaimStatus::Pending) {
            DashboardStatus::Pending
        } else if any(ClaimStatus::Approved) {
            // Approved once, link since revoked
            DashboardStatus::Revoked
        } else if any(ClaimStatus::Rejected) {
            DashboardStatus::Rejected
        } else {
            DashboardStatus::NoClaims
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnerDashboard {
    pub status: DashboardStatus,
    pub businesses: Vec<Business>,
    pub claims: Vec<Claim>,
}

pub async fn owner_dashboard<S>(store: &S, profile_id: Uuid) -> Result<OwnerDashboard, ApiError>
where
    S: Store + ?Sized,
{
    let businesses = store.owned_businesses(profile_id).await?;
    let claims = store.claims_for_profile(profile_id).await?;
    Ok(OwnerDashboard {
        status: DashboardStatus::derive(&businesses, &claims),
        businesses,
        claims,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{NewBusiness, NewProfile};
    use crate::database::{BusinessStore, ClaimStore, MemoryStore, ProfileStore};
    use crate::database::models::NewClaim;
    use crate::types::Role;

    fn claim(status: ClaimStatus) -> Claim {
        Claim {
            id: Uuid::new_v4(),
            profile_id: Uuid::new_v4(),
            business_id: Uuid::new_v4(),
            status,
            note: None,
            submitted_at: chrono::Utc::now(),
            reviewed_at: None,
            reviewed_by: None,
        }
    }

    #[test]
    fn dashboard_distinguishes_rejected_from_never_claimed() {
        assert_eq!(DashboardStatus::derive(&[], &[]), DashboardStatus::NoClaims);
        assert_eq!(
            DashboardStatus::derive(&[], &[claim(ClaimStatus::Rejected)]),
            DashboardStatus::Rejected
        );
        assert_eq!(
            DashboardStatus::derive(&[], &[claim(ClaimStatus::Rejected), claim(ClaimStatus::Pending)]),
            DashboardStatus::Pending
        );
        assert_eq!(
            DashboardStatus::derive(&[], &[claim(ClaimStatus::Approved)]),
            DashboardStatus::Revoked
        );
    }

    #[tokio::test]
    async fn ownership_is_monotonic_until_revoked() {
        let store = MemoryStore::new();
        let (owner, _) = store
            .create_profile(NewProfile { account_id: Uuid::new_v4(), email: None, role: Role::BusinessOwner })
            .await
            .unwrap();
        let business = store.create_business(NewBusiness::named("Bakery")).await.unwrap();
        assert!(!is_owner(&store, owner.id, business.id).await);

        let pending = store
            .submit_claim(NewClaim { profile_id: owner.id, business_id: business.id, note: None })
            .await
            .unwrap();
        store.record_review(pending.id, ClaimStatus::Approved, Uuid::new_v4()).await.unwrap();

        for _ in 0..5 {
            assert!(is_owner(&store, owner.id, business.id).await);
        }

        store.revoke_link(owner.id, business.id).await.unwrap();
        assert!(!is_owner(&store, owner.id, business.id).await);
    }

    #[tokio::test]
    async fn lookup_failure_and_unknown_business_mean_not_owner() {
        let store = MemoryStore::new();
        let profile = Uuid::new_v4();
        assert!(!is_owner(&store, profile, Uuid::new_v4()).await);

        store.set_unavailable(true);
        assert!(!is_owner(&store, profile, Uuid::new_v4()).await);
        assert!(require_owner(&store, profile, Uuid::new_v4()).await.is_err());
    }
}
