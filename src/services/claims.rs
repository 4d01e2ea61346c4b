use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::ownership::is_owner;
use crate::access::AuthenticatedActor;
use crate::database::models::{Claim, ClaimStatus, NewClaim};
use crate::database::Store;
use crate::error::ApiError;
use crate::types::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimAction {
    Approve,
    Reject,
}

impl ClaimAction {
    pub fn outcome(&self) -> ClaimStatus {
        match self {
            ClaimAction::Approve => ClaimStatus::Approved,
            ClaimAction::Reject => ClaimStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimError {
    #[error("Only administrators may review claims (reviewer role: {0})")]
    ReviewerNotAdmin(Role),

    #[error("Claim has already been {0}")]
    AlreadyReviewed(ClaimStatus),

    #[error("Claimant is no longer a business account (role: {0})")]
    ClaimantNotBusiness(Role),
}

/// Claim state machine: `pending -> approved | rejected`, admin reviewers
/// only, terminal states final.
pub fn transition(current: ClaimStatus, action: ClaimAction, reviewer: Role) -> Result<ClaimStatus, ClaimError> {
    if reviewer != Role::Admin {
        return Err(ClaimError::ReviewerNotAdmin(reviewer));
    }
    match current {
        ClaimStatus::Pending => Ok(action.outcome()),
        terminal => Err(ClaimError::AlreadyReviewed(terminal)),
    }
}

/// Review a claim on behalf of `reviewer`. Approval also requires the
/// claimant to still hold a business account.
pub async fn review_claim<S>(
    store: &S,
    reviewer: &AuthenticatedActor,
    claim_id: Uuid,
    action: ClaimAction,
) -> Result<Claim, ApiError>
where
    S: Store + ?Sized,
{
    let claim = store
        .get_claim(claim_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Claim not found"))?;

    let outcome = transition(claim.status, action, reviewer.role).map_err(|e| {
        tracing::warn!("Claim {} review by {} refused: {}", claim_id, reviewer.profile_id, e);
        e
    })?;

    if action == ClaimAction::Approve {
        let claimant = store
            .get_profile(claim.profile_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Claimant profile not found"))?;
        if claimant.role != Role::BusinessOwner {
            tracing::warn!("Claim {} not approved: claimant {} is {}", claim_id, claimant.id, claimant.role);
            return Err(ClaimError::ClaimantNotBusiness(claimant.role).into());
        }
    }

    let reviewed = store.record_review(claim.id, outcome, reviewer.profile_id).await?;
    tracing::info!(
        "Claim {} on business {} {} by {}",
        reviewed.id, reviewed.business_id, reviewed.status, reviewer.profile_id
    );
    Ok(reviewed)
}

/// File a claim for `business_id` on behalf of a business account
pub async fn submit_claim<S>(
    store: &S,
    claimant: &AuthenticatedActor,
    business_id: Uuid,
    note: Option<String>,
) -> Result<Claim, ApiError>
where
    S: Store + ?Sized,
{
    if claimant.role != Role::BusinessOwner {
        return Err(ApiError::permission_denied());
    }

    store
        .get_business(business_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Business not found"))?;

    if is_owner(store, claimant.profile_id, business_id).await {
        return Err(ApiError::conflict("You already manage this business"));
    }

    let claim = store
        .submit_claim(NewClaim {
            profile_id: claimant.profile_id,
            business_id,
            note,
        })
        .await?;
    tracing::info!("Claim {} submitted by {} for business {}", claim.id, claimant.profile_id, business_id);
    Ok(claim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_moves_pending_to_either_outcome() {
        assert_eq!(
            transition(ClaimStatus::Pending, ClaimAction::Approve, Role::Admin),
            Ok(ClaimStatus::Approved)
        );
        assert_eq!(
            transition(ClaimStatus::Pending, ClaimAction::Reject, Role::Admin),
            Ok(ClaimStatus::Rejected)
        );
    }

    #[test]
    fn terminal_states_are_final() {
        for terminal in [ClaimStatus::Approved, ClaimStatus::Rejected] {
            for action in [ClaimAction::Approve, ClaimAction::Reject] {
                assert_eq!(
                    transition(terminal, action, Role::Admin),
                    Err(ClaimError::AlreadyReviewed(terminal))
                );
            }
        }
    }

    #[test]
    fn non_admin_reviewers_are_refused() {
        for role in [Role::User, Role::BusinessOwner] {
            assert_eq!(
                transition(ClaimStatus::Pending, ClaimAction::Approve, role),
                Err(ClaimError::ReviewerNotAdmin(role))
            );
        }
    }
}
