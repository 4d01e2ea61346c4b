use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{
    Business, BusinessUpdate, Claim, ClaimStatus, NewBusiness, NewClaim, NewProfile, OwnershipLink, Profile,
    ProfileUpdate,
};
use super::store::{BusinessStore, ClaimStore, OwnershipStore, ProfileStore, Store};
use crate::types::{OnboardingStep, Role};

const PROFILE_COLUMNS: &str = "id, email, role, display_name, avatar_url, bio, locale, \
     interests_complete, subcategories_complete, deal_breakers_complete, onboarding_complete, \
     created_at, updated_at";

const BUSINESS_COLUMNS: &str = "id, name, description, category, address, phone, website, created_at, updated_at";

const CLAIM_COLUMNS: &str = "id, profile_id, business_id, status, note, submitted_at, reviewed_at, reviewed_by";

/// Postgres-backed store. Business mutations run under row-level security.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a transaction acting as `profile_id` for the RLS policies
    async fn begin_as(&self, profile_id: Uuid) -> Result<Transaction<'static, Postgres>, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT set_config('app.current_profile_id', $1, true)")
            .bind(profile_id.to_string())
            .execute(&mut *tx)
            .await?;
        Ok(tx)
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn get_profile(&self, account_id: Uuid) -> Result<Option<Profile>, DatabaseError> {
        let sql = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);
        let profile = sqlx::query_as::<_, Profile>(&sql)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    async fn create_profile(&self, new: NewProfile) -> Result<(Profile, bool), DatabaseError> {
        let sql = format!(
            "INSERT INTO profiles (id, email, role) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO NOTHING RETURNING {}",
            PROFILE_COLUMNS
        );
        let inserted = sqlx::query_as::<_, Profile>(&sql)
            .bind(new.account_id)
            .bind(&new.email)
            .bind(new.role)
            .fetch_optional(&self.pool)
            .await?;

        match inserted {
            Some(profile) => Ok((profile, true)),
            None => {
                let existing = self
                    .get_profile(new.account_id)
                    .await?
                    .ok_or_else(|| DatabaseError::NotFound("Profile vanished during creation".to_string()))?;
                Ok((existing, false))
            }
        }
    }

    async fn update_profile(&self, account_id: Uuid, update: ProfileUpdate) -> Result<Profile, DatabaseError> {
        let sql = format!(
            "UPDATE profiles SET \
                display_name = COALESCE($2, display_name), \
                avatar_url = COALESCE($3, avatar_url), \
                bio = COALESCE($4, bio), \
                locale = COALESCE($5, locale), \
                updated_at = now() \
             WHERE id = $1 RETURNING {}",
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, Profile>(&sql)
            .bind(account_id)
            .bind(&update.display_name)
            .bind(&update.avatar_url)
            .bind(&update.bio)
            .bind(&update.locale)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Profile not found".to_string()))
    }

    async fn complete_onboarding_step(&self, account_id: Uuid, step: OnboardingStep) -> Result<Profile, DatabaseError> {
        // Column names come from a closed enum, never from input
        let column = match step {
            OnboardingStep::Interests => "interests_complete",
            OnboardingStep::Subcategories => "subcategories_complete",
            OnboardingStep::DealBreakers => "deal_breakers_complete",
            OnboardingStep::Complete => "onboarding_complete",
        };
        let sql = format!(
            "UPDATE profiles SET {} = TRUE, updated_at = now() WHERE id = $1 RETURNING {}",
            column, PROFILE_COLUMNS
        );
        sqlx::query_as::<_, Profile>(&sql)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Profile not found".to_string()))
    }

    async fn set_role(&self, account_id: Uuid, role: Role) -> Result<Profile, DatabaseError> {
        let sql = format!(
            "UPDATE profiles SET role = $2, updated_at = now() WHERE id = $1 RETURNING {}",
            PROFILE_COLUMNS
        );
        sqlx::query_as::<_, Profile>(&sql)
            .bind(account_id)
            .bind(role)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Profile not found".to_string()))
    }

    async fn delete_profile(&self, account_id: Uuid) -> Result<(), DatabaseError> {
        // Claims and ownership links cascade through their foreign keys
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(account_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Profile not found".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl OwnershipStore for PgStore {
    async fn find_link(&self, profile_id: Uuid, business_id: Uuid) -> Result<Option<OwnershipLink>, DatabaseError> {
        let link = sqlx::query_as::<_, OwnershipLink>(
            "SELECT profile_id, business_id, claim_id, verified_at FROM business_owners \
             WHERE profile_id = $1 AND business_id = $2",
        )
        .bind(profile_id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(link)
    }

    async fn owned_businesses(&self, profile_id: Uuid) -> Result<Vec<Business>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM businesses \
             WHERE id IN (SELECT business_id FROM business_owners WHERE profile_id = $1) \
             ORDER BY name",
            BUSINESS_COLUMNS
        );
        let businesses = sqlx::query_as::<_, Business>(&sql)
            .bind(profile_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(businesses)
    }

    async fn revoke_link(&self, profile_id: Uuid, business_id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM business_owners WHERE profile_id = $1 AND business_id = $2")
            .bind(profile_id)
            .bind(business_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ClaimStore for PgStore {
    async fn submit_claim(&self, new: NewClaim) -> Result<Claim, DatabaseError> {
        let sql = format!(
            "INSERT INTO business_claims (profile_id, business_id, note) VALUES ($1, $2, $3) RETURNING {}",
            CLAIM_COLUMNS
        );
        sqlx::query_as::<_, Claim>(&sql)
            .bind(new.profile_id)
            .bind(new.business_id)
            .bind(&new.note)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_constraint(e, "A claim for this business is already pending"))
    }

    async fn get_claim(&self, claim_id: Uuid) -> Result<Option<Claim>, DatabaseError> {
        let sql = format!("SELECT {} FROM business_claims WHERE id = $1", CLAIM_COLUMNS);
        let claim = sqlx::query_as::<_, Claim>(&sql)
            .bind(claim_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(claim)
    }

    async fn claims_for_profile(&self, profile_id: Uuid) -> Result<Vec<Claim>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM business_claims WHERE profile_id = $1 ORDER BY submitted_at DESC",
            CLAIM_COLUMNS
        );
        let claims = sqlx::query_as::<_, Claim>(&sql)
            .bind(profile_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(claims)
    }

    async fn list_claims(&self, status: Option<ClaimStatus>) -> Result<Vec<Claim>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM business_claims WHERE ($1::claim_status IS NULL OR status = $1) \
             ORDER BY submitted_at",
            CLAIM_COLUMNS
        );
        let claims = sqlx::query_as::<_, Claim>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(claims)
    }

    async fn record_review(&self, claim_id: Uuid, outcome: ClaimStatus, reviewer: Uuid) -> Result<Claim, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        // Conditional on still being pending; a concurrent review loses here
        let sql = format!(
            "UPDATE business_claims SET status = $2, reviewed_at = now(), reviewed_by = $3 \
             WHERE id = $1 AND status = 'pending' RETURNING {}",
            CLAIM_COLUMNS
        );
        let claim = sqlx::query_as::<_, Claim>(&sql)
            .bind(claim_id)
            .bind(outcome)
            .bind(reviewer)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::Conflict("Claim is no longer pending".to_string()))?;

        if outcome == ClaimStatus::Approved {
            sqlx::query(
                "INSERT INTO business_owners (profile_id, business_id, claim_id) VALUES ($1, $2, $3) \
                 ON CONFLICT (profile_id, business_id) DO NOTHING",
            )
            .bind(claim.profile_id)
            .bind(claim.business_id)
            .bind(claim.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(claim)
    }
}

#[async_trait]
impl BusinessStore for PgStore {
    async fn get_business(&self, business_id: Uuid) -> Result<Option<Business>, DatabaseError> {
        let sql = format!("SELECT {} FROM businesses WHERE id = $1", BUSINESS_COLUMNS);
        let business = sqlx::query_as::<_, Business>(&sql)
            .bind(business_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(business)
    }

    async fn create_business(&self, new: NewBusiness) -> Result<Business, DatabaseError> {
        let sql = format!(
            "INSERT INTO businesses (name, description, category, address, phone, website) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            BUSINESS_COLUMNS
        );
        let business = sqlx::query_as::<_, Business>(&sql)
            .bind(&new.name)
            .bind(&new.description)
            .bind(&new.category)
            .bind(&new.address)
            .bind(&new.phone)
            .bind(&new.website)
            .fetch_one(&self.pool)
            .await?;
        Ok(business)
    }

    async fn update_business_as(&self, actor: Uuid, business_id: Uuid, update: BusinessUpdate) -> Result<Business, DatabaseError> {
        let mut tx = self.begin_as(actor).await?;
        let sql = format!(
            "UPDATE businesses SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                category = COALESCE($4, category), \
                address = COALESCE($5, address), \
                phone = COALESCE($6, phone), \
                website = COALESCE($7, website), \
                updated_at = now() \
             WHERE id = $1 RETURNING {}",
            BUSINESS_COLUMNS
        );
        // RLS hides rows the actor does not own, so "no row" means denied
        let business = sqlx::query_as::<_, Business>(&sql)
            .bind(business_id)
            .bind(&update.name)
            .bind(&update.description)
            .bind(&update.category)
            .bind(&update.address)
            .bind(&update.phone)
            .bind(&update.website)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::PermissionDenied(format!("update of business {}", business_id)))?;
        tx.commit().await?;
        Ok(business)
    }

    async fn delete_business_as(&self, actor: Uuid, business_id: Uuid) -> Result<(), DatabaseError> {
        let mut tx = self.begin_as(actor).await?;
        let result = sqlx::query("DELETE FROM businesses WHERE id = $1")
            .bind(business_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::PermissionDenied(format!("delete of business {}", business_id)));
        }
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
