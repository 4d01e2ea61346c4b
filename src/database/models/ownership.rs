use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Verified association between a profile and a business it may manage
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OwnershipLink {
    pub profile_id: Uuid,
    pub business_id: Uuid,
    pub claim_id: Option<Uuid>,
    pub verified_at: DateTime<Utc>,
}
