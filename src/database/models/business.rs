use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Business {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBusiness {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

impl NewBusiness {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            category: None,
            address: None,
            phone: None,
            website: None,
        }
    }
}

/// Listing fields an owner may edit
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BusinessUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

impl BusinessUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.address.is_none()
            && self.phone.is_none()
            && self.website.is_none()
    }

    pub fn apply(&self, business: &mut Business) {
        if let Some(v) = &self.name {
            business.name = v.clone();
        }
        if let Some(v) = &self.description {
            business.description = Some(v.clone());
        }
        if let Some(v) = &self.category {
            business.category = Some(v.clone());
        }
        if let Some(v) = &self.address {
            business.address = Some(v.clone());
        }
        if let Some(v) = &self.phone {
            business.phone = Some(v.clone());
        }
        if let Some(v) = &self.website {
            business.website = Some(v.clone());
        }
    }
}
