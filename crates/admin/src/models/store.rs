//! Store domain types.
//!
//! A store is the tenant boundary: every catalog row belongs to exactly one
//! store, and only the store's owner may mutate its catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storedash_core::{StoreId, UserId};

use super::validation::{Validate, ValidationError, require_text};

/// A store owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Store {
    /// True when `user` owns this store.
    #[must_use]
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.user_id == user
    }
}

/// Request body for creating or renaming a store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Validated store fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreDraft {
    pub name: String,
}

impl Validate for StoreInput {
    type Draft = StoreDraft;

    fn validate(&self) -> Result<StoreDraft, ValidationError> {
        Ok(StoreDraft {
            name: require_text(self.name.as_ref(), "Name is required")?,
        })
    }
}
