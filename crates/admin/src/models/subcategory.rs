//! Subcategory domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storedash_core::{CategoryId, StoreId, SubcategoryId};

use super::validation::{Validate, ValidationError, require_id, require_text};

/// A grouping nested under a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub store_id: StoreId,
    pub category_id: CategoryId,
    pub name: String,
    pub is_locked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or updating a subcategory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubcategoryInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    pub is_locked: bool,
}

/// Validated subcategory fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubcategoryDraft {
    pub name: String,
    pub category_id: CategoryId,
    pub is_locked: bool,
}

impl Validate for SubcategoryInput {
    type Draft = SubcategoryDraft;

    fn validate(&self) -> Result<SubcategoryDraft, ValidationError> {
        Ok(SubcategoryDraft {
            name: require_text(self.name.as_ref(), "Name is required")?,
            category_id: require_id(self.category_id.as_ref(), "Category id is required")?,
            is_locked: self.is_locked,
        })
    }
}
