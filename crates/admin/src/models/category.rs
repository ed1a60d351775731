//! Category domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storedash_core::{BillboardId, CategoryId, StoreId};

use super::billboard::Billboard;
use super::validation::{Validate, ValidationError, require_id, require_text};

/// A top-level product grouping, displayed with a billboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub store_id: StoreId,
    pub billboard_id: BillboardId,
    pub name: String,
    pub is_locked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A category with its billboard loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithBillboard {
    #[serde(flatten)]
    pub category: Category,
    pub billboard: Option<Billboard>,
}

/// Request body for creating or updating a category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billboard_id: Option<BillboardId>,
    pub is_locked: bool,
}

/// Validated category fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub billboard_id: BillboardId,
    pub is_locked: bool,
}

impl Validate for CategoryInput {
    type Draft = CategoryDraft;

    fn validate(&self) -> Result<CategoryDraft, ValidationError> {
        Ok(CategoryDraft {
            name: require_text(self.name.as_ref(), "Name is required")?,
            billboard_id: require_id(self.billboard_id.as_ref(), "Billboard id is required")?,
            is_locked: self.is_locked,
        })
    }
}
