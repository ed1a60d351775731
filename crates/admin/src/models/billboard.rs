//! Billboard domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storedash_core::{BillboardId, StoreId};

use super::validation::{Validate, ValidationError, require_text};

/// A hero image with a label, shown on category pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Billboard {
    pub id: BillboardId,
    pub store_id: StoreId,
    pub label: String,
    pub image_url: String,
    /// Shown on the storefront home page.
    pub is_featured: bool,
    pub is_locked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or updating a billboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BillboardInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub is_featured: bool,
    pub is_locked: bool,
}

/// Validated billboard fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillboardDraft {
    pub label: String,
    pub image_url: String,
    pub is_featured: bool,
    pub is_locked: bool,
}

impl Validate for BillboardInput {
    type Draft = BillboardDraft;

    fn validate(&self) -> Result<BillboardDraft, ValidationError> {
        Ok(BillboardDraft {
            label: require_text(self.label.as_ref(), "Label is required")?,
            image_url: require_text(self.image_url.as_ref(), "Image URL is required")?,
            is_featured: self.is_featured,
            is_locked: self.is_locked,
        })
    }
}
