//! Color domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storedash_core::{ColorId, StoreId};

use super::validation::{Validate, ValidationError, require_text};

/// A product color with its display value (usually a hex code).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Color {
    pub id: ColorId,
    pub store_id: StoreId,
    pub name: String,
    pub value: String,
    pub is_locked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or updating a color.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColorInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub is_locked: bool,
}

/// Validated color fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorDraft {
    pub name: String,
    pub value: String,
    pub is_locked: bool,
}

impl Validate for ColorInput {
    type Draft = ColorDraft;

    fn validate(&self) -> Result<ColorDraft, ValidationError> {
        Ok(ColorDraft {
            name: require_text(self.name.as_ref(), "Name is required")?,
            value: require_text(self.value.as_ref(), "Value is required")?,
            is_locked: self.is_locked,
        })
    }
}
