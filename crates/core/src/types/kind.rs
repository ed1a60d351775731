//! Catalog entity kinds.
//!
//! Every catalog entity shares the same route shape and the same lock
//! guard, so the per-kind strings (URL segment, log tags, user-facing
//! messages) live here where server, client and CLI can agree on them.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// A lockable catalog entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Billboard,
    Category,
    Subcategory,
    Size,
    Color,
    Product,
}

/// The operation a route performs, used to build log tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl EntityKind {
    /// All kinds, in dependency order (referenced kinds first).
    pub const ALL: [Self; 6] = [
        Self::Billboard,
        Self::Category,
        Self::Subcategory,
        Self::Size,
        Self::Color,
        Self::Product,
    ];

    /// URL path segment (`/api/{storeId}/{segment}`).
    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::Billboard => "billboards",
            Self::Category => "categories",
            Self::Subcategory => "subcategories",
            Self::Size => "sizes",
            Self::Color => "colors",
            Self::Product => "products",
        }
    }

    /// Capitalised singular name used in messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Billboard => "Billboard",
            Self::Category => "Category",
            Self::Subcategory => "Subcategory",
            Self::Size => "Size",
            Self::Color => "Color",
            Self::Product => "Product",
        }
    }

    /// Database table name (inside the `catalog` schema).
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Billboard => "catalog.billboard",
            Self::Category => "catalog.category",
            Self::Subcategory => "catalog.subcategory",
            Self::Size => "catalog.size",
            Self::Color => "catalog.color",
            Self::Product => "catalog.product",
        }
    }

    /// Message for a missing entity id path parameter.
    #[must_use]
    pub const fn id_required_message(self) -> &'static str {
        match self {
            Self::Billboard => "Billboard id is required",
            Self::Category => "Category id is required",
            Self::Subcategory => "Subcategory id is required",
            Self::Size => "Size id is required",
            Self::Color => "Color id is required",
            Self::Product => "Product id is required",
        }
    }

    /// Message for a reference to a row that is not in the path store.
    #[must_use]
    pub const fn invalid_reference_message(self) -> &'static str {
        match self {
            Self::Billboard => "Billboard id is invalid",
            Self::Category => "Category id is invalid",
            Self::Subcategory => "Subcategory id is invalid",
            Self::Size => "Size id is invalid",
            Self::Color => "Color id is invalid",
            Self::Product => "Product id is invalid",
        }
    }

    /// Message shown when a delete fails for a reason other than a lock.
    ///
    /// Almost always a foreign key restriction from dependent rows.
    #[must_use]
    pub const fn delete_blocked_message(self) -> &'static str {
        match self {
            Self::Billboard => "Make sure you removed all categories using this billboard first.",
            Self::Category => "Make sure you removed all products using this category first.",
            Self::Subcategory => {
                "Make sure you removed all products using this subcategory first."
            }
            Self::Size => "Make sure you removed all products using this size first.",
            Self::Color => "Make sure you removed all products using this color first.",
            Self::Product => "Something went wrong.",
        }
    }

    /// Log tag for a route, e.g. `BILLBOARD_PATCH`.
    #[must_use]
    pub const fn route_tag(self, op: Operation) -> &'static str {
        match (self, op) {
            (Self::Billboard, Operation::List) => "BILLBOARDS_GET",
            (Self::Billboard, Operation::Get) => "BILLBOARD_GET",
            (Self::Billboard, Operation::Create) => "BILLBOARDS_POST",
            (Self::Billboard, Operation::Update) => "BILLBOARD_PATCH",
            (Self::Billboard, Operation::Delete) => "BILLBOARD_DELETE",
            (Self::Category, Operation::List) => "CATEGORIES_GET",
            (Self::Category, Operation::Get) => "CATEGORY_GET",
            (Self::Category, Operation::Create) => "CATEGORIES_POST",
            (Self::Category, Operation::Update) => "CATEGORY_PATCH",
            (Self::Category, Operation::Delete) => "CATEGORY_DELETE",
            (Self::Subcategory, Operation::List) => "SUBCATEGORIES_GET",
            (Self::Subcategory, Operation::Get) => "SUBCATEGORY_GET",
            (Self::Subcategory, Operation::Create) => "SUBCATEGORIES_POST",
            (Self::Subcategory, Operation::Update) => "SUBCATEGORY_PATCH",
            (Self::Subcategory, Operation::Delete) => "SUBCATEGORY_DELETE",
            (Self::Size, Operation::List) => "SIZES_GET",
            (Self::Size, Operation::Get) => "SIZE_GET",
            (Self::Size, Operation::Create) => "SIZES_POST",
            (Self::Size, Operation::Update) => "SIZE_PATCH",
            (Self::Size, Operation::Delete) => "SIZE_DELETE",
            (Self::Color, Operation::List) => "COLORS_GET",
            (Self::Color, Operation::Get) => "COLOR_GET",
            (Self::Color, Operation::Create) => "COLORS_POST",
            (Self::Color, Operation::Update) => "COLOR_PATCH",
            (Self::Color, Operation::Delete) => "COLOR_DELETE",
            (Self::Product, Operation::List) => "PRODUCTS_GET",
            (Self::Product, Operation::Get) => "PRODUCT_GET",
            (Self::Product, Operation::Create) => "PRODUCTS_POST",
            (Self::Product, Operation::Update) => "PRODUCT_PATCH",
            (Self::Product, Operation::Delete) => "PRODUCT_DELETE",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// Error returned when parsing an unknown entity kind.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown entity kind: {0}")]
pub struct UnknownEntityKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    /// Accepts singular or plural names, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.segment() == lower || kind.label().to_ascii_lowercase() == lower)
            .ok_or_else(|| UnknownEntityKind(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_singular_and_plural() {
        assert_eq!("billboards".parse(), Ok(EntityKind::Billboard));
        assert_eq!("Category".parse(), Ok(EntityKind::Category));
        assert_eq!("subcategory".parse(), Ok(EntityKind::Subcategory));
        assert_eq!(" COLORS ".parse(), Ok(EntityKind::Color));
        assert!("stores".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_route_tags() {
        assert_eq!(
            EntityKind::Billboard.route_tag(Operation::Update),
            "BILLBOARD_PATCH"
        );
        assert_eq!(
            EntityKind::Product.route_tag(Operation::Delete),
            "PRODUCT_DELETE"
        );
        assert_eq!(EntityKind::Size.route_tag(Operation::Get), "SIZE_GET");
    }

    #[test]
    fn test_segments_are_unique() {
        for (i, a) in EntityKind::ALL.iter().enumerate() {
            for b in EntityKind::ALL.iter().skip(i + 1) {
                assert_ne!(a.segment(), b.segment());
            }
        }
    }

    #[test]
    fn test_delete_blocked_message_names_dependents() {
        assert!(
            EntityKind::Billboard
                .delete_blocked_message()
                .contains("categories")
        );
        assert!(EntityKind::Size.delete_blocked_message().contains("products"));
    }
}
