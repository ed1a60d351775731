//! Catalog persistence.
//!
//! # Schema: `catalog`
//!
//! ## Tables
//!
//! - `store` - Tenants, each owned by one user id
//! - `billboard`, `category`, `subcategory`, `size`, `color` - Lockable catalog rows
//! - `product` - Lockable products referencing category/subcategory/size/color
//! - `image` - Product images (cascade-deleted with their product)
//!
//! # Backends
//!
//! [`CatalogStore`] is the seam between route handlers and storage:
//! - [`PgCatalogStore`] - `PostgreSQL` via sqlx (production)
//! - [`MemoryCatalogStore`] - in-process tables with the same lock and
//!   foreign key semantics (tests, local tooling)
//!
//! # Lock guard
//!
//! Every update/delete of a lockable row is a single conditional write keyed
//! on the row being unlocked and belonging to the path store. When the write
//! touches nothing the backend reports [`RepositoryError::Locked`] if the row
//! exists and is locked, otherwise [`RepositoryError::NotFound`].
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p storedash-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use storedash_core::{
    BillboardId, CategoryId, ColorId, EntityKind, ProductId, SizeId, StoreId, SubcategoryId,
    UserId,
};

use crate::models::{
    Billboard, BillboardDraft, Category, CategoryDraft, CategoryWithBillboard, Color, ColorDraft,
    Product, ProductDraft, ProductWithRelations, Size, SizeDraft, Store, StoreDraft, Subcategory,
    SubcategoryDraft,
};

pub use memory::MemoryCatalogStore;
pub use postgres::PgCatalogStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found (or belongs to another store).
    #[error("not found")]
    NotFound,

    /// The target row is locked against updates and deletes.
    #[error("row is locked")]
    Locked,

    /// A write named a row that does not exist in the path store.
    #[error("{0} reference is not in this store")]
    InvalidReference(EntityKind),

    /// Constraint violation (e.g., deleting a row that others reference).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Filters for listing products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
    pub color_id: Option<ColorId>,
    pub size_id: Option<SizeId>,
    pub is_featured: Option<bool>,
    pub include_archived: bool,
}

impl ProductFilter {
    /// Whether a product passes this filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.category_id
            .as_ref()
            .is_none_or(|id| &product.category_id == id)
            && self
                .subcategory_id
                .as_ref()
                .is_none_or(|id| &product.subcategory_id == id)
            && self
                .color_id
                .as_ref()
                .is_none_or(|id| product.color_id.as_ref() == Some(id))
            && self
                .size_id
                .as_ref()
                .is_none_or(|id| product.size_id.as_ref() == Some(id))
            && self.is_featured.is_none_or(|f| product.is_featured == f)
            && (self.include_archived || !product.is_archived)
    }
}

/// Storage operations used by the catalog API.
///
/// `update_*` and `delete_*` are lock-guarded: they never modify a locked
/// row and are scoped to `store`.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    // -- Stores ---------------------------------------------------------------

    async fn create_store(&self, owner: &UserId, draft: &StoreDraft)
    -> Result<Store, RepositoryError>;
    async fn find_store(&self, id: &StoreId) -> Result<Option<Store>, RepositoryError>;
    async fn list_stores(&self, owner: &UserId) -> Result<Vec<Store>, RepositoryError>;
    async fn rename_store(&self, id: &StoreId, draft: &StoreDraft)
    -> Result<Store, RepositoryError>;
    async fn delete_store(&self, id: &StoreId) -> Result<Store, RepositoryError>;

    // -- Billboards -----------------------------------------------------------

    async fn list_billboards(&self, store: &StoreId) -> Result<Vec<Billboard>, RepositoryError>;
    async fn get_billboard(
        &self,
        store: &StoreId,
        id: &BillboardId,
    ) -> Result<Option<Billboard>, RepositoryError>;
    async fn create_billboard(
        &self,
        store: &StoreId,
        draft: &BillboardDraft,
    ) -> Result<Billboard, RepositoryError>;
    async fn update_billboard(
        &self,
        store: &StoreId,
        id: &BillboardId,
        draft: &BillboardDraft,
    ) -> Result<Billboard, RepositoryError>;
    async fn delete_billboard(
        &self,
        store: &StoreId,
        id: &BillboardId,
    ) -> Result<Billboard, RepositoryError>;

    // -- Categories -----------------------------------------------------------

    async fn list_categories(
        &self,
        store: &StoreId,
    ) -> Result<Vec<CategoryWithBillboard>, RepositoryError>;
    async fn get_category(
        &self,
        store: &StoreId,
        id: &CategoryId,
    ) -> Result<Option<CategoryWithBillboard>, RepositoryError>;
    async fn create_category(
        &self,
        store: &StoreId,
        draft: &CategoryDraft,
    ) -> Result<Category, RepositoryError>;
    async fn update_category(
        &self,
        store: &StoreId,
        id: &CategoryId,
        draft: &CategoryDraft,
    ) -> Result<Category, RepositoryError>;
    async fn delete_category(
        &self,
        store: &StoreId,
        id: &CategoryId,
    ) -> Result<Category, RepositoryError>;

    // -- Subcategories --------------------------------------------------------

    async fn list_subcategories(
        &self,
        store: &StoreId,
    ) -> Result<Vec<Subcategory>, RepositoryError>;
    async fn get_subcategory(
        &self,
        store: &StoreId,
        id: &SubcategoryId,
    ) -> Result<Option<Subcategory>, RepositoryError>;
    async fn create_subcategory(
        &self,
        store: &StoreId,
        draft: &SubcategoryDraft,
    ) -> Result<Subcategory, RepositoryError>;
    async fn update_subcategory(
        &self,
        store: &StoreId,
        id: &SubcategoryId,
        draft: &SubcategoryDraft,
    ) -> Result<Subcategory, RepositoryError>;
    async fn delete_subcategory(
        &self,
        store: &StoreId,
        id: &SubcategoryId,
    ) -> Result<Subcategory, RepositoryError>;

    // -- Sizes ----------------------------------------------------------------

    async fn list_sizes(&self, store: &StoreId) -> Result<Vec<Size>, RepositoryError>;
    async fn get_size(&self, store: &StoreId, id: &SizeId)
    -> Result<Option<Size>, RepositoryError>;
    async fn create_size(&self, store: &StoreId, draft: &SizeDraft)
    -> Result<Size, RepositoryError>;
    async fn update_size(
        &self,
        store: &StoreId,
        id: &SizeId,
        draft: &SizeDraft,
    ) -> Result<Size, RepositoryError>;
    async fn delete_size(&self, store: &StoreId, id: &SizeId) -> Result<Size, RepositoryError>;

    // -- Colors ---------------------------------------------------------------

    async fn list_colors(&self, store: &StoreId) -> Result<Vec<Color>, RepositoryError>;
    async fn get_color(
        &self,
        store: &StoreId,
        id: &ColorId,
    ) -> Result<Option<Color>, RepositoryError>;
    async fn create_color(
        &self,
        store: &StoreId,
        draft: &ColorDraft,
    ) -> Result<Color, RepositoryError>;
    async fn update_color(
        &self,
        store: &StoreId,
        id: &ColorId,
        draft: &ColorDraft,
    ) -> Result<Color, RepositoryError>;
    async fn delete_color(&self, store: &StoreId, id: &ColorId) -> Result<Color, RepositoryError>;

    // -- Products -------------------------------------------------------------

    async fn list_products(
        &self,
        store: &StoreId,
        filter: &ProductFilter,
    ) -> Result<Vec<ProductWithRelations>, RepositoryError>;
    async fn get_product(
        &self,
        store: &StoreId,
        id: &ProductId,
    ) -> Result<Option<ProductWithRelations>, RepositoryError>;
    async fn create_product(
        &self,
        store: &StoreId,
        draft: &ProductDraft,
    ) -> Result<ProductWithRelations, RepositoryError>;
    /// Update scalar fields and replace the image list, all or nothing.
    async fn update_product(
        &self,
        store: &StoreId,
        id: &ProductId,
        draft: &ProductDraft,
    ) -> Result<ProductWithRelations, RepositoryError>;
    async fn delete_product(
        &self,
        store: &StoreId,
        id: &ProductId,
    ) -> Result<Product, RepositoryError>;

    // -- Operator tools -------------------------------------------------------

    /// Clear the lock flag on one row. Not reachable over HTTP.
    async fn unlock(&self, kind: EntityKind, id: &str) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use storedash_core::Price;

    fn product(archived: bool, featured: bool) -> Product {
        Product {
            id: ProductId::new("p1"),
            store_id: StoreId::new("store1"),
            category_id: CategoryId::new("cat1"),
            subcategory_id: SubcategoryId::new("sub1"),
            size_id: Some(SizeId::new("size1")),
            color_id: None,
            name: "Shirt".into(),
            description: None,
            price: Price::new(Decimal::ONE).unwrap(),
            is_featured: featured,
            is_archived: archived,
            is_locked: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_filter_excludes_archived_by_default() {
        let filter = ProductFilter::default();
        assert!(filter.matches(&product(false, false)));
        assert!(!filter.matches(&product(true, false)));

        let filter = ProductFilter {
            include_archived: true,
            ..ProductFilter::default()
        };
        assert!(filter.matches(&product(true, false)));
    }

    #[test]
    fn test_filter_by_relations() {
        let filter = ProductFilter {
            size_id: Some(SizeId::new("size1")),
            ..ProductFilter::default()
        };
        assert!(filter.matches(&product(false, false)));

        let filter = ProductFilter {
            color_id: Some(ColorId::new("color1")),
            ..ProductFilter::default()
        };
        assert!(!filter.matches(&product(false, false)));

        let filter = ProductFilter {
            is_featured: Some(true),
            ..ProductFilter::default()
        };
        assert!(!filter.matches(&product(false, false)));
        assert!(filter.matches(&product(false, true)));
    }
}
