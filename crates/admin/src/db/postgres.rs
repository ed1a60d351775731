//! `PostgreSQL` catalog backend.
//!
//! Queries are built at runtime (`query_as::<_, T>`) so the crate builds
//! without a live database. Row types are the domain models themselves,
//! which derive `sqlx::FromRow`.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::{PgExecutor, PgRow};
use sqlx::{FromRow, PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use storedash_core::{
    BillboardId, CategoryId, ColorId, EntityKind, ImageId, ProductId, SizeId, StoreId,
    SubcategoryId, UserId,
};

use super::{CatalogStore, ProductFilter, RepositoryError};
use crate::models::{
    Billboard, BillboardDraft, Category, CategoryDraft, CategoryWithBillboard, Color, ColorDraft,
    Image, Product, ProductDraft, ProductWithRelations, Size, SizeDraft, Store, StoreDraft,
    Subcategory, SubcategoryDraft,
};

/// Catalog repository backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool (used by migrations and health checks).
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn list_rows<T>(&self, kind: EntityKind, store: &StoreId) -> Result<Vec<T>, RepositoryError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!(
            "SELECT * FROM {} WHERE store_id = $1 ORDER BY created_at DESC",
            kind.table()
        );
        Ok(sqlx::query_as::<_, T>(&sql)
            .bind(store)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_row<T>(
        &self,
        kind: EntityKind,
        store: &StoreId,
        id: &str,
    ) -> Result<Option<T>, RepositoryError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!(
            "SELECT * FROM {} WHERE id = $1 AND store_id = $2",
            kind.table()
        );
        Ok(sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .bind(store)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn rows_by_ids<T>(&self, kind: EntityKind, ids: Vec<String>) -> Result<Vec<T>, RepositoryError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT * FROM {} WHERE id = ANY($1)", kind.table());
        Ok(sqlx::query_as::<_, T>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Conditional delete: only an unlocked row in `store` is removed.
    async fn delete_unlocked<T>(
        &self,
        kind: EntityKind,
        store: &StoreId,
        id: &str,
    ) -> Result<T, RepositoryError>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!(
            "DELETE FROM {} WHERE id = $1 AND store_id = $2 AND NOT is_locked RETURNING *",
            kind.table()
        );
        let deleted = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .bind(store)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?;

        match deleted {
            Some(row) => Ok(row),
            None => Err(classify_miss(&self.pool, kind, store, id).await),
        }
    }

    /// Finish a conditional update: a returned row is success, no row is classified.
    async fn guarded<T>(
        &self,
        updated: Option<T>,
        kind: EntityKind,
        store: &StoreId,
        id: &str,
    ) -> Result<T, RepositoryError> {
        match updated {
            Some(row) => Ok(row),
            None => Err(classify_miss(&self.pool, kind, store, id).await),
        }
    }

    /// Load images and referenced rows for a batch of products.
    async fn with_relations(
        &self,
        products: Vec<Product>,
    ) -> Result<Vec<ProductWithRelations>, RepositoryError> {
        if products.is_empty() {
            return Ok(Vec::new());
        }

        let product_ids: Vec<String> = products.iter().map(|p| p.id.to_string()).collect();
        let images = sqlx::query_as::<_, Image>(
            r"
            SELECT * FROM catalog.image
            WHERE product_id = ANY($1)
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut images_by_product: HashMap<ProductId, Vec<Image>> = HashMap::new();
        for image in images {
            images_by_product
                .entry(image.product_id.clone())
                .or_default()
                .push(image);
        }

        let categories: HashMap<CategoryId, Category> = self
            .rows_by_ids::<Category>(
                EntityKind::Category,
                products.iter().map(|p| p.category_id.to_string()).collect(),
            )
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();
        let subcategories: HashMap<SubcategoryId, Subcategory> = self
            .rows_by_ids::<Subcategory>(
                EntityKind::Subcategory,
                products.iter().map(|p| p.subcategory_id.to_string()).collect(),
            )
            .await?
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();
        let sizes: HashMap<SizeId, Size> = self
            .rows_by_ids::<Size>(
                EntityKind::Size,
                products
                    .iter()
                    .filter_map(|p| p.size_id.as_ref().map(ToString::to_string))
                    .collect(),
            )
            .await?
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();
        let colors: HashMap<ColorId, Color> = self
            .rows_by_ids::<Color>(
                EntityKind::Color,
                products
                    .iter()
                    .filter_map(|p| p.color_id.as_ref().map(ToString::to_string))
                    .collect(),
            )
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        Ok(products
            .into_iter()
            .map(|product| ProductWithRelations {
                images: images_by_product.remove(&product.id).unwrap_or_default(),
                category: categories.get(&product.category_id).cloned(),
                subcategory: subcategories.get(&product.subcategory_id).cloned(),
                size: product.size_id.as_ref().and_then(|id| sizes.get(id)).cloned(),
                color: product.color_id.as_ref().and_then(|id| colors.get(id)).cloned(),
                product,
            })
            .collect())
    }

    async fn single_with_relations(
        &self,
        product: Product,
    ) -> Result<ProductWithRelations, RepositoryError> {
        self.with_relations(vec![product])
            .await?
            .pop()
            .ok_or(RepositoryError::NotFound)
    }
}

/// Decide why a conditional write touched no row.
///
/// A row that still exists in the store was locked at write time.
async fn classify_miss<'e, E>(executor: E, kind: EntityKind, store: &StoreId, id: &str) -> RepositoryError
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "SELECT is_locked FROM {} WHERE id = $1 AND store_id = $2",
        kind.table()
    );
    match sqlx::query_scalar::<_, bool>(&sql)
        .bind(id)
        .bind(store)
        .fetch_optional(executor)
        .await
    {
        Ok(Some(_)) => RepositoryError::Locked,
        Ok(None) => RepositoryError::NotFound,
        Err(e) => RepositoryError::Database(e),
    }
}

/// Map constraint violations on writes to `RepositoryError::Conflict`.
fn map_write_error(e: sqlx::Error) -> RepositoryError {
    match e {
        sqlx::Error::Database(ref db_err)
            if db_err.is_foreign_key_violation() || db_err.is_unique_violation() =>
        {
            RepositoryError::Conflict(db_err.message().to_owned())
        }
        other => RepositoryError::Database(other),
    }
}

/// The kind a store-scoped reference constraint points at.
fn referenced_kind(constraint: &str) -> Option<EntityKind> {
    match constraint {
        "category_billboard_fk" => Some(EntityKind::Billboard),
        "subcategory_category_fk" | "product_category_fk" => Some(EntityKind::Category),
        "product_subcategory_fk" => Some(EntityKind::Subcategory),
        "product_size_fk" => Some(EntityKind::Size),
        "product_color_fk" => Some(EntityKind::Color),
        _ => None,
    }
}

/// Map errors from inserting or updating a referencing row.
///
/// A reference constraint firing here means the named row is missing from
/// the path store.
fn map_reference_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_foreign_key_violation()
        && let Some(kind) = db_err.constraint().and_then(referenced_kind)
    {
        return RepositoryError::InvalidReference(kind);
    }
    map_write_error(e)
}

/// Bulk insert the image list for a product.
async fn insert_images(
    conn: &mut PgConnection,
    product_id: &ProductId,
    urls: &[String],
) -> Result<(), RepositoryError> {
    if urls.is_empty() {
        return Ok(());
    }

    let mut builder: QueryBuilder<'_, Postgres> =
        QueryBuilder::new("INSERT INTO catalog.image (id, product_id, url, created_at) ");
    // clock_timestamp() advances per row, so created_at keeps list order
    builder.push_values(urls, |mut row, url| {
        row.push_bind(ImageId::generate())
            .push_bind(product_id.clone())
            .push_bind(url.clone())
            .push("clock_timestamp()");
    });
    builder
        .build()
        .execute(conn)
        .await
        .map_err(map_write_error)?;

    Ok(())
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // -- Stores ---------------------------------------------------------------

    #[instrument(skip(self, draft))]
    async fn create_store(
        &self,
        owner: &UserId,
        draft: &StoreDraft,
    ) -> Result<Store, RepositoryError> {
        let store = sqlx::query_as::<_, Store>(
            r"
            INSERT INTO catalog.store (id, name, user_id)
            VALUES ($1, $2, $3)
            RETURNING *
            ",
        )
        .bind(StoreId::generate())
        .bind(&draft.name)
        .bind(owner)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(store)
    }

    async fn find_store(&self, id: &StoreId) -> Result<Option<Store>, RepositoryError> {
        Ok(
            sqlx::query_as::<_, Store>("SELECT * FROM catalog.store WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_stores(&self, owner: &UserId) -> Result<Vec<Store>, RepositoryError> {
        Ok(sqlx::query_as::<_, Store>(
            r"
            SELECT * FROM catalog.store
            WHERE user_id = $1
            ORDER BY created_at ASC
            ",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?)
    }

    #[instrument(skip(self, draft))]
    async fn rename_store(
        &self,
        id: &StoreId,
        draft: &StoreDraft,
    ) -> Result<Store, RepositoryError> {
        sqlx::query_as::<_, Store>(
            r"
            UPDATE catalog.store
            SET name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(&draft.name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    #[instrument(skip(self))]
    async fn delete_store(&self, id: &StoreId) -> Result<Store, RepositoryError> {
        sqlx::query_as::<_, Store>("DELETE FROM catalog.store WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?
            .ok_or(RepositoryError::NotFound)
    }

    // -- Billboards -----------------------------------------------------------

    async fn list_billboards(&self, store: &StoreId) -> Result<Vec<Billboard>, RepositoryError> {
        self.list_rows(EntityKind::Billboard, store).await
    }

    async fn get_billboard(
        &self,
        store: &StoreId,
        id: &BillboardId,
    ) -> Result<Option<Billboard>, RepositoryError> {
        self.get_row(EntityKind::Billboard, store, id.as_str()).await
    }

    #[instrument(skip(self, draft))]
    async fn create_billboard(
        &self,
        store: &StoreId,
        draft: &BillboardDraft,
    ) -> Result<Billboard, RepositoryError> {
        let billboard = sqlx::query_as::<_, Billboard>(
            r"
            INSERT INTO catalog.billboard (id, store_id, label, image_url, is_featured, is_locked)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            ",
        )
        .bind(BillboardId::generate())
        .bind(store)
        .bind(&draft.label)
        .bind(&draft.image_url)
        .bind(draft.is_featured)
        .bind(draft.is_locked)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(billboard)
    }

    #[instrument(skip(self, draft))]
    async fn update_billboard(
        &self,
        store: &StoreId,
        id: &BillboardId,
        draft: &BillboardDraft,
    ) -> Result<Billboard, RepositoryError> {
        let updated = sqlx::query_as::<_, Billboard>(
            r"
            UPDATE catalog.billboard
            SET label = $3, image_url = $4, is_featured = $5, is_locked = $6, updated_at = NOW()
            WHERE id = $1 AND store_id = $2 AND NOT is_locked
            RETURNING *
            ",
        )
        .bind(id)
        .bind(store)
        .bind(&draft.label)
        .bind(&draft.image_url)
        .bind(draft.is_featured)
        .bind(draft.is_locked)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        self.guarded(updated, EntityKind::Billboard, store, id.as_str())
            .await
    }

    #[instrument(skip(self))]
    async fn delete_billboard(
        &self,
        store: &StoreId,
        id: &BillboardId,
    ) -> Result<Billboard, RepositoryError> {
        self.delete_unlocked(EntityKind::Billboard, store, id.as_str())
            .await
    }

    // -- Categories -----------------------------------------------------------

    async fn list_categories(
        &self,
        store: &StoreId,
    ) -> Result<Vec<CategoryWithBillboard>, RepositoryError> {
        let categories: Vec<Category> = self.list_rows(EntityKind::Category, store).await?;
        let billboards: HashMap<BillboardId, Billboard> = self
            .rows_by_ids::<Billboard>(
                EntityKind::Billboard,
                categories.iter().map(|c| c.billboard_id.to_string()).collect(),
            )
            .await?
            .into_iter()
            .map(|b| (b.id.clone(), b))
            .collect();

        Ok(categories
            .into_iter()
            .map(|category| CategoryWithBillboard {
                billboard: billboards.get(&category.billboard_id).cloned(),
                category,
            })
            .collect())
    }

    async fn get_category(
        &self,
        store: &StoreId,
        id: &CategoryId,
    ) -> Result<Option<CategoryWithBillboard>, RepositoryError> {
        let Some(category) = self
            .get_row::<Category>(EntityKind::Category, store, id.as_str())
            .await?
        else {
            return Ok(None);
        };

        let billboard = sqlx::query_as::<_, Billboard>(
            "SELECT * FROM catalog.billboard WHERE id = $1",
        )
        .bind(&category.billboard_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(Some(CategoryWithBillboard {
            category,
            billboard,
        }))
    }

    #[instrument(skip(self, draft))]
    async fn create_category(
        &self,
        store: &StoreId,
        draft: &CategoryDraft,
    ) -> Result<Category, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            r"
            INSERT INTO catalog.category (id, store_id, billboard_id, name, is_locked)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            ",
        )
        .bind(CategoryId::generate())
        .bind(store)
        .bind(&draft.billboard_id)
        .bind(&draft.name)
        .bind(draft.is_locked)
        .fetch_one(&self.pool)
        .await
        .map_err(map_reference_error)?;

        Ok(category)
    }

    #[instrument(skip(self, draft))]
    async fn update_category(
        &self,
        store: &StoreId,
        id: &CategoryId,
        draft: &CategoryDraft,
    ) -> Result<Category, RepositoryError> {
        let updated = sqlx::query_as::<_, Category>(
            r"
            UPDATE catalog.category
            SET name = $3, billboard_id = $4, is_locked = $5, updated_at = NOW()
            WHERE id = $1 AND store_id = $2 AND NOT is_locked
            RETURNING *
            ",
        )
        .bind(id)
        .bind(store)
        .bind(&draft.name)
        .bind(&draft.billboard_id)
        .bind(draft.is_locked)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_reference_error)?;

        self.guarded(updated, EntityKind::Category, store, id.as_str())
            .await
    }

    #[instrument(skip(self))]
    async fn delete_category(
        &self,
        store: &StoreId,
        id: &CategoryId,
    ) -> Result<Category, RepositoryError> {
        self.delete_unlocked(EntityKind::Category, store, id.as_str())
            .await
    }

    // -- Subcategories --------------------------------------------------------

    async fn list_subcategories(
        &self,
        store: &StoreId,
    ) -> Result<Vec<Subcategory>, RepositoryError> {
        self.list_rows(EntityKind::Subcategory, store).await
    }

    async fn get_subcategory(
        &self,
        store: &StoreId,
        id: &SubcategoryId,
    ) -> Result<Option<Subcategory>, RepositoryError> {
        self.get_row(EntityKind::Subcategory, store, id.as_str())
            .await
    }

    #[instrument(skip(self, draft))]
    async fn create_subcategory(
        &self,
        store: &StoreId,
        draft: &SubcategoryDraft,
    ) -> Result<Subcategory, RepositoryError> {
        let subcategory = sqlx::query_as::<_, Subcategory>(
            r"
            INSERT INTO catalog.subcategory (id, store_id, category_id, name, is_locked)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            ",
        )
        .bind(SubcategoryId::generate())
        .bind(store)
        .bind(&draft.category_id)
        .bind(&draft.name)
        .bind(draft.is_locked)
        .fetch_one(&self.pool)
        .await
        .map_err(map_reference_error)?;

        Ok(subcategory)
    }

    #[instrument(skip(self, draft))]
    async fn update_subcategory(
        &self,
        store: &StoreId,
        id: &SubcategoryId,
        draft: &SubcategoryDraft,
    ) -> Result<Subcategory, RepositoryError> {
        let updated = sqlx::query_as::<_, Subcategory>(
            r"
            UPDATE catalog.subcategory
            SET name = $3, category_id = $4, is_locked = $5, updated_at = NOW()
            WHERE id = $1 AND store_id = $2 AND NOT is_locked
            RETURNING *
            ",
        )
        .bind(id)
        .bind(store)
        .bind(&draft.name)
        .bind(&draft.category_id)
        .bind(draft.is_locked)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_reference_error)?;

        self.guarded(updated, EntityKind::Subcategory, store, id.as_str())
            .await
    }

    #[instrument(skip(self))]
    async fn delete_subcategory(
        &self,
        store: &StoreId,
        id: &SubcategoryId,
    ) -> Result<Subcategory, RepositoryError> {
        self.delete_unlocked(EntityKind::Subcategory, store, id.as_str())
            .await
    }

    // -- Sizes ----------------------------------------------------------------

    async fn list_sizes(&self, store: &StoreId) -> Result<Vec<Size>, RepositoryError> {
        self.list_rows(EntityKind::Size, store).await
    }

    async fn get_size(
        &self,
        store: &StoreId,
        id: &SizeId,
    ) -> Result<Option<Size>, RepositoryError> {
        self.get_row(EntityKind::Size, store, id.as_str()).await
    }

    #[instrument(skip(self, draft))]
    async fn create_size(
        &self,
        store: &StoreId,
        draft: &SizeDraft,
    ) -> Result<Size, RepositoryError> {
        let size = sqlx::query_as::<_, Size>(
            r"
            INSERT INTO catalog.size (id, store_id, name, value, is_locked)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            ",
        )
        .bind(SizeId::generate())
        .bind(store)
        .bind(&draft.name)
        .bind(&draft.value)
        .bind(draft.is_locked)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(size)
    }

    #[instrument(skip(self, draft))]
    async fn update_size(
        &self,
        store: &StoreId,
        id: &SizeId,
        draft: &SizeDraft,
    ) -> Result<Size, RepositoryError> {
        let updated = sqlx::query_as::<_, Size>(
            r"
            UPDATE catalog.size
            SET name = $3, value = $4, is_locked = $5, updated_at = NOW()
            WHERE id = $1 AND store_id = $2 AND NOT is_locked
            RETURNING *
            ",
        )
        .bind(id)
        .bind(store)
        .bind(&draft.name)
        .bind(&draft.value)
        .bind(draft.is_locked)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        self.guarded(updated, EntityKind::Size, store, id.as_str())
            .await
    }

    #[instrument(skip(self))]
    async fn delete_size(&self, store: &StoreId, id: &SizeId) -> Result<Size, RepositoryError> {
        self.delete_unlocked(EntityKind::Size, store, id.as_str())
            .await
    }

    // -- Colors ---------------------------------------------------------------

    async fn list_colors(&self, store: &StoreId) -> Result<Vec<Color>, RepositoryError> {
        self.list_rows(EntityKind::Color, store).await
    }

    async fn get_color(
        &self,
        store: &StoreId,
        id: &ColorId,
    ) -> Result<Option<Color>, RepositoryError> {
        self.get_row(EntityKind::Color, store, id.as_str()).await
    }

    #[instrument(skip(self, draft))]
    async fn create_color(
        &self,
        store: &StoreId,
        draft: &ColorDraft,
    ) -> Result<Color, RepositoryError> {
        let color = sqlx::query_as::<_, Color>(
            r"
            INSERT INTO catalog.color (id, store_id, name, value, is_locked)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            ",
        )
        .bind(ColorId::generate())
        .bind(store)
        .bind(&draft.name)
        .bind(&draft.value)
        .bind(draft.is_locked)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(color)
    }

    #[instrument(skip(self, draft))]
    async fn update_color(
        &self,
        store: &StoreId,
        id: &ColorId,
        draft: &ColorDraft,
    ) -> Result<Color, RepositoryError> {
        let updated = sqlx::query_as::<_, Color>(
            r"
            UPDATE catalog.color
            SET name = $3, value = $4, is_locked = $5, updated_at = NOW()
            WHERE id = $1 AND store_id = $2 AND NOT is_locked
            RETURNING *
            ",
        )
        .bind(id)
        .bind(store)
        .bind(&draft.name)
        .bind(&draft.value)
        .bind(draft.is_locked)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        self.guarded(updated, EntityKind::Color, store, id.as_str())
            .await
    }

    #[instrument(skip(self))]
    async fn delete_color(&self, store: &StoreId, id: &ColorId) -> Result<Color, RepositoryError> {
        self.delete_unlocked(EntityKind::Color, store, id.as_str())
            .await
    }

    // -- Products -------------------------------------------------------------

    async fn list_products(
        &self,
        store: &StoreId,
        filter: &ProductFilter,
    ) -> Result<Vec<ProductWithRelations>, RepositoryError> {
        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT * FROM catalog.product WHERE store_id = ");
        builder.push_bind(store.clone());

        if let Some(id) = &filter.category_id {
            builder.push(" AND category_id = ").push_bind(id.clone());
        }
        if let Some(id) = &filter.subcategory_id {
            builder.push(" AND subcategory_id = ").push_bind(id.clone());
        }
        if let Some(id) = &filter.color_id {
            builder.push(" AND color_id = ").push_bind(id.clone());
        }
        if let Some(id) = &filter.size_id {
            builder.push(" AND size_id = ").push_bind(id.clone());
        }
        if let Some(featured) = filter.is_featured {
            builder.push(" AND is_featured = ").push_bind(featured);
        }
        if !filter.include_archived {
            builder.push(" AND NOT is_archived");
        }
        builder.push(" ORDER BY created_at DESC");

        let products = builder
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;

        self.with_relations(products).await
    }

    async fn get_product(
        &self,
        store: &StoreId,
        id: &ProductId,
    ) -> Result<Option<ProductWithRelations>, RepositoryError> {
        match self
            .get_row::<Product>(EntityKind::Product, store, id.as_str())
            .await?
        {
            Some(product) => Ok(Some(self.single_with_relations(product).await?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, draft))]
    async fn create_product(
        &self,
        store: &StoreId,
        draft: &ProductDraft,
    ) -> Result<ProductWithRelations, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let product = sqlx::query_as::<_, Product>(
            r"
            INSERT INTO catalog.product (
                id, store_id, category_id, subcategory_id, size_id, color_id,
                name, description, price, is_featured, is_archived, is_locked
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            ",
        )
        .bind(ProductId::generate())
        .bind(store)
        .bind(&draft.category_id)
        .bind(&draft.subcategory_id)
        .bind(&draft.size_id)
        .bind(&draft.color_id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.is_featured)
        .bind(draft.is_archived)
        .bind(draft.is_locked)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_reference_error)?;

        insert_images(&mut tx, &product.id, &draft.images).await?;
        tx.commit().await?;

        self.single_with_relations(product).await
    }

    #[instrument(skip(self, draft))]
    async fn update_product(
        &self,
        store: &StoreId,
        id: &ProductId,
        draft: &ProductDraft,
    ) -> Result<ProductWithRelations, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Product>(
            r"
            UPDATE catalog.product
            SET category_id = $3, subcategory_id = $4, size_id = $5, color_id = $6,
                name = $7, description = $8, price = $9,
                is_featured = $10, is_archived = $11, is_locked = $12,
                updated_at = NOW()
            WHERE id = $1 AND store_id = $2 AND NOT is_locked
            RETURNING *
            ",
        )
        .bind(id)
        .bind(store)
        .bind(&draft.category_id)
        .bind(&draft.subcategory_id)
        .bind(&draft.size_id)
        .bind(&draft.color_id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.is_featured)
        .bind(draft.is_archived)
        .bind(draft.is_locked)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_reference_error)?;

        let Some(product) = updated else {
            let miss = classify_miss(&mut *tx, EntityKind::Product, store, id.as_str()).await;
            tx.rollback().await?;
            return Err(miss);
        };

        sqlx::query("DELETE FROM catalog.image WHERE product_id = $1")
            .bind(&product.id)
            .execute(&mut *tx)
            .await?;
        insert_images(&mut tx, &product.id, &draft.images).await?;
        tx.commit().await?;

        self.single_with_relations(product).await
    }

    #[instrument(skip(self))]
    async fn delete_product(
        &self,
        store: &StoreId,
        id: &ProductId,
    ) -> Result<Product, RepositoryError> {
        self.delete_unlocked(EntityKind::Product, store, id.as_str())
            .await
    }

    // -- Operator tools -------------------------------------------------------

    #[instrument(skip(self))]
    async fn unlock(&self, kind: EntityKind, id: &str) -> Result<(), RepositoryError> {
        let sql = format!(
            "UPDATE {} SET is_locked = FALSE, updated_at = NOW() WHERE id = $1",
            kind.table()
        );
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
