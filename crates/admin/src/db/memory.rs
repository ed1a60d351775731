//! In-process catalog backend.
//!
//! Mirrors the `PostgreSQL` schema closely enough for route and client tests:
//! lock-guarded writes, store scoping, restrict-on-delete foreign keys and
//! cascade deletion of product images. Every mutation runs under a single
//! write lock, so the lock check and the write are one atomic step.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use storedash_core::{
    BillboardId, CategoryId, ColorId, EntityKind, ImageId, Price, ProductId, SizeId, StoreId,
    SubcategoryId, UserId,
};

use super::{CatalogStore, ProductFilter, RepositoryError};
use crate::models::{
    Billboard, BillboardDraft, Category, CategoryDraft, CategoryWithBillboard, Color, ColorDraft,
    Image, Product, ProductDraft, ProductWithRelations, Size, SizeDraft, Store, StoreDraft,
    Subcategory, SubcategoryDraft,
};

/// A lockable catalog row.
trait CatalogRow {
    fn key(&self) -> &str;
    fn store(&self) -> &StoreId;
    fn locked(&self) -> bool;
    fn set_locked(&mut self, locked: bool);
}

macro_rules! impl_catalog_row {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl CatalogRow for $ty {
                fn key(&self) -> &str {
                    self.id.as_str()
                }

                fn store(&self) -> &StoreId {
                    &self.store_id
                }

                fn locked(&self) -> bool {
                    self.is_locked
                }

                fn set_locked(&mut self, locked: bool) {
                    self.is_locked = locked;
                    self.updated_at = Utc::now();
                }
            }
        )+
    };
}

impl_catalog_row!(Billboard, Category, Subcategory, Size, Color, Product);

#[derive(Debug, Default)]
struct Tables {
    stores: Vec<Store>,
    billboards: Vec<Billboard>,
    categories: Vec<Category>,
    subcategories: Vec<Subcategory>,
    sizes: Vec<Size>,
    colors: Vec<Color>,
    products: Vec<Product>,
    images: Vec<Image>,
}

/// Newest first, matching `ORDER BY created_at DESC`.
fn newest_first<T: CatalogRow + Clone>(rows: &[T], store: &StoreId) -> Vec<T> {
    rows.iter()
        .rev()
        .filter(|row| row.store() == store)
        .cloned()
        .collect()
}

fn find_in_store<'a, T: CatalogRow>(rows: &'a [T], store: &StoreId, id: &str) -> Option<&'a T> {
    rows.iter()
        .find(|row| row.key() == id && row.store() == store)
}

/// The row `id` in `store`, provided it is unlocked.
fn unlocked_mut<'a, T: CatalogRow>(
    rows: &'a mut [T],
    store: &StoreId,
    id: &str,
) -> Result<&'a mut T, RepositoryError> {
    let row = rows
        .iter_mut()
        .find(|row| row.key() == id && row.store() == store)
        .ok_or(RepositoryError::NotFound)?;
    if row.locked() {
        return Err(RepositoryError::Locked);
    }
    Ok(row)
}

/// Position of the row `id` in `store`, provided it is unlocked.
fn unlocked_position<T: CatalogRow>(
    rows: &[T],
    store: &StoreId,
    id: &str,
) -> Result<usize, RepositoryError> {
    let (index, row) = rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.key() == id && row.store() == store)
        .ok_or(RepositoryError::NotFound)?;
    if row.locked() {
        return Err(RepositoryError::Locked);
    }
    Ok(index)
}

fn unlock_row<T: CatalogRow>(rows: &mut [T], id: &str) -> bool {
    let Some(row) = rows.iter_mut().find(|row| row.key() == id) else {
        return false;
    };
    row.set_locked(false);
    true
}

/// Reject a reference unless `id` names a row of `store`.
fn require_in_store<T: CatalogRow>(
    rows: &[T],
    store: &StoreId,
    id: &str,
    kind: EntityKind,
) -> Result<(), RepositoryError> {
    find_in_store(rows, store, id)
        .map(|_| ())
        .ok_or(RepositoryError::InvalidReference(kind))
}

fn still_referenced(what: &str) -> RepositoryError {
    RepositoryError::Conflict(format!("{what} is still referenced"))
}

impl Tables {
    fn require_billboard(&self, store: &StoreId, id: &BillboardId) -> Result<(), RepositoryError> {
        require_in_store(&self.billboards, store, id.as_str(), EntityKind::Billboard)
    }

    fn require_category(&self, store: &StoreId, id: &CategoryId) -> Result<(), RepositoryError> {
        require_in_store(&self.categories, store, id.as_str(), EntityKind::Category)
    }

    fn check_product_references(
        &self,
        store: &StoreId,
        draft: &ProductDraft,
    ) -> Result<(), RepositoryError> {
        self.require_category(store, &draft.category_id)?;
        require_in_store(
            &self.subcategories,
            store,
            draft.subcategory_id.as_str(),
            EntityKind::Subcategory,
        )?;
        if let Some(id) = &draft.size_id {
            require_in_store(&self.sizes, store, id.as_str(), EntityKind::Size)?;
        }
        if let Some(id) = &draft.color_id {
            require_in_store(&self.colors, store, id.as_str(), EntityKind::Color)?;
        }
        Ok(())
    }

    fn with_billboard(&self, category: Category) -> CategoryWithBillboard {
        CategoryWithBillboard {
            billboard: self
                .billboards
                .iter()
                .find(|b| b.id == category.billboard_id)
                .cloned(),
            category,
        }
    }

    fn with_relations(&self, product: Product) -> ProductWithRelations {
        ProductWithRelations {
            images: self
                .images
                .iter()
                .filter(|image| image.product_id == product.id)
                .cloned()
                .collect(),
            category: self
                .categories
                .iter()
                .find(|c| c.id == product.category_id)
                .cloned(),
            subcategory: self
                .subcategories
                .iter()
                .find(|s| s.id == product.subcategory_id)
                .cloned(),
            size: product
                .size_id
                .as_ref()
                .and_then(|id| self.sizes.iter().find(|s| &s.id == id))
                .cloned(),
            color: product
                .color_id
                .as_ref()
                .and_then(|id| self.colors.iter().find(|c| &c.id == id))
                .cloned(),
            product,
        }
    }

    fn replace_images(&mut self, product_id: &ProductId, urls: &[String]) {
        self.images.retain(|image| &image.product_id != product_id);
        let now = Utc::now();
        self.images.extend(urls.iter().map(|url| Image {
            id: ImageId::generate(),
            product_id: product_id.clone(),
            url: url.clone(),
            created_at: now,
            updated_at: now,
        }));
    }
}

/// Catalog repository held entirely in memory.
///
/// Rows created through the trait get generated ids; the `seed_*` helpers
/// insert rows with fixed ids for fixtures.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    tables: RwLock<Tables>,
    offline: AtomicBool,
}

impl MemoryCatalogStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail as if the database were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn online(&self) -> Result<(), RepositoryError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    /// Insert a store with a fixed id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` for the reserved id `stores`.
    pub async fn seed_store(
        &self,
        id: &str,
        owner: &str,
        name: &str,
    ) -> Result<Store, RepositoryError> {
        let id = StoreId::new(id);
        if id.is_reserved() {
            return Err(RepositoryError::Conflict(format!(
                "store id `{id}` is reserved"
            )));
        }
        let now = Utc::now();
        let store = Store {
            id,
            name: name.to_owned(),
            user_id: UserId::new(owner),
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.stores.push(store.clone());
        Ok(store)
    }

    /// Insert a billboard with a fixed id.
    pub async fn seed_billboard(&self, store: &str, id: &str, locked: bool) -> Billboard {
        let now = Utc::now();
        let billboard = Billboard {
            id: BillboardId::new(id),
            store_id: StoreId::new(store),
            label: format!("Billboard {id}"),
            image_url: format!("https://images.example.com/{id}.png"),
            is_featured: false,
            is_locked: locked,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.billboards.push(billboard.clone());
        billboard
    }

    /// Insert a category with a fixed id.
    pub async fn seed_category(
        &self,
        store: &str,
        id: &str,
        billboard: &str,
        locked: bool,
    ) -> Category {
        let now = Utc::now();
        let category = Category {
            id: CategoryId::new(id),
            store_id: StoreId::new(store),
            billboard_id: BillboardId::new(billboard),
            name: format!("Category {id}"),
            is_locked: locked,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.categories.push(category.clone());
        category
    }

    /// Insert a subcategory with a fixed id.
    pub async fn seed_subcategory(
        &self,
        store: &str,
        id: &str,
        category: &str,
        locked: bool,
    ) -> Subcategory {
        let now = Utc::now();
        let subcategory = Subcategory {
            id: SubcategoryId::new(id),
            store_id: StoreId::new(store),
            category_id: CategoryId::new(category),
            name: format!("Subcategory {id}"),
            is_locked: locked,
            created_at: now,
            updated_at: now,
        };
        self.tables
            .write()
            .await
            .subcategories
            .push(subcategory.clone());
        subcategory
    }

    /// Insert a size with a fixed id.
    pub async fn seed_size(&self, store: &str, id: &str, locked: bool) -> Size {
        let now = Utc::now();
        let size = Size {
            id: SizeId::new(id),
            store_id: StoreId::new(store),
            name: format!("Size {id}"),
            value: id.to_uppercase(),
            is_locked: locked,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.sizes.push(size.clone());
        size
    }

    /// Insert a color with a fixed id.
    pub async fn seed_color(&self, store: &str, id: &str, locked: bool) -> Color {
        let now = Utc::now();
        let color = Color {
            id: ColorId::new(id),
            store_id: StoreId::new(store),
            name: format!("Color {id}"),
            value: "#000000".to_owned(),
            is_locked: locked,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.colors.push(color.clone());
        color
    }

    /// Insert a product with a fixed id and one image.
    pub async fn seed_product(
        &self,
        store: &str,
        id: &str,
        (category, subcategory): (&str, &str),
        price: Price,
        locked: bool,
    ) -> Product {
        let now = Utc::now();
        let product = Product {
            id: ProductId::new(id),
            store_id: StoreId::new(store),
            category_id: CategoryId::new(category),
            subcategory_id: SubcategoryId::new(subcategory),
            size_id: None,
            color_id: None,
            name: format!("Product {id}"),
            description: None,
            price,
            is_featured: false,
            is_archived: false,
            is_locked: locked,
            created_at: now,
            updated_at: now,
        };
        let mut tables = self.tables.write().await;
        tables.replace_images(
            &product.id,
            &[format!("https://images.example.com/{id}.png")],
        );
        tables.products.push(product.clone());
        product
    }

    /// Whether a row of `kind` with `id` exists and is locked.
    pub async fn is_locked(&self, kind: EntityKind, id: &str) -> Option<bool> {
        let tables = self.tables.read().await;
        match kind {
            EntityKind::Billboard => lock_state(&tables.billboards, id),
            EntityKind::Category => lock_state(&tables.categories, id),
            EntityKind::Subcategory => lock_state(&tables.subcategories, id),
            EntityKind::Size => lock_state(&tables.sizes, id),
            EntityKind::Color => lock_state(&tables.colors, id),
            EntityKind::Product => lock_state(&tables.products, id),
        }
    }
}

fn lock_state<T: CatalogRow>(rows: &[T], id: &str) -> Option<bool> {
    rows.iter().find(|row| row.key() == id).map(CatalogRow::locked)
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        self.online()
    }

    // -- Stores ---------------------------------------------------------------

    async fn create_store(
        &self,
        owner: &UserId,
        draft: &StoreDraft,
    ) -> Result<Store, RepositoryError> {
        self.online()?;
        let now = Utc::now();
        let store = Store {
            id: StoreId::generate(),
            name: draft.name.clone(),
            user_id: owner.clone(),
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.stores.push(store.clone());
        Ok(store)
    }

    async fn find_store(&self, id: &StoreId) -> Result<Option<Store>, RepositoryError> {
        self.online()?;
        Ok(self
            .tables
            .read()
            .await
            .stores
            .iter()
            .find(|s| &s.id == id)
            .cloned())
    }

    async fn list_stores(&self, owner: &UserId) -> Result<Vec<Store>, RepositoryError> {
        self.online()?;
        Ok(self
            .tables
            .read()
            .await
            .stores
            .iter()
            .filter(|s| &s.user_id == owner)
            .cloned()
            .collect())
    }

    async fn rename_store(
        &self,
        id: &StoreId,
        draft: &StoreDraft,
    ) -> Result<Store, RepositoryError> {
        self.online()?;
        let mut tables = self.tables.write().await;
        let store = tables
            .stores
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or(RepositoryError::NotFound)?;
        store.name.clone_from(&draft.name);
        store.updated_at = Utc::now();
        Ok(store.clone())
    }

    async fn delete_store(&self, id: &StoreId) -> Result<Store, RepositoryError> {
        self.online()?;
        let mut tables = self.tables.write().await;
        let index = tables
            .stores
            .iter()
            .position(|s| &s.id == id)
            .ok_or(RepositoryError::NotFound)?;
        let referenced = tables.billboards.iter().any(|r| &r.store_id == id)
            || tables.categories.iter().any(|r| &r.store_id == id)
            || tables.subcategories.iter().any(|r| &r.store_id == id)
            || tables.sizes.iter().any(|r| &r.store_id == id)
            || tables.colors.iter().any(|r| &r.store_id == id)
            || tables.products.iter().any(|r| &r.store_id == id);
        if referenced {
            return Err(still_referenced("store"));
        }
        Ok(tables.stores.remove(index))
    }

    // -- Billboards -----------------------------------------------------------

    async fn list_billboards(&self, store: &StoreId) -> Result<Vec<Billboard>, RepositoryError> {
        self.online()?;
        Ok(newest_first(&self.tables.read().await.billboards, store))
    }

    async fn get_billboard(
        &self,
        store: &StoreId,
        id: &BillboardId,
    ) -> Result<Option<Billboard>, RepositoryError> {
        self.online()?;
        Ok(find_in_store(&self.tables.read().await.billboards, store, id.as_str()).cloned())
    }

    async fn create_billboard(
        &self,
        store: &StoreId,
        draft: &BillboardDraft,
    ) -> Result<Billboard, RepositoryError> {
        self.online()?;
        let now = Utc::now();
        let billboard = Billboard {
            id: BillboardId::generate(),
            store_id: store.clone(),
            label: draft.label.clone(),
            image_url: draft.image_url.clone(),
            is_featured: draft.is_featured,
            is_locked: draft.is_locked,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.billboards.push(billboard.clone());
        Ok(billboard)
    }

    async fn update_billboard(
        &self,
        store: &StoreId,
        id: &BillboardId,
        draft: &BillboardDraft,
    ) -> Result<Billboard, RepositoryError> {
        self.online()?;
        let mut tables = self.tables.write().await;
        let row = unlocked_mut(&mut tables.billboards, store, id.as_str())?;
        row.label.clone_from(&draft.label);
        row.image_url.clone_from(&draft.image_url);
        row.is_featured = draft.is_featured;
        row.is_locked = draft.is_locked;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete_billboard(
        &self,
        store: &StoreId,
        id: &BillboardId,
    ) -> Result<Billboard, RepositoryError> {
        self.online()?;
        let mut tables = self.tables.write().await;
        let index = unlocked_position(&tables.billboards, store, id.as_str())?;
        if tables.categories.iter().any(|c| &c.billboard_id == id) {
            return Err(still_referenced("billboard"));
        }
        Ok(tables.billboards.remove(index))
    }

    // -- Categories -----------------------------------------------------------

    async fn list_categories(
        &self,
        store: &StoreId,
    ) -> Result<Vec<CategoryWithBillboard>, RepositoryError> {
        self.online()?;
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.categories, store)
            .into_iter()
            .map(|category| tables.with_billboard(category))
            .collect())
    }

    async fn get_category(
        &self,
        store: &StoreId,
        id: &CategoryId,
    ) -> Result<Option<CategoryWithBillboard>, RepositoryError> {
        self.online()?;
        let tables = self.tables.read().await;
        Ok(find_in_store(&tables.categories, store, id.as_str())
            .cloned()
            .map(|category| tables.with_billboard(category)))
    }

    async fn create_category(
        &self,
        store: &StoreId,
        draft: &CategoryDraft,
    ) -> Result<Category, RepositoryError> {
        self.online()?;
        let mut tables = self.tables.write().await;
        tables.require_billboard(store, &draft.billboard_id)?;
        let now = Utc::now();
        let category = Category {
            id: CategoryId::generate(),
            store_id: store.clone(),
            billboard_id: draft.billboard_id.clone(),
            name: draft.name.clone(),
            is_locked: draft.is_locked,
            created_at: now,
            updated_at: now,
        };
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        store: &StoreId,
        id: &CategoryId,
        draft: &CategoryDraft,
    ) -> Result<Category, RepositoryError> {
        self.online()?;
        let mut tables = self.tables.write().await;
        unlocked_position(&tables.categories, store, id.as_str())?;
        tables.require_billboard(store, &draft.billboard_id)?;
        let row = unlocked_mut(&mut tables.categories, store, id.as_str())?;
        row.name.clone_from(&draft.name);
        row.billboard_id = draft.billboard_id.clone();
        row.is_locked = draft.is_locked;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete_category(
        &self,
        store: &StoreId,
        id: &CategoryId,
    ) -> Result<Category, RepositoryError> {
        self.online()?;
        let mut tables = self.tables.write().await;
        let index = unlocked_position(&tables.categories, store, id.as_str())?;
        if tables.subcategories.iter().any(|s| &s.category_id == id)
            || tables.products.iter().any(|p| &p.category_id == id)
        {
            return Err(still_referenced("category"));
        }
        Ok(tables.categories.remove(index))
    }

    // -- Subcategories --------------------------------------------------------

    async fn list_subcategories(
        &self,
        store: &StoreId,
    ) -> Result<Vec<Subcategory>, RepositoryError> {
        self.online()?;
        Ok(newest_first(&self.tables.read().await.subcategories, store))
    }

    async fn get_subcategory(
        &self,
        store: &StoreId,
        id: &SubcategoryId,
    ) -> Result<Option<Subcategory>, RepositoryError> {
        self.online()?;
        Ok(find_in_store(&self.tables.read().await.subcategories, store, id.as_str()).cloned())
    }

    async fn create_subcategory(
        &self,
        store: &StoreId,
        draft: &SubcategoryDraft,
    ) -> Result<Subcategory, RepositoryError> {
        self.online()?;
        let mut tables = self.tables.write().await;
        tables.require_category(store, &draft.category_id)?;
        let now = Utc::now();
        let subcategory = Subcategory {
            id: SubcategoryId::generate(),
            store_id: store.clone(),
            category_id: draft.category_id.clone(),
            name: draft.name.clone(),
            is_locked: draft.is_locked,
            created_at: now,
            updated_at: now,
        };
        tables.subcategories.push(subcategory.clone());
        Ok(subcategory)
    }

    async fn update_subcategory(
        &self,
        store: &StoreId,
        id: &SubcategoryId,
        draft: &SubcategoryDraft,
    ) -> Result<Subcategory, RepositoryError> {
        self.online()?;
        let mut tables = self.tables.write().await;
        unlocked_position(&tables.subcategories, store, id.as_str())?;
        tables.require_category(store, &draft.category_id)?;
        let row = unlocked_mut(&mut tables.subcategories, store, id.as_str())?;
        row.name.clone_from(&draft.name);
        row.category_id = draft.category_id.clone();
        row.is_locked = draft.is_locked;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete_subcategory(
        &self,
        store: &StoreId,
        id: &SubcategoryId,
    ) -> Result<Subcategory, RepositoryError> {
        self.online()?;
        let mut tables = self.tables.write().await;
        let index = unlocked_position(&tables.subcategories, store, id.as_str())?;
        if tables.products.iter().any(|p| &p.subcategory_id == id) {
            return Err(still_referenced("subcategory"));
        }
        Ok(tables.subcategories.remove(index))
    }

    // -- Sizes ----------------------------------------------------------------

    async fn list_sizes(&self, store: &StoreId) -> Result<Vec<Size>, RepositoryError> {
        self.online()?;
        Ok(newest_first(&self.tables.read().await.sizes, store))
    }

    async fn get_size(
        &self,
        store: &StoreId,
        id: &SizeId,
    ) -> Result<Option<Size>, RepositoryError> {
        self.online()?;
        Ok(find_in_store(&self.tables.read().await.sizes, store, id.as_str()).cloned())
    }

    async fn create_size(
        &self,
        store: &StoreId,
        draft: &SizeDraft,
    ) -> Result<Size, RepositoryError> {
        self.online()?;
        let now = Utc::now();
        let size = Size {
            id: SizeId::generate(),
            store_id: store.clone(),
            name: draft.name.clone(),
            value: draft.value.clone(),
            is_locked: draft.is_locked,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.sizes.push(size.clone());
        Ok(size)
    }

    async fn update_size(
        &self,
        store: &StoreId,
        id: &SizeId,
        draft: &SizeDraft,
    ) -> Result<Size, RepositoryError> {
        self.online()?;
        let mut tables = self.tables.write().await;
        let row = unlocked_mut(&mut tables.sizes, store, id.as_str())?;
        row.name.clone_from(&draft.name);
        row.value.clone_from(&draft.value);
        row.is_locked = draft.is_locked;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete_size(&self, store: &StoreId, id: &SizeId) -> Result<Size, RepositoryError> {
        self.online()?;
        let mut tables = self.tables.write().await;
        let index = unlocked_position(&tables.sizes, store, id.as_str())?;
        if tables
            .products
            .iter()
            .any(|p| p.size_id.as_ref() == Some(id))
        {
            return Err(still_referenced("size"));
        }
        Ok(tables.sizes.remove(index))
    }

    // -- Colors ---------------------------------------------------------------

    async fn list_colors(&self, store: &StoreId) -> Result<Vec<Color>, RepositoryError> {
        self.online()?;
        Ok(newest_first(&self.tables.read().await.colors, store))
    }

    async fn get_color(
        &self,
        store: &StoreId,
        id: &ColorId,
    ) -> Result<Option<Color>, RepositoryError> {
        self.online()?;
        Ok(find_in_store(&self.tables.read().await.colors, store, id.as_str()).cloned())
    }

    async fn create_color(
        &self,
        store: &StoreId,
        draft: &ColorDraft,
    ) -> Result<Color, RepositoryError> {
        self.online()?;
        let now = Utc::now();
        let color = Color {
            id: ColorId::generate(),
            store_id: store.clone(),
            name: draft.name.clone(),
            value: draft.value.clone(),
            is_locked: draft.is_locked,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.colors.push(color.clone());
        Ok(color)
    }

    async fn update_color(
        &self,
        store: &StoreId,
        id: &ColorId,
        draft: &ColorDraft,
    ) -> Result<Color, RepositoryError> {
        self.online()?;
        let mut tables = self.tables.write().await;
        let row = unlocked_mut(&mut tables.colors, store, id.as_str())?;
        row.name.clone_from(&draft.name);
        row.value.clone_from(&draft.value);
        row.is_locked = draft.is_locked;
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete_color(&self, store: &StoreId, id: &ColorId) -> Result<Color, RepositoryError> {
        self.online()?;
        let mut tables = self.tables.write().await;
        let index = unlocked_position(&tables.colors, store, id.as_str())?;
        if tables
            .products
            .iter()
            .any(|p| p.color_id.as_ref() == Some(id))
        {
            return Err(still_referenced("color"));
        }
        Ok(tables.colors.remove(index))
    }

    // -- Products -------------------------------------------------------------

    async fn list_products(
        &self,
        store: &StoreId,
        filter: &ProductFilter,
    ) -> Result<Vec<ProductWithRelations>, RepositoryError> {
        self.online()?;
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.products, store)
            .into_iter()
            .filter(|product| filter.matches(product))
            .map(|product| tables.with_relations(product))
            .collect())
    }

    async fn get_product(
        &self,
        store: &StoreId,
        id: &ProductId,
    ) -> Result<Option<ProductWithRelations>, RepositoryError> {
        self.online()?;
        let tables = self.tables.read().await;
        Ok(find_in_store(&tables.products, store, id.as_str())
            .cloned()
            .map(|product| tables.with_relations(product)))
    }

    async fn create_product(
        &self,
        store: &StoreId,
        draft: &ProductDraft,
    ) -> Result<ProductWithRelations, RepositoryError> {
        self.online()?;
        let mut tables = self.tables.write().await;
        tables.check_product_references(store, draft)?;
        let now = Utc::now();
        let product = Product {
            id: ProductId::generate(),
            store_id: store.clone(),
            category_id: draft.category_id.clone(),
            subcategory_id: draft.subcategory_id.clone(),
            size_id: draft.size_id.clone(),
            color_id: draft.color_id.clone(),
            name: draft.name.clone(),
            description: draft.description.clone(),
            price: draft.price,
            is_featured: draft.is_featured,
            is_archived: draft.is_archived,
            is_locked: draft.is_locked,
            created_at: now,
            updated_at: now,
        };
        tables.replace_images(&product.id, &draft.images);
        tables.products.push(product.clone());
        Ok(tables.with_relations(product))
    }

    async fn update_product(
        &self,
        store: &StoreId,
        id: &ProductId,
        draft: &ProductDraft,
    ) -> Result<ProductWithRelations, RepositoryError> {
        self.online()?;
        let mut tables = self.tables.write().await;
        unlocked_position(&tables.products, store, id.as_str())?;
        tables.check_product_references(store, draft)?;

        let row = unlocked_mut(&mut tables.products, store, id.as_str())?;
        row.category_id = draft.category_id.clone();
        row.subcategory_id = draft.subcategory_id.clone();
        row.size_id.clone_from(&draft.size_id);
        row.color_id.clone_from(&draft.color_id);
        row.name.clone_from(&draft.name);
        row.description.clone_from(&draft.description);
        row.price = draft.price;
        row.is_featured = draft.is_featured;
        row.is_archived = draft.is_archived;
        row.is_locked = draft.is_locked;
        row.updated_at = Utc::now();
        let product = row.clone();

        tables.replace_images(&product.id, &draft.images);
        Ok(tables.with_relations(product))
    }

    async fn delete_product(
        &self,
        store: &StoreId,
        id: &ProductId,
    ) -> Result<Product, RepositoryError> {
        self.online()?;
        let mut tables = self.tables.write().await;
        let index = unlocked_position(&tables.products, store, id.as_str())?;
        let product = tables.products.remove(index);
        tables.images.retain(|image| &image.product_id != id);
        Ok(product)
    }

    // -- Operator tools -------------------------------------------------------

    async fn unlock(&self, kind: EntityKind, id: &str) -> Result<(), RepositoryError> {
        self.online()?;
        let mut tables = self.tables.write().await;
        let found = match kind {
            EntityKind::Billboard => unlock_row(&mut tables.billboards, id),
            EntityKind::Category => unlock_row(&mut tables.categories, id),
            EntityKind::Subcategory => unlock_row(&mut tables.subcategories, id),
            EntityKind::Size => unlock_row(&mut tables.sizes, id),
            EntityKind::Color => unlock_row(&mut tables.colors, id),
            EntityKind::Product => unlock_row(&mut tables.products, id),
        };
        if found {
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }
}
