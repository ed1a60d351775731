//! Product API handlers.
//!
//! Products carry an image list. Reads return the product with its images
//! and referenced rows; updates replace the image list in the same
//! transaction as the lock-guarded row update.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    routing::get,
};
use tracing::instrument;

use storedash_core::{EntityKind, Operation, ProductId, StoreId};

use super::guard;
use crate::db::ProductFilter;
use crate::error::{AppError, RouteContext};
use crate::middleware::RequireCaller;
use crate::models::{Product, ProductInput, ProductWithRelations};
use crate::state::AppState;

const KIND: EntityKind = EntityKind::Product;

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/{storeId}/products", get(list).post(create))
        .route(
            "/api/{storeId}/products/{productId}",
            get(show).patch(update).delete(destroy),
        )
}

/// List a store's products, newest first.
///
/// Query parameters: `categoryId`, `subcategoryId`, `colorId`, `sizeId`,
/// `isFeatured`, `includeArchived` (archived products are hidden by default).
///
/// # Errors
///
/// Returns an internal error if the backend fails.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Path(store_id): Path<StoreId>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<ProductWithRelations>>, AppError> {
    let products = state
        .catalog()
        .list_products(&store_id, &filter)
        .await
        .at(KIND.route_tag(Operation::List))?;
    Ok(Json(products))
}

/// Fetch one product with images and relations.
///
/// # Errors
///
/// Returns 400 for a blank id, 404 if the product is not in the store.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path((store_id, product_id)): Path<(StoreId, ProductId)>,
) -> Result<Json<ProductWithRelations>, AppError> {
    guard::entity_id(KIND, product_id.as_str())?;
    state
        .catalog()
        .get_product(&store_id, &product_id)
        .await
        .at(KIND.route_tag(Operation::Get))?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// Create a product and its images.
///
/// # Errors
///
/// Returns 403, 400 or 405 per the mutation protocol.
#[instrument(skip(state, body))]
pub async fn create(
    RequireCaller(user): RequireCaller,
    State(state): State<AppState>,
    Path(store_id): Path<StoreId>,
    body: Result<Json<ProductInput>, JsonRejection>,
) -> Result<Json<ProductWithRelations>, AppError> {
    let route = KIND.route_tag(Operation::Create);
    let draft = guard::draft(body)?;
    guard::owned_store(&state, &store_id, &user, route).await?;

    let product = state
        .catalog()
        .create_product(&store_id, &draft)
        .await
        .at(route)?;
    Ok(Json(product))
}

/// Update an unlocked product and replace its images.
///
/// # Errors
///
/// Returns 403, 400, 405, 409 or 404 per the mutation protocol. On 409 no
/// image row is touched.
#[instrument(skip(state, body))]
pub async fn update(
    RequireCaller(user): RequireCaller,
    State(state): State<AppState>,
    Path((store_id, product_id)): Path<(StoreId, ProductId)>,
    body: Result<Json<ProductInput>, JsonRejection>,
) -> Result<Json<ProductWithRelations>, AppError> {
    let route = KIND.route_tag(Operation::Update);
    let draft = guard::draft(body)?;
    guard::entity_id(KIND, product_id.as_str())?;
    guard::owned_store(&state, &store_id, &user, route).await?;

    let product = state
        .catalog()
        .update_product(&store_id, &product_id, &draft)
        .await
        .at(route)?;
    Ok(Json(product))
}

/// Delete an unlocked product. Its images go with it.
///
/// # Errors
///
/// Returns 403, 400, 405, 409 or 404 per the mutation protocol.
#[instrument(skip(state))]
pub async fn destroy(
    RequireCaller(user): RequireCaller,
    State(state): State<AppState>,
    Path((store_id, product_id)): Path<(StoreId, ProductId)>,
) -> Result<Json<Product>, AppError> {
    let route = KIND.route_tag(Operation::Delete);
    guard::entity_id(KIND, product_id.as_str())?;
    guard::owned_store(&state, &store_id, &user, route).await?;

    let product = state
        .catalog()
        .delete_product(&store_id, &product_id)
        .await
        .at(route)?;
    Ok(Json(product))
}
