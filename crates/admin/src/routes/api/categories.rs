//! Category API handlers.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::get,
};
use tracing::instrument;

use storedash_core::{CategoryId, EntityKind, Operation, StoreId};

use super::guard;
use crate::error::{AppError, RouteContext};
use crate::middleware::RequireCaller;
use crate::models::{Category, CategoryInput, CategoryWithBillboard};
use crate::state::AppState;

const KIND: EntityKind = EntityKind::Category;

/// Build the categories router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/{storeId}/categories", get(list).post(create))
        .route(
            "/api/{storeId}/categories/{categoryId}",
            get(show).patch(update).delete(destroy),
        )
}

/// List a store's categories with their billboards, newest first.
///
/// # Errors
///
/// Returns an internal error if the backend fails.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Path(store_id): Path<StoreId>,
) -> Result<Json<Vec<CategoryWithBillboard>>, AppError> {
    let categories = state
        .catalog()
        .list_categories(&store_id)
        .await
        .at(KIND.route_tag(Operation::List))?;
    Ok(Json(categories))
}

/// Fetch one category with its billboard.
///
/// # Errors
///
/// Returns 400 for a blank id, 404 if the category is not in the store.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path((store_id, category_id)): Path<(StoreId, CategoryId)>,
) -> Result<Json<CategoryWithBillboard>, AppError> {
    guard::entity_id(KIND, category_id.as_str())?;
    state
        .catalog()
        .get_category(&store_id, &category_id)
        .await
        .at(KIND.route_tag(Operation::Get))?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// Create a category.
///
/// # Errors
///
/// Returns 403, 400 or 405 per the mutation protocol.
#[instrument(skip(state, body))]
pub async fn create(
    RequireCaller(user): RequireCaller,
    State(state): State<AppState>,
    Path(store_id): Path<StoreId>,
    body: Result<Json<CategoryInput>, JsonRejection>,
) -> Result<Json<Category>, AppError> {
    let route = KIND.route_tag(Operation::Create);
    let draft = guard::draft(body)?;
    guard::owned_store(&state, &store_id, &user, route).await?;

    let category = state
        .catalog()
        .create_category(&store_id, &draft)
        .await
        .at(route)?;
    Ok(Json(category))
}

/// Update an unlocked category.
///
/// # Errors
///
/// Returns 403, 400, 405, 409 or 404 per the mutation protocol.
#[instrument(skip(state, body))]
pub async fn update(
    RequireCaller(user): RequireCaller,
    State(state): State<AppState>,
    Path((store_id, category_id)): Path<(StoreId, CategoryId)>,
    body: Result<Json<CategoryInput>, JsonRejection>,
) -> Result<Json<Category>, AppError> {
    let route = KIND.route_tag(Operation::Update);
    let draft = guard::draft(body)?;
    guard::entity_id(KIND, category_id.as_str())?;
    guard::owned_store(&state, &store_id, &user, route).await?;

    let category = state
        .catalog()
        .update_category(&store_id, &category_id, &draft)
        .await
        .at(route)?;
    Ok(Json(category))
}

/// Delete an unlocked category.
///
/// # Errors
///
/// Returns 403, 400, 405, 409 or 404 per the mutation protocol, and 500
/// while subcategories or products still use the category.
#[instrument(skip(state))]
pub async fn destroy(
    RequireCaller(user): RequireCaller,
    State(state): State<AppState>,
    Path((store_id, category_id)): Path<(StoreId, CategoryId)>,
) -> Result<Json<Category>, AppError> {
    let route = KIND.route_tag(Operation::Delete);
    guard::entity_id(KIND, category_id.as_str())?;
    guard::owned_store(&state, &store_id, &user, route).await?;

    let category = state
        .catalog()
        .delete_category(&store_id, &category_id)
        .await
        .at(route)?;
    Ok(Json(category))
}
