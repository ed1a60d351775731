//! Subcategory API handlers.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::get,
};
use tracing::instrument;

use storedash_core::{EntityKind, Operation, StoreId, SubcategoryId};

use super::guard;
use crate::error::{AppError, RouteContext};
use crate::middleware::RequireCaller;
use crate::models::{Subcategory, SubcategoryInput};
use crate::state::AppState;

const KIND: EntityKind = EntityKind::Subcategory;

/// Build the subcategories router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/{storeId}/subcategories", get(list).post(create))
        .route(
            "/api/{storeId}/subcategories/{subcategoryId}",
            get(show).patch(update).delete(destroy),
        )
}

/// List a store's subcategories, newest first.
///
/// # Errors
///
/// Returns an internal error if the backend fails.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Path(store_id): Path<StoreId>,
) -> Result<Json<Vec<Subcategory>>, AppError> {
    let subcategories = state
        .catalog()
        .list_subcategories(&store_id)
        .await
        .at(KIND.route_tag(Operation::List))?;
    Ok(Json(subcategories))
}

/// Fetch one subcategory.
///
/// # Errors
///
/// Returns 400 for a blank id, 404 if the subcategory is not in the store.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path((store_id, subcategory_id)): Path<(StoreId, SubcategoryId)>,
) -> Result<Json<Subcategory>, AppError> {
    guard::entity_id(KIND, subcategory_id.as_str())?;
    state
        .catalog()
        .get_subcategory(&store_id, &subcategory_id)
        .await
        .at(KIND.route_tag(Operation::Get))?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// Create a subcategory.
///
/// # Errors
///
/// Returns 403, 400 or 405 per the mutation protocol.
#[instrument(skip(state, body))]
pub async fn create(
    RequireCaller(user): RequireCaller,
    State(state): State<AppState>,
    Path(store_id): Path<StoreId>,
    body: Result<Json<SubcategoryInput>, JsonRejection>,
) -> Result<Json<Subcategory>, AppError> {
    let route = KIND.route_tag(Operation::Create);
    let draft = guard::draft(body)?;
    guard::owned_store(&state, &store_id, &user, route).await?;

    let subcategory = state
        .catalog()
        .create_subcategory(&store_id, &draft)
        .await
        .at(route)?;
    Ok(Json(subcategory))
}

/// Update an unlocked subcategory.
///
/// # Errors
///
/// Returns 403, 400, 405, 409 or 404 per the mutation protocol.
#[instrument(skip(state, body))]
pub async fn update(
    RequireCaller(user): RequireCaller,
    State(state): State<AppState>,
    Path((store_id, subcategory_id)): Path<(StoreId, SubcategoryId)>,
    body: Result<Json<SubcategoryInput>, JsonRejection>,
) -> Result<Json<Subcategory>, AppError> {
    let route = KIND.route_tag(Operation::Update);
    let draft = guard::draft(body)?;
    guard::entity_id(KIND, subcategory_id.as_str())?;
    guard::owned_store(&state, &store_id, &user, route).await?;

    let subcategory = state
        .catalog()
        .update_subcategory(&store_id, &subcategory_id, &draft)
        .await
        .at(route)?;
    Ok(Json(subcategory))
}

/// Delete an unlocked subcategory.
///
/// # Errors
///
/// Returns 403, 400, 405, 409 or 404 per the mutation protocol, and 500
/// while products still use the subcategory.
#[instrument(skip(state))]
pub async fn destroy(
    RequireCaller(user): RequireCaller,
    State(state): State<AppState>,
    Path((store_id, subcategory_id)): Path<(StoreId, SubcategoryId)>,
) -> Result<Json<Subcategory>, AppError> {
    let route = KIND.route_tag(Operation::Delete);
    guard::entity_id(KIND, subcategory_id.as_str())?;
    guard::owned_store(&state, &store_id, &user, route).await?;

    let subcategory = state
        .catalog()
        .delete_subcategory(&store_id, &subcategory_id)
        .await
        .at(route)?;
    Ok(Json(subcategory))
}
