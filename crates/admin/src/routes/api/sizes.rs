//! Size API handlers.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::get,
};
use tracing::instrument;

use storedash_core::{EntityKind, Operation, SizeId, StoreId};

use super::guard;
use crate::error::{AppError, RouteContext};
use crate::middleware::RequireCaller;
use crate::models::{Size, SizeInput};
use crate::state::AppState;

const KIND: EntityKind = EntityKind::Size;

/// Build the sizes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/{storeId}/sizes", get(list).post(create))
        .route(
            "/api/{storeId}/sizes/{sizeId}",
            get(show).patch(update).delete(destroy),
        )
}

/// List a store's sizes, newest first.
///
/// # Errors
///
/// Returns an internal error if the backend fails.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Path(store_id): Path<StoreId>,
) -> Result<Json<Vec<Size>>, AppError> {
    let sizes = state
        .catalog()
        .list_sizes(&store_id)
        .await
        .at(KIND.route_tag(Operation::List))?;
    Ok(Json(sizes))
}

/// Fetch one size.
///
/// # Errors
///
/// Returns 400 for a blank id, 404 if the size is not in the store.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path((store_id, size_id)): Path<(StoreId, SizeId)>,
) -> Result<Json<Size>, AppError> {
    guard::entity_id(KIND, size_id.as_str())?;
    state
        .catalog()
        .get_size(&store_id, &size_id)
        .await
        .at(KIND.route_tag(Operation::Get))?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// Create a size.
///
/// # Errors
///
/// Returns 403, 400 or 405 per the mutation protocol.
#[instrument(skip(state, body))]
pub async fn create(
    RequireCaller(user): RequireCaller,
    State(state): State<AppState>,
    Path(store_id): Path<StoreId>,
    body: Result<Json<SizeInput>, JsonRejection>,
) -> Result<Json<Size>, AppError> {
    let route = KIND.route_tag(Operation::Create);
    let draft = guard::draft(body)?;
    guard::owned_store(&state, &store_id, &user, route).await?;

    let size = state
        .catalog()
        .create_size(&store_id, &draft)
        .await
        .at(route)?;
    Ok(Json(size))
}

/// Update an unlocked size.
///
/// # Errors
///
/// Returns 403, 400, 405, 409 or 404 per the mutation protocol.
#[instrument(skip(state, body))]
pub async fn update(
    RequireCaller(user): RequireCaller,
    State(state): State<AppState>,
    Path((store_id, size_id)): Path<(StoreId, SizeId)>,
    body: Result<Json<SizeInput>, JsonRejection>,
) -> Result<Json<Size>, AppError> {
    let route = KIND.route_tag(Operation::Update);
    let draft = guard::draft(body)?;
    guard::entity_id(KIND, size_id.as_str())?;
    guard::owned_store(&state, &store_id, &user, route).await?;

    let size = state
        .catalog()
        .update_size(&store_id, &size_id, &draft)
        .await
        .at(route)?;
    Ok(Json(size))
}

/// Delete an unlocked size.
///
/// # Errors
///
/// Returns 403, 400, 405, 409 or 404 per the mutation protocol, and 500
/// while products still use the size.
#[instrument(skip(state))]
pub async fn destroy(
    RequireCaller(user): RequireCaller,
    State(state): State<AppState>,
    Path((store_id, size_id)): Path<(StoreId, SizeId)>,
) -> Result<Json<Size>, AppError> {
    let route = KIND.route_tag(Operation::Delete);
    guard::entity_id(KIND, size_id.as_str())?;
    guard::owned_store(&state, &store_id, &user, route).await?;

    let size = state
        .catalog()
        .delete_size(&store_id, &size_id)
        .await
        .at(route)?;
    Ok(Json(size))
}
