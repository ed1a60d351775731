//! Billboard API handlers.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::get,
};
use tracing::instrument;

use storedash_core::{BillboardId, EntityKind, Operation, StoreId};

use super::guard;
use crate::error::{AppError, RouteContext};
use crate::middleware::RequireCaller;
use crate::models::{Billboard, BillboardInput};
use crate::state::AppState;

const KIND: EntityKind = EntityKind::Billboard;

/// Build the billboards router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/{storeId}/billboards", get(list).post(create))
        .route(
            "/api/{storeId}/billboards/{billboardId}",
            get(show).patch(update).delete(destroy),
        )
}

/// List a store's billboards, newest first.
///
/// # Errors
///
/// Returns an internal error if the backend fails.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Path(store_id): Path<StoreId>,
) -> Result<Json<Vec<Billboard>>, AppError> {
    let billboards = state
        .catalog()
        .list_billboards(&store_id)
        .await
        .at(KIND.route_tag(Operation::List))?;
    Ok(Json(billboards))
}

/// Fetch one billboard.
///
/// # Errors
///
/// Returns 400 for a blank id, 404 if the billboard is not in the store.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path((store_id, billboard_id)): Path<(StoreId, BillboardId)>,
) -> Result<Json<Billboard>, AppError> {
    guard::entity_id(KIND, billboard_id.as_str())?;
    state
        .catalog()
        .get_billboard(&store_id, &billboard_id)
        .await
        .at(KIND.route_tag(Operation::Get))?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// Create a billboard.
///
/// # Errors
///
/// Returns 403, 400 or 405 per the mutation protocol.
#[instrument(skip(state, body))]
pub async fn create(
    RequireCaller(user): RequireCaller,
    State(state): State<AppState>,
    Path(store_id): Path<StoreId>,
    body: Result<Json<BillboardInput>, JsonRejection>,
) -> Result<Json<Billboard>, AppError> {
    let route = KIND.route_tag(Operation::Create);
    let draft = guard::draft(body)?;
    guard::owned_store(&state, &store_id, &user, route).await?;

    let billboard = state
        .catalog()
        .create_billboard(&store_id, &draft)
        .await
        .at(route)?;
    Ok(Json(billboard))
}

/// Update an unlocked billboard.
///
/// # Errors
///
/// Returns 403, 400, 405, 409 or 404 per the mutation protocol.
#[instrument(skip(state, body))]
pub async fn update(
    RequireCaller(user): RequireCaller,
    State(state): State<AppState>,
    Path((store_id, billboard_id)): Path<(StoreId, BillboardId)>,
    body: Result<Json<BillboardInput>, JsonRejection>,
) -> Result<Json<Billboard>, AppError> {
    let route = KIND.route_tag(Operation::Update);
    let draft = guard::draft(body)?;
    guard::entity_id(KIND, billboard_id.as_str())?;
    guard::owned_store(&state, &store_id, &user, route).await?;

    let billboard = state
        .catalog()
        .update_billboard(&store_id, &billboard_id, &draft)
        .await
        .at(route)?;
    Ok(Json(billboard))
}

/// Delete an unlocked billboard.
///
/// # Errors
///
/// Returns 403, 400, 405, 409 or 404 per the mutation protocol, and 500
/// while categories still use the billboard.
#[instrument(skip(state))]
pub async fn destroy(
    RequireCaller(user): RequireCaller,
    State(state): State<AppState>,
    Path((store_id, billboard_id)): Path<(StoreId, BillboardId)>,
) -> Result<Json<Billboard>, AppError> {
    let route = KIND.route_tag(Operation::Delete);
    guard::entity_id(KIND, billboard_id.as_str())?;
    guard::owned_store(&state, &store_id, &user, route).await?;

    let billboard = state
        .catalog()
        .delete_billboard(&store_id, &billboard_id)
        .await
        .at(route)?;
    Ok(Json(billboard))
}
