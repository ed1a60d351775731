//! Store management handlers.
//!
//! Every route requires a caller; a store owned by someone else answers 405
//! exactly like a missing one.
//!
//! `/api/stores` shares its first segment with `/api/{storeId}/...`, so the
//! id `stores` ([`StoreId::RESERVED`]) is refused by the schema and by
//! fixture seeding. Generated ids are UUIDs and never collide.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::get,
};
use tracing::{info, instrument};

use storedash_core::StoreId;

use super::guard;
use crate::error::{AppError, RouteContext};
use crate::middleware::RequireCaller;
use crate::models::{Store, StoreInput};
use crate::state::AppState;

/// Build the stores router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/stores", get(list).post(create))
        .route(
            "/api/stores/{storeId}",
            get(show).patch(rename).delete(destroy),
        )
}

/// List the caller's stores.
///
/// # Errors
///
/// Returns 403 without a caller.
#[instrument(skip(state))]
pub async fn list(
    RequireCaller(user): RequireCaller,
    State(state): State<AppState>,
) -> Result<Json<Vec<Store>>, AppError> {
    let stores = state.catalog().list_stores(&user).await.at("STORES_GET")?;
    Ok(Json(stores))
}

/// Create a store owned by the caller.
///
/// # Errors
///
/// Returns 403 without a caller, 400 without a name.
#[instrument(skip(state, body))]
pub async fn create(
    RequireCaller(user): RequireCaller,
    State(state): State<AppState>,
    body: Result<Json<StoreInput>, JsonRejection>,
) -> Result<Json<Store>, AppError> {
    let draft = guard::draft(body)?;
    let store = state
        .catalog()
        .create_store(&user, &draft)
        .await
        .at("STORES_POST")?;

    info!(store_id = %store.id, user_id = %user, "store created");
    Ok(Json(store))
}

/// Fetch one of the caller's stores.
///
/// # Errors
///
/// Returns 403 without a caller, 405 if the caller does not own it.
#[instrument(skip(state))]
pub async fn show(
    RequireCaller(user): RequireCaller,
    State(state): State<AppState>,
    Path(store_id): Path<StoreId>,
) -> Result<Json<Store>, AppError> {
    let store = guard::owned_store(&state, &store_id, &user, "STORE_GET").await?;
    Ok(Json(store))
}

/// Rename one of the caller's stores.
///
/// # Errors
///
/// Returns 403, 400 or 405.
#[instrument(skip(state, body))]
pub async fn rename(
    RequireCaller(user): RequireCaller,
    State(state): State<AppState>,
    Path(store_id): Path<StoreId>,
    body: Result<Json<StoreInput>, JsonRejection>,
) -> Result<Json<Store>, AppError> {
    let draft = guard::draft(body)?;
    guard::owned_store(&state, &store_id, &user, "STORE_PATCH").await?;

    let store = state
        .catalog()
        .rename_store(&store_id, &draft)
        .await
        .at("STORE_PATCH")?;
    Ok(Json(store))
}

/// Delete one of the caller's stores.
///
/// # Errors
///
/// Returns 403 or 405, and 500 while catalog rows still belong to the store.
#[instrument(skip(state))]
pub async fn destroy(
    RequireCaller(user): RequireCaller,
    State(state): State<AppState>,
    Path(store_id): Path<StoreId>,
) -> Result<Json<Store>, AppError> {
    guard::owned_store(&state, &store_id, &user, "STORE_DELETE").await?;

    let store = state
        .catalog()
        .delete_store(&store_id)
        .await
        .at("STORE_DELETE")?;

    info!(store_id = %store.id, user_id = %user, "store deleted");
    Ok(Json(store))
}
