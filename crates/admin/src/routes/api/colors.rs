//! Color API handlers.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::get,
};
use tracing::instrument;

use storedash_core::{ColorId, EntityKind, Operation, StoreId};

use super::guard;
use crate::error::{AppError, RouteContext};
use crate::middleware::RequireCaller;
use crate::models::{Color, ColorInput};
use crate::state::AppState;

const KIND: EntityKind = EntityKind::Color;

/// Build the colors router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/{storeId}/colors", get(list).post(create))
        .route(
            "/api/{storeId}/colors/{colorId}",
            get(show).patch(update).delete(destroy),
        )
}

/// List a store's colors, newest first.
///
/// # Errors
///
/// Returns an internal error if the backend fails.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Path(store_id): Path<StoreId>,
) -> Result<Json<Vec<Color>>, AppError> {
    let colors = state
        .catalog()
        .list_colors(&store_id)
        .await
        .at(KIND.route_tag(Operation::List))?;
    Ok(Json(colors))
}

/// Fetch one color.
///
/// # Errors
///
/// Returns 400 for a blank id, 404 if the color is not in the store.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path((store_id, color_id)): Path<(StoreId, ColorId)>,
) -> Result<Json<Color>, AppError> {
    guard::entity_id(KIND, color_id.as_str())?;
    state
        .catalog()
        .get_color(&store_id, &color_id)
        .await
        .at(KIND.route_tag(Operation::Get))?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// Create a color.
///
/// # Errors
///
/// Returns 403, 400 or 405 per the mutation protocol.
#[instrument(skip(state, body))]
pub async fn create(
    RequireCaller(user): RequireCaller,
    State(state): State<AppState>,
    Path(store_id): Path<StoreId>,
    body: Result<Json<ColorInput>, JsonRejection>,
) -> Result<Json<Color>, AppError> {
    let route = KIND.route_tag(Operation::Create);
    let draft = guard::draft(body)?;
    guard::owned_store(&state, &store_id, &user, route).await?;

    let color = state
        .catalog()
        .create_color(&store_id, &draft)
        .await
        .at(route)?;
    Ok(Json(color))
}

/// Update an unlocked color.
///
/// # Errors
///
/// Returns 403, 400, 405, 409 or 404 per the mutation protocol.
#[instrument(skip(state, body))]
pub async fn update(
    RequireCaller(user): RequireCaller,
    State(state): State<AppState>,
    Path((store_id, color_id)): Path<(StoreId, ColorId)>,
    body: Result<Json<ColorInput>, JsonRejection>,
) -> Result<Json<Color>, AppError> {
    let route = KIND.route_tag(Operation::Update);
    let draft = guard::draft(body)?;
    guard::entity_id(KIND, color_id.as_str())?;
    guard::owned_store(&state, &store_id, &user, route).await?;

    let color = state
        .catalog()
        .update_color(&store_id, &color_id, &draft)
        .await
        .at(route)?;
    Ok(Json(color))
}

/// Delete an unlocked color.
///
/// # Errors
///
/// Returns 403, 400, 405, 409 or 404 per the mutation protocol, and 500
/// while products still use the color.
#[instrument(skip(state))]
pub async fn destroy(
    RequireCaller(user): RequireCaller,
    State(state): State<AppState>,
    Path((store_id, color_id)): Path<(StoreId, ColorId)>,
) -> Result<Json<Color>, AppError> {
    let route = KIND.route_tag(Operation::Delete);
    guard::entity_id(KIND, color_id.as_str())?;
    guard::owned_store(&state, &store_id, &user, route).await?;

    let color = state
        .catalog()
        .delete_color(&store_id, &color_id)
        .await
        .at(route)?;
    Ok(Json(color))
}
