//! Lock-guarded mutation protocol.
//!
//! Every catalog mutation runs the same checks, in this order:
//!
//! 1. caller identity ([`RequireCaller`](crate::middleware::RequireCaller)), else 403
//! 2. request body parses and validates ([`draft`]), else 400 with the field message
//! 3. entity id path parameter is present ([`entity_id`]), else 400
//! 4. the path store exists and belongs to the caller ([`owned_store`]), else 405
//! 5. the backend's conditional write, which refuses locked rows (409) and
//!    rows outside the store (404)
//!
//! Anything else becomes a 500 tagged with the route name.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use tracing::{debug, warn};

use storedash_core::{EntityKind, StoreId, UserId};

use crate::error::{AppError, RouteContext};
use crate::models::{Store, Validate};
use crate::state::AppState;

/// Response body for a request that is not valid JSON.
pub const INVALID_BODY: &str = "Invalid request body";

/// Parse and validate a request body into a draft.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for unparseable JSON or the first missing field.
pub fn draft<I: Validate>(body: Result<Json<I>, JsonRejection>) -> Result<I::Draft, AppError> {
    let Json(input) = body.map_err(|rejection| {
        debug!(error = %rejection, "rejected request body");
        AppError::BadRequest(INVALID_BODY)
    })?;
    Ok(input.validate()?)
}

/// Require a non-blank entity id path parameter.
///
/// # Errors
///
/// Returns `AppError::BadRequest` naming the entity id.
pub fn entity_id(kind: EntityKind, id: &str) -> Result<(), AppError> {
    if id.trim().is_empty() {
        return Err(AppError::BadRequest(kind.id_required_message()));
    }
    Ok(())
}

/// Load the path store and require the caller to own it.
///
/// A missing store answers the same as someone else's store.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` if the store is missing or owned by
/// another user, or an internal error tagged with `route`.
pub async fn owned_store(
    state: &AppState,
    store_id: &StoreId,
    user: &UserId,
    route: &'static str,
) -> Result<Store, AppError> {
    match state.catalog().find_store(store_id).await.at(route)? {
        Some(store) if store.is_owned_by(user) => Ok(store),
        Some(_) => {
            warn!(route, store_id = %store_id, user_id = %user, "caller does not own store");
            Err(AppError::Unauthorized)
        }
        None => Err(AppError::Unauthorized),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use secrecy::SecretString;

    use crate::db::MemoryCatalogStore;
    use crate::models::ColorInput;
    use crate::services::auth::TokenVerifier;

    async fn state() -> AppState {
        let db = MemoryCatalogStore::new();
        db.seed_store("store1", "user1", "Main").await.unwrap();
        AppState::new(
            Arc::new(db),
            TokenVerifier::new(SecretString::from("k3Jx9!qLw2@ZpR7#vN5$tB8&mC4^yH6*")),
        )
    }

    #[test]
    fn test_draft_reports_first_missing_field() {
        let body = Ok(Json(ColorInput {
            name: Some("Red".into()),
            ..ColorInput::default()
        }));
        let err = draft(body).unwrap_err();
        assert!(matches!(err, AppError::BadRequest("Value is required")));
    }

    #[test]
    fn test_entity_id_rejects_blank() {
        let err = entity_id(EntityKind::Size, " ").unwrap_err();
        assert!(matches!(err, AppError::BadRequest("Size id is required")));
        assert!(entity_id(EntityKind::Size, "size1").is_ok());
    }

    #[tokio::test]
    async fn test_owned_store() {
        let state = state().await;
        let store = StoreId::new("store1");

        let owned = owned_store(&state, &store, &UserId::new("user1"), "TEST")
            .await
            .unwrap();
        assert_eq!(owned.name, "Main");

        let err = owned_store(&state, &store, &UserId::new("user2"), "TEST")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));

        let err = owned_store(&state, &StoreId::new("nope"), &UserId::new("user1"), "TEST")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }
}
