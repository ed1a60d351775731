//! JSON API route handlers.
//!
//! One module per catalog entity plus store management. All of them share
//! the checks in [`guard`].

pub mod billboards;
pub mod categories;
pub mod colors;
pub mod guard;
pub mod products;
pub mod sizes;
pub mod stores;
pub mod subcategories;

#[cfg(test)]
mod tests;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(stores::router())
        .merge(billboards::router())
        .merge(categories::router())
        .merge(subcategories::router())
        .merge(sizes::router())
        .merge(colors::router())
        .merge(products::router())
}
