//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::CatalogStore;
use crate::services::auth::TokenVerifier;

/// Application state shared across all handlers.
///
/// Cheap to clone; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    catalog: Arc<dyn CatalogStore>,
    tokens: TokenVerifier,
}

impl AppState {
    /// Build state from a catalog backend and the caller token verifier.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogStore>, tokens: TokenVerifier) -> Self {
        Self {
            inner: Arc::new(AppStateInner { catalog, tokens }),
        }
    }

    /// The catalog repository.
    #[must_use]
    pub fn catalog(&self) -> &dyn CatalogStore {
        self.inner.catalog.as_ref()
    }

    /// The caller token verifier.
    #[must_use]
    pub fn tokens(&self) -> &TokenVerifier {
        &self.inner.tokens
    }
}
