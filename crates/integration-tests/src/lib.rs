//! Integration test harness for Storedash.
//!
//! Each test gets its own catalog API server on an ephemeral port, backed
//! by the in-memory catalog store, and talks to it over real HTTP.
//!
//! ```rust,ignore
//! let server = TestServer::start().await;
//! let client = server.client_for("user1");
//! let colors: Vec<Color> = client.list(EntityKind::Color, &store).await?;
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use rust_decimal::Decimal;
use secrecy::SecretString;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use storedash_admin::client::CatalogClient;
use storedash_admin::db::MemoryCatalogStore;
use storedash_admin::services::TokenVerifier;
use storedash_admin::{AppState, app};
use storedash_core::{Price, UserId};

const TEST_SECRET: &str = "k3Jx9!qLw2@ZpR7#vN5$tB8&mC4^yH6*";

/// A running catalog API server.
pub struct TestServer {
    pub db: Arc<MemoryCatalogStore>,
    addr: SocketAddr,
    tokens: TokenVerifier,
    task: JoinHandle<()>,
}

impl TestServer {
    /// Start a server seeded with the standard fixture.
    ///
    /// `store1` is owned by `user1` and `store2` by `user2`. In `store1`,
    /// billboard `bb1` and product `prod2` are locked; everything else is
    /// unlocked. `cat1` uses `bb2`; `sub1` belongs to `cat1`; both products
    /// use `cat1`/`sub1`.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot bind.
    pub async fn start() -> Self {
        let db = Arc::new(MemoryCatalogStore::new());
        seed(&db).await;
        Self::with_store(db).await
    }

    /// Start a server over an existing in-memory store.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot bind.
    pub async fn with_store(db: Arc<MemoryCatalogStore>) -> Self {
        let tokens = TokenVerifier::new(SecretString::from(TEST_SECRET));
        let state = AppState::new(db.clone(), tokens.clone());
        let router = app(state, &[]);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("failed to bind test listener: {e}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|e| panic!("failed to read local address: {e}"));

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                panic!("test server failed: {e}");
            }
        });

        Self {
            db,
            addr,
            tokens,
            task,
        }
    }

    /// Base URL, e.g. `http://127.0.0.1:49152`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A signed bearer token for `user`.
    ///
    /// # Panics
    ///
    /// Panics if the user id cannot be signed.
    #[must_use]
    pub fn token(&self, user: &str) -> SecretString {
        let token = self
            .tokens
            .issue(&UserId::new(user))
            .unwrap_or_else(|e| panic!("failed to issue token: {e}"));
        SecretString::from(token)
    }

    /// A client calling as `user`.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client_for(&self, user: &str) -> CatalogClient {
        CatalogClient::new(&self.base_url(), Some(&self.token(user)))
            .unwrap_or_else(|e| panic!("failed to build client: {e}"))
    }

    /// A client with no caller identity.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn anonymous_client(&self) -> CatalogClient {
        CatalogClient::new(&self.base_url(), None)
            .unwrap_or_else(|e| panic!("failed to build client: {e}"))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn seed(db: &MemoryCatalogStore) {
    for (id, owner, name) in [("store1", "user1", "Main"), ("store2", "user2", "Other")] {
        db.seed_store(id, owner, name)
            .await
            .unwrap_or_else(|e| panic!("fixture store rejected: {e}"));
    }
    db.seed_billboard("store1", "bb1", true).await;
    db.seed_billboard("store1", "bb2", false).await;
    db.seed_category("store1", "cat1", "bb2", false).await;
    db.seed_subcategory("store1", "sub1", "cat1", false).await;
    db.seed_size("store1", "size1", false).await;
    db.seed_color("store1", "color1", false).await;
    db.seed_color("store2", "color9", false).await;

    for (id, cents, locked) in [("prod1", 1999, false), ("prod2", 500, true)] {
        let price = Price::new(Decimal::new(cents, 2))
            .unwrap_or_else(|e| panic!("fixture price rejected: {e}"));
        db.seed_product("store1", id, ("cat1", "sub1"), price, locked)
            .await;
    }
}
