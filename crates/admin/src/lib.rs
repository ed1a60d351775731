//! Storedash catalog admin library.
//!
//! The catalog API server, its persistence backends, and the dashboard-side
//! client and form state machines, exposed as a library so the binary, the
//! CLI and the integration tests share one implementation.
//!
//! # Modules
//!
//! - [`routes`] - axum handlers and the lock-guarded mutation protocol
//! - [`db`] - `CatalogStore` trait with PostgreSQL and in-memory backends
//! - [`client`] - typed reqwest client for the catalog API
//! - [`forms`] - per-form submit/delete state machines

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::app;
pub use state::AppState;
