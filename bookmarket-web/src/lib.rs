//! Bookmarket Web Server
//!
//! Server-rendered marketplace: registration and login, a filterable book
//! catalog, listing management for sellers, and direct messages.

pub mod auth;
pub mod database;
pub mod error;
pub mod flash;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;
pub mod templates;

// Re-export main types
pub use error::PageError;
pub use server::BookmarketServer;
pub use state::AppState;

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::trace::TraceLayer;

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let static_dir = state.config.server.static_dir.clone();

    Router::new()
        .merge(routes::page_routes())
        .merge(routes::static_routes(&static_dir))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1MB, forms only
        .with_state(state)
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Market(#[from] bookmarket_core::MarketError),
}

impl From<sqlx::Error> for WebError {
    fn from(err: sqlx::Error) -> Self {
        WebError::Database(err.to_string())
    }
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;
