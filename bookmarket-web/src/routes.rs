//! Route definitions for the Bookmarket web server

use crate::{auth, handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

/// Create page routes
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::home))
        // Accounts
        .route(
            "/register",
            get(auth::handlers::register_form).post(auth::handlers::register),
        )
        .route(
            "/login",
            get(auth::handlers::login_form).post(auth::handlers::login),
        )
        .route("/logout", get(auth::handlers::logout))
        // Catalog and listings
        .route("/books", get(handlers::books::catalog))
        .route(
            "/books/add",
            get(handlers::books::add_form).post(handlers::books::add),
        )
        .route(
            "/books/edit/{id}",
            get(handlers::books::edit_form).post(handlers::books::edit),
        )
        .route("/books/delete/{id}", post(handlers::books::delete))
        // Messaging
        .route(
            "/messages/{user_id}",
            get(handlers::messages::conversation).post(handlers::messages::send),
        )
        // Profile
        .route("/profile", get(handlers::profile::show))
        .route(
            "/profile/edit",
            get(handlers::profile::edit_form).post(handlers::profile::edit),
        )
        .route("/health", get(handlers::health::health_check))
}

/// Create static file routes
pub fn static_routes(static_dir: &str) -> Router<AppState> {
    Router::new().nest_service("/static", ServeDir::new(static_dir))
}
