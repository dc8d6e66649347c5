//! HTTP surface for Jotbox.
//! Translates requests into `jotbox_core` service calls; no domain rules
//! live here.

pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod state;

pub use config::ServeArgs;
pub use error::ApiError;
pub use state::AppState;

use axum::routing::{get, post, put};
use axum::Router;
use tower_cookies::CookieManagerLayer;

/// Builds the application router over `state`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/register", post(api::register))
        .route("/api/register", post(api::register))
        .route("/", get(api::home))
        .route("/login", get(api::login_page).post(api::login))
        .route("/api/login", post(api::login))
        .route("/logout", get(api::logout))
        .route("/api/notes", get(api::list_notes).post(api::create_note))
        .route("/api/notes/current", get(api::current_note))
        .route(
            "/api/notes/{id}",
            put(api::update_note).delete(api::delete_note),
        )
        .route("/api/notes/{id}/set-current", post(api::set_current_note))
        .route("/health", get(api::health))
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
