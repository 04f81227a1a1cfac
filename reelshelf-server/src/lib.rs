//! # Reelshelf Server
//!
//! HTTP front for the reelshelf media browser: directory listings with fuzzy
//! filtering, batched duration probing and watch progress, all served from a
//! single media root.

pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(routes::create_api_router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
