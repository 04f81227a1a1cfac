use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    AppState,
    handlers::{handle_directory, handle_media},
};

/// Create the API router
pub fn create_api_router() -> Router<AppState> {
    Router::new().nest(
        "/api",
        Router::new()
            .route("/dir-contents", get(handle_directory::get_dir_contents))
            .route(
                "/dir-contents/durations",
                get(handle_directory::get_durations),
            )
            .route("/media-info", get(handle_media::get_media_info))
            .route("/update-progress", post(handle_media::update_progress)),
    )
}
