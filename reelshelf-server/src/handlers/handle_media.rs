use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use reelshelf_model::{MediaEntry, PathQuery, ProgressUpdate};

use crate::infra::{app_state::AppState, errors::AppResult};

pub async fn get_media_info(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> AppResult<Json<MediaEntry>> {
    let entry = state.library().media_info(&query.path).await?;
    Ok(Json(entry))
}

pub async fn update_progress(
    State(state): State<AppState>,
    Query(update): Query<ProgressUpdate>,
) -> AppResult<StatusCode> {
    state
        .library()
        .update_progress(&update.path, update.progress)
        .await?;
    Ok(StatusCode::OK)
}
