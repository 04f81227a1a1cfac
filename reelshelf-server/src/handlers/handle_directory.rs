use axum::{
    extract::{Query, State},
    response::Json,
};
use reelshelf_model::{
    DirContentsQuery, DirectoryListing, DurationsResponse, PathQuery,
};

use crate::infra::{app_state::AppState, errors::AppResult};

/// Media files and folders directly under `path`, optionally filtered.
///
/// Durations are only reported when already cached; clients follow up with
/// [`get_durations`] to fill the gaps.
pub async fn get_dir_contents(
    State(state): State<AppState>,
    Query(query): Query<DirContentsQuery>,
) -> AppResult<Json<DirectoryListing>> {
    let filter = query.filter_request();
    let listing = state
        .library()
        .query_directory(&query.path, filter.as_ref())
        .await?;
    Ok(Json(listing))
}

pub async fn get_durations(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> AppResult<Json<DurationsResponse>> {
    let durations = state
        .library()
        .compute_durations_for_directory(&query.path)
        .await?;
    Ok(Json(durations))
}
