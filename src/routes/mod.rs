mod admin;
mod movies;
mod persons;
mod reviews;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::default_limit,
    storage::MAX_IMAGE_BYTES,
};

/// Body limit leaves headroom over the image ceiling so an oversized upload
/// reaches the validator and gets a proper 422 instead of a transport error.
const BODY_LIMIT: usize = MAX_IMAGE_BYTES + 2 * 1024 * 1024;

pub fn router(state: Arc<AppState>) -> Router {
    let upload_dir = state.config.upload_dir.clone();

    Router::new()
        .route("/health", get(health))
        .route("/movies", get(movies::list_movies).post(movies::create_movie))
        .route("/movies/bulk", post(movies::create_movies_bulk))
        .route("/movies/search", post(movies::search_movies))
        .route(
            "/movies/{id}",
            get(movies::get_movie).patch(movies::update_movie).delete(movies::delete_movie),
        )
        .route(
            "/movies/{id}/persons",
            get(movies::movie_credits).post(movies::add_movie_persons),
        )
        .route("/movies/{id}/persons/{person_id}", delete(movies::remove_movie_person))
        .route("/movies/{id}/upload-image", post(movies::upload_image))
        .route(
            "/movies/{id}/reviews",
            get(reviews::list_reviews).post(reviews::create_review),
        )
        .route("/movies/{id}/reviews/{review_id}", delete(reviews::delete_review))
        .route("/persons", get(persons::list_persons).post(persons::create_person))
        .route("/persons/search", post(persons::search_persons))
        .route(
            "/persons/{id}",
            get(persons::get_person).patch(persons::update_person).delete(persons::delete_person),
        )
        .route("/persons/{id}/movies", get(persons::person_movies))
        .route("/admin/stats", get(admin::stats))
        .route("/admin/db/clean", post(admin::db_clean))
        .route("/admin/db/seed", post(admin::db_seed))
        .route("/admin/db/reset", post(admin::db_reset))
        .nest_service("/static/uploads", ServeDir::new(upload_dir))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

pub(crate) fn page_window(skip: i64, limit: i64) -> AppResult<(u64, u64)> {
    if skip < 0 {
        return Err(AppError::validation("skip must be non-negative"));
    }
    if !(1..=100).contains(&limit) {
        return Err(AppError::validation("limit must be between 1 and 100"));
    }
    Ok((skip as u64, limit as u64))
}
