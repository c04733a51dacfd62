use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use super::{PageQuery, page_window};
use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{ReviewCreate, ReviewPage, ReviewResponse},
};

pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<ReviewPage>> {
    let (skip, limit) = page_window(page.skip, page.limit)?;
    let listing = state
        .catalog
        .list_reviews(id, skip, limit)
        .await?
        .ok_or_else(|| AppError::not_found("Movie"))?;
    Ok(Json(ReviewPage {
        items: listing.items,
        total: listing.total,
        skip,
        limit,
        average_rating: listing.average_rating,
    }))
}

pub async fn create_review(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(req): Json<ReviewCreate>,
) -> AppResult<(StatusCode, Json<ReviewResponse>)> {
    let created = state
        .catalog
        .create_review(id, req)
        .await?
        .ok_or_else(|| AppError::not_found("Movie"))?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete_review(
    State(state): State<Arc<AppState>>,
    Path((id, review_id)): Path<(i32, i32)>,
) -> AppResult<StatusCode> {
    if !state.catalog.delete_review(id, review_id).await? {
        return Err(AppError::not_found("Review"));
    }
    Ok(StatusCode::NO_CONTENT)
}
