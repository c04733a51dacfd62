use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::warn;

use super::{PageQuery, page_window};
use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{
        CreditCreate, CreditResponse, MovieCreate, MovieResponse, MovieRole, MovieSearchRequest,
        MovieUpdate, Page,
    },
    storage::validate_upload,
};

pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Page<MovieResponse>>> {
    let (skip, limit) = page_window(page.skip, page.limit)?;
    let (items, total) = state.catalog.list_movies(skip, limit).await?;
    Ok(Json(Page { items, total, skip, limit }))
}

pub async fn search_movies(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MovieSearchRequest>,
) -> AppResult<Json<Page<MovieResponse>>> {
    let (skip, limit) = page_window(req.skip, req.limit)?;
    let (items, total) = state.catalog.search_movies(&req, skip, limit).await?;
    Ok(Json(Page { items, total, skip, limit }))
}

pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<MovieResponse>> {
    let movie =
        state.catalog.get_movie(id).await?.ok_or_else(|| AppError::not_found("Movie"))?;
    Ok(Json(state.catalog.movie_response(movie).await?))
}

pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MovieCreate>,
) -> AppResult<(StatusCode, Json<MovieResponse>)> {
    let created = state.catalog.create_movie(req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn create_movies_bulk(
    State(state): State<Arc<AppState>>,
    Json(reqs): Json<Vec<MovieCreate>>,
) -> AppResult<(StatusCode, Json<Vec<MovieResponse>>)> {
    let created = state.catalog.create_movies_bulk(reqs).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(patch): Json<MovieUpdate>,
) -> AppResult<Json<MovieResponse>> {
    let updated = state
        .catalog
        .update_movie(id, patch)
        .await?
        .ok_or_else(|| AppError::not_found("Movie"))?;
    Ok(Json(updated))
}

pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    if !state.catalog.delete_movie(id).await? {
        return Err(AppError::not_found("Movie"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn movie_credits(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<CreditResponse>>> {
    let credits =
        state.catalog.movie_credits(id).await?.ok_or_else(|| AppError::not_found("Movie"))?;
    Ok(Json(credits))
}

pub async fn add_movie_persons(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(batch): Json<Vec<CreditCreate>>,
) -> AppResult<(StatusCode, Json<Vec<CreditResponse>>)> {
    let created = state.catalog.add_credits(id, batch).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
pub struct RemoveCreditQuery {
    #[serde(default)]
    role: Option<String>,
}

pub async fn remove_movie_person(
    State(state): State<Arc<AppState>>,
    Path((id, person_id)): Path<(i32, i32)>,
    Query(q): Query<RemoveCreditQuery>,
) -> AppResult<StatusCode> {
    let role = match q.role.as_deref() {
        Some(name) => Some(
            MovieRole::from_name(name)
                .ok_or_else(|| AppError::validation(format!("{name} is not a valid role")))?,
        ),
        None => None,
    };

    if !state.catalog.remove_credits(id, person_id, role).await? {
        return Err(AppError::not_found("Association"));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> AppResult<Json<MovieResponse>> {
    let movie =
        state.catalog.get_movie(id).await?.ok_or_else(|| AppError::not_found("Movie"))?;

    let mut upload: Option<(String, String, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::validation(format!("malformed multipart body: {err}")))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(|err| {
                AppError::validation(format!("failed to read uploaded file: {err}"))
            })?;
            upload = Some((filename, content_type, bytes));
        }
    }

    let (filename, content_type, bytes) =
        upload.ok_or_else(|| AppError::validation("multipart field 'file' is required"))?;
    validate_upload(&content_type, bytes.len())?;

    // Replace semantics: old asset goes first, best-effort.
    if let Some(old) = &movie.image_path {
        if !state.images.delete(old).await {
            warn!(movie_id = id, path = %old, "failed to delete previous image");
        }
    }

    let stored = state.images.save(&bytes, &filename, &content_type).await?;
    let updated = state.catalog.update_movie_image(movie, stored).await?;
    Ok(Json(state.catalog.movie_response(updated).await?))
}
