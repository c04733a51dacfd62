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
    models::{
        Page, PersonCreate, PersonMovieResponse, PersonResponse, PersonSearchRequest,
        PersonUpdate,
    },
};

pub async fn list_persons(
    State(state): State<Arc<AppState>>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Page<PersonResponse>>> {
    let (skip, limit) = page_window(page.skip, page.limit)?;
    let (items, total) = state.catalog.list_persons(skip, limit).await?;
    Ok(Json(Page { items, total, skip, limit }))
}

pub async fn search_persons(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PersonSearchRequest>,
) -> AppResult<Json<Page<PersonResponse>>> {
    let (skip, limit) = page_window(req.skip, req.limit)?;
    let (items, total) = state.catalog.search_persons(&req, skip, limit).await?;
    Ok(Json(Page { items, total, skip, limit }))
}

pub async fn get_person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<PersonResponse>> {
    let person =
        state.catalog.get_person(id).await?.ok_or_else(|| AppError::not_found("Person"))?;
    Ok(Json(PersonResponse::from_model(person, None)))
}

pub async fn person_movies(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<PersonMovieResponse>>> {
    let movies =
        state.catalog.person_movies(id).await?.ok_or_else(|| AppError::not_found("Person"))?;
    Ok(Json(movies))
}

pub async fn create_person(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PersonCreate>,
) -> AppResult<(StatusCode, Json<PersonResponse>)> {
    let created = state.catalog.create_person(req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(patch): Json<PersonUpdate>,
) -> AppResult<Json<PersonResponse>> {
    let updated = state
        .catalog
        .update_person(id, patch)
        .await?
        .ok_or_else(|| AppError::not_found("Person"))?;
    Ok(Json(updated))
}

pub async fn delete_person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    if !state.catalog.delete_person(id).await? {
        return Err(AppError::not_found("Person"));
    }
    Ok(StatusCode::NO_CONTENT)
}
