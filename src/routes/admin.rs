use std::sync::Arc;

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::{AppState, error::AppResult, seed};

pub async fn stats(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let (total_movies, total_persons) = state.catalog.stats().await?;
    Ok(Json(json!({
        "total_movies": total_movies,
        "total_professionals": total_persons,
    })))
}

pub async fn db_clean(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    state.catalog.clean().await?;
    Ok(Json(json!({
        "status": "ok",
        "message": "Database cleaned (all movies and persons removed).",
    })))
}

pub async fn db_seed(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    if seed::run_seed(&state.catalog).await? {
        Ok(Json(json!({
            "status": "ok",
            "message": "Database seeded from embedded fixture.",
        })))
    } else {
        Ok(Json(json!({
            "status": "skipped",
            "message": "Database already has data.",
        })))
    }
}

pub async fn db_reset(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    state.catalog.clean().await?;
    let seeded = seed::run_seed(&state.catalog).await?;
    let message = if seeded {
        "Database reset: cleaned and seeded."
    } else {
        "Database reset: cleaned (seed skipped)."
    };
    Ok(Json(json!({ "status": "ok", "message": message })))
}
