pub mod catalog;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod models;
pub mod routes;
pub mod seed;
pub mod storage;

use std::sync::Arc;

use crate::{catalog::CatalogStore, config::Config, storage::ImageStorage};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: CatalogStore,
    pub images: Arc<dyn ImageStorage>,
}
