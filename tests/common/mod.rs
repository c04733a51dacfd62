use cinedex::{
    catalog::CatalogStore,
    models::{Genre, MovieCreate, PersonCreate},
};
use migration::Migrator;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;

/// Fresh in-memory catalog with the schema applied. A single pooled
/// connection keeps every query on the same in-memory database.
pub async fn setup() -> CatalogStore {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1);

    let db = Database::connect(opts).await.expect("connecting to in-memory sqlite");
    Migrator::up(&db, None).await.expect("running migrations");
    CatalogStore::new(db)
}

pub fn movie(title: &str, genres: &[Genre]) -> MovieCreate {
    MovieCreate {
        title: title.to_string(),
        description: None,
        release_date: None,
        genres: genres.to_vec(),
        rating: None,
    }
}

pub fn person(name: &str, email: &str) -> PersonCreate {
    PersonCreate { name: name.to_string(), email: email.to_string() }
}
