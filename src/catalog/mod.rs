mod credits;
mod movies;
mod persons;
mod reviews;

use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    TransactionTrait,
};

use crate::{
    entities::{movie, movie_genre, movie_person, person, review},
    error::AppResult,
    models::Genre,
};

pub use movies::BULK_MOVIE_LIMIT;
pub use reviews::ReviewListing;

/// Handle over the relational store. All mutating operations run inside a
/// single transaction; constraint violations at commit roll the whole
/// mutation back and surface as conflicts.
#[derive(Clone)]
pub struct CatalogStore {
    db: DatabaseConnection,
}

impl CatalogStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn stats(&self) -> AppResult<(u64, u64)> {
        let movies = movie::Entity::find().count(&self.db).await?;
        let persons = person::Entity::find().count(&self.db).await?;
        Ok((movies, persons))
    }

    /// Removes every catalog row, dependents first.
    pub async fn clean(&self) -> AppResult<()> {
        let txn = self.db.begin().await?;

        review::Entity::delete_many().exec(&txn).await?;
        movie_person::Entity::delete_many().exec(&txn).await?;
        movie_genre::Entity::delete_many().exec(&txn).await?;
        movie::Entity::delete_many().exec(&txn).await?;
        person::Entity::delete_many().exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }
}

/// Genre tags for a set of movies, one query. Unknown codes are skipped;
/// rows can only be written through the enum.
pub(crate) async fn genre_map<C: ConnectionTrait>(
    conn: &C,
    movie_ids: &[i32],
) -> AppResult<HashMap<i32, Vec<Genre>>> {
    if movie_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = movie_genre::Entity::find()
        .filter(movie_genre::Column::MovieId.is_in(movie_ids.to_vec()))
        .all(conn)
        .await?;

    let mut map: HashMap<i32, Vec<Genre>> = HashMap::new();
    for row in rows {
        let Some(genre) = Genre::from_code(row.genre) else {
            continue;
        };
        map.entry(row.movie_id).or_default().push(genre);
    }
    for genres in map.values_mut() {
        genres.sort();
    }
    Ok(map)
}
