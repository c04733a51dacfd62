use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait, sea_query::Query,
};

use super::{CatalogStore, genre_map};
use crate::{
    entities::{movie, movie_genre, movie_person, review},
    error::{AppError, AppResult},
    models::{Genre, MovieCreate, MovieResponse, MovieRole, MovieSearchRequest, MovieUpdate},
};

/// Hard ceiling on a single bulk create; larger batches are rejected before
/// any row is written.
pub const BULK_MOVIE_LIMIT: usize = 300;

impl CatalogStore {
    pub async fn get_movie(&self, id: i32) -> AppResult<Option<movie::Model>> {
        Ok(movie::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn movie_response(&self, m: movie::Model) -> AppResult<MovieResponse> {
        let mut map = genre_map(&self.db, &[m.id]).await?;
        let genres = map.remove(&m.id).unwrap_or_default();
        Ok(MovieResponse::from_model(m, genres))
    }

    async fn movie_responses(&self, rows: Vec<movie::Model>) -> AppResult<Vec<MovieResponse>> {
        let ids: Vec<i32> = rows.iter().map(|m| m.id).collect();
        let mut map = genre_map(&self.db, &ids).await?;
        Ok(rows
            .into_iter()
            .map(|m| {
                let genres = map.remove(&m.id).unwrap_or_default();
                MovieResponse::from_model(m, genres)
            })
            .collect())
    }

    pub async fn create_movie(&self, req: MovieCreate) -> AppResult<MovieResponse> {
        let genres = normalize_genres(&req.genres)?;

        let txn = self.db.begin().await?;
        let created = insert_movie(&txn, req, &genres).await?;
        txn.commit().await?;

        Ok(created)
    }

    /// Inserts the whole batch atomically. Validation runs over every record
    /// before the first insert, so a bad record rejects the batch untouched.
    pub async fn create_movies_bulk(
        &self,
        reqs: Vec<MovieCreate>,
    ) -> AppResult<Vec<MovieResponse>> {
        if reqs.len() > BULK_MOVIE_LIMIT {
            return Err(AppError::validation(format!(
                "bulk create accepts at most {BULK_MOVIE_LIMIT} movies, got {}",
                reqs.len()
            )));
        }

        let mut prepared = Vec::with_capacity(reqs.len());
        for req in reqs {
            let genres = normalize_genres(&req.genres)?;
            prepared.push((req, genres));
        }

        let txn = self.db.begin().await?;
        let mut created = Vec::with_capacity(prepared.len());
        for (req, genres) in prepared {
            created.push(insert_movie(&txn, req, &genres).await?);
        }
        txn.commit().await?;

        Ok(created)
    }

    /// Merge update: only supplied fields change. Explicit nulls clear
    /// nullable fields; a supplied genre list replaces the whole set.
    pub async fn update_movie(
        &self,
        id: i32,
        patch: MovieUpdate,
    ) -> AppResult<Option<MovieResponse>> {
        let Some(current) = self.get_movie(id).await? else {
            return Ok(None);
        };

        let new_genres = match &patch.genres {
            Some(genres) => Some(normalize_genres(genres)?),
            None => None,
        };

        let mut am: movie::ActiveModel = current.clone().into();
        let mut changed = false;
        if let Some(title) = patch.title {
            am.title = Set(title);
            changed = true;
        }
        if let Some(description) = patch.description {
            am.description = Set(description);
            changed = true;
        }
        if let Some(release_date) = patch.release_date {
            am.release_date = Set(release_date);
            changed = true;
        }
        if let Some(rating) = patch.rating {
            am.rating = Set(rating);
            changed = true;
        }

        if !changed && new_genres.is_none() {
            return Ok(Some(self.movie_response(current).await?));
        }

        let txn = self.db.begin().await?;
        am.updated_at = Set(Utc::now());
        let updated = am.update(&txn).await?;
        if let Some(genres) = &new_genres {
            movie_genre::Entity::delete_many()
                .filter(movie_genre::Column::MovieId.eq(id))
                .exec(&txn)
                .await?;
            insert_genres(&txn, id, genres).await?;
        }
        txn.commit().await?;

        match new_genres {
            Some(genres) => Ok(Some(MovieResponse::from_model(updated, genres))),
            None => Ok(Some(self.movie_response(updated).await?)),
        }
    }

    /// Physical delete; association and review rows go in the same
    /// transaction, with the schema's ON DELETE CASCADE as backstop.
    pub async fn delete_movie(&self, id: i32) -> AppResult<bool> {
        let txn = self.db.begin().await?;

        review::Entity::delete_many()
            .filter(review::Column::MovieId.eq(id))
            .exec(&txn)
            .await?;
        movie_person::Entity::delete_many()
            .filter(movie_person::Column::MovieId.eq(id))
            .exec(&txn)
            .await?;
        movie_genre::Entity::delete_many()
            .filter(movie_genre::Column::MovieId.eq(id))
            .exec(&txn)
            .await?;
        let res = movie::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(res.rows_affected > 0)
    }

    pub async fn list_movies(
        &self,
        skip: u64,
        limit: u64,
    ) -> AppResult<(Vec<MovieResponse>, u64)> {
        let total = movie::Entity::find().count(&self.db).await?;
        let rows = movie::Entity::find()
            .order_by_asc(movie::Column::Id)
            .offset(skip)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok((self.movie_responses(rows).await?, total))
    }

    /// AND across filter categories, OR within each category's value set.
    /// Multi-valued filters are membership subqueries, so the base row set
    /// never contains duplicates and `total` counts distinct movies.
    pub async fn search_movies(
        &self,
        req: &MovieSearchRequest,
        skip: u64,
        limit: u64,
    ) -> AppResult<(Vec<MovieResponse>, u64)> {
        let select = build_movie_search(req)?;
        let total = select.clone().count(&self.db).await?;
        let rows = select
            .order_by_asc(movie::Column::Id)
            .offset(skip)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok((self.movie_responses(rows).await?, total))
    }

    pub async fn update_movie_image(
        &self,
        m: movie::Model,
        image_path: String,
    ) -> AppResult<movie::Model> {
        let mut am: movie::ActiveModel = m.into();
        am.image_path = Set(Some(image_path));
        am.updated_at = Set(Utc::now());
        Ok(am.update(&self.db).await?)
    }
}

async fn insert_movie<C: ConnectionTrait>(
    conn: &C,
    req: MovieCreate,
    genres: &[Genre],
) -> AppResult<MovieResponse> {
    let now = Utc::now();
    let model = movie::ActiveModel {
        id: Default::default(),
        title: Set(req.title),
        description: Set(req.description),
        release_date: Set(req.release_date),
        rating: Set(req.rating),
        image_path: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let created = model.insert(conn).await?;
    insert_genres(conn, created.id, genres).await?;
    Ok(MovieResponse::from_model(created, genres.to_vec()))
}

async fn insert_genres<C: ConnectionTrait>(
    conn: &C,
    movie_id: i32,
    genres: &[Genre],
) -> AppResult<()> {
    let rows = genres.iter().map(|g| movie_genre::ActiveModel {
        movie_id: Set(movie_id),
        genre: Set(g.as_code()),
    });
    movie_genre::Entity::insert_many(rows).exec_without_returning(conn).await?;
    Ok(())
}

/// Input genre lists have set semantics: duplicates collapse, order is the
/// fixed genre code order, and an empty set is invalid.
fn normalize_genres(genres: &[Genre]) -> AppResult<Vec<Genre>> {
    let mut genres = genres.to_vec();
    genres.sort();
    genres.dedup();
    if genres.is_empty() {
        return Err(AppError::validation("a movie requires at least one genre"));
    }
    Ok(genres)
}

fn build_movie_search(req: &MovieSearchRequest) -> AppResult<Select<movie::Entity>> {
    let mut select = movie::Entity::find();

    if let Some(term) = req.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        select = select.filter(
            Condition::any()
                .add(movie::Column::Title.contains(term))
                .add(movie::Column::Description.contains(term)),
        );
    }

    if let Some(genres) = req.genres.as_deref().filter(|g| !g.is_empty()) {
        let codes: Vec<i32> = genres.iter().map(|g| g.as_code()).collect();
        let tagged = Query::select()
            .column(movie_genre::Column::MovieId)
            .from(movie_genre::Entity)
            .and_where(movie_genre::Column::Genre.is_in(codes))
            .to_owned();
        select = select.filter(movie::Column::Id.in_subquery(tagged));
    }

    if let Some(director_id) = req.director_id {
        let directed = Query::select()
            .column(movie_person::Column::MovieId)
            .from(movie_person::Entity)
            .and_where(movie_person::Column::Role.eq(MovieRole::Director.as_str()))
            .and_where(movie_person::Column::PersonId.eq(director_id))
            .to_owned();
        select = select.filter(movie::Column::Id.in_subquery(directed));
    }

    if let Some(actor_ids) = req.actor_ids.as_deref().filter(|a| !a.is_empty()) {
        let acted = Query::select()
            .column(movie_person::Column::MovieId)
            .from(movie_person::Entity)
            .and_where(movie_person::Column::Role.eq(MovieRole::Actor.as_str()))
            .and_where(movie_person::Column::PersonId.is_in(actor_ids.to_vec()))
            .to_owned();
        select = select.filter(movie::Column::Id.in_subquery(acted));
    }

    let (start, end) = year_bounds(req)?;
    if let Some(start) = start {
        select = select.filter(movie::Column::ReleaseDate.gte(start));
    }
    if let Some(end) = end {
        select = select.filter(movie::Column::ReleaseDate.lte(end));
    }

    Ok(select)
}

/// `release_year` is shorthand for start_year = end_year = year; mixing it
/// with either bound is ambiguous and rejected.
fn year_bounds(req: &MovieSearchRequest) -> AppResult<(Option<NaiveDate>, Option<NaiveDate>)> {
    let (start_year, end_year) = match req.release_year {
        Some(year) => {
            if req.start_year.is_some() || req.end_year.is_some() {
                return Err(AppError::validation(
                    "release_year cannot be combined with start_year/end_year",
                ));
            }
            (Some(year), Some(year))
        },
        None => (req.start_year, req.end_year),
    };

    let start = match start_year {
        Some(y) => Some(
            NaiveDate::from_ymd_opt(y, 1, 1)
                .ok_or_else(|| AppError::validation(format!("start_year {y} is out of range")))?,
        ),
        None => None,
    };
    let end = match end_year {
        Some(y) => Some(
            NaiveDate::from_ymd_opt(y, 12, 31)
                .ok_or_else(|| AppError::validation(format!("end_year {y} is out of range")))?,
        ),
        None => None,
    };
    Ok((start, end))
}
