use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait, sea_query::Query,
};

use super::{CatalogStore, genre_map};
use crate::{
    entities::{movie, movie_genre, movie_person, person},
    error::{AppResult, conflict_on_unique},
    models::{
        MovieRole, PersonCreate, PersonMovieResponse, PersonResponse, PersonSearchRequest,
        PersonUpdate,
    },
};

const EMAIL_TAKEN: &str = "A person with this email already exists.";

impl CatalogStore {
    pub async fn get_person(&self, id: i32) -> AppResult<Option<person::Model>> {
        Ok(person::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn create_person(&self, req: PersonCreate) -> AppResult<PersonResponse> {
        let now = Utc::now();
        let model = person::ActiveModel {
            id: Default::default(),
            name: Set(req.name),
            email: Set(req.email),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = model
            .insert(&self.db)
            .await
            .map_err(|err| conflict_on_unique(err, EMAIL_TAKEN))?;
        Ok(PersonResponse::from_model(created, None))
    }

    pub async fn update_person(
        &self,
        id: i32,
        patch: PersonUpdate,
    ) -> AppResult<Option<PersonResponse>> {
        let Some(current) = self.get_person(id).await? else {
            return Ok(None);
        };

        if patch.name.is_none() && patch.email.is_none() {
            return Ok(Some(PersonResponse::from_model(current, None)));
        }

        let mut am: person::ActiveModel = current.into();
        if let Some(name) = patch.name {
            am.name = Set(name);
        }
        if let Some(email) = patch.email {
            am.email = Set(email);
        }
        am.updated_at = Set(Utc::now());

        let updated = am
            .update(&self.db)
            .await
            .map_err(|err| conflict_on_unique(err, EMAIL_TAKEN))?;
        Ok(Some(PersonResponse::from_model(updated, None)))
    }

    pub async fn delete_person(&self, id: i32) -> AppResult<bool> {
        let txn = self.db.begin().await?;

        movie_person::Entity::delete_many()
            .filter(movie_person::Column::PersonId.eq(id))
            .exec(&txn)
            .await?;
        let res = person::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(res.rows_affected > 0)
    }

    pub async fn list_persons(
        &self,
        skip: u64,
        limit: u64,
    ) -> AppResult<(Vec<PersonResponse>, u64)> {
        let total = person::Entity::find().count(&self.db).await?;
        let rows = person::Entity::find()
            .order_by_asc(person::Column::Id)
            .offset(skip)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok((self.with_movie_counts(rows).await?, total))
    }

    /// Same AND/OR discipline as the movie search. Every category is a
    /// membership predicate over the person, so `total` counts distinct
    /// persons without a DISTINCT pass.
    pub async fn search_persons(
        &self,
        req: &PersonSearchRequest,
        skip: u64,
        limit: u64,
    ) -> AppResult<(Vec<PersonResponse>, u64)> {
        let select = build_person_search(req);
        let total = select.clone().count(&self.db).await?;
        let rows = select
            .order_by_asc(person::Column::Id)
            .offset(skip)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok((self.with_movie_counts(rows).await?, total))
    }

    /// Every movie the person is credited on, with role and genre tags,
    /// ordered by role then title.
    pub async fn person_movies(
        &self,
        person_id: i32,
    ) -> AppResult<Option<Vec<PersonMovieResponse>>> {
        if self.get_person(person_id).await?.is_none() {
            return Ok(None);
        }

        let rows = movie_person::Entity::find()
            .filter(movie_person::Column::PersonId.eq(person_id))
            .find_also_related(movie::Entity)
            .order_by_asc(movie_person::Column::Role)
            .order_by_asc(movie::Column::Title)
            .all(&self.db)
            .await?;

        let movie_ids: Vec<i32> =
            rows.iter().filter_map(|(_, m)| m.as_ref().map(|m| m.id)).collect();
        let genres = genre_map(&self.db, &movie_ids).await?;

        let mut out = Vec::with_capacity(rows.len());
        for (mp, m) in rows {
            let Some(m) = m else {
                continue;
            };
            let Some(role) = MovieRole::from_name(&mp.role) else {
                continue;
            };
            out.push(PersonMovieResponse {
                id: mp.id,
                movie_id: m.id,
                movie_title: m.title,
                role,
                image_path: m.image_path,
                rating: m.rating,
                release_date: m.release_date,
                genres: genres.get(&m.id).cloned().unwrap_or_default(),
            });
        }
        Ok(Some(out))
    }

    /// movie_count is the person's total association count, deliberately
    /// independent of whatever filters produced the current page.
    async fn with_movie_counts(
        &self,
        rows: Vec<person::Model>,
    ) -> AppResult<Vec<PersonResponse>> {
        let ids: Vec<i32> = rows.iter().map(|p| p.id).collect();
        let counts = movie_counts(&self.db, &ids).await?;
        Ok(rows
            .into_iter()
            .map(|p| {
                let count = counts.get(&p.id).copied().unwrap_or(0);
                PersonResponse::from_model(p, Some(count))
            })
            .collect())
    }
}

async fn movie_counts<C: ConnectionTrait>(
    conn: &C,
    person_ids: &[i32],
) -> AppResult<HashMap<i32, i64>> {
    if person_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(i32, i64)> = movie_person::Entity::find()
        .select_only()
        .column(movie_person::Column::PersonId)
        .column_as(movie_person::Column::Id.count(), "movie_count")
        .filter(movie_person::Column::PersonId.is_in(person_ids.to_vec()))
        .group_by(movie_person::Column::PersonId)
        .into_tuple()
        .all(conn)
        .await?;

    Ok(rows.into_iter().collect())
}

fn build_person_search(req: &PersonSearchRequest) -> Select<person::Entity> {
    let mut select = person::Entity::find();

    if let Some(term) = req.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        select = select.filter(
            Condition::any()
                .add(person::Column::Name.contains(term))
                .add(person::Column::Email.contains(term)),
        );
    }

    if let Some(movie_ids) = req.movie_ids.as_deref().filter(|m| !m.is_empty()) {
        let credited = Query::select()
            .column(movie_person::Column::PersonId)
            .from(movie_person::Entity)
            .and_where(movie_person::Column::MovieId.is_in(movie_ids.to_vec()))
            .to_owned();
        select = select.filter(person::Column::Id.in_subquery(credited));
    }

    if let Some(genres) = req.genres.as_deref().filter(|g| !g.is_empty()) {
        let codes: Vec<i32> = genres.iter().map(|g| g.as_code()).collect();
        let tagged = Query::select()
            .column(movie_genre::Column::MovieId)
            .from(movie_genre::Entity)
            .and_where(movie_genre::Column::Genre.is_in(codes))
            .to_owned();
        let credited_on_tagged = Query::select()
            .column(movie_person::Column::PersonId)
            .from(movie_person::Entity)
            .and_where(movie_person::Column::MovieId.in_subquery(tagged))
            .to_owned();
        select = select.filter(person::Column::Id.in_subquery(credited_on_tagged));
    }

    if let Some(roles) = req.roles.as_deref().filter(|r| !r.is_empty()) {
        let names: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
        let holding = Query::select()
            .column(movie_person::Column::PersonId)
            .from(movie_person::Entity)
            .and_where(movie_person::Column::Role.is_in(names))
            .to_owned();
        select = select.filter(person::Column::Id.in_subquery(holding));
    }

    select
}
