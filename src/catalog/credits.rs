use std::collections::HashSet;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use super::CatalogStore;
use crate::{
    entities::{movie_person, person},
    error::{AppError, AppResult, conflict_on_unique},
    models::{CreditCreate, CreditResponse, MovieRole},
};

const ROLE_TAKEN: &str = "person already holds this role on this movie";

impl CatalogStore {
    pub async fn movie_credits(&self, movie_id: i32) -> AppResult<Option<Vec<CreditResponse>>> {
        if self.get_movie(movie_id).await?.is_none() {
            return Ok(None);
        }

        let rows = movie_person::Entity::find()
            .filter(movie_person::Column::MovieId.eq(movie_id))
            .order_by_asc(movie_person::Column::Id)
            .all(&self.db)
            .await?;

        let credits = rows
            .into_iter()
            .filter_map(|mp| {
                let role = MovieRole::from_name(&mp.role)?;
                Some(CreditResponse::from_model(mp, role))
            })
            .collect();
        Ok(Some(credits))
    }

    /// Validates the whole batch before writing anything, then persists it as
    /// one atomic unit. A concurrent request that slips past the pre-checks
    /// hits the unique index at commit and is rolled back as a conflict.
    pub async fn add_credits(
        &self,
        movie_id: i32,
        batch: Vec<CreditCreate>,
    ) -> AppResult<Vec<CreditResponse>> {
        if self.get_movie(movie_id).await?.is_none() {
            return Err(AppError::not_found("Movie"));
        }
        if batch.is_empty() {
            return Err(AppError::validation("at least one person/role assignment is required"));
        }

        let directors = batch.iter().filter(|c| c.role == MovieRole::Director).count();
        if directors > 1 {
            return Err(AppError::conflict("a movie can have only one director"));
        }
        if directors == 1 {
            let has_director = movie_person::Entity::find()
                .filter(movie_person::Column::MovieId.eq(movie_id))
                .filter(movie_person::Column::Role.eq(MovieRole::Director.as_str()))
                .one(&self.db)
                .await?
                .is_some();
            if has_director {
                return Err(AppError::conflict("this movie already has a director"));
            }
        }

        let mut seen: HashSet<(i32, MovieRole)> = HashSet::new();
        for entry in &batch {
            if !seen.insert((entry.person_id, entry.role)) {
                return Err(AppError::conflict(format!(
                    "duplicate assignment of person {} as {} in this request",
                    entry.person_id,
                    entry.role.as_str()
                )));
            }
        }

        let person_ids: Vec<i32> =
            batch.iter().map(|c| c.person_id).collect::<HashSet<_>>().into_iter().collect();
        let found: HashSet<i32> = person::Entity::find()
            .filter(person::Column::Id.is_in(person_ids.clone()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();
        for id in &person_ids {
            if !found.contains(id) {
                return Err(AppError::NotFound(format!("Person {id} not found")));
            }
        }

        let existing: HashSet<(i32, String)> = movie_person::Entity::find()
            .filter(movie_person::Column::MovieId.eq(movie_id))
            .filter(movie_person::Column::PersonId.is_in(person_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|mp| (mp.person_id, mp.role))
            .collect();
        for entry in &batch {
            if existing.contains(&(entry.person_id, entry.role.as_str().to_string())) {
                return Err(AppError::conflict(format!(
                    "person {} already has the {} role on this movie",
                    entry.person_id,
                    entry.role.as_str()
                )));
            }
        }

        let txn = self.db.begin().await?;
        let mut created = Vec::with_capacity(batch.len());
        for entry in &batch {
            let model = movie_person::ActiveModel {
                id: Default::default(),
                movie_id: Set(movie_id),
                person_id: Set(entry.person_id),
                role: Set(entry.role.as_str().to_string()),
            };
            let mp = model
                .insert(&txn)
                .await
                .map_err(|err| conflict_on_unique(err, ROLE_TAKEN))?;
            created.push(CreditResponse::from_model(mp, entry.role));
        }
        txn.commit().await.map_err(|err| conflict_on_unique(err, ROLE_TAKEN))?;

        Ok(created)
    }

    /// With a role, removes exactly that association; without, removes every
    /// association between the movie and the person. Zero rows removed means
    /// there was nothing to remove.
    pub async fn remove_credits(
        &self,
        movie_id: i32,
        person_id: i32,
        role: Option<MovieRole>,
    ) -> AppResult<bool> {
        let mut delete = movie_person::Entity::delete_many()
            .filter(movie_person::Column::MovieId.eq(movie_id))
            .filter(movie_person::Column::PersonId.eq(person_id));
        if let Some(role) = role {
            delete = delete.filter(movie_person::Column::Role.eq(role.as_str()));
        }

        let res = delete.exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }
}
