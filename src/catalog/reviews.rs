use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use super::CatalogStore;
use crate::{
    entities::review,
    error::{AppError, AppResult},
    models::{ReviewCreate, ReviewResponse},
};

/// One page of a movie's reviews plus the aggregate over all of them.
pub struct ReviewListing {
    pub items: Vec<ReviewResponse>,
    pub total: u64,
    pub average_rating: Option<f64>,
}

impl CatalogStore {
    /// Newest first. The average covers every review of the movie, not the
    /// current page, and is recomputed on each read.
    pub async fn list_reviews(
        &self,
        movie_id: i32,
        skip: u64,
        limit: u64,
    ) -> AppResult<Option<ReviewListing>> {
        if self.get_movie(movie_id).await?.is_none() {
            return Ok(None);
        }

        let total = review::Entity::find()
            .filter(review::Column::MovieId.eq(movie_id))
            .count(&self.db)
            .await?;
        let average_rating = self.average_rating(movie_id).await?;

        let rows = review::Entity::find()
            .filter(review::Column::MovieId.eq(movie_id))
            .order_by_desc(review::Column::CreatedAt)
            .order_by_desc(review::Column::Id)
            .offset(skip)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(Some(ReviewListing {
            items: rows.into_iter().map(Into::into).collect(),
            total,
            average_rating,
        }))
    }

    async fn average_rating(&self, movie_id: i32) -> AppResult<Option<f64>> {
        let row: Option<(Option<f64>, i64)> = review::Entity::find()
            .select_only()
            .column_as(review::Column::Rating.sum(), "rating_sum")
            .column_as(review::Column::Id.count(), "review_count")
            .filter(review::Column::MovieId.eq(movie_id))
            .into_tuple()
            .one(&self.db)
            .await?;

        let average = match row {
            Some((Some(sum), count)) if count > 0 => {
                let mean = sum / count as f64;
                Some((mean * 10.0).round() / 10.0)
            },
            _ => None,
        };
        Ok(average)
    }

    pub async fn create_review(
        &self,
        movie_id: i32,
        req: ReviewCreate,
    ) -> AppResult<Option<ReviewResponse>> {
        validate_review(&req)?;

        if self.get_movie(movie_id).await?.is_none() {
            return Ok(None);
        }

        let model = review::ActiveModel {
            id: Default::default(),
            movie_id: Set(movie_id),
            author_name: Set(req.author_name),
            rating: Set(req.rating),
            content: Set(req.content),
            created_at: Set(Utc::now()),
        };
        Ok(Some(model.insert(&self.db).await?.into()))
    }

    /// The review must belong to the given movie; a mismatched pair deletes
    /// nothing and reports not-found.
    pub async fn delete_review(&self, movie_id: i32, review_id: i32) -> AppResult<bool> {
        let res = review::Entity::delete_many()
            .filter(review::Column::Id.eq(review_id))
            .filter(review::Column::MovieId.eq(movie_id))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }
}

fn validate_review(req: &ReviewCreate) -> AppResult<()> {
    if req.author_name.is_empty() || req.author_name.len() > 255 {
        return Err(AppError::validation("author_name must be between 1 and 255 characters"));
    }
    if req.content.is_empty() {
        return Err(AppError::validation("content must not be empty"));
    }
    if !(0.0..=10.0).contains(&req.rating) {
        return Err(AppError::validation("rating must be between 0 and 10"));
    }
    Ok(())
}
