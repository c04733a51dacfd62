use std::collections::HashMap;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set, TransactionTrait};
use serde::Deserialize;
use tracing::warn;

use crate::{
    catalog::CatalogStore,
    entities::{movie, movie_genre, movie_person, person, review},
    error::AppResult,
    models::{Genre, MovieRole},
};

const SEED_JSON: &str = include_str!("../data/seed.json");

#[derive(Debug, Deserialize)]
struct SeedData {
    persons: Vec<SeedPerson>,
    movies: Vec<SeedMovie>,
}

#[derive(Debug, Deserialize)]
struct SeedPerson {
    name: String,
    email: String,
}

#[derive(Debug, Deserialize)]
struct SeedMovie {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    release_date: Option<NaiveDate>,
    genres: Vec<String>,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    credits: Vec<SeedCredit>,
    #[serde(default)]
    reviews: Vec<SeedReview>,
}

#[derive(Debug, Deserialize)]
struct SeedCredit {
    email: String,
    role: MovieRole,
}

#[derive(Debug, Deserialize)]
struct SeedReview {
    author_name: String,
    rating: f64,
    content: String,
}

/// Loads the embedded fixture, but only into an empty catalog. Returns false
/// when movies already exist and nothing was written.
pub async fn run_seed(store: &CatalogStore) -> AppResult<bool> {
    if movie::Entity::find().count(store.db()).await? > 0 {
        return Ok(false);
    }

    let data: SeedData =
        serde_json::from_str(SEED_JSON).context("parsing embedded seed data")?;

    let now = Utc::now();
    let txn = store.db().begin().await?;

    let mut person_ids: HashMap<String, i32> = HashMap::new();
    for p in &data.persons {
        let model = person::ActiveModel {
            id: Default::default(),
            name: Set(p.name.clone()),
            email: Set(p.email.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = model.insert(&txn).await?;
        person_ids.insert(p.email.clone(), created.id);
    }

    for m in &data.movies {
        let model = movie::ActiveModel {
            id: Default::default(),
            title: Set(m.title.clone()),
            description: Set(m.description.clone()),
            release_date: Set(m.release_date),
            rating: Set(m.rating),
            image_path: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = model.insert(&txn).await?;

        let mut genres: Vec<Genre> = m
            .genres
            .iter()
            .filter_map(|name| {
                let genre = genre_from_name(name);
                if genre.is_none() {
                    warn!(genre = %name, title = %m.title, "skipping unknown genre in seed data");
                }
                genre
            })
            .collect();
        genres.sort();
        genres.dedup();
        for genre in genres {
            let row = movie_genre::ActiveModel {
                movie_id: Set(created.id),
                genre: Set(genre.as_code()),
            };
            movie_genre::Entity::insert(row).exec_without_returning(&txn).await?;
        }

        for credit in &m.credits {
            let Some(person_id) = person_ids.get(&credit.email).copied() else {
                warn!(email = %credit.email, title = %m.title, "skipping credit for unknown person in seed data");
                continue;
            };
            let row = movie_person::ActiveModel {
                id: Default::default(),
                movie_id: Set(created.id),
                person_id: Set(person_id),
                role: Set(credit.role.as_str().to_string()),
            };
            movie_person::Entity::insert(row).exec_without_returning(&txn).await?;
        }

        for r in &m.reviews {
            let row = review::ActiveModel {
                id: Default::default(),
                movie_id: Set(created.id),
                author_name: Set(r.author_name.clone()),
                rating: Set(r.rating),
                content: Set(r.content.clone()),
                created_at: Set(now),
            };
            review::Entity::insert(row).exec_without_returning(&txn).await?;
        }
    }

    txn.commit().await?;
    Ok(true)
}

/// Fixture genre names are free-form; compound names collapse onto their
/// primary component, unknown names are skipped by the caller.
fn genre_from_name(raw: &str) -> Option<Genre> {
    let lowered = raw.trim().to_lowercase();
    let key = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    match key.as_str() {
        "action" => Some(Genre::Action),
        "comedy" => Some(Genre::Comedy),
        "drama" => Some(Genre::Drama),
        "horror" => Some(Genre::Horror),
        "sci-fi" | "science fiction" => Some(Genre::SciFi),
        "thriller" => Some(Genre::Thriller),
        "fantasy" => Some(Genre::Fantasy),
        "romance" => Some(Genre::Romance),
        "animation" => Some(Genre::Animation),
        "adventure" => Some(Genre::Adventure),
        "family" => Some(Genre::Family),
        "mystery" => Some(Genre::Mystery),
        "war" => Some(Genre::War),
        "western" => Some(Genre::Western),
        "crime" => Some(Genre::Crime),
        "documentary" => Some(Genre::Documentary),
        "biography" => Some(Genre::Biography),
        "history" => Some(Genre::History),
        "crime thriller" | "psychological thriller" | "spy thriller" | "survival thriller"
        | "political thriller" | "tech thriller" | "disaster thriller" | "mystery thriller" => {
            Some(Genre::Thriller)
        },
        "war drama" | "music drama" | "political drama" | "legal drama"
        | "psychological drama" | "disaster" => Some(Genre::Drama),
        "sci-fi thriller" | "sci-fi drama" | "cyberpunk" => Some(Genre::SciFi),
        "crime drama" => Some(Genre::Crime),
        "historical drama" => Some(Genre::History),
        "survival" => Some(Genre::Adventure),
        "action drama" | "action thriller" => Some(Genre::Action),
        "sci-fi horror" => Some(Genre::Horror),
        "mystery drama" => Some(Genre::Mystery),
        _ => None,
    }
}
