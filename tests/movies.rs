mod common;

use cinedex::{
    error::AppError,
    models::{Genre, MovieCreate, MovieUpdate},
};
use chrono::NaiveDate;

use common::{movie, setup};

#[tokio::test]
async fn created_movie_renders_genres_in_code_order() {
    let store = setup().await;

    let created = store
        .create_movie(movie("Out of Order", &[Genre::Thriller, Genre::Action]))
        .await
        .unwrap();

    assert_eq!(created.genres, vec![Genre::Action, Genre::Thriller]);

    let fetched = store.get_movie(created.id).await.unwrap().unwrap();
    let rendered = store.movie_response(fetched).await.unwrap();
    assert_eq!(rendered.genres, vec![Genre::Action, Genre::Thriller]);
}

#[tokio::test]
async fn duplicate_input_genres_collapse_to_a_set() {
    let store = setup().await;

    let created = store
        .create_movie(movie("Twice Tagged", &[Genre::Drama, Genre::Drama, Genre::Action]))
        .await
        .unwrap();

    assert_eq!(created.genres, vec![Genre::Action, Genre::Drama]);
}

#[tokio::test]
async fn movie_requires_at_least_one_genre() {
    let store = setup().await;

    let err = store.create_movie(movie("Untagged", &[])).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn partial_update_only_touches_supplied_fields() {
    let store = setup().await;

    let created = store
        .create_movie(MovieCreate {
            title: "Original".to_string(),
            description: Some("Kept as-is".to_string()),
            release_date: NaiveDate::from_ymd_opt(2010, 7, 16),
            genres: vec![Genre::SciFi],
            rating: Some(8.8),
        })
        .await
        .unwrap();

    let updated = store
        .update_movie(
            created.id,
            MovieUpdate {
                title: Some("Renamed".to_string()),
                rating: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.rating, None);
    assert_eq!(updated.description.as_deref(), Some("Kept as-is"));
    assert_eq!(updated.release_date, NaiveDate::from_ymd_opt(2010, 7, 16));
    assert_eq!(updated.genres, vec![Genre::SciFi]);
    assert!(updated.updated_at >= created.updated_at);
}

#[tokio::test]
async fn update_replaces_the_genre_set() {
    let store = setup().await;

    let created =
        store.create_movie(movie("Retagged", &[Genre::Action, Genre::War])).await.unwrap();

    let updated = store
        .update_movie(
            created.id,
            MovieUpdate { genres: Some(vec![Genre::Comedy]), ..Default::default() },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.genres, vec![Genre::Comedy]);

    let err = store
        .update_movie(created.id, MovieUpdate { genres: Some(vec![]), ..Default::default() })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn update_of_missing_movie_is_not_found() {
    let store = setup().await;

    let result = store
        .update_movie(999, MovieUpdate { title: Some("Noop".to_string()), ..Default::default() })
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn delete_cascades_to_owned_rows() {
    let store = setup().await;

    let created = store.create_movie(movie("Doomed", &[Genre::Horror])).await.unwrap();
    let person = store
        .create_person(common::person("Cast Member", "cast@movies.test"))
        .await
        .unwrap();
    store
        .add_credits(
            created.id,
            vec![cinedex::models::CreditCreate {
                person_id: person.id,
                role: cinedex::models::MovieRole::Actor,
            }],
        )
        .await
        .unwrap();
    store
        .create_review(
            created.id,
            cinedex::models::ReviewCreate {
                author_name: "Reviewer".to_string(),
                rating: 7.0,
                content: "Fine.".to_string(),
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert!(store.delete_movie(created.id).await.unwrap());

    assert!(store.get_movie(created.id).await.unwrap().is_none());
    assert!(store.movie_credits(created.id).await.unwrap().is_none());
    assert!(store.list_reviews(created.id, 0, 20).await.unwrap().is_none());
    let person_movies = store.person_movies(person.id).await.unwrap().unwrap();
    assert!(person_movies.is_empty());

    assert!(!store.delete_movie(created.id).await.unwrap());
}

#[tokio::test]
async fn bulk_create_accepts_exactly_the_limit() {
    let store = setup().await;

    let batch: Vec<_> =
        (0..300).map(|i| movie(&format!("Bulk {i}"), &[Genre::Drama])).collect();
    let created = store.create_movies_bulk(batch).await.unwrap();
    assert_eq!(created.len(), 300);

    let (_, total) = store.list_movies(0, 1).await.unwrap();
    assert_eq!(total, 300);
}

#[tokio::test]
async fn bulk_create_rejects_oversized_batches_before_writing() {
    let store = setup().await;

    let batch: Vec<_> =
        (0..301).map(|i| movie(&format!("Bulk {i}"), &[Genre::Drama])).collect();
    let err = store.create_movies_bulk(batch).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let (_, total) = store.list_movies(0, 1).await.unwrap();
    assert_eq!(total, 0);
}

#[tokio::test]
async fn bulk_create_is_all_or_nothing() {
    let store = setup().await;

    let batch = vec![movie("Good", &[Genre::Drama]), movie("Bad", &[])];
    let err = store.create_movies_bulk(batch).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let (_, total) = store.list_movies(0, 1).await.unwrap();
    assert_eq!(total, 0);
}
