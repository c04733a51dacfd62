mod common;

use cinedex::{models::Genre, seed};

use common::{movie, setup};

#[tokio::test]
async fn seed_fills_an_empty_catalog_once() {
    let store = setup().await;

    assert!(seed::run_seed(&store).await.unwrap());

    let (total_movies, total_persons) = store.stats().await.unwrap();
    assert_eq!(total_movies, 7);
    assert_eq!(total_persons, 12);

    // Second run is a no-op.
    assert!(!seed::run_seed(&store).await.unwrap());
    let (total_movies_after, _) = store.stats().await.unwrap();
    assert_eq!(total_movies_after, 7);
}

#[tokio::test]
async fn seed_skips_a_catalog_that_already_has_movies() {
    let store = setup().await;

    store.create_movie(movie("Pre-existing", &[Genre::Drama])).await.unwrap();
    assert!(!seed::run_seed(&store).await.unwrap());

    let (total_movies, _) = store.stats().await.unwrap();
    assert_eq!(total_movies, 1);
}

#[tokio::test]
async fn seeded_data_is_fully_linked() {
    let store = setup().await;
    seed::run_seed(&store).await.unwrap();

    let (movies, _) = store.list_movies(0, 100).await.unwrap();
    let inception = movies.iter().find(|m| m.title == "Inception").unwrap();
    assert_eq!(
        inception.genres,
        vec![Genre::Action, Genre::SciFi, Genre::Thriller]
    );

    let credits = store.movie_credits(inception.id).await.unwrap().unwrap();
    assert_eq!(credits.len(), 3);

    let reviews = store.list_reviews(inception.id, 0, 20).await.unwrap().unwrap();
    assert_eq!(reviews.total, 2);
    assert!(reviews.average_rating.is_some());
}

#[tokio::test]
async fn clean_empties_every_table() {
    let store = setup().await;
    seed::run_seed(&store).await.unwrap();

    store.clean().await.unwrap();

    let (total_movies, total_persons) = store.stats().await.unwrap();
    assert_eq!(total_movies, 0);
    assert_eq!(total_persons, 0);
    let (persons, _) = store.list_persons(0, 20).await.unwrap();
    assert!(persons.is_empty());

    // Reset semantics: a clean catalog seeds again.
    assert!(seed::run_seed(&store).await.unwrap());
    let (total_movies, _) = store.stats().await.unwrap();
    assert_eq!(total_movies, 7);
}
