mod common;

use cinedex::{
    error::AppError,
    models::{CreditCreate, Genre, MovieRole},
};

use common::{movie, person, setup};

fn credit(person_id: i32, role: MovieRole) -> CreditCreate {
    CreditCreate { person_id, role }
}

#[tokio::test]
async fn a_movie_gets_at_most_one_director() {
    let store = setup().await;

    let m = store.create_movie(movie("Helmed", &[Genre::Drama])).await.unwrap();
    let p1 = store.create_person(person("First Director", "d1@credits.test")).await.unwrap();
    let p2 = store.create_person(person("Second Director", "d2@credits.test")).await.unwrap();

    store.add_credits(m.id, vec![credit(p1.id, MovieRole::Director)]).await.unwrap();

    let err =
        store.add_credits(m.id, vec![credit(p2.id, MovieRole::Director)]).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // The existing association is untouched.
    let credits = store.movie_credits(m.id).await.unwrap().unwrap();
    assert_eq!(credits.len(), 1);
    assert_eq!(credits[0].person_id, p1.id);
    assert_eq!(credits[0].role, MovieRole::Director);
}

#[tokio::test]
async fn two_directors_in_one_batch_persist_nothing() {
    let store = setup().await;

    let m = store.create_movie(movie("Contested", &[Genre::Drama])).await.unwrap();
    let p1 = store.create_person(person("A", "a@credits.test")).await.unwrap();
    let p2 = store.create_person(person("B", "b@credits.test")).await.unwrap();

    let err = store
        .add_credits(
            m.id,
            vec![credit(p1.id, MovieRole::Director), credit(p2.id, MovieRole::Director)],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let credits = store.movie_credits(m.id).await.unwrap().unwrap();
    assert!(credits.is_empty());
}

#[tokio::test]
async fn one_person_may_hold_distinct_roles_but_not_the_same_twice() {
    let store = setup().await;

    let m = store.create_movie(movie("Auteur Piece", &[Genre::Drama])).await.unwrap();
    let p = store.create_person(person("Auteur", "auteur@credits.test")).await.unwrap();

    store.add_credits(m.id, vec![credit(p.id, MovieRole::Actor)]).await.unwrap();
    store.add_credits(m.id, vec![credit(p.id, MovieRole::Director)]).await.unwrap();

    let err = store.add_credits(m.id, vec![credit(p.id, MovieRole::Actor)]).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let credits = store.movie_credits(m.id).await.unwrap().unwrap();
    assert_eq!(credits.len(), 2);
}

#[tokio::test]
async fn duplicate_pair_within_a_batch_is_rejected() {
    let store = setup().await;

    let m = store.create_movie(movie("Doubled", &[Genre::Drama])).await.unwrap();
    let p = store.create_person(person("Twice", "twice@credits.test")).await.unwrap();

    let err = store
        .add_credits(m.id, vec![credit(p.id, MovieRole::Actor), credit(p.id, MovieRole::Actor)])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let credits = store.movie_credits(m.id).await.unwrap().unwrap();
    assert!(credits.is_empty());
}

#[tokio::test]
async fn unknown_person_or_movie_is_not_found() {
    let store = setup().await;

    let m = store.create_movie(movie("Real", &[Genre::Drama])).await.unwrap();

    let err = store.add_credits(m.id, vec![credit(999, MovieRole::Actor)]).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = store.add_credits(999, vec![credit(1, MovieRole::Actor)]).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn removal_with_role_removes_exactly_that_association() {
    let store = setup().await;

    let m = store.create_movie(movie("Partial", &[Genre::Drama])).await.unwrap();
    let p = store.create_person(person("Multi", "multi@credits.test")).await.unwrap();
    store
        .add_credits(
            m.id,
            vec![credit(p.id, MovieRole::Actor), credit(p.id, MovieRole::Producer)],
        )
        .await
        .unwrap();

    assert!(store.remove_credits(m.id, p.id, Some(MovieRole::Actor)).await.unwrap());

    let credits = store.movie_credits(m.id).await.unwrap().unwrap();
    assert_eq!(credits.len(), 1);
    assert_eq!(credits[0].role, MovieRole::Producer);
}

#[tokio::test]
async fn removal_without_role_removes_every_association_for_the_pair() {
    let store = setup().await;

    let m = store.create_movie(movie("Full Sweep", &[Genre::Drama])).await.unwrap();
    let p = store.create_person(person("Swept", "swept@credits.test")).await.unwrap();
    let other = store.create_person(person("Stays", "stays@credits.test")).await.unwrap();
    store
        .add_credits(
            m.id,
            vec![
                credit(p.id, MovieRole::Actor),
                credit(p.id, MovieRole::Director),
                credit(other.id, MovieRole::Producer),
            ],
        )
        .await
        .unwrap();

    assert!(store.remove_credits(m.id, p.id, None).await.unwrap());

    let credits = store.movie_credits(m.id).await.unwrap().unwrap();
    assert_eq!(credits.len(), 1);
    assert_eq!(credits[0].person_id, other.id);
}

#[tokio::test]
async fn removing_a_missing_association_reports_not_found() {
    let store = setup().await;

    let m = store.create_movie(movie("Empty", &[Genre::Drama])).await.unwrap();
    let p = store.create_person(person("Uncredited", "none@credits.test")).await.unwrap();

    assert!(!store.remove_credits(m.id, p.id, None).await.unwrap());
    assert!(!store.remove_credits(m.id, p.id, Some(MovieRole::Actor)).await.unwrap());
}
