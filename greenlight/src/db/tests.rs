//! Store contract tests.
//!
//! Every scenario is written once against the [`Store`] traits and run against each backend. The
//! Postgres variants need a live `DATABASE_URL` and are ignored by default; run them with
//! `cargo test -- --ignored`.

use chrono::{Duration, Utc};
use rstest::{fixture, rstest};

use crate::db::errors::DbError;
use crate::db::models::{
    movies::{MovieCreateDBRequest, MovieFilter, MovieSort, MovieUpdateDBRequest},
    tokens::TokenCreateDBRequest,
    users::{UserCreateDBRequest, UserUpdateDBRequest},
};
use crate::db::{InMemoryStore, PostgresStore, Store};
use crate::types::TokenScope;

fn movie(title: &str, year: i32, runtime: i32, genres: &[&str]) -> MovieCreateDBRequest {
    MovieCreateDBRequest {
        title: title.to_string(),
        year,
        runtime,
        genres: genres.iter().map(|g| g.to_string()).collect(),
    }
}

fn user(email: &str) -> UserCreateDBRequest {
    UserCreateDBRequest {
        name: "Alice".to_string(),
        email: email.to_string(),
        password_hash: "$argon2id$not-a-real-hash".to_string(),
    }
}

fn token(hash_byte: u8, user_id: i64, scope: TokenScope) -> TokenCreateDBRequest {
    TokenCreateDBRequest {
        hash: vec![hash_byte; 32],
        user_id,
        expiry: Utc::now() + Duration::hours(1),
        scope,
    }
}

/// Fixture that returns InMemoryStore
#[fixture]
fn in_memory_store() -> InMemoryStore {
    InMemoryStore::new()
}

async fn run_test_movie_crud<S: Store>(store: &S) {
    let created = store.insert_movie(&movie("Moana", 2016, 107, &["animation", "adventure"])).await.unwrap();
    assert!(created.id > 0);
    assert_eq!(created.version, 1);

    let fetched = store.get_movie(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.title, "Moana");
    assert_eq!(fetched.genres, vec!["animation", "adventure"]);

    assert!(store.delete_movie(created.id).await.unwrap());
    assert!(store.get_movie(created.id).await.unwrap().is_none());
    assert!(!store.delete_movie(created.id).await.unwrap());
}

#[rstest]
#[tokio::test]
async fn test_movie_crud(in_memory_store: InMemoryStore) {
    run_test_movie_crud(&in_memory_store).await;
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_movie_crud_postgres(pool: sqlx::PgPool) {
    run_test_movie_crud(&PostgresStore::new(pool)).await;
}

async fn run_test_update_if_version<S: Store>(store: &S) {
    let created = store.insert_movie(&movie("Black Panther", 2018, 134, &["action"])).await.unwrap();
    let update = MovieUpdateDBRequest {
        title: "Black Panther".to_string(),
        year: 2018,
        runtime: 135,
        genres: vec!["action".to_string(), "adventure".to_string()],
    };

    let updated = store.update_movie_if_version(created.id, 1, &update).await.unwrap();
    assert_eq!(updated.version, 2);
    assert_eq!(updated.runtime, 135);

    // A second writer still holding version 1 loses
    let stale = store.update_movie_if_version(created.id, 1, &update).await;
    assert!(matches!(stale, Err(DbError::VersionConflict)));
    assert_eq!(store.get_movie(created.id).await.unwrap().unwrap().version, 2);

    let missing = store.update_movie_if_version(created.id + 1000, 1, &update).await;
    assert!(matches!(missing, Err(DbError::NotFound)));
}

#[rstest]
#[tokio::test]
async fn test_update_if_version(in_memory_store: InMemoryStore) {
    run_test_update_if_version(&in_memory_store).await;
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_update_if_version_postgres(pool: sqlx::PgPool) {
    run_test_update_if_version(&PostgresStore::new(pool)).await;
}

async fn run_test_concurrent_updates_have_one_winner<S: Store + Clone + 'static>(store: S) {
    let created = store.insert_movie(&movie("Heat", 1995, 170, &["crime"])).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        let id = created.id;
        handles.push(tokio::spawn(async move {
            let update = MovieUpdateDBRequest {
                title: format!("Heat {i}"),
                year: 1995,
                runtime: 170,
                genres: vec!["crime".to_string()],
            };
            store.update_movie_if_version(id, 1, &update).await
        }));
    }

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(movie) => {
                winners += 1;
                assert_eq!(movie.version, 2);
            }
            Err(DbError::VersionConflict) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(winners, 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_have_one_winner(in_memory_store: InMemoryStore) {
    run_test_concurrent_updates_have_one_winner(in_memory_store).await;
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_updates_have_one_winner_postgres(pool: sqlx::PgPool) {
    run_test_concurrent_updates_have_one_winner(PostgresStore::new(pool)).await;
}

async fn run_test_query_movies<S: Store>(store: &S) {
    store.insert_movie(&movie("Moana", 2016, 107, &["animation", "adventure"])).await.unwrap();
    store.insert_movie(&movie("Black Panther", 2018, 134, &["action", "adventure"])).await.unwrap();
    store.insert_movie(&movie("Deadpool", 2016, 108, &["action", "comedy"])).await.unwrap();
    store.insert_movie(&movie("The Breakfast Club", 1986, 96, &["drama"])).await.unwrap();

    // Title is a case-insensitive substring match
    let (page, total) = store
        .query_movies(&MovieFilter {
            title: "PANTHER".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(page[0].title, "Black Panther");

    // Genres must all be present
    let (page, total) = store
        .query_movies(&MovieFilter {
            genres: vec!["action".to_string(), "adventure".to_string()],
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(page[0].title, "Black Panther");

    // Sort by year descending; the two 2016 movies tie and fall back to ascending id
    let (page, total) = store
        .query_movies(&MovieFilter {
            sort: MovieSort::parse("-year").unwrap(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(total, 4);
    let titles: Vec<&str> = page.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["Black Panther", "Moana", "Deadpool", "The Breakfast Club"]);

    // Pagination reports the full total even past the last page
    let (page, total) = store
        .query_movies(&MovieFilter {
            page: 2,
            page_size: 3,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(total, 4);
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].title, "The Breakfast Club");

    let (page, total) = store
        .query_movies(&MovieFilter {
            page: 10,
            page_size: 3,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(total, 4);
    assert!(page.is_empty());

    let (page, total) = store
        .query_movies(&MovieFilter {
            title: "nothing like this".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(total, 0);
    assert!(page.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_query_movies(in_memory_store: InMemoryStore) {
    run_test_query_movies(&in_memory_store).await;
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_query_movies_postgres(pool: sqlx::PgPool) {
    run_test_query_movies(&PostgresStore::new(pool)).await;
}

async fn run_test_user_email_is_unique_case_insensitively<S: Store>(store: &S) {
    let alice = store.insert_user(&user("alice@example.com")).await.unwrap();
    assert!(!alice.activated);
    assert_eq!(alice.version, 1);

    let dup = store.insert_user(&user("ALICE@example.com")).await.unwrap_err();
    assert!(dup.is_duplicate_email(), "expected duplicate email, got {dup:?}");

    let found = store.get_user_by_email("Alice@Example.com").await.unwrap().unwrap();
    assert_eq!(found.id, alice.id);
    assert!(store.get_user_by_email("bob@example.com").await.unwrap().is_none());
}

#[rstest]
#[tokio::test]
async fn test_user_email_is_unique_case_insensitively(in_memory_store: InMemoryStore) {
    run_test_user_email_is_unique_case_insensitively(&in_memory_store).await;
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_user_email_is_unique_case_insensitively_postgres(pool: sqlx::PgPool) {
    run_test_user_email_is_unique_case_insensitively(&PostgresStore::new(pool)).await;
}

async fn run_test_activate_user_bumps_version<S: Store>(store: &S) {
    let alice = store.insert_user(&user("alice@example.com")).await.unwrap();
    let mut update = UserUpdateDBRequest::from(&alice);
    update.activated = true;

    let activated = store.update_user_if_version(alice.id, alice.version, &update).await.unwrap();
    assert!(activated.activated);
    assert_eq!(activated.version, 2);

    let stale = store.update_user_if_version(alice.id, alice.version, &update).await;
    assert!(matches!(stale, Err(DbError::VersionConflict)));
}

#[rstest]
#[tokio::test]
async fn test_activate_user_bumps_version(in_memory_store: InMemoryStore) {
    run_test_activate_user_bumps_version(&in_memory_store).await;
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_activate_user_bumps_version_postgres(pool: sqlx::PgPool) {
    run_test_activate_user_bumps_version(&PostgresStore::new(pool)).await;
}

async fn run_test_tokens_by_hash_and_scope<S: Store>(store: &S) {
    let alice = store.insert_user(&user("alice@example.com")).await.unwrap();

    store.insert_token(&token(1, alice.id, TokenScope::Activation)).await.unwrap();
    store.insert_token(&token(2, alice.id, TokenScope::Activation)).await.unwrap();
    store.insert_token(&token(3, alice.id, TokenScope::Authentication)).await.unwrap();

    let found = store.get_token(&[1; 32], TokenScope::Activation).await.unwrap().unwrap();
    assert_eq!(found.user_id, alice.id);
    // Same hash, wrong scope
    assert!(store.get_token(&[1; 32], TokenScope::Authentication).await.unwrap().is_none());

    let purged = store.delete_tokens_for_user(alice.id, TokenScope::Activation).await.unwrap();
    assert_eq!(purged, 2);
    assert!(store.get_token(&[2; 32], TokenScope::Activation).await.unwrap().is_none());
    assert!(store.get_token(&[3; 32], TokenScope::Authentication).await.unwrap().is_some());
}

#[rstest]
#[tokio::test]
async fn test_tokens_by_hash_and_scope(in_memory_store: InMemoryStore) {
    run_test_tokens_by_hash_and_scope(&in_memory_store).await;
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_tokens_by_hash_and_scope_postgres(pool: sqlx::PgPool) {
    run_test_tokens_by_hash_and_scope(&PostgresStore::new(pool)).await;
}

async fn run_test_token_owner_must_exist_and_cascades<S: Store>(store: &S) {
    let orphan = store.insert_token(&token(9, 4242, TokenScope::Authentication)).await;
    assert!(matches!(orphan, Err(DbError::ForeignKeyViolation { .. })));

    let alice = store.insert_user(&user("alice@example.com")).await.unwrap();
    store.insert_token(&token(4, alice.id, TokenScope::Authentication)).await.unwrap();

    assert!(store.delete_user(alice.id).await.unwrap());
    assert!(store.get_token(&[4; 32], TokenScope::Authentication).await.unwrap().is_none());
}

#[rstest]
#[tokio::test]
async fn test_token_owner_must_exist_and_cascades(in_memory_store: InMemoryStore) {
    run_test_token_owner_must_exist_and_cascades(&in_memory_store).await;
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_token_owner_must_exist_and_cascades_postgres(pool: sqlx::PgPool) {
    run_test_token_owner_must_exist_and_cascades(&PostgresStore::new(pool)).await;
}
