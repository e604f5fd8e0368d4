//! Test utilities shared by the unit and HTTP tests.

use std::sync::Arc;

use axum_test::TestServer;

use crate::{
    AppState,
    auth::password::{self, Argon2Params},
    config::Config,
    db::{
        InMemoryStore, MovieStore, UserStore,
        models::{
            movies::{MovieCreateDBRequest, MovieDBResponse},
            users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest},
        },
    },
    services::TokenManager,
    types::TokenScope,
};

/// Cheapest Argon2 settings the library accepts.
const TEST_ARGON2: Argon2Params = Argon2Params {
    memory_kib: 128,
    iterations: 1,
    parallelism: 1,
};

pub fn create_test_config() -> Config {
    let mut config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "testing".to_string(),
        ..Default::default()
    };
    config.auth.password.argon2_memory_kib = TEST_ARGON2.memory_kib;
    config.auth.password.argon2_iterations = TEST_ARGON2.iterations;
    config.auth.password.argon2_parallelism = TEST_ARGON2.parallelism;
    config
}

pub fn create_test_state() -> AppState {
    AppState::builder()
        .store(Arc::new(InMemoryStore::new()))
        .config(create_test_config())
        .build()
}

pub fn create_test_server(state: AppState) -> TestServer {
    TestServer::new(crate::build_router(state)).expect("Failed to create test server")
}

/// Insert a user with a real password hash, optionally already activated.
pub async fn create_user<S: UserStore + ?Sized>(store: &S, email: &str, password: &str, activated: bool) -> UserDBResponse {
    let password_hash = password::hash_string_with_params(password, TEST_ARGON2).expect("Failed to hash password");
    let user = store
        .insert_user(&UserCreateDBRequest {
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash,
        })
        .await
        .expect("Failed to create test user");

    if !activated {
        return user;
    }

    let mut update = UserUpdateDBRequest::from(&user);
    update.activated = true;
    store
        .update_user_if_version(user.id, user.version, &update)
        .await
        .expect("Failed to activate test user")
}

/// Create a user and issue them an authentication token, returning the token plaintext.
pub async fn create_authenticated_user(state: &AppState, email: &str, activated: bool) -> (UserDBResponse, String) {
    let store = state.store.as_ref();
    let user = create_user(store, email, "pa55word", activated).await;
    let issued = TokenManager::new(store)
        .issue(user.id, TokenScope::Authentication, state.config.auth.authentication_token_ttl)
        .await
        .expect("Failed to issue test token");
    (user, issued.plaintext.as_str().to_string())
}

pub async fn create_test_movie(state: &AppState) -> MovieDBResponse {
    state
        .store
        .insert_movie(&MovieCreateDBRequest {
            title: "Moana".to_string(),
            year: 2016,
            runtime: 107,
            genres: vec!["animation".to_string(), "adventure".to_string()],
        })
        .await
        .expect("Failed to create test movie")
}
