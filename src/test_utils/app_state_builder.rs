//! Test app state builder for HTTP-level testing.
//!
//! `TestAppStateBuilder` creates an `AppState` backed by in-memory mocks so
//! route handlers can be exercised with `axum_test::TestServer`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use time::Duration;
use url::Url;

use crate::{
    adapters::http::app_state::AppState,
    domain::entities::user::UserRecord,
    infra::config::AppConfig,
    test_utils::{InMemoryOAuthStateStore, InMemoryUserRepo, StubIdentityProvider},
    use_cases::{
        access_registry::{AccessRegistry, UserRepo},
        identity_link::IdentityLinkUseCases,
    },
};

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// # Example
///
/// ```ignore
/// let user = create_test_user(|u| u.has_access = true);
///
/// let (app_state, repo) = TestAppStateBuilder::new()
///     .with_user(user)
///     .build_with_repo();
/// ```
pub struct TestAppStateBuilder {
    users: Vec<UserRecord>,
    repo: Option<Arc<dyn UserRepo>>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            users: vec![],
            repo: None,
        }
    }

    /// Seed a user into the default in-memory repo.
    pub fn with_user(mut self, user: UserRecord) -> Self {
        self.users.push(user);
        self
    }

    /// Replace the user repo, e.g. with a `FailingUserRepo`. Seeded users are ignored.
    pub fn with_repo(mut self, repo: Arc<dyn UserRepo>) -> Self {
        self.repo = Some(repo);
        self
    }

    pub fn build(self) -> AppState {
        self.build_parts().0
    }

    /// Build and also return the in-memory repo for assertions.
    pub fn build_with_repo(self) -> (AppState, Arc<InMemoryUserRepo>) {
        let (app_state, repo, _) = self.build_parts();
        (app_state, repo)
    }

    /// Build and also return the OAuth state store for assertions.
    pub fn build_with_state_store(self) -> (AppState, Arc<InMemoryOAuthStateStore>) {
        let (app_state, _, states) = self.build_parts();
        (app_state, states)
    }

    fn build_parts(self) -> (AppState, Arc<InMemoryUserRepo>, Arc<InMemoryOAuthStateStore>) {
        let in_memory = Arc::new(InMemoryUserRepo::with_users(self.users));
        let repo = self
            .repo
            .unwrap_or_else(|| in_memory.clone() as Arc<dyn UserRepo>);
        let states = Arc::new(InMemoryOAuthStateStore::new());
        let identity = Arc::new(StubIdentityProvider::new());

        let config = test_config();
        let access_registry = AccessRegistry::new(repo.clone(), identity.clone());
        let identity_link = IdentityLinkUseCases::new(
            repo,
            states.clone(),
            identity,
            config.app_redirect_url.clone(),
            config.oauth_state_ttl.whole_minutes(),
        );

        let app_state = AppState {
            config: Arc::new(config),
            access_registry: Arc::new(access_registry),
            identity_link: Arc::new(identity_link),
        };
        (app_state, in_memory, states)
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        database_url: "postgres://localhost/ribh_test".to_string(),
        database_max_connections: 1,
        redis_url: "redis://127.0.0.1:6379".to_string(),
        cors_origin: HeaderValue::from_static("http://localhost:3000"),
        app_redirect_url: Url::parse("https://app.test/verify-email/connect-accounts").unwrap(),
        oauth_state_ttl: Duration::minutes(10),
    }
}
