//! In-memory mock implementations of the application ports.

use async_trait::async_trait;
use secrecy::SecretString;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        ports::identity_provider::{ExternalId, IdentityProviderClient, ProviderToken},
        use_cases::{
            access_registry::UserRepo,
            identity_link::{OAuthStateData, OAuthStateStore},
        },
    },
    domain::entities::{identity_provider::IdentityProvider, user::UserRecord},
};

// ============================================================================
// InMemoryUserRepo
// ============================================================================

/// In-memory implementation of `UserRepo`. Records keep insertion order.
#[derive(Default)]
pub struct InMemoryUserRepo {
    pub users: Mutex<Vec<UserRecord>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repo with initial users for testing.
    pub fn with_users(users: Vec<UserRecord>) -> Self {
        Self {
            users: Mutex::new(users),
        }
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    /// Snapshot of the record for `email` (for test assertions).
    pub fn get(&self, email: &str) -> Option<UserRecord> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }

    fn new_record(email: &str, has_access: bool) -> UserRecord {
        let now = chrono::Utc::now().naive_utc();
        UserRecord {
            id: Uuid::new_v4(),
            email: email.to_string(),
            has_access,
            twitter_id: None,
            pub_key: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    fn update_whitelisted(
        &self,
        email: &str,
        apply: impl FnOnce(&mut UserRecord),
    ) -> Option<UserRecord> {
        let mut users = self.users.lock().unwrap();
        let user = users.iter_mut().find(|u| u.email == email && u.has_access)?;
        apply(user);
        user.updated_at = Some(chrono::Utc::now().naive_utc());
        Some(user.clone())
    }
}

#[async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<UserRecord>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        Ok(self.get(email))
    }

    async fn list_by_access(&self, has_access: bool) -> AppResult<Vec<UserRecord>> {
        let mut users: Vec<UserRecord> = self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.has_access == has_access)
            .cloned()
            .collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn insert_waitlisted(&self, email: &str) -> AppResult<UserRecord> {
        let mut users = self.users.lock().unwrap();
        if let Some(existing) = users.iter().find(|u| u.email == email) {
            return Ok(existing.clone());
        }
        let user = Self::new_record(email, false);
        users.push(user.clone());
        Ok(user)
    }

    async fn grant_access(&self, email: &str) -> AppResult<UserRecord> {
        let mut users = self.users.lock().unwrap();
        if let Some(existing) = users.iter_mut().find(|u| u.email == email) {
            if !existing.has_access {
                existing.has_access = true;
                existing.updated_at = Some(chrono::Utc::now().naive_utc());
            }
            return Ok(existing.clone());
        }
        let user = Self::new_record(email, true);
        users.push(user.clone());
        Ok(user)
    }

    async fn set_pub_key(&self, email: &str, pub_key: &str) -> AppResult<Option<UserRecord>> {
        Ok(self.update_whitelisted(email, |u| u.pub_key = Some(pub_key.to_string())))
    }

    async fn set_twitter_id(
        &self,
        email: &str,
        twitter_id: &str,
    ) -> AppResult<Option<UserRecord>> {
        Ok(self.update_whitelisted(email, |u| u.twitter_id = Some(twitter_id.to_string())))
    }
}

// ============================================================================
// FailingUserRepo
// ============================================================================

/// Wraps an `InMemoryUserRepo` and returns a database error for one email,
/// or for every call when built with [`FailingUserRepo::always`].
pub struct FailingUserRepo {
    inner: Arc<InMemoryUserRepo>,
    failing_email: Option<String>,
}

impl FailingUserRepo {
    pub fn new(inner: Arc<InMemoryUserRepo>, failing_email: &str) -> Self {
        Self {
            inner,
            failing_email: Some(failing_email.to_string()),
        }
    }

    pub fn always(inner: Arc<InMemoryUserRepo>) -> Self {
        Self {
            inner,
            failing_email: None,
        }
    }

    fn check(&self, email: Option<&str>) -> AppResult<()> {
        let fails = match (&self.failing_email, email) {
            (None, _) => true,
            (Some(failing), Some(email)) => failing == email,
            (Some(_), None) => false,
        };
        if fails {
            Err(AppError::Database("Database operation failed".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UserRepo for FailingUserRepo {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<UserRecord>> {
        self.check(None)?;
        self.inner.get_by_id(id).await
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        self.check(Some(email))?;
        self.inner.get_by_email(email).await
    }

    async fn list_by_access(&self, has_access: bool) -> AppResult<Vec<UserRecord>> {
        self.check(None)?;
        self.inner.list_by_access(has_access).await
    }

    async fn insert_waitlisted(&self, email: &str) -> AppResult<UserRecord> {
        self.check(Some(email))?;
        self.inner.insert_waitlisted(email).await
    }

    async fn grant_access(&self, email: &str) -> AppResult<UserRecord> {
        self.check(Some(email))?;
        self.inner.grant_access(email).await
    }

    async fn set_pub_key(&self, email: &str, pub_key: &str) -> AppResult<Option<UserRecord>> {
        self.check(Some(email))?;
        self.inner.set_pub_key(email, pub_key).await
    }

    async fn set_twitter_id(
        &self,
        email: &str,
        twitter_id: &str,
    ) -> AppResult<Option<UserRecord>> {
        self.check(Some(email))?;
        self.inner.set_twitter_id(email, twitter_id).await
    }
}

// ============================================================================
// InMemoryOAuthStateStore
// ============================================================================

/// In-memory `OAuthStateStore`. TTLs are ignored.
#[derive(Default)]
pub struct InMemoryOAuthStateStore {
    pub states: Mutex<HashMap<String, OAuthStateData>>,
}

impl InMemoryOAuthStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.lock().unwrap().len()
    }

    /// Read a stored state without consuming it.
    pub fn peek(&self, state: &str) -> Option<OAuthStateData> {
        self.states.lock().unwrap().get(state).cloned()
    }

    /// The state token, when exactly one handshake is pending.
    pub fn only_state(&self) -> Option<String> {
        let states = self.states.lock().unwrap();
        if states.len() == 1 {
            states.keys().next().cloned()
        } else {
            None
        }
    }
}

#[async_trait]
impl OAuthStateStore for InMemoryOAuthStateStore {
    async fn store_state(
        &self,
        state: &str,
        data: &OAuthStateData,
        _ttl_minutes: i64,
    ) -> AppResult<()> {
        self.states
            .lock()
            .unwrap()
            .insert(state.to_string(), data.clone());
        Ok(())
    }

    async fn consume_state(&self, state: &str) -> AppResult<Option<OAuthStateData>> {
        Ok(self.states.lock().unwrap().remove(state))
    }
}

// ============================================================================
// StubIdentityProvider
// ============================================================================

const STUB_EXTERNAL_ID: &str = "1234567890";

/// Identity provider that accepts any code and always resolves to the same account.
#[derive(Default)]
pub struct StubIdentityProvider {
    exchanged_codes: Mutex<Vec<String>>,
    profile_requests: Mutex<Vec<String>>,
}

impl StubIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account id returned for every exchanged code.
    pub fn external_id(&self) -> &str {
        STUB_EXTERNAL_ID
    }

    pub fn exchanged_codes(&self) -> Vec<String> {
        self.exchanged_codes.lock().unwrap().clone()
    }

    pub fn profile_requests(&self) -> Vec<String> {
        self.profile_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityProviderClient for StubIdentityProvider {
    fn provider(&self) -> IdentityProvider {
        IdentityProvider::Twitter
    }

    fn authorization_url(&self, state: &str, code_challenge: &str) -> AppResult<String> {
        Ok(format!(
            "https://provider.test/authorize?state={state}&code_challenge={code_challenge}"
        ))
    }

    async fn exchange_code(&self, code: &str, _code_verifier: &str) -> AppResult<ProviderToken> {
        self.exchanged_codes.lock().unwrap().push(code.to_string());
        Ok(ProviderToken {
            access_token: SecretString::new("stub-access-token".into()),
        })
    }

    async fn fetch_authenticated_id(&self, _token: &ProviderToken) -> AppResult<ExternalId> {
        Ok(ExternalId::new(STUB_EXTERNAL_ID))
    }

    async fn fetch_profile(&self, external_id: &ExternalId) -> AppResult<serde_json::Value> {
        self.profile_requests
            .lock()
            .unwrap()
            .push(external_id.as_str().to_string());
        Ok(serde_json::json!({
            "data": {
                "id": external_id.as_str(),
                "username": "stub_user",
            }
        }))
    }
}
