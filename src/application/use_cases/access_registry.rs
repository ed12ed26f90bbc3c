use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult, BatchFailure},
    application::{
        ports::identity_provider::{ExternalId, IdentityProviderClient},
        validators::{is_valid_external_id, is_valid_pub_key, normalize_email},
    },
    domain::entities::user::UserRecord,
};

/// Persistence port for user records. Emails passed in are already normalized.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<UserRecord>>;
    async fn get_by_email(&self, email: &str) -> AppResult<Option<UserRecord>>;
    /// Records with the given access flag, oldest first.
    async fn list_by_access(&self, has_access: bool) -> AppResult<Vec<UserRecord>>;
    /// Insert a waitlisted record unless one already exists for `email`.
    /// Returns the stored record either way and never touches `has_access`.
    async fn insert_waitlisted(&self, email: &str) -> AppResult<UserRecord>;
    /// Create a whitelisted record, or grant access to the existing one.
    async fn grant_access(&self, email: &str) -> AppResult<UserRecord>;
    /// Set `pub_key` on the whitelisted record for `email`.
    /// `None` means no whitelisted record matched and nothing was written.
    async fn set_pub_key(&self, email: &str, pub_key: &str) -> AppResult<Option<UserRecord>>;
    /// Set `twitter_id` on the whitelisted record for `email`. Same contract as `set_pub_key`.
    async fn set_twitter_id(&self, email: &str, twitter_id: &str)
    -> AppResult<Option<UserRecord>>;
}

#[derive(Clone)]
pub struct AccessRegistry {
    repo: Arc<dyn UserRepo>,
    identity: Arc<dyn IdentityProviderClient>,
}

impl AccessRegistry {
    pub fn new(repo: Arc<dyn UserRepo>, identity: Arc<dyn IdentityProviderClient>) -> Self {
        Self { repo, identity }
    }

    #[instrument(skip(self))]
    pub async fn join_waitlist(&self, email: &str) -> AppResult<UserRecord> {
        let email = normalize_email(email)?;
        let user = self.repo.insert_waitlisted(&email).await?;
        tracing::info!(
            user_id = %user.id,
            state = user.access_state().as_str(),
            "Waitlist entry recorded"
        );
        Ok(user)
    }

    pub async fn list_waitlist(&self) -> AppResult<Vec<UserRecord>> {
        self.repo.list_by_access(false).await
    }

    /// Grant access to every email in `emails`.
    ///
    /// Input is validated up front, so a malformed address rejects the whole
    /// request before anything is written. After that each email is applied on
    /// its own: a store failure on one item does not stop the rest, and the
    /// batch as a whole is not atomic. Any failure is reported through
    /// `AppError::BatchIncomplete` together with the records that were applied.
    #[instrument(skip(self, emails), fields(count = emails.len()))]
    pub async fn whitelist(&self, emails: &[String]) -> AppResult<Vec<UserRecord>> {
        let normalized = emails
            .iter()
            .map(|raw| {
                normalize_email(raw)
                    .map_err(|_| AppError::InvalidInput(format!("Invalid email address: {raw}")))
            })
            .collect::<AppResult<Vec<_>>>()?;

        let mut applied = Vec::with_capacity(normalized.len());
        let mut failed = Vec::new();

        for email in normalized {
            match self.repo.grant_access(&email).await {
                Ok(user) => applied.push(user),
                Err(err) => {
                    tracing::warn!(email = %email, error = %err, "Failed to whitelist email");
                    failed.push(BatchFailure {
                        email,
                        reason: err.to_string(),
                    });
                }
            }
        }

        if !failed.is_empty() {
            return Err(AppError::BatchIncomplete { applied, failed });
        }

        tracing::info!(count = applied.len(), "Emails whitelisted");
        Ok(applied)
    }

    #[instrument(skip(self))]
    pub async fn connect_wallet(&self, email: &str, pub_key: &str) -> AppResult<UserRecord> {
        let email = normalize_email(email)?;
        let pub_key = pub_key.trim();
        if !is_valid_pub_key(pub_key) {
            return Err(AppError::InvalidInput("Invalid public key".into()));
        }

        self.repo
            .set_pub_key(&email, pub_key)
            .await?
            .ok_or(AppError::NotWhitelisted)
    }

    #[instrument(skip(self))]
    pub async fn connect_identity(&self, email: &str, external_id: &str) -> AppResult<UserRecord> {
        let email = normalize_email(email)?;
        let external_id = external_id.trim();
        if !is_valid_external_id(external_id) {
            return Err(AppError::InvalidInput("Invalid external id".into()));
        }

        let user = self
            .repo
            .set_twitter_id(&email, external_id)
            .await?
            .ok_or(AppError::NotWhitelisted)?;
        tracing::info!(
            user_id = %user.id,
            state = user.access_state().as_str(),
            "Identity linked"
        );
        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> AppResult<UserRecord> {
        let email = normalize_email(email)?;
        self.repo
            .get_by_email(&email)
            .await?
            .filter(|user| user.has_access)
            .ok_or(AppError::NotFound)
    }

    #[instrument(skip(self))]
    pub async fn get_profile(&self, id: Uuid) -> AppResult<serde_json::Value> {
        let user = self.repo.get_by_id(id).await?.ok_or(AppError::NotFound)?;
        let twitter_id = user.twitter_id.ok_or(AppError::IdentityNotLinked)?;
        self.identity
            .fetch_profile(&ExternalId::new(twitter_id))
            .await
    }
}
