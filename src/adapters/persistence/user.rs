use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::user::UserRecord,
    use_cases::access_registry::UserRepo,
};

const USER_COLUMNS: &str = "id, email, has_access, twitter_id, pub_key, created_at, updated_at";

fn row_to_user(row: sqlx::postgres::PgRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        email: row.get("email"),
        has_access: row.get("has_access"),
        twitter_id: row.get("twitter_id"),
        pub_key: row.get("pub_key"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl UserRepo for PostgresPersistence {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(row.map(row_to_user))
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(row.map(row_to_user))
    }

    async fn list_by_access(&self, has_access: bool) -> AppResult<Vec<UserRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE has_access = $1 ORDER BY created_at ASC"
        ))
        .bind(has_access)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_user).collect())
    }

    async fn insert_waitlisted(&self, email: &str) -> AppResult<UserRecord> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (id, email, has_access)
            VALUES ($1, $2, FALSE)
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_user(row))
    }

    async fn grant_access(&self, email: &str) -> AppResult<UserRecord> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (id, email, has_access)
            VALUES ($1, $2, TRUE)
            ON CONFLICT (email) DO UPDATE SET
                has_access = TRUE,
                updated_at = CASE WHEN users.has_access THEN users.updated_at ELSE CURRENT_TIMESTAMP END
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_user(row))
    }

    async fn set_pub_key(&self, email: &str, pub_key: &str) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET pub_key = $2, updated_at = CURRENT_TIMESTAMP
            WHERE email = $1 AND has_access = TRUE
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(pub_key)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_user))
    }

    async fn set_twitter_id(
        &self,
        email: &str,
        twitter_id: &str,
    ) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET twitter_id = $2, updated_at = CURRENT_TIMESTAMP
            WHERE email = $1 AND has_access = TRUE
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(twitter_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_user))
    }
}
