//! Account repository for database operations

use async_trait::async_trait;
use common::error::is_unique_violation;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use super::{AccountStore, RepositoryError, RepositoryResult, username_conflict};
use crate::{
    models::{Account, AccountChanges, Role},
    password::hash_password,
};

/// PostgreSQL-backed account repository
#[derive(Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    /// Create a new account repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn account_from_row(row: &PgRow) -> RepositoryResult<Account> {
    let role: String = row.try_get("role")?;
    let role = role.parse::<Role>().map_err(|e| {
        RepositoryError::Database(sqlx::Error::Decode(e.into()))
    })?;

    Ok(Account {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        role,
        created_at: row.try_get("created_at")?,
    })
}

fn map_conflict(error: sqlx::Error, username: &str) -> RepositoryError {
    if is_unique_violation(&error) {
        username_conflict(username)
    } else {
        RepositoryError::Database(error)
    }
}

#[async_trait]
impl AccountStore for AccountRepository {
    async fn list(&self) -> RepositoryResult<Vec<Account>> {
        let rows = sqlx::query(
            r#"
            SELECT id, username, password_hash, role, created_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(account_from_row).collect()
    }

    async fn create(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> RepositoryResult<Account> {
        info!("Creating account: {}", username);

        let password_hash = hash_password(password).map_err(RepositoryError::Hashing)?;

        let row = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id, username, password_hash, role, created_at
            "#,
        )
        .bind(username)
        .bind(&password_hash)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_conflict(e, username))?;

        account_from_row(&row)
    }

    async fn update(&self, id: i64, changes: &AccountChanges) -> RepositoryResult<u64> {
        info!("Updating account: {}", id);

        let password_hash = changes
            .password
            .as_deref()
            .map(hash_password)
            .transpose()
            .map_err(RepositoryError::Hashing)?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = COALESCE($1, username),
                password_hash = COALESCE($2, password_hash)
            WHERE id = $3
            "#,
        )
        .bind(&changes.username)
        .bind(&password_hash)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_conflict(e, changes.username.as_deref().unwrap_or_default()))?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<u64> {
        info!("Deleting account: {}", id);

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, role, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, role, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn admin_exists(&self) -> RepositoryResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE role = 'admin')")
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }
}
