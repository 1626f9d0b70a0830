//! Employee repository for database operations

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use super::{EmployeeStore, RepositoryResult};
use crate::models::{Employee, EmployeeFields};

/// PostgreSQL-backed employee repository
#[derive(Clone)]
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    /// Create a new employee repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeStore for EmployeeRepository {
    async fn list_by_archived(&self, archived: bool) -> RepositoryResult<Vec<Employee>> {
        let employees = sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, name, position, address, exact_address, latitude, longitude,
                   photo_data, photo_name, is_archived, created_at
            FROM employees
            WHERE is_archived = $1
            ORDER BY id
            "#,
        )
        .bind(archived)
        .fetch_all(&self.pool)
        .await?;

        Ok(employees)
    }

    async fn create(&self, fields: &EmployeeFields) -> RepositoryResult<Employee> {
        info!("Creating employee: {}", fields.name);

        let employee = sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees
                (name, position, address, exact_address, latitude, longitude, photo_data, photo_name)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, position, address, exact_address, latitude, longitude,
                      photo_data, photo_name, is_archived, created_at
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.position)
        .bind(&fields.address)
        .bind(&fields.exact_address)
        .bind(fields.latitude)
        .bind(fields.longitude)
        .bind(&fields.photo_data)
        .bind(&fields.photo_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(employee)
    }

    async fn update(&self, id: i64, fields: &EmployeeFields) -> RepositoryResult<u64> {
        info!("Updating employee: {}", id);

        let result = sqlx::query(
            r#"
            UPDATE employees
            SET name = $1, position = $2, address = $3, exact_address = $4,
                latitude = $5, longitude = $6, photo_data = $7, photo_name = $8
            WHERE id = $9
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.position)
        .bind(&fields.address)
        .bind(&fields.exact_address)
        .bind(fields.latitude)
        .bind(fields.longitude)
        .bind(&fields.photo_data)
        .bind(&fields.photo_name)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: i64) -> RepositoryResult<u64> {
        info!("Deleting employee: {}", id);

        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn set_archived(&self, id: i64, archived: bool) -> RepositoryResult<u64> {
        info!("Setting archive flag of employee {} to {}", id, archived);

        let result = sqlx::query("UPDATE employees SET is_archived = $1 WHERE id = $2")
            .bind(archived)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(common::database::health_check(&self.pool)
            .await
            .unwrap_or(false))
    }
}
