//! Repositories for database operations
//!
//! The data access layer is expressed as two traits so the router can run
//! against PostgreSQL in production and against in-memory stores in tests or
//! the demo mode. Mutations report the number of matched rows; a count of 0
//! means no record had the given id.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Account, AccountChanges, Employee, EmployeeFields, Role};

pub mod account;
pub mod employee;
pub mod memory;

pub use account::AccountRepository;
pub use employee::EmployeeRepository;
pub use memory::{MemoryAccountStore, MemoryEmployeeStore};

/// Errors raised by the stores
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// A unique constraint (account username) was violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The underlying query failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing failed
    #[error("{0}")]
    Hashing(String),
}

/// Type alias for repository results
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Employee records
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Employees whose archive flag equals `archived`, by id
    async fn list_by_archived(&self, archived: bool) -> RepositoryResult<Vec<Employee>>;

    /// Insert a new, non-archived employee
    async fn create(&self, fields: &EmployeeFields) -> RepositoryResult<Employee>;

    /// Overwrite every mutable field of employee `id`
    async fn update(&self, id: i64, fields: &EmployeeFields) -> RepositoryResult<u64>;

    /// Remove employee `id` permanently
    async fn delete(&self, id: i64) -> RepositoryResult<u64>;

    /// Set the archive flag of employee `id`
    async fn set_archived(&self, id: i64, archived: bool) -> RepositoryResult<u64>;

    /// Whether the backing store is reachable
    async fn health_check(&self) -> RepositoryResult<bool>;

    async fn list_active(&self) -> RepositoryResult<Vec<Employee>> {
        self.list_by_archived(false).await
    }

    async fn list_archived(&self) -> RepositoryResult<Vec<Employee>> {
        self.list_by_archived(true).await
    }
}

/// Login accounts
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// All accounts, by id
    async fn list(&self) -> RepositoryResult<Vec<Account>>;

    /// Hash `password` and insert the account; a taken username is a conflict
    async fn create(&self, username: &str, password: &str, role: Role)
    -> RepositoryResult<Account>;

    /// Rename and/or re-hash the password of account `id`
    async fn update(&self, id: i64, changes: &AccountChanges) -> RepositoryResult<u64>;

    /// Remove account `id` permanently
    async fn delete(&self, id: i64) -> RepositoryResult<u64>;

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<Account>>;

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Account>>;

    /// Whether any account holds the admin role
    async fn admin_exists(&self) -> RepositoryResult<bool>;
}

pub(crate) fn username_conflict(username: &str) -> RepositoryError {
    RepositoryError::Conflict(format!("Username {} already exists", username))
}
