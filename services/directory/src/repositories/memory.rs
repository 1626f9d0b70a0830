//! In-memory stores with the same contract as the PostgreSQL repositories.
//!
//! Used by the HTTP tests and by `DIRECTORY_STORAGE=memory`. Nothing is
//! persisted across restarts.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{
    AccountStore, EmployeeStore, RepositoryError, RepositoryResult, username_conflict,
};
use crate::{
    models::{Account, AccountChanges, Employee, EmployeeFields, Role},
    password::hash_password,
};

/// Rows keyed by id, plus the next id to hand out
#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// In-memory employee store
#[derive(Debug, Clone, Default)]
pub struct MemoryEmployeeStore {
    table: Arc<RwLock<Table<Employee>>>,
}

impl MemoryEmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmployeeStore for MemoryEmployeeStore {
    async fn list_by_archived(&self, archived: bool) -> RepositoryResult<Vec<Employee>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|e| e.is_archived == archived)
            .cloned()
            .collect())
    }

    async fn create(&self, fields: &EmployeeFields) -> RepositoryResult<Employee> {
        let mut table = self.table.write().await;
        let id = table.allocate_id();

        let employee = Employee {
            id,
            name: fields.name.clone(),
            position: fields.position.clone(),
            address: fields.address.clone(),
            exact_address: fields.exact_address.clone(),
            latitude: fields.latitude,
            longitude: fields.longitude,
            photo_data: fields.photo_data.clone(),
            photo_name: fields.photo_name.clone(),
            is_archived: false,
            created_at: Utc::now(),
        };
        table.rows.insert(id, employee.clone());

        Ok(employee)
    }

    async fn update(&self, id: i64, fields: &EmployeeFields) -> RepositoryResult<u64> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&id) {
            Some(employee) => {
                employee.name = fields.name.clone();
                employee.position = fields.position.clone();
                employee.address = fields.address.clone();
                employee.exact_address = fields.exact_address.clone();
                employee.latitude = fields.latitude;
                employee.longitude = fields.longitude;
                employee.photo_data = fields.photo_data.clone();
                employee.photo_name = fields.photo_name.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: i64) -> RepositoryResult<u64> {
        let mut table = self.table.write().await;
        Ok(u64::from(table.rows.remove(&id).is_some()))
    }

    async fn set_archived(&self, id: i64, archived: bool) -> RepositoryResult<u64> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&id) {
            Some(employee) => {
                employee.is_archived = archived;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(true)
    }
}

/// In-memory account store
#[derive(Debug, Clone, Default)]
pub struct MemoryAccountStore {
    table: Arc<RwLock<Table<Account>>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn list(&self) -> RepositoryResult<Vec<Account>> {
        let table = self.table.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn create(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> RepositoryResult<Account> {
        let password_hash = hash_password(password).map_err(RepositoryError::Hashing)?;

        let mut table = self.table.write().await;
        if table.rows.values().any(|a| a.username == username) {
            return Err(username_conflict(username));
        }

        let id = table.allocate_id();
        let account = Account {
            id,
            username: username.to_string(),
            password_hash,
            role,
            created_at: Utc::now(),
        };
        table.rows.insert(id, account.clone());

        Ok(account)
    }

    async fn update(&self, id: i64, changes: &AccountChanges) -> RepositoryResult<u64> {
        let password_hash = changes
            .password
            .as_deref()
            .map(hash_password)
            .transpose()
            .map_err(RepositoryError::Hashing)?;

        let mut table = self.table.write().await;
        if let Some(username) = &changes.username {
            let taken = table
                .rows
                .values()
                .any(|a| a.id != id && &a.username == username);
            if taken {
                return Err(username_conflict(username));
            }
        }

        match table.rows.get_mut(&id) {
            Some(account) => {
                if let Some(username) = &changes.username {
                    account.username = username.clone();
                }
                if let Some(hash) = password_hash {
                    account.password_hash = hash;
                }
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: i64) -> RepositoryResult<u64> {
        let mut table = self.table.write().await;
        Ok(u64::from(table.rows.remove(&id).is_some()))
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<Account>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|a| a.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Account>> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn admin_exists(&self) -> RepositoryResult<bool> {
        let table = self.table.read().await;
        Ok(table.rows.values().any(Account::is_admin))
    }
}
