//! Login account model and admin request payloads

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{ValidationError, non_blank, validate_username};

/// Capability carried by an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// Account entity. Holds the password hash, so it is never serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Account as listed in the admin panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSummary {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountSummary {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            role: account.role,
            created_at: account.created_at,
        }
    }
}

/// Username and password pair, used for both login and account creation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Validated username and password
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl CredentialsRequest {
    /// Both fields present; the username is trimmed, the password kept verbatim
    pub fn validate(self) -> Result<Credentials, ValidationError> {
        let missing = || ValidationError::new("Username and password are required");

        let username = non_blank(self.username).ok_or_else(missing)?;
        let password = self
            .password
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(missing)?;

        Ok(Credentials { username, password })
    }

    /// Like [`CredentialsRequest::validate`], also enforcing the username format
    pub fn validate_new_account(self) -> Result<Credentials, ValidationError> {
        let credentials = self.validate()?;
        validate_username(&credentials.username)?;
        Ok(credentials)
    }
}

/// Admin update body; at least one field must be present
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAccountRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Validated account changes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountChanges {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl UpdateAccountRequest {
    pub fn validate(self) -> Result<AccountChanges, ValidationError> {
        let username = non_blank(self.username);
        let password = self.password.filter(|p| !p.trim().is_empty());

        if username.is_none() && password.is_none() {
            return Err(ValidationError::new("Username or password is required"));
        }
        if let Some(name) = &username {
            validate_username(name)?;
        }

        Ok(AccountChanges { username, password })
    }
}
