//! Session model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::account::Role;

/// Authenticated identity referenced by a session cookie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub account_id: i64,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}
