//! Application state shared across handlers

use std::sync::Arc;

use crate::{
    config::CookieConfig,
    geocode::Geocoder,
    rate_limiter::RateLimiter,
    repositories::{AccountStore, EmployeeStore},
    session::SessionManager,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub employees: Arc<dyn EmployeeStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub sessions: SessionManager,
    pub geocoder: Arc<dyn Geocoder>,
    pub login_limiter: RateLimiter,
    pub cookie: CookieConfig,
}
