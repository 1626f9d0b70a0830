//! Employee directory service
//!
//! Stores employee records with geocoded coordinates, serves them to the map
//! client, proxies address lookups to a geocoding service, and manages the
//! login accounts allowed to use it.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod geocode;
pub mod middleware;
pub mod models;
pub mod password;
pub mod rate_limiter;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod state;
pub mod validation;

pub use routes::create_router;
pub use state::AppState;
