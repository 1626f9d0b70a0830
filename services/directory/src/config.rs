//! Service configuration
//!
//! Settings are read from `DIRECTORY_*` environment variables layered over
//! built-in defaults. Database and Redis connection settings keep their own
//! variables (see `common::database` and `common::cache`).

use std::{path::PathBuf, str::FromStr};

use anyhow::{Context, Result, bail};
use config::{Config, Environment};
use serde::Deserialize;

use crate::{geocode::GeocoderConfig, rate_limiter::RateLimiterConfig};

/// Where employee and account records live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => bail!("Unknown storage backend: {}", other),
        }
    }
}

/// Where login sessions live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    Memory,
    Redis,
}

impl FromStr for SessionBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(SessionBackend::Memory),
            "redis" => Ok(SessionBackend::Redis),
            other => bail!("Unknown session backend: {}", other),
        }
    }
}

/// Raw settings as read from the environment
#[derive(Debug, Deserialize)]
struct Settings {
    bind_address: String,
    public_dir: String,
    storage: String,
    session_backend: String,
    admin_username: Option<String>,
    admin_password: Option<String>,
    cookie_name: String,
    cookie_secure: bool,
    geocoder_url: String,
    geocoder_user_agent: String,
    geocoder_language: String,
    geocoder_viewbox: String,
    login_max_attempts: u32,
    login_window_seconds: u64,
    login_lockout_seconds: u64,
}

/// Session cookie settings
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "directory_session".to_string(),
            secure: false,
        }
    }
}

/// Bootstrap administrator credentials
#[derive(Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub public_dir: PathBuf,
    pub storage: StorageBackend,
    pub session_backend: SessionBackend,
    pub admin: Option<AdminBootstrap>,
    pub cookie: CookieConfig,
    pub geocoder: GeocoderConfig,
    pub login_limits: RateLimiterConfig,
}

impl AppConfig {
    /// Load the configuration from `DIRECTORY_*` environment variables
    ///
    /// # Environment Variables
    /// - `DIRECTORY_BIND_ADDRESS` (default: "0.0.0.0:3000")
    /// - `DIRECTORY_PUBLIC_DIR`: static assets (default: "public")
    /// - `DIRECTORY_STORAGE`: "postgres" or "memory" (default: "postgres")
    /// - `DIRECTORY_SESSION_BACKEND`: "memory" or "redis" (default: "memory")
    /// - `DIRECTORY_ADMIN_USERNAME` / `DIRECTORY_ADMIN_PASSWORD`: bootstrap administrator
    /// - `DIRECTORY_COOKIE_NAME` (default: "directory_session"), `DIRECTORY_COOKIE_SECURE` (default: false)
    /// - `DIRECTORY_GEOCODER_URL`, `DIRECTORY_GEOCODER_USER_AGENT`,
    ///   `DIRECTORY_GEOCODER_LANGUAGE`, `DIRECTORY_GEOCODER_VIEWBOX`
    /// - `DIRECTORY_LOGIN_MAX_ATTEMPTS` (default: 5), `DIRECTORY_LOGIN_WINDOW_SECONDS` (default: 300),
    ///   `DIRECTORY_LOGIN_LOCKOUT_SECONDS` (default: 900)
    pub fn load() -> Result<Self> {
        let geocoder = GeocoderConfig::default();
        let limits = RateLimiterConfig::default();
        let cookie = CookieConfig::default();

        let settings: Settings = Config::builder()
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("public_dir", "public")?
            .set_default("storage", "postgres")?
            .set_default("session_backend", "memory")?
            .set_default("cookie_name", cookie.name)?
            .set_default("cookie_secure", cookie.secure)?
            .set_default("geocoder_url", geocoder.url)?
            .set_default("geocoder_user_agent", geocoder.user_agent)?
            .set_default("geocoder_language", geocoder.language)?
            .set_default("geocoder_viewbox", geocoder.viewbox)?
            .set_default("login_max_attempts", i64::from(limits.max_attempts))?
            .set_default("login_window_seconds", limits.window_seconds as i64)?
            .set_default("login_lockout_seconds", limits.lockout_seconds as i64)?
            .add_source(Environment::with_prefix("DIRECTORY").try_parsing(true))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        Self::try_from(settings)
    }
}

impl TryFrom<Settings> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(settings: Settings) -> Result<Self> {
        validate_viewbox(&settings.geocoder_viewbox)?;

        let admin = match (settings.admin_username, settings.admin_password) {
            (Some(username), Some(password))
                if !username.trim().is_empty() && !password.is_empty() =>
            {
                Some(AdminBootstrap {
                    username: username.trim().to_string(),
                    password,
                })
            }
            (None, None) => None,
            _ => bail!(
                "DIRECTORY_ADMIN_USERNAME and DIRECTORY_ADMIN_PASSWORD must be set together"
            ),
        };

        if settings.login_max_attempts == 0 {
            bail!("DIRECTORY_LOGIN_MAX_ATTEMPTS must be at least 1");
        }

        Ok(AppConfig {
            bind_address: settings.bind_address,
            public_dir: PathBuf::from(settings.public_dir),
            storage: settings.storage.parse()?,
            session_backend: settings.session_backend.parse()?,
            admin,
            cookie: CookieConfig {
                name: settings.cookie_name,
                secure: settings.cookie_secure,
            },
            geocoder: GeocoderConfig {
                url: settings.geocoder_url,
                user_agent: settings.geocoder_user_agent,
                language: settings.geocoder_language,
                viewbox: settings.geocoder_viewbox,
            },
            login_limits: RateLimiterConfig {
                max_attempts: settings.login_max_attempts,
                window_seconds: settings.login_window_seconds,
                lockout_seconds: settings.login_lockout_seconds,
            },
        })
    }
}

/// A viewbox is four comma-separated numbers: `left,top,right,bottom`
fn validate_viewbox(viewbox: &str) -> Result<()> {
    let parts: Vec<&str> = viewbox.split(',').map(str::trim).collect();
    if parts.len() != 4 || parts.iter().any(|p| p.parse::<f64>().is_err()) {
        bail!("Invalid geocoder viewbox: {}", viewbox);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "DIRECTORY_BIND_ADDRESS",
        "DIRECTORY_STORAGE",
        "DIRECTORY_SESSION_BACKEND",
        "DIRECTORY_ADMIN_USERNAME",
        "DIRECTORY_ADMIN_PASSWORD",
        "DIRECTORY_COOKIE_SECURE",
        "DIRECTORY_GEOCODER_VIEWBOX",
        "DIRECTORY_LOGIN_MAX_ATTEMPTS",
    ];

    fn clear_env() {
        for var in VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();

        let config = AppConfig::load().unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:3000");
        assert_eq!(config.public_dir, PathBuf::from("public"));
        assert_eq!(config.storage, StorageBackend::Postgres);
        assert_eq!(config.session_backend, SessionBackend::Memory);
        assert!(config.admin.is_none());
        assert!(!config.cookie.secure);
        assert_eq!(config.geocoder.viewbox, "123.80,10.45,124.05,10.20");
        assert_eq!(config.login_limits.max_attempts, 5);
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        clear_env();
        unsafe {
            std::env::set_var("DIRECTORY_BIND_ADDRESS", "127.0.0.1:8080");
            std::env::set_var("DIRECTORY_STORAGE", "memory");
            std::env::set_var("DIRECTORY_SESSION_BACKEND", "redis");
            std::env::set_var("DIRECTORY_ADMIN_USERNAME", "poc@admin");
            std::env::set_var("DIRECTORY_ADMIN_PASSWORD", "12345");
            std::env::set_var("DIRECTORY_COOKIE_SECURE", "true");
            std::env::set_var("DIRECTORY_LOGIN_MAX_ATTEMPTS", "3");
        }

        let config = AppConfig::load().unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.session_backend, SessionBackend::Redis);
        let admin = config.admin.unwrap();
        assert_eq!(admin.username, "poc@admin");
        assert_eq!(admin.password, "12345");
        assert!(config.cookie.secure);
        assert_eq!(config.login_limits.max_attempts, 3);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_values_are_rejected() {
        clear_env();
        unsafe {
            std::env::set_var("DIRECTORY_STORAGE", "mysql");
        }
        assert!(AppConfig::load().is_err());

        clear_env();
        unsafe {
            std::env::set_var("DIRECTORY_GEOCODER_VIEWBOX", "1,2,3");
        }
        assert!(AppConfig::load().is_err());

        clear_env();
        unsafe {
            std::env::set_var("DIRECTORY_ADMIN_USERNAME", "poc@admin");
        }
        assert!(AppConfig::load().is_err());

        clear_env();
    }

    #[test]
    fn test_admin_password_is_redacted() {
        let admin = AdminBootstrap {
            username: "poc@admin".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{:?}", admin);
        assert!(debug.contains("poc@admin"));
        assert!(!debug.contains("hunter2"));
    }
}
