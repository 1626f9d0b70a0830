//! Shared harness: the full router over in-memory stores and a stub geocoder

#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use directory::{
    AppState,
    config::CookieConfig,
    create_router,
    geocode::{GeocodeError, Geocoder},
    models::Role,
    rate_limiter::{RateLimiter, RateLimiterConfig},
    repositories::{AccountStore, MemoryAccountStore, MemoryEmployeeStore},
    session::SessionManager,
};

pub const ADMIN_USERNAME: &str = "poc@admin";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const USER_USERNAME: &str = "jane";
pub const USER_PASSWORD: &str = "jane-password";
pub const LOGIN_ATTEMPTS: u32 = 3;

/// Geocoder answering every query with a fixed result, or failing
pub struct StubGeocoder {
    pub results: Option<Value>,
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn search(&self, _query: &str) -> Result<Value, GeocodeError> {
        self.results.clone().ok_or(GeocodeError::Status(503))
    }
}

pub struct TestApp {
    pub router: Router,
    pub accounts: Arc<MemoryAccountStore>,
}

/// Response parts the tests look at
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// `name=value` pair of the session cookie set by this response
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("directory_session=") && !v.contains("Max-Age=0"))
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }
}

pub fn nominatim_results() -> Value {
    json!([
        {
            "place_id": 1,
            "display_name": "Ayala Center Cebu, Cebu Business Park, Cebu City",
            "lat": "10.3181",
            "lon": "123.9053"
        }
    ])
}

pub async fn spawn_app() -> Result<TestApp> {
    spawn_app_with_geocoder(Some(nominatim_results())).await
}

pub async fn spawn_app_with_geocoder(results: Option<Value>) -> Result<TestApp> {
    build_app(results, None).await
}

/// App serving static files from `assets` behind the guard
pub async fn spawn_app_with_assets(assets: PathBuf) -> Result<TestApp> {
    build_app(Some(nominatim_results()), Some(assets)).await
}

async fn build_app(results: Option<Value>, assets: Option<PathBuf>) -> Result<TestApp> {
    let accounts = Arc::new(MemoryAccountStore::new());
    accounts
        .create(ADMIN_USERNAME, ADMIN_PASSWORD, Role::Admin)
        .await?;
    accounts
        .create(USER_USERNAME, USER_PASSWORD, Role::User)
        .await?;

    let state = AppState {
        employees: Arc::new(MemoryEmployeeStore::new()),
        accounts: accounts.clone(),
        sessions: SessionManager::in_memory(),
        geocoder: Arc::new(StubGeocoder { results }),
        login_limiter: RateLimiter::new(RateLimiterConfig {
            max_attempts: LOGIN_ATTEMPTS,
            window_seconds: 300,
            lockout_seconds: 900,
        }),
        cookie: CookieConfig::default(),
    };

    Ok(TestApp {
        router: create_router(state, assets),
        accounts,
    })
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await?.to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        Ok(TestResponse {
            status,
            headers,
            body,
        })
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Result<TestResponse> {
        self.request(Method::GET, uri, cookie, None).await
    }

    /// Log in and return the session cookie
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let response = self
            .request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await?;
        anyhow::ensure!(
            response.status == StatusCode::OK,
            "login failed with {}: {}",
            response.status,
            response.body
        );
        response
            .session_cookie()
            .ok_or_else(|| anyhow::anyhow!("login response carried no session cookie"))
    }

    pub async fn login_admin(&self) -> Result<String> {
        self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }

    pub async fn login_user(&self) -> Result<String> {
        self.login(USER_USERNAME, USER_PASSWORD).await
    }
}

pub fn employee_payload(name: &str) -> Value {
    json!({
        "name": name,
        "position": "Eng",
        "address": "X",
        "exactAddress": "X",
        "latitude": 10.3,
        "longitude": 123.9
    })
}
