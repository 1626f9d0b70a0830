//! Login, logout and current-identity handlers

use axum::{
    Extension, Json,
    extract::State,
    response::IntoResponse,
};
use axum_extra::extract::{
    WithRejection,
    cookie::{Cookie, CookieJar, SameSite},
};
use serde::Serialize;
use tracing::{info, warn};

use super::MessageResponse;
use crate::{
    config::CookieConfig,
    error::{ApiError, ApiResult},
    middleware::CurrentUser,
    models::{CredentialsRequest, Role},
    password::verify_login,
    state::AppState,
};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Response for the current identity
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

fn session_cookie(config: &CookieConfig, token: String) -> Cookie<'static> {
    Cookie::build((config.name.clone(), token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure)
        .path("/")
        .build()
}

fn expired_cookie(config: &CookieConfig) -> Cookie<'static> {
    Cookie::build((config.name.clone(), "")).path("/").build()
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<CredentialsRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let credentials = payload.validate()?;
    let limiter_key = credentials.username.to_lowercase();

    if state.login_limiter.is_locked(&limiter_key).await {
        warn!("Login locked out for user: {}", credentials.username);
        return Err(ApiError::TooManyAttempts);
    }

    let account = state.accounts.find_by_username(&credentials.username).await?;
    let verified = verify_login(
        &credentials.password,
        account.as_ref().map(|account| account.password_hash.as_str()),
    );
    let account = account.filter(|_| verified);

    let Some(account) = account else {
        warn!("Failed login attempt for user: {}", credentials.username);
        state.login_limiter.record_failure(&limiter_key).await;
        return Err(ApiError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
    };

    state.login_limiter.reset(&limiter_key).await;

    // A fresh token on every login; the previous one from this browser is dropped
    if let Some(previous) = jar.get(&state.cookie.name) {
        state.sessions.destroy(previous.value()).await?;
    }
    let session = state.sessions.create(&account).await?;
    info!("User logged in: {}", account.username);

    let jar = jar.add(session_cookie(&state.cookie, session.token));
    Ok((jar, MessageResponse::new("Login successful")))
}

/// Logout endpoint; succeeds whether or not a session was present
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<impl IntoResponse> {
    if let Some(cookie) = jar.get(&state.cookie.name) {
        if state.sessions.destroy(cookie.value()).await? {
            info!("Session ended by logout");
        }
    }

    let jar = jar.remove(expired_cookie(&state.cookie));
    Ok((jar, MessageResponse::new("Logged out successfully")))
}

/// Identity behind the current session
pub async fn me(Extension(user): Extension<CurrentUser>) -> impl IntoResponse {
    Json(MeResponse {
        id: user.id,
        username: user.username,
        role: user.role,
    })
}
