//! Authorization guard
//!
//! Every request passes through [`auth_guard`], which resolves the session
//! cookie and decides, from the path and the account role, whether the
//! request proceeds, is redirected to the login page, or is denied.
//!
//! Paths are classified in the form the static file service resolves them:
//! percent-decoded, with empty and `.` segments dropped.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use crate::{
    error::ApiError,
    models::{Role, Session},
    state::AppState,
};

/// Page unauthenticated browsers are sent to
pub const LOGIN_PAGE: &str = "/login.html";

const PUBLIC_PATHS: &[&str] = &[
    LOGIN_PAGE,
    "/login.js",
    "/login.css",
    "/api/auth/login",
    "/api/auth/logout",
    "/api/health",
];

const ADMIN_PAGES: &[&str] = &[
    "/admin.html",
    "/admin.js",
    "/admin.css",
    "/admin-create.html",
    "/admin-create.js",
];

/// Authenticated user information
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<Session> for CurrentUser {
    fn from(session: Session) -> Self {
        Self {
            id: session.account_id,
            username: session.username,
            role: session.role,
        }
    }
}

/// What a path requires from the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Admin,
}

/// Decoded, normalized form of a request path.
///
/// Returns `None` for paths that cannot name a file under the asset
/// directory (`..` segments, backslashes, NUL bytes, invalid UTF-8).
pub fn canonical_path(raw: &str) -> Option<String> {
    let decoded = urlencoding::decode(raw).ok()?;

    let mut segments = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            s if s.contains('\\') || s.contains('\0') => return None,
            s => segments.push(s),
        }
    }

    Some(format!("/{}", segments.join("/")))
}

/// Classify a canonical request path
pub fn required_access(path: &str) -> Access {
    if PUBLIC_PATHS.contains(&path) {
        Access::Public
    } else if ADMIN_PAGES.contains(&path) || path == "/api/admin" || path.starts_with("/api/admin/")
    {
        Access::Admin
    } else {
        Access::Authenticated
    }
}

fn is_api(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

/// Session and role check in front of every route
pub async fn auth_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let Some(path) = canonical_path(req.uri().path()) else {
        warn!("Rejected malformed path: {}", req.uri().path());
        return (StatusCode::BAD_REQUEST, "Invalid path").into_response();
    };
    let access = required_access(&path);

    if access == Access::Public {
        return next.run(req).await;
    }

    let session = match jar.get(&state.cookie.name) {
        Some(cookie) => match state.sessions.resolve(cookie.value()).await {
            Ok(session) => session,
            Err(e) => return ApiError::from(e).into_response(),
        },
        None => None,
    };

    let Some(session) = session else {
        return if is_api(&path) {
            ApiError::Unauthenticated("Authentication required".to_string()).into_response()
        } else {
            Redirect::to(LOGIN_PAGE).into_response()
        };
    };

    let user = CurrentUser::from(session);
    if access == Access::Admin && !user.is_admin() {
        warn!("Denied {} to non-admin account {}", path, user.username);
        return if is_api(&path) {
            ApiError::Forbidden("Admin access required".to_string()).into_response()
        } else {
            (StatusCode::FORBIDDEN, "Admin access required").into_response()
        };
    }

    req.extensions_mut().insert(user);
    next.run(req).await
}
