//! Account management handlers (admin only; the guard enforces the role)

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use tracing::info;

use super::MutationResponse;
use crate::{
    error::{ApiError, ApiResult},
    middleware::CurrentUser,
    models::{AccountSummary, CredentialsRequest, Role, UpdateAccountRequest},
    state::AppState,
};

type AccountId = WithRejection<Path<i64>, ApiError>;

/// All login accounts
pub async fn list_users(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let accounts: Vec<AccountSummary> = state
        .accounts
        .list()
        .await?
        .into_iter()
        .map(AccountSummary::from)
        .collect();

    Ok(Json(accounts))
}

/// Provision a new (non-admin) account
pub async fn create_user(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    WithRejection(Json(payload), _): WithRejection<Json<CredentialsRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let credentials = payload.validate_new_account()?;
    let account = state
        .accounts
        .create(&credentials.username, &credentials.password, Role::User)
        .await?;

    info!("{} created account {}", admin.username, account.username);
    Ok((StatusCode::CREATED, Json(AccountSummary::from(account))))
}

/// Rename an account and/or set a new password
pub async fn update_user(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    WithRejection(Path(id), _): AccountId,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateAccountRequest>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let changes = payload.validate()?;
    let affected = state.accounts.update(id, &changes).await?;

    if affected > 0 {
        // Sessions carry the username, so any change invalidates them
        state.sessions.revoke_account(id).await?;
        info!("{} updated account {}", admin.username, id);
    }

    Ok(MutationResponse::new("User updated successfully", affected))
}

/// Remove an account; the administrator account cannot be removed
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    WithRejection(Path(id), _): AccountId,
) -> ApiResult<impl IntoResponse> {
    if let Some(account) = state.accounts.find_by_id(id).await? {
        if account.is_admin() {
            return Err(ApiError::Validation(
                "The administrator account cannot be deleted".to_string(),
            ));
        }
    }

    let affected = state.accounts.delete(id).await?;
    if affected > 0 {
        state.sessions.revoke_account(id).await?;
        info!("{} deleted account {}", admin.username, id);
    }

    Ok(MutationResponse::new("User deleted successfully", affected))
}
