//! Startup provisioning of the administrator account

use tracing::{info, warn};

use crate::{
    config::AdminBootstrap,
    models::Role,
    repositories::{AccountStore, RepositoryResult},
};

/// Make sure the configured administrator exists.
///
/// An existing account with that username is left untouched, including its
/// password and role.
pub async fn ensure_admin(
    accounts: &dyn AccountStore,
    admin: Option<&AdminBootstrap>,
) -> RepositoryResult<()> {
    match admin {
        Some(admin) => {
            if accounts.find_by_username(&admin.username).await?.is_some() {
                info!("Administrator account {} already exists", admin.username);
            } else {
                accounts
                    .create(&admin.username, &admin.password, Role::Admin)
                    .await?;
                info!("Created administrator account {}", admin.username);
            }
        }
        None => {
            if !accounts.admin_exists().await? {
                warn!(
                    "No administrator account exists; set DIRECTORY_ADMIN_USERNAME and DIRECTORY_ADMIN_PASSWORD"
                );
            }
        }
    }

    Ok(())
}
