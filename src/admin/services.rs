use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    admin::dto::AdminView,
    auth::{
        repo::UserRepo,
        repo_types::{Identity, Role},
    },
    error::AppError,
};

pub async fn overview(users: &dyn UserRepo) -> Result<AdminView, AppError> {
    let users = users.list_all().await?;
    let count = |role: Role| users.iter().filter(|u| u.role() == Some(role)).count();
    let owners = count(Role::Owner);
    let renters = count(Role::Renter);
    let unverified = users
        .iter()
        .filter(|u| u.profile.as_ref().is_some_and(|p| !p.verified))
        .count();
    Ok(AdminView { users, owners, renters, unverified })
}

/// Sets the verification flag on a profile. `user_type` must name the
/// profile's actual role.
pub async fn set_verification(
    users: &dyn UserRepo,
    user_id: Uuid,
    user_type: &str,
    verified: bool,
) -> Result<Identity, AppError> {
    let role: Role = user_type
        .parse()
        .map_err(|_| AppError::validation("Unknown user type."))?;
    let user = users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    if user.role() != Some(role) {
        warn!(%user_id, requested = %role, actual = ?user.role(), "verification type mismatch");
        return Err(AppError::validation(format!(
            "{} is not registered as a {role}.",
            user.username
        )));
    }
    if !users.set_verified(user_id, verified).await? {
        return Err(AppError::NotFound("Profile"));
    }
    info!(%user_id, verified, "profile verification changed");
    Ok(user)
}

pub async fn delete_user(
    users: &dyn UserRepo,
    actor: &Identity,
    user_id: Uuid,
) -> Result<Identity, AppError> {
    if actor.id == user_id {
        return Err(AppError::validation("You cannot delete your own account."));
    }
    let user = users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    users.delete(user_id).await?;
    info!(%user_id, username = %user.username, actor_id = %actor.id, "user deleted");
    Ok(user)
}
