//! Role gates called at the top of every protected handler.

use tracing::warn;

use crate::{
    auth::repo_types::{Identity, Role},
    error::AppError,
};

pub fn require_login(user: Option<Identity>) -> Result<Identity, AppError> {
    user.ok_or_else(|| {
        warn!("anonymous request to protected page");
        AppError::denied("Please log in to continue.")
    })
}

/// Continues only for an authenticated identity whose profile has `role`.
pub fn require_role(user: Option<Identity>, role: Role) -> Result<Identity, AppError> {
    let user = require_login(user)?;
    if user.role() == Some(role) {
        return Ok(user);
    }
    warn!(user_id = %user.id, required = %role, actual = ?user.role(), "role gate denied");
    Err(AppError::denied(format!(
        "Access denied: this page is for {}s only.",
        role
    )))
}

pub fn require_staff(user: Option<Identity>) -> Result<Identity, AppError> {
    let user = require_login(user)?;
    if user.is_staff {
        return Ok(user);
    }
    warn!(user_id = %user.id, "staff gate denied");
    Err(AppError::denied("Access denied: administrators only."))
}
