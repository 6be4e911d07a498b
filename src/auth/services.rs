use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::RegisterForm,
        password::{hash_password, verify_password},
        repo::{DuplicateUser, UserRepo},
        repo_types::{Identity, NewIdentity, NewProfile, Role},
    },
    config::AdminSeed,
    error::AppError,
};

pub const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Maps an insert that lost a race on a unique key to the same notice the
/// pre-checks give.
fn creation_error(e: anyhow::Error) -> AppError {
    match e.downcast_ref::<DuplicateUser>() {
        Some(DuplicateUser::Username) => AppError::validation("Username already exists."),
        Some(DuplicateUser::Email) => AppError::validation("Email already registered."),
        None => AppError::Internal(e),
    }
}

/// Creates an identity with a `role` profile. Nothing is written when any
/// check fails.
pub async fn register(
    users: &dyn UserRepo,
    role: Role,
    form: RegisterForm,
) -> Result<Identity, AppError> {
    let email = form.email.trim().to_lowercase();
    let mut username = form.username.trim().to_string();
    if username.is_empty() {
        if let Some((local, _)) = email.split_once('@') {
            username = local.to_string();
        }
    }

    if username.is_empty() {
        return Err(AppError::validation("A username or valid email is required."));
    }
    if !email.is_empty() && !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::validation("Invalid email address."));
    }
    if form.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters."
        )));
    }
    if form.password != form.confirm_password {
        return Err(AppError::validation("Passwords do not match."));
    }
    if users.find_by_username(&username).await?.is_some() {
        warn!(username = %username, "username already registered");
        return Err(AppError::validation("Username already exists."));
    }
    if !email.is_empty() && users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::validation("Email already registered."));
    }

    let password_hash = hash_password(&form.password)?;
    let identity = users
        .create(NewIdentity {
            username,
            email: (!email.is_empty()).then_some(email),
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            password_hash,
            is_staff: false,
            profile: Some(NewProfile {
                role,
                phone: form.phone.trim().to_string(),
            }),
        })
        .await
        .map_err(creation_error)?;

    info!(user_id = %identity.id, username = %identity.username, %role, "user registered");
    Ok(identity)
}

pub async fn authenticate(
    users: &dyn UserRepo,
    username: &str,
    password: &str,
) -> Result<Identity, AppError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AppError::validation("Username and password are required."));
    }

    let invalid = || AppError::AuthenticationFailure("Invalid username or password.".into());
    let Some(user) = users.find_by_username(username).await? else {
        warn!(username = %username, "login unknown username");
        return Err(invalid());
    };
    if !verify_password(password, &user.password_hash)? {
        warn!(username = %username, user_id = %user.id, "login invalid password");
        return Err(invalid());
    }
    Ok(user)
}

/// Creates the configured staff account unless the username is taken.
pub async fn ensure_admin(users: &dyn UserRepo, seed: &AdminSeed) -> anyhow::Result<()> {
    if let Some(existing) = users.find_by_username(&seed.username).await? {
        if !existing.is_staff {
            warn!(username = %seed.username, "admin username belongs to a non-staff user");
        }
        return Ok(());
    }
    let user = users
        .create(NewIdentity {
            username: seed.username.clone(),
            email: None,
            first_name: String::new(),
            last_name: String::new(),
            password_hash: hash_password(&seed.password)?,
            is_staff: true,
            profile: None,
        })
        .await?;
    info!(user_id = %user.id, username = %user.username, "staff account created");
    Ok(())
}
