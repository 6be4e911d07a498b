use serde::{Deserialize, Serialize};

use crate::auth::repo_types::Identity;

/// Form body for `/register/{role}`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

/// Form body for `/login/{role}`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Landing page view model.
#[derive(Debug, Serialize)]
pub struct HomeView {
    pub user: Option<Identity>,
    pub login_paths: [&'static str; 2],
    pub register_paths: [&'static str; 2],
}
