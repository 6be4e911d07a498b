use serde::Serialize;

use crate::auth::repo_types::Identity;

#[derive(Debug, Serialize)]
pub struct AdminView {
    pub users: Vec<Identity>,
    pub owners: usize,
    pub renters: usize,
    /// Profiles still waiting for verification.
    pub unverified: usize,
}
