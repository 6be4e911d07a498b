use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Marketplace role carried by a user's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Owner,
    Renter,
}

impl Role {
    /// Capitalized form used in notices.
    pub fn label(self) -> &'static str {
        match self {
            Role::Owner => "Owner",
            Role::Renter => "Renter",
        }
    }

    pub fn dashboard_path(self) -> &'static str {
        match self {
            Role::Owner => "/dashboard/owner",
            Role::Renter => "/dashboard/renter",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Owner => f.write_str("owner"),
            Role::Renter => f.write_str("renter"),
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Role::Owner),
            "renter" => Ok(Role::Renter),
            other => anyhow::bail!("unknown role {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub role: Role,
    pub phone: String,
    pub verified: bool,
}

/// A user account together with its optional role profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub is_staff: bool,
    pub created_at: OffsetDateTime,
    pub profile: Option<Profile>,
}

impl Identity {
    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().map(|p| p.role)
    }

    pub fn is_verified(&self) -> bool {
        self.profile.as_ref().is_some_and(|p| p.verified)
    }
}

/// Flat `users LEFT JOIN profiles` row.
#[derive(Debug, FromRow)]
pub struct IdentityRow {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub created_at: OffsetDateTime,
    pub role: Option<Role>,
    pub phone: Option<String>,
    pub verified: Option<bool>,
}

impl From<IdentityRow> for Identity {
    fn from(r: IdentityRow) -> Self {
        let profile = r.role.map(|role| Profile {
            role,
            phone: r.phone.unwrap_or_default(),
            verified: r.verified.unwrap_or(false),
        });
        Self {
            id: r.id,
            username: r.username,
            email: r.email,
            first_name: r.first_name,
            last_name: r.last_name,
            password_hash: r.password_hash,
            is_staff: r.is_staff,
            created_at: r.created_at,
            profile,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewProfile {
    pub role: Role,
    pub phone: String,
}

#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub username: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub profile: Option<NewProfile>,
}
