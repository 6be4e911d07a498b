use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::{Identity, IdentityRow, NewIdentity, Profile};

/// An insert that collided with a unique key on `users`.
#[derive(Debug, thiserror::Error)]
pub enum DuplicateUser {
    #[error("username already taken")]
    Username,
    #[error("email already taken")]
    Email,
}

fn duplicate_user(e: &sqlx::Error) -> Option<DuplicateUser> {
    let db = e.as_database_error()?;
    if db.code().as_deref() != Some("23505") {
        return None;
    }
    Some(match db.constraint() {
        Some(c) if c.contains("email") => DuplicateUser::Email,
        _ => DuplicateUser::Username,
    })
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Identity>>;
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<Identity>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Identity>>;
    /// Inserts the user and its profile atomically. Unique-key collisions
    /// come back as [`DuplicateUser`].
    async fn create(&self, new: NewIdentity) -> anyhow::Result<Identity>;
    async fn list_all(&self) -> anyhow::Result<Vec<Identity>>;
    /// Returns false when the user has no profile.
    async fn set_verified(&self, id: Uuid, verified: bool) -> anyhow::Result<bool>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

const IDENTITY_SELECT: &str = r#"
    SELECT u.id, u.username, u.email, u.first_name, u.last_name, u.password_hash,
           u.is_staff, u.created_at, p.role, p.phone, p.verified
    FROM users u
    LEFT JOIN profiles p ON p.user_id = u.id
"#;

#[derive(Clone)]
pub struct PgUserRepo {
    db: PgPool,
}

impl PgUserRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn find_one(&self, filter: &str, value: &str) -> anyhow::Result<Option<Identity>> {
        let sql = format!("{IDENTITY_SELECT} WHERE {filter} = $1");
        let row = sqlx::query_as::<_, IdentityRow>(&sql)
            .bind(value)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Identity::from))
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Identity>> {
        let sql = format!("{IDENTITY_SELECT} WHERE u.id = $1");
        let row = sqlx::query_as::<_, IdentityRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Identity::from))
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<Identity>> {
        self.find_one("u.username", username).await
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Identity>> {
        self.find_one("lower(u.email)", &email.to_lowercase()).await
    }

    async fn create(&self, new: NewIdentity) -> anyhow::Result<Identity> {
        let mut tx = self.db.begin().await.context("begin tx")?;

        let (id, created_at) = sqlx::query_as::<_, (Uuid, time::OffsetDateTime)>(
            r#"
            INSERT INTO users (username, email, first_name, last_name, password_hash, is_staff)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, created_at
            "#,
        )
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.password_hash)
        .bind(new.is_staff)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match duplicate_user(&e) {
            Some(dup) => anyhow::Error::new(dup),
            None => anyhow::Error::new(e).context("insert user"),
        })?;

        if let Some(p) = &new.profile {
            sqlx::query(
                r#"
                INSERT INTO profiles (user_id, role, phone, verified)
                VALUES ($1, $2, $3, FALSE)
                "#,
            )
            .bind(id)
            .bind(p.role)
            .bind(&p.phone)
            .execute(&mut *tx)
            .await
            .context("insert profile")?;
        }

        tx.commit().await.context("commit tx")?;

        Ok(Identity {
            id,
            username: new.username,
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            password_hash: new.password_hash,
            is_staff: new.is_staff,
            created_at,
            profile: new.profile.map(|p| Profile {
                role: p.role,
                phone: p.phone,
                verified: false,
            }),
        })
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Identity>> {
        let sql = format!("{IDENTITY_SELECT} ORDER BY u.created_at DESC");
        let rows = sqlx::query_as::<_, IdentityRow>(&sql)
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Identity::from).collect())
    }

    async fn set_verified(&self, id: Uuid, verified: bool) -> anyhow::Result<bool> {
        let res = sqlx::query("UPDATE profiles SET verified = $2 WHERE user_id = $1")
            .bind(id)
            .bind(verified)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
