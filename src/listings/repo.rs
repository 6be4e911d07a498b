use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::listings::repo_types::{Listing, ListingFields};

#[async_trait]
pub trait ListingRepo: Send + Sync {
    async fn create(&self, owner_id: Uuid, fields: ListingFields) -> anyhow::Result<Listing>;
    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Listing>>;
    /// Newest first.
    async fn list_all(&self) -> anyhow::Result<Vec<Listing>>;
    /// Newest first.
    async fn list_for_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<Listing>>;
    async fn update(&self, id: Uuid, fields: ListingFields) -> anyhow::Result<Option<Listing>>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

const LISTING_COLUMNS: &str =
    "id, owner_id, title, location, rent, size, capacity, description, image, created_at, occupied";

#[derive(Clone)]
pub struct PgListingRepo {
    db: PgPool,
}

impl PgListingRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ListingRepo for PgListingRepo {
    async fn create(&self, owner_id: Uuid, f: ListingFields) -> anyhow::Result<Listing> {
        let sql = format!(
            r#"
            INSERT INTO listings (owner_id, title, location, rent, size, capacity, description, image, occupied)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {LISTING_COLUMNS}
            "#
        );
        let listing = sqlx::query_as::<_, Listing>(&sql)
            .bind(owner_id)
            .bind(f.title)
            .bind(f.location)
            .bind(f.rent)
            .bind(f.size)
            .bind(f.capacity)
            .bind(f.description)
            .bind(f.image)
            .bind(f.occupied)
            .fetch_one(&self.db)
            .await?;
        Ok(listing)
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Listing>> {
        let sql = format!("SELECT {LISTING_COLUMNS} FROM listings WHERE id = $1");
        let listing = sqlx::query_as::<_, Listing>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(listing)
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Listing>> {
        let sql = format!("SELECT {LISTING_COLUMNS} FROM listings ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, Listing>(&sql).fetch_all(&self.db).await?;
        Ok(rows)
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<Listing>> {
        let sql = format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE owner_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, Listing>(&sql)
            .bind(owner_id)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn update(&self, id: Uuid, f: ListingFields) -> anyhow::Result<Option<Listing>> {
        let sql = format!(
            r#"
            UPDATE listings
               SET title = $2, location = $3, rent = $4, size = $5, capacity = $6,
                   description = $7, image = $8, occupied = $9
             WHERE id = $1
            RETURNING {LISTING_COLUMNS}
            "#
        );
        let listing = sqlx::query_as::<_, Listing>(&sql)
            .bind(id)
            .bind(f.title)
            .bind(f.location)
            .bind(f.rent)
            .bind(f.size)
            .bind(f.capacity)
            .bind(f.description)
            .bind(f.image)
            .bind(f.occupied)
            .fetch_optional(&self.db)
            .await?;
        Ok(listing)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
