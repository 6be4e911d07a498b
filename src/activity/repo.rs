use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::activity::repo_types::{ListingView, Message, NewMessage};

/// Append-only view and message logs.
#[async_trait]
pub trait ActivityRepo: Send + Sync {
    async fn record_view(
        &self,
        listing_id: Uuid,
        viewer_id: Option<Uuid>,
    ) -> anyhow::Result<ListingView>;
    /// Listings without views are absent from the map.
    async fn view_counts(&self, listing_ids: &[Uuid]) -> anyhow::Result<HashMap<Uuid, i64>>;
    async fn send_message(&self, new: NewMessage) -> anyhow::Result<Message>;
    /// Sent and received, newest first.
    async fn messages_for(&self, user_id: Uuid) -> anyhow::Result<Vec<Message>>;
}

#[derive(Clone)]
pub struct PgActivityRepo {
    db: PgPool,
}

impl PgActivityRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ActivityRepo for PgActivityRepo {
    async fn record_view(
        &self,
        listing_id: Uuid,
        viewer_id: Option<Uuid>,
    ) -> anyhow::Result<ListingView> {
        let view = sqlx::query_as::<_, ListingView>(
            r#"
            INSERT INTO listing_views (listing_id, viewer_id)
            VALUES ($1, $2)
            RETURNING id, listing_id, viewer_id, viewed_at
            "#,
        )
        .bind(listing_id)
        .bind(viewer_id)
        .fetch_one(&self.db)
        .await?;
        Ok(view)
    }

    async fn view_counts(&self, listing_ids: &[Uuid]) -> anyhow::Result<HashMap<Uuid, i64>> {
        let rows = sqlx::query_as::<_, (Uuid, i64)>(
            r#"
            SELECT listing_id, COUNT(*)
              FROM listing_views
             WHERE listing_id = ANY($1)
             GROUP BY listing_id
            "#,
        )
        .bind(listing_ids)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().collect())
    }

    async fn send_message(&self, new: NewMessage) -> anyhow::Result<Message> {
        let msg = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (sender_id, recipient_id, listing_id, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id, sender_id, recipient_id, listing_id, body, sent_at
            "#,
        )
        .bind(new.sender_id)
        .bind(new.recipient_id)
        .bind(new.listing_id)
        .bind(new.body)
        .fetch_one(&self.db)
        .await?;
        Ok(msg)
    }

    async fn messages_for(&self, user_id: Uuid) -> anyhow::Result<Vec<Message>> {
        let rows = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, sender_id, recipient_id, listing_id, body, sent_at
              FROM messages
             WHERE sender_id = $1 OR recipient_id = $1
             ORDER BY sent_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
