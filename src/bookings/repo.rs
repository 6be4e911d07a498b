use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::bookings::repo_types::{BookingRequest, BookingStatus};

#[async_trait]
pub trait BookingRepo: Send + Sync {
    /// Inserts a pending request.
    async fn create(
        &self,
        renter_id: Uuid,
        owner_id: Uuid,
        listing_id: Uuid,
    ) -> anyhow::Result<BookingRequest>;
    async fn find(&self, id: Uuid) -> anyhow::Result<Option<BookingRequest>>;
    /// Unconditional write; `None` when the request does not exist.
    async fn set_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> anyhow::Result<Option<BookingRequest>>;
    async fn list_pending_for_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<BookingRequest>>;
    async fn list_resolved_for_renter(&self, renter_id: Uuid)
        -> anyhow::Result<Vec<BookingRequest>>;
    async fn list_for_renter(&self, renter_id: Uuid) -> anyhow::Result<Vec<BookingRequest>>;
    async fn list_for_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<BookingRequest>>;
}

const BOOKING_COLUMNS: &str = "id, renter_id, owner_id, listing_id, status, created_at, updated_at";

#[derive(Clone)]
pub struct PgBookingRepo {
    db: PgPool,
}

impl PgBookingRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn list_where(&self, filter: &str, id: Uuid) -> anyhow::Result<Vec<BookingRequest>> {
        let sql = format!(
            "SELECT {BOOKING_COLUMNS} FROM booking_requests WHERE {filter} ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, BookingRequest>(&sql)
            .bind(id)
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl BookingRepo for PgBookingRepo {
    async fn create(
        &self,
        renter_id: Uuid,
        owner_id: Uuid,
        listing_id: Uuid,
    ) -> anyhow::Result<BookingRequest> {
        let sql = format!(
            r#"
            INSERT INTO booking_requests (renter_id, owner_id, listing_id, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING {BOOKING_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, BookingRequest>(&sql)
            .bind(renter_id)
            .bind(owner_id)
            .bind(listing_id)
            .fetch_one(&self.db)
            .await?;
        Ok(row)
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<BookingRequest>> {
        let sql = format!("SELECT {BOOKING_COLUMNS} FROM booking_requests WHERE id = $1");
        let row = sqlx::query_as::<_, BookingRequest>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> anyhow::Result<Option<BookingRequest>> {
        let sql = format!(
            r#"
            UPDATE booking_requests
               SET status = $2, updated_at = now()
             WHERE id = $1
            RETURNING {BOOKING_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, BookingRequest>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.db)
            .await?;
        Ok(row)
    }

    async fn list_pending_for_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<BookingRequest>> {
        self.list_where("owner_id = $1 AND status = 'pending'", owner_id).await
    }

    async fn list_resolved_for_renter(
        &self,
        renter_id: Uuid,
    ) -> anyhow::Result<Vec<BookingRequest>> {
        self.list_where("renter_id = $1 AND status <> 'pending'", renter_id).await
    }

    async fn list_for_renter(&self, renter_id: Uuid) -> anyhow::Result<Vec<BookingRequest>> {
        self.list_where("renter_id = $1", renter_id).await
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<BookingRequest>> {
        self.list_where("owner_id = $1", owner_id).await
    }
}
