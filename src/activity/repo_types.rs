use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ListingView {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub viewer_id: Option<Uuid>, // None for anonymous visitors
    pub viewed_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub listing_id: Option<Uuid>,
    pub body: String,
    pub sent_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub listing_id: Option<Uuid>,
    pub body: String,
}
