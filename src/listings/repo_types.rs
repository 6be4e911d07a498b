use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// A room offered for rent.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Listing {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub location: String,
    pub rent: Decimal,
    pub size: i32,     // square metres
    pub capacity: i32, // occupants
    pub description: String,
    pub image: Option<String>, // external image reference
    pub created_at: OffsetDateTime,
    pub occupied: bool,
}

/// Owner-editable listing attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingFields {
    pub title: String,
    pub location: String,
    pub rent: Decimal,
    pub size: i32,
    pub capacity: i32,
    pub description: String,
    pub image: Option<String>,
    pub occupied: bool,
}
