use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Accepted,
    Rejected,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Accepted => "accepted",
            BookingStatus::Rejected => "rejected",
        })
    }
}

/// Owner's answer to a booking request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub fn status(self) -> BookingStatus {
        match self {
            Decision::Accept => BookingStatus::Accepted,
            Decision::Reject => BookingStatus::Rejected,
        }
    }
}

impl FromStr for Decision {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(Decision::Accept),
            "reject" => Ok(Decision::Reject),
            other => anyhow::bail!("unknown decision {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct BookingRequest {
    pub id: Uuid,
    pub renter_id: Uuid,
    pub owner_id: Uuid, // copied from the listing at creation
    pub listing_id: Uuid,
    pub status: BookingStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
