use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::listings::repo_types::Listing;

/// Form body for posting or editing a listing. Numeric fields arrive as raw
/// strings so that blanks can default to zero.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListingForm {
    pub title: String,
    pub location: String,
    pub rent: String,
    pub size: String,
    pub capacity: String,
    pub description: String,
    pub image: String,
    /// HTML checkbox: present ("on") when ticked.
    pub occupied: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OwnerCard {
    pub id: Uuid,
    pub username: String,
    pub verified: bool,
}

/// `/room/{id}` view model.
#[derive(Debug, Serialize)]
pub struct RoomView {
    pub listing: Listing,
    pub owner: Option<OwnerCard>,
    pub can_request_booking: bool,
}
