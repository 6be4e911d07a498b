use serde::Serialize;

use crate::{
    auth::repo_types::Identity, bookings::dto::NotificationItem, listings::repo_types::Listing,
};

#[derive(Debug, Serialize)]
pub struct RenterDashboard {
    pub user: Identity,
    /// Every listing, newest first.
    pub listings: Vec<Listing>,
    pub my_requests: Vec<NotificationItem>,
}

#[derive(Debug, Serialize)]
pub struct OwnerDashboard {
    pub user: Identity,
    pub listings: Vec<Listing>,
    pub pending_requests: Vec<NotificationItem>,
}
