use serde::Serialize;

use crate::bookings::repo_types::BookingRequest;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    /// Requests waiting on an owner's decision.
    Pending,
    /// Decisions a renter has received.
    Resolved,
}

#[derive(Debug, Serialize)]
pub struct NotificationItem {
    #[serde(flatten)]
    pub request: BookingRequest,
    pub listing_title: Option<String>,
    /// Renter for owners, owner for renters.
    pub counterpart: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NotificationsView {
    pub kind: FeedKind,
    pub count: usize,
    pub items: Vec<NotificationItem>,
}
