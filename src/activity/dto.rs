use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::activity::repo_types::Message;

/// Owner reply from `/owner/messages`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MessageForm {
    pub recipient: String, // username
    /// Blank when the reply is not about a listing.
    pub listing_id: String,
    pub body: String,
}

/// Message to a listing's owner from `/room/{id}/message`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RoomMessageForm {
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct MessageItem {
    #[serde(flatten)]
    pub message: Message,
    pub from: Option<String>,
    pub to: Option<String>,
    pub incoming: bool,
}

#[derive(Debug, Serialize)]
pub struct InboxView {
    pub received: usize,
    pub messages: Vec<MessageItem>,
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct ListingStats {
    pub listing_id: Uuid,
    pub title: String,
    pub views: i64,
    pub requests: usize,
    pub pending: usize,
    pub accepted: usize,
    pub rejected: usize,
}

#[derive(Debug, Default, Serialize)]
pub struct AnalyticsView {
    pub listings: Vec<ListingStats>,
    pub total_views: i64,
    pub total_requests: usize,
    pub total_pending: usize,
    pub total_accepted: usize,
    pub total_rejected: usize,
}
