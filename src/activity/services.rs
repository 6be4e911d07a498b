use std::collections::HashMap;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    activity::{
        dto::{AnalyticsView, InboxView, ListingStats, MessageItem},
        repo_types::{Message, NewMessage},
    },
    auth::repo_types::Identity,
    bookings::repo_types::BookingStatus,
    error::AppError,
    listings::repo_types::Listing,
    state::AppState,
};

/// Logs a page view unless the viewer owns the listing. Failures are logged
/// and swallowed so the page still renders.
pub async fn record_view(state: &AppState, listing: &Listing, viewer: Option<&Identity>) {
    if viewer.is_some_and(|v| v.id == listing.owner_id) {
        return;
    }
    match state.activity.record_view(listing.id, viewer.map(|v| v.id)).await {
        Ok(view) => debug!(view_id = %view.id, listing_id = %listing.id, "listing view recorded"),
        Err(e) => warn!(error = %e, listing_id = %listing.id, "failed to record listing view"),
    }
}

pub async fn send_message(
    state: &AppState,
    sender: &Identity,
    recipient_id: Uuid,
    listing_id: Option<Uuid>,
    body: &str,
) -> Result<Message, AppError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(AppError::validation("Message cannot be empty."));
    }
    if recipient_id == sender.id {
        return Err(AppError::validation("You cannot message yourself."));
    }
    if state.users.find_by_id(recipient_id).await?.is_none() {
        return Err(AppError::NotFound("Recipient"));
    }
    if let Some(id) = listing_id {
        if state.listings.find(id).await?.is_none() {
            return Err(AppError::NotFound("Listing"));
        }
    }

    let message = state
        .activity
        .send_message(NewMessage {
            sender_id: sender.id,
            recipient_id,
            listing_id,
            body: body.to_string(),
        })
        .await?;
    info!(message_id = %message.id, sender_id = %sender.id, %recipient_id, "message sent");
    Ok(message)
}

/// Optional listing reference from a form field; blank means none.
pub fn parse_listing_ref(raw: &str) -> Result<Option<Uuid>, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<Uuid>()
        .map(Some)
        .map_err(|_| AppError::validation("Invalid listing reference."))
}

/// Resolves a recipient by username, then sends.
pub async fn send_message_to(
    state: &AppState,
    sender: &Identity,
    recipient: &str,
    listing_ref: &str,
    body: &str,
) -> Result<Message, AppError> {
    let listing_id = parse_listing_ref(listing_ref)?;
    let recipient = state
        .users
        .find_by_username(recipient.trim())
        .await?
        .ok_or(AppError::NotFound("Recipient"))?;
    send_message(state, sender, recipient.id, listing_id, body).await
}

pub async fn inbox(state: &AppState, user: &Identity) -> Result<InboxView, AppError> {
    let messages = state.activity.messages_for(user.id).await?;

    let mut names: HashMap<Uuid, Option<String>> = HashMap::new();
    names.insert(user.id, Some(user.username.clone()));
    let mut items = Vec::with_capacity(messages.len());
    for message in messages {
        for id in [message.sender_id, message.recipient_id] {
            if !names.contains_key(&id) {
                let name = state.users.find_by_id(id).await?.map(|u| u.username);
                names.insert(id, name);
            }
        }
        items.push(MessageItem {
            from: names.get(&message.sender_id).cloned().flatten(),
            to: names.get(&message.recipient_id).cloned().flatten(),
            incoming: message.recipient_id == user.id,
            message,
        });
    }

    let received = items.iter().filter(|m| m.incoming).count();
    Ok(InboxView { received, messages: items })
}

/// Per-listing view and booking counts for everything `owner` lists.
pub async fn owner_analytics(
    state: &AppState,
    owner: &Identity,
) -> Result<AnalyticsView, AppError> {
    let listings = state.listings.list_for_owner(owner.id).await?;
    let ids: Vec<Uuid> = listings.iter().map(|l| l.id).collect();
    let views = state.activity.view_counts(&ids).await?;
    let requests = state.bookings.list_for_owner(owner.id).await?;

    let mut view = AnalyticsView::default();
    for listing in listings {
        let mut stats = ListingStats {
            listing_id: listing.id,
            title: listing.title,
            views: views.get(&listing.id).copied().unwrap_or(0),
            ..Default::default()
        };
        for req in requests.iter().filter(|r| r.listing_id == listing.id) {
            stats.requests += 1;
            match req.status {
                BookingStatus::Pending => stats.pending += 1,
                BookingStatus::Accepted => stats.accepted += 1,
                BookingStatus::Rejected => stats.rejected += 1,
            }
        }
        view.total_views += stats.views;
        view.total_requests += stats.requests;
        view.total_pending += stats.pending;
        view.total_accepted += stats.accepted;
        view.total_rejected += stats.rejected;
        view.listings.push(stats);
    }
    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::repo_types::Role,
        bookings::services::{accept, request_booking},
        listings::repo_types::ListingFields,
    };
    use rust_decimal::Decimal;

    fn fields(title: &str) -> ListingFields {
        ListingFields {
            title: title.into(),
            location: "Chattogram".into(),
            rent: Decimal::ZERO,
            size: 0,
            capacity: 0,
            description: String::new(),
            image: None,
            occupied: false,
        }
    }

    #[tokio::test]
    async fn owner_views_are_not_counted() {
        let state = AppState::fake();
        let owner = state.seed_user("ola", Role::Owner).await;
        let renter = state.seed_user("rae", Role::Renter).await;
        let listing = state.listings.create(owner.id, fields("Nook")).await.unwrap();

        record_view(&state, &listing, Some(&owner)).await;
        record_view(&state, &listing, Some(&renter)).await;
        record_view(&state, &listing, None).await;

        let counts = state.activity.view_counts(&[listing.id]).await.unwrap();
        assert_eq!(counts.get(&listing.id), Some(&2));
    }

    #[tokio::test]
    async fn analytics_counts_views_and_requests() {
        let state = AppState::fake();
        let owner = state.seed_user("ola", Role::Owner).await;
        let renter = state.seed_user("rae", Role::Renter).await;
        let nook = state.listings.create(owner.id, fields("Nook")).await.unwrap();
        let loft = state.listings.create(owner.id, fields("Loft")).await.unwrap();

        record_view(&state, &nook, Some(&renter)).await;
        record_view(&state, &nook, None).await;
        let a = request_booking(state.bookings.as_ref(), state.listings.as_ref(), &renter, nook.id)
            .await
            .unwrap();
        request_booking(state.bookings.as_ref(), state.listings.as_ref(), &renter, nook.id)
            .await
            .unwrap();
        accept(state.bookings.as_ref(), &owner, a.id).await.unwrap();

        let view = owner_analytics(&state, &owner).await.unwrap();
        assert_eq!(view.listings.len(), 2);
        let nook_stats = view.listings.iter().find(|s| s.listing_id == nook.id).unwrap();
        assert_eq!(nook_stats.views, 2);
        assert_eq!(nook_stats.requests, 2);
        assert_eq!(nook_stats.pending, 1);
        assert_eq!(nook_stats.accepted, 1);
        let loft_stats = view.listings.iter().find(|s| s.listing_id == loft.id).unwrap();
        assert_eq!(loft_stats.views, 0);
        assert_eq!(view.total_views, 2);
        assert_eq!(view.total_requests, 2);
    }

    #[tokio::test]
    async fn message_rules() {
        let state = AppState::fake();
        let owner = state.seed_user("ola", Role::Owner).await;
        let renter = state.seed_user("rae", Role::Renter).await;

        assert!(matches!(
            send_message(&state, &renter, owner.id, None, "   ").await,
            Err(AppError::Validation { .. })
        ));
        assert!(matches!(
            send_message(&state, &renter, renter.id, None, "hi").await,
            Err(AppError::Validation { .. })
        ));
        assert!(matches!(
            send_message_to(&state, &renter, "nobody", "", "hi").await,
            Err(AppError::NotFound(_))
        ));

        send_message(&state, &renter, owner.id, None, "Is the room free in May?").await.unwrap();
        send_message_to(&state, &owner, "rae", "", "Yes it is.").await.unwrap();

        let inbox = inbox(&state, &owner).await.unwrap();
        assert_eq!(inbox.messages.len(), 2);
        assert_eq!(inbox.received, 1);
        assert_eq!(inbox.messages[0].message.body, "Yes it is.");
        assert!(!inbox.messages[0].incoming);
        assert_eq!(inbox.messages[1].from.as_deref(), Some("rae"));
    }

    #[test]
    fn listing_ref_parsing() {
        assert_eq!(parse_listing_ref("  ").unwrap(), None);
        let id = Uuid::new_v4();
        assert_eq!(parse_listing_ref(&id.to_string()).unwrap(), Some(id));
        assert!(matches!(parse_listing_ref("room-7"), Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn message_about_unknown_listing_is_not_found() {
        let state = AppState::fake();
        let owner = state.seed_user("ola", Role::Owner).await;
        let renter = state.seed_user("rae", Role::Renter).await;

        let err = send_message(&state, &owner, renter.id, Some(Uuid::new_v4()), "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("Listing")));
        assert!(state.activity.messages_for(owner.id).await.unwrap().is_empty());

        let nook = state.listings.create(owner.id, fields("Nook")).await.unwrap();
        let sent = send_message_to(&state, &owner, "rae", &nook.id.to_string(), "hello")
            .await
            .unwrap();
        assert_eq!(sent.listing_id, Some(nook.id));
    }
}
