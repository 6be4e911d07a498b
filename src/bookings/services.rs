use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    auth::repo_types::{Identity, Role},
    bookings::{
        dto::{FeedKind, NotificationItem, NotificationsView},
        repo::BookingRepo,
        repo_types::{BookingRequest, BookingStatus, Decision},
    },
    error::AppError,
    listings::repo::ListingRepo,
    state::AppState,
};

/// Files a pending request for `listing_id`; the owner is taken from the
/// listing. Repeated requests for the same listing are all kept.
pub async fn request_booking(
    bookings: &dyn BookingRepo,
    listings: &dyn ListingRepo,
    renter: &Identity,
    listing_id: Uuid,
) -> Result<BookingRequest, AppError> {
    let listing = listings
        .find(listing_id)
        .await?
        .ok_or(AppError::NotFound("Listing"))?;
    let request = bookings.create(renter.id, listing.owner_id, listing.id).await?;
    info!(
        request_id = %request.id,
        renter_id = %renter.id,
        owner_id = %listing.owner_id,
        listing_id = %listing.id,
        "booking requested"
    );
    Ok(request)
}

/// Applies the owner's decision. The status is written even when the request
/// was already resolved.
pub async fn decide(
    bookings: &dyn BookingRepo,
    actor: &Identity,
    request_id: Uuid,
    decision: Decision,
) -> Result<BookingRequest, AppError> {
    let request = bookings
        .find(request_id)
        .await?
        .ok_or(AppError::NotFound("Booking request"))?;

    if request.owner_id != actor.id {
        warn!(%request_id, actor_id = %actor.id, owner_id = %request.owner_id, "booking decision by non-owner");
        return Err(AppError::denied(
            "Only the listing owner can respond to this booking request.",
        ));
    }
    if request.status != BookingStatus::Pending {
        warn!(%request_id, from = %request.status, to = %decision.status(), "re-deciding resolved booking request");
    }

    let updated = bookings
        .set_status(request_id, decision.status())
        .await?
        .ok_or(AppError::NotFound("Booking request"))?;
    info!(%request_id, status = %updated.status, "booking request decided");
    Ok(updated)
}

pub async fn accept(
    bookings: &dyn BookingRepo,
    actor: &Identity,
    request_id: Uuid,
) -> Result<BookingRequest, AppError> {
    decide(bookings, actor, request_id, Decision::Accept).await
}

pub async fn reject(
    bookings: &dyn BookingRepo,
    actor: &Identity,
    request_id: Uuid,
) -> Result<BookingRequest, AppError> {
    decide(bookings, actor, request_id, Decision::Reject).await
}

/// `decision` is the raw path segment (`accept` | `reject`).
pub async fn respond(
    bookings: &dyn BookingRepo,
    actor: &Identity,
    request_id: Uuid,
    decision: &str,
) -> Result<BookingRequest, AppError> {
    let decision: Decision = decision
        .parse()
        .map_err(|_| AppError::validation("Unknown response; expected accept or reject."))?;
    decide(bookings, actor, request_id, decision).await
}

/// Owners see requests awaiting their decision; renters see decisions made on
/// their requests.
pub async fn notifications(
    state: &AppState,
    user: &Identity,
) -> Result<NotificationsView, AppError> {
    let (kind, requests) = match user.role() {
        Some(Role::Owner) => (
            FeedKind::Pending,
            state.bookings.list_pending_for_owner(user.id).await?,
        ),
        Some(Role::Renter) => (
            FeedKind::Resolved,
            state.bookings.list_resolved_for_renter(user.id).await?,
        ),
        None => {
            return Err(AppError::denied(
                "Notifications are only available to owners and renters.",
            ))
        }
    };

    let counterpart_of: fn(&BookingRequest) -> Uuid = match kind {
        FeedKind::Pending => |r: &BookingRequest| r.renter_id,
        FeedKind::Resolved => |r: &BookingRequest| r.owner_id,
    };
    let items = describe(state, requests, counterpart_of).await?;
    Ok(NotificationsView { kind, count: items.len(), items })
}

/// Attaches the listing title and the other party's username to each request.
pub async fn describe(
    state: &AppState,
    requests: Vec<BookingRequest>,
    counterpart_of: fn(&BookingRequest) -> Uuid,
) -> Result<Vec<NotificationItem>, AppError> {
    let mut items = Vec::with_capacity(requests.len());
    for request in requests {
        let listing_title = state.listings.find(request.listing_id).await?.map(|l| l.title);
        let counterpart = state
            .users
            .find_by_id(counterpart_of(&request))
            .await?
            .map(|u| u.username);
        items.push(NotificationItem { request, listing_title, counterpart });
    }
    Ok(items)
}
