use axum::{
    extract::{Path, State},
    routing::{get, post},
    Form, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    activity,
    auth::{
        extractors::CurrentUser,
        gate::{require_login, require_role},
        repo_types::Role,
    },
    bookings,
    error::AppError,
    flash::{Flash, FlashRedirect, IncomingFlash, Page},
    listings::{
        dto::{ListingForm, OwnerCard, RoomView},
        repo_types::Listing,
        services,
    },
    state::AppState,
};

const OWNER_DASHBOARD: &str = "/dashboard/owner";
const OWNER_LISTINGS: &str = "/owner/listings";

pub fn listing_routes() -> Router<AppState> {
    Router::new()
        .route("/post-new-listing", post(post_new_listing))
        .route("/owner/listings", get(my_listings))
        .route("/owner/listings/:id/edit", post(edit_listing))
        .route("/owner/listings/:id/delete", post(delete_listing))
        .route(
            "/room/:id",
            get(room_detail).post(bookings::handlers::request_booking),
        )
        .route("/room/:id/message", post(message_owner))
}

#[instrument(skip_all)]
pub async fn post_new_listing(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<ListingForm>,
) -> Result<FlashRedirect, AppError> {
    let owner = require_role(user, Role::Owner)?;
    let listing = services::create(state.listings.as_ref(), &owner, form)
        .await
        .map_err(|e| e.back_to(OWNER_DASHBOARD))?;
    Ok(FlashRedirect::new(
        OWNER_DASHBOARD,
        Flash::success(format!("Listing \"{}\" posted.", listing.title)),
    ))
}

#[instrument(skip_all)]
pub async fn my_listings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    flash: IncomingFlash,
) -> Result<Page<Vec<Listing>>, AppError> {
    let owner = require_role(user, Role::Owner)?;
    let listings = state.listings.list_for_owner(owner.id).await?;
    Ok(Page::new(flash, listings))
}

#[instrument(skip_all, fields(listing_id = %id))]
pub async fn edit_listing(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Form(form): Form<ListingForm>,
) -> Result<FlashRedirect, AppError> {
    let owner = require_role(user, Role::Owner)?;
    services::update(state.listings.as_ref(), &owner, id, form)
        .await
        .map_err(|e| e.back_to(OWNER_LISTINGS))?;
    Ok(FlashRedirect::new(OWNER_LISTINGS, Flash::success("Listing updated.")))
}

#[instrument(skip_all, fields(listing_id = %id))]
pub async fn delete_listing(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<FlashRedirect, AppError> {
    let owner = require_role(user, Role::Owner)?;
    services::delete(state.listings.as_ref(), &owner, id).await?;
    Ok(FlashRedirect::new(OWNER_LISTINGS, Flash::success("Listing deleted.")))
}

/// Public room page. Records the visit before rendering.
#[instrument(skip_all, fields(listing_id = %id))]
pub async fn room_detail(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    flash: IncomingFlash,
    Path(id): Path<Uuid>,
) -> Result<Page<RoomView>, AppError> {
    let listing = state
        .listings
        .find(id)
        .await?
        .ok_or(AppError::NotFound("Listing"))?;
    activity::services::record_view(&state, &listing, user.as_ref()).await;

    let owner = state
        .users
        .find_by_id(listing.owner_id)
        .await?
        .map(|o| OwnerCard {
            id: o.id,
            verified: o.is_verified(),
            username: o.username,
        });
    let can_request_booking = user
        .as_ref()
        .is_some_and(|u| u.role() == Some(Role::Renter) && !listing.occupied);

    Ok(Page::new(
        flash,
        RoomView { listing, owner, can_request_booking },
    ))
}

/// Lets any signed-in visitor of a room page reach its owner.
#[instrument(skip_all, fields(listing_id = %id))]
pub async fn message_owner(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Form(form): Form<activity::dto::RoomMessageForm>,
) -> Result<FlashRedirect, AppError> {
    let sender = require_login(user)?;
    let room = format!("/room/{id}");
    let listing = state
        .listings
        .find(id)
        .await?
        .ok_or(AppError::NotFound("Listing"))?;
    activity::services::send_message(
        &state,
        &sender,
        listing.owner_id,
        Some(listing.id),
        &form.body,
    )
    .await
    .map_err(|e| e.back_to(room.clone()))?;
    Ok(FlashRedirect::new(room, Flash::success("Message sent to the owner.")))
}
