use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::{
        extractors::CurrentUser,
        gate::{require_login, require_role},
        repo_types::Role,
    },
    bookings::{dto::NotificationsView, repo_types::BookingRequest, services},
    error::AppError,
    flash::{Flash, FlashRedirect, IncomingFlash, Page},
    state::AppState,
};

const NOTIFICATIONS: &str = "/notifications";

pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(notifications))
        .route("/notifications/respond/:id/:decision", post(respond))
        .route("/booking/accept/:id", post(accept))
        .route("/booking/reject/:id", post(reject))
}

/// `POST /room/{id}`; mounted by the listings router next to the room page.
#[instrument(skip_all, fields(listing_id = %listing_id))]
pub async fn request_booking(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(listing_id): Path<Uuid>,
) -> Result<FlashRedirect, AppError> {
    let renter = require_role(user, Role::Renter)?;
    services::request_booking(
        state.bookings.as_ref(),
        state.listings.as_ref(),
        &renter,
        listing_id,
    )
    .await?;
    Ok(FlashRedirect::new(
        format!("/room/{listing_id}"),
        Flash::success("Booking request sent to the owner."),
    ))
}

#[instrument(skip_all)]
pub async fn notifications(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    flash: IncomingFlash,
) -> Result<Page<NotificationsView>, AppError> {
    let user = require_login(user)?;
    let view = services::notifications(&state, &user).await?;
    Ok(Page::new(flash, view))
}

fn decided(request: &BookingRequest) -> FlashRedirect {
    FlashRedirect::new(
        NOTIFICATIONS,
        Flash::success(format!("Booking request {}.", request.status)),
    )
}

#[instrument(skip_all, fields(request_id = %id, %decision))]
pub async fn respond(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((id, decision)): Path<(Uuid, String)>,
) -> Result<FlashRedirect, AppError> {
    let owner = require_role(user, Role::Owner)?;
    let request = services::respond(state.bookings.as_ref(), &owner, id, &decision)
        .await
        .map_err(|e| e.back_to(NOTIFICATIONS))?;
    Ok(decided(&request))
}

#[instrument(skip_all, fields(request_id = %id))]
pub async fn accept(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<FlashRedirect, AppError> {
    let owner = require_role(user, Role::Owner)?;
    let request = services::accept(state.bookings.as_ref(), &owner, id).await?;
    Ok(decided(&request))
}

#[instrument(skip_all, fields(request_id = %id))]
pub async fn reject(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<FlashRedirect, AppError> {
    let owner = require_role(user, Role::Owner)?;
    let request = services::reject(state.bookings.as_ref(), &owner, id).await?;
    Ok(decided(&request))
}
