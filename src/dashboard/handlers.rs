use axum::{extract::State, routing::get, Router};
use tracing::instrument;

use crate::{
    auth::{extractors::CurrentUser, gate::require_role, repo_types::Role},
    bookings::services::describe,
    dashboard::dto::{OwnerDashboard, RenterDashboard},
    error::AppError,
    flash::{IncomingFlash, Page},
    state::AppState,
};

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/renter", get(renter_dashboard))
        .route("/dashboard/owner", get(owner_dashboard))
}

#[instrument(skip_all)]
pub async fn renter_dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    flash: IncomingFlash,
) -> Result<Page<RenterDashboard>, AppError> {
    let renter = require_role(user, Role::Renter)?;
    let listings = state.listings.list_all().await?;
    let requests = state.bookings.list_for_renter(renter.id).await?;
    let my_requests = describe(&state, requests, |r| r.owner_id).await?;
    Ok(Page::new(
        flash,
        RenterDashboard { user: renter, listings, my_requests },
    ))
}

#[instrument(skip_all)]
pub async fn owner_dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    flash: IncomingFlash,
) -> Result<Page<OwnerDashboard>, AppError> {
    let owner = require_role(user, Role::Owner)?;
    let listings = state.listings.list_for_owner(owner.id).await?;
    let pending = state.bookings.list_pending_for_owner(owner.id).await?;
    let pending_requests = describe(&state, pending, |r| r.renter_id).await?;
    Ok(Page::new(
        flash,
        OwnerDashboard { user: owner, listings, pending_requests },
    ))
}
