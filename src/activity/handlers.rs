use axum::{extract::State, routing::get, Form, Router};
use tracing::instrument;

use crate::{
    activity::{
        dto::{AnalyticsView, InboxView, MessageForm},
        services,
    },
    auth::{extractors::CurrentUser, gate::require_role, repo_types::Role},
    error::AppError,
    flash::{Flash, FlashRedirect, IncomingFlash, Page},
    state::AppState,
};

const OWNER_MESSAGES: &str = "/owner/messages";

pub fn activity_routes() -> Router<AppState> {
    Router::new()
        .route("/owner/messages", get(owner_inbox).post(owner_reply))
        .route("/owner/analytics", get(owner_analytics))
}

#[instrument(skip_all)]
pub async fn owner_inbox(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    flash: IncomingFlash,
) -> Result<Page<InboxView>, AppError> {
    let owner = require_role(user, Role::Owner)?;
    let view = services::inbox(&state, &owner).await?;
    Ok(Page::new(flash, view))
}

#[instrument(skip_all)]
pub async fn owner_reply(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<MessageForm>,
) -> Result<FlashRedirect, AppError> {
    let owner = require_role(user, Role::Owner)?;
    services::send_message_to(&state, &owner, &form.recipient, &form.listing_id, &form.body)
        .await
        .map_err(|e| e.back_to(OWNER_MESSAGES))?;
    Ok(FlashRedirect::new(OWNER_MESSAGES, Flash::success("Message sent.")))
}

#[instrument(skip_all)]
pub async fn owner_analytics(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    flash: IncomingFlash,
) -> Result<Page<AnalyticsView>, AppError> {
    let owner = require_role(user, Role::Owner)?;
    let view = services::owner_analytics(&state, &owner).await?;
    Ok(Page::new(flash, view))
}
