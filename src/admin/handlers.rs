use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    admin::{dto::AdminView, services},
    auth::{extractors::CurrentUser, gate::require_staff},
    error::AppError,
    flash::{Flash, FlashRedirect, IncomingFlash, Page},
    state::AppState,
};

const ADMIN_DASHBOARD: &str = "/dashboard/admin";

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/admin", get(admin_dashboard))
        .route("/dashboard/admin/verify/:user_id/:user_type", post(verify_user))
        .route("/dashboard/admin/reject/:user_id/:user_type", post(reject_user))
        .route("/dashboard/admin/users/:user_id/delete", post(delete_user))
}

#[instrument(skip_all)]
pub async fn admin_dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    flash: IncomingFlash,
) -> Result<Page<AdminView>, AppError> {
    require_staff(user)?;
    let view = services::overview(state.users.as_ref()).await?;
    Ok(Page::new(flash, view))
}

#[instrument(skip_all, fields(%user_id, %user_type))]
pub async fn verify_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((user_id, user_type)): Path<(Uuid, String)>,
) -> Result<FlashRedirect, AppError> {
    require_staff(user)?;
    let target = services::set_verification(state.users.as_ref(), user_id, &user_type, true)
        .await
        .map_err(|e| e.back_to(ADMIN_DASHBOARD))?;
    Ok(FlashRedirect::new(
        ADMIN_DASHBOARD,
        Flash::success(format!("{} has been verified.", target.username)),
    ))
}

#[instrument(skip_all, fields(%user_id, %user_type))]
pub async fn reject_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((user_id, user_type)): Path<(Uuid, String)>,
) -> Result<FlashRedirect, AppError> {
    require_staff(user)?;
    let target = services::set_verification(state.users.as_ref(), user_id, &user_type, false)
        .await
        .map_err(|e| e.back_to(ADMIN_DASHBOARD))?;
    Ok(FlashRedirect::new(
        ADMIN_DASHBOARD,
        Flash::info(format!("Verification removed for {}.", target.username)),
    ))
}

#[instrument(skip_all, fields(%user_id))]
pub async fn delete_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<Uuid>,
) -> Result<FlashRedirect, AppError> {
    let admin = require_staff(user)?;
    let target = services::delete_user(state.users.as_ref(), &admin, user_id)
        .await
        .map_err(|e| e.back_to(ADMIN_DASHBOARD))?;
    Ok(FlashRedirect::new(
        ADMIN_DASHBOARD,
        Flash::success(format!("User {} deleted.", target.username)),
    ))
}

#[cfg(test)]
mod tests {
    use crate::{
        auth::repo_types::Role,
        state::AppState,
        test_support::{body_json, form_post, get, location},
    };

    #[tokio::test]
    async fn staff_verifies_and_lists_users() {
        let state = AppState::fake();
        let admin = state.seed_staff("root").await;
        let owner = state.seed_user("opal", Role::Owner).await;
        let cookie = state.session_for(&admin);
        let app = crate::app::build_app(state.clone());

        let res = form_post(
            &app,
            &format!("/dashboard/admin/verify/{}/owner", owner.id),
            "",
            Some(&cookie),
        )
        .await;
        assert_eq!(location(&res), "/dashboard/admin");
        assert!(state.users.find_by_id(owner.id).await.unwrap().unwrap().is_verified());

        let body = body_json(get(&app, "/dashboard/admin", Some(&cookie)).await).await;
        assert_eq!(body["data"]["owners"], 1);
        assert_eq!(body["data"]["unverified"], 0);
    }

    #[tokio::test]
    async fn non_staff_are_denied() {
        let state = AppState::fake();
        let owner = state.seed_user("opal", Role::Owner).await;
        let app = crate::app::build_app(state.clone());

        let res = get(&app, "/dashboard/admin", Some(&state.session_for(&owner))).await;
        assert_eq!(location(&res), "/");

        let res = form_post(
            &app,
            &format!("/dashboard/admin/verify/{}/owner", owner.id),
            "",
            Some(&state.session_for(&owner)),
        )
        .await;
        assert_eq!(location(&res), "/");
        assert!(!state.users.find_by_id(owner.id).await.unwrap().unwrap().is_verified());
    }

    #[tokio::test]
    async fn deleting_a_user_cascades_to_listings() {
        let state = AppState::fake();
        let admin = state.seed_staff("root").await;
        let owner = state.seed_user("opal", Role::Owner).await;
        let app = crate::app::build_app(state.clone());
        form_post(
            &app,
            "/post-new-listing",
            "title=Cabin&location=Rangpur",
            Some(&state.session_for(&owner)),
        )
        .await;
        assert_eq!(state.listings.list_all().await.unwrap().len(), 1);

        let res = form_post(
            &app,
            &format!("/dashboard/admin/users/{}/delete", owner.id),
            "",
            Some(&state.session_for(&admin)),
        )
        .await;
        assert_eq!(location(&res), "/dashboard/admin");
        assert!(state.users.find_by_id(owner.id).await.unwrap().is_none());
        assert!(state.listings.list_all().await.unwrap().is_empty());
    }
}
