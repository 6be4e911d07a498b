use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{HomeView, LoginForm, RegisterForm},
        extractors::{CurrentUser, SESSION_COOKIE},
        jwt::JwtKeys,
        repo_types::Role,
        services,
    },
    cookies,
    error::{AppError, LANDING_PAGE},
    flash::{Flash, FlashRedirect, IncomingFlash, Page},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/login/:role", post(login))
        .route("/register/:role", post(register))
        .route("/logout", get(logout).post(logout))
}

fn parse_role(raw: &str) -> Result<Role, AppError> {
    raw.parse().map_err(|_| AppError::NotFound("Role"))
}

#[instrument(skip_all)]
pub async fn home(CurrentUser(user): CurrentUser, flash: IncomingFlash) -> Page<HomeView> {
    Page::new(
        flash,
        HomeView {
            user,
            login_paths: ["/login/renter", "/login/owner"],
            register_paths: ["/register/renter", "/register/owner"],
        },
    )
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Path(role): Path<String>,
    Form(form): Form<LoginForm>,
) -> Result<FlashRedirect, AppError> {
    let role = parse_role(&role)?;
    let user = services::authenticate(state.users.as_ref(), &form.username, &form.password).await?;

    let destination = if user.is_staff {
        "/dashboard/admin"
    } else if user.role() == Some(role) {
        role.dashboard_path()
    } else {
        warn!(user_id = %user.id, requested = %role, actual = ?user.role(), "login with wrong role");
        return Err(AppError::denied(format!(
            "This account is not registered as a {role}."
        )));
    };

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;
    let session = cookies::build(
        SESSION_COOKIE,
        &token,
        Some(keys.ttl_secs()),
        state.config.cookie_secure,
    );

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(FlashRedirect::new(
        destination,
        Flash::success(format!("Logged in successfully as {}!", role.label())),
    )
    .with_cookie(session))
}

#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    Path(role): Path<String>,
    Form(form): Form<RegisterForm>,
) -> Result<FlashRedirect, AppError> {
    let role = parse_role(&role)?;
    services::register(state.users.as_ref(), role, form).await?;
    Ok(FlashRedirect::new(
        LANDING_PAGE,
        Flash::success(format!(
            "Account created successfully as {}! Please log in.",
            role.label()
        )),
    ))
}

#[instrument(skip_all)]
pub async fn logout(CurrentUser(user): CurrentUser) -> Response {
    match user {
        Some(user) => {
            info!(user_id = %user.id, "user logged out");
            FlashRedirect::new(LANDING_PAGE, Flash::info("You have been logged out."))
                .with_cookie(cookies::expire(SESSION_COOKIE))
                .into_response()
        }
        None => Redirect::to(LANDING_PAGE).into_response(),
    }
}
