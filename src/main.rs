use std::sync::Arc;

mod activity;
mod admin;
mod app;
mod auth;
mod bookings;
mod config;
mod cookies;
mod dashboard;
mod db;
mod error;
mod flash;
mod listings;
mod state;

#[cfg(test)]
mod memory;
#[cfg(test)]
mod test_support;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "roomify=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = Arc::new(AppConfig::from_env()?);
    let db = db::connect(&config.database_url).await?;
    db::migrate(&db).await;

    let state = AppState::from_pool(config.clone(), db);
    if let Some(seed) = &config.admin {
        auth::services::ensure_admin(state.users.as_ref(), seed).await?;
    }

    let app = app::build_app(state);
    app::serve(app, &config).await
}
