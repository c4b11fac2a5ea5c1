use std::sync::Arc;

mod app;
mod auth;
mod config;
mod db;
mod error;
mod products;
mod seed;
mod state;
#[cfg(test)]
mod testing;

use crate::{config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "pharmalab=debug,axum=info,tower_http=info".to_string());
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
    tracing::info!(environment = ?config.environment, "configuration loaded");
    let pool = db::connect(&config).await?;
    db::migrate(&pool).await?;

    if std::env::args().nth(1).as_deref() == Some("seed") {
        let res = seed::run(&pool).await;
        pool.close().await;
        return res;
    }

    let app = app::build_app(AppState::new(&config, pool.clone()));
    let res = app::serve(app, &config.host, config.port).await;

    pool.close().await;
    tracing::info!("database pool closed");
    res
}
